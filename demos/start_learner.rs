//! Starts a learner, which listens for the accept-acks acceptors fan out
//! to it and prints each instance's decided value as soon as a majority
//! agrees.
//!
//! Run as follows
//!     RUST_LOG=classic_paxos=info cargo run --example start_learner -- Config
//! The learner's own address comes from `Config.toml`'s `[learners]`
//! table, entry 0; this demo supports only a single learner.

extern crate classic_paxos;
extern crate env_logger;
#[macro_use]
extern crate log;

use std::env;

use classic_paxos::message::WireMessage;
use classic_paxos::{Learner, NetConfig, NetNode};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 2 {
        panic!("expected 1 argument (config_file) excluding the binary name");
    }

    let config = NetConfig::load(&args[1]).expect("failed to load config");
    let addr = *config
        .learners
        .first()
        .expect("Config.toml has no [learners] entries");

    let node = NetNode::bind(addr).expect("failed to bind learner socket");
    let mut learner = Learner::new(config.quorum_size());

    info!("learner listening on {}", addr);

    loop {
        let (msg, _from) = match node.receive().expect("transport failure") {
            Some(pair) => pair,
            None => continue,
        };

        if let WireMessage::AcceptAck(ack) = msg {
            let iid = ack.iid;
            if let Some(value) = learner.observe(&ack) {
                println!("instance {} decided: {:?}", iid, String::from_utf8_lossy(value));
            }
        }
    }
}
