//! Starts one proposer, which listens for client submissions and
//! acceptor acks, driving instances through phase 1 and phase 2.
//!
//! Run as follows
//!     RUST_LOG=classic_paxos=info cargo run --example start_proposer -- <proposer_id> Config
//! where <proposer_id> is this proposer's 0-based index in `Config.toml`'s
//! `[proposers]` table.

extern crate classic_paxos;
extern crate env_logger;
#[macro_use]
extern crate log;

use std::env;

use classic_paxos::message::WireMessage;
use classic_paxos::{NetConfig, NetNode, Proposer};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        panic!("expected 2 arguments (proposer_id, config_file) excluding the binary name");
    }

    let id: i32 = args[1].parse().expect("proposer_id must be an integer");
    let config = NetConfig::load(&args[2]).expect("failed to load config");
    let addr = config.proposer_addr(id).expect("no such proposer id in config");

    let node = NetNode::bind(addr).expect("failed to bind proposer socket");
    let mut proposer = Proposer::new(id, config.quorum_size());

    info!("proposer {} listening on {}", id, addr);

    loop {
        let (msg, from) = match node.receive().expect("transport failure") {
            Some(pair) => pair,
            None => continue,
        };

        match msg {
            WireMessage::Submit(submit) => {
                proposer.propose(submit.value);
                drive_accept(&node, &mut proposer, &config);
                if proposer.prepared_count() == 0 {
                    let req = proposer.prepare();
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                }
            }
            WireMessage::PrepareAck(ack) => {
                if let Some(req) = proposer.receive_prepare_ack(&ack) {
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                } else {
                    drive_accept(&node, &mut proposer, &config);
                }
            }
            WireMessage::AcceptAck(ack) => {
                if let Some(req) = proposer.receive_accept_ack(&ack) {
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                }
            }
            WireMessage::PrepareReq(_) | WireMessage::AcceptReq(_) | WireMessage::RepeatReq(_) => {
                debug!("proposer {}: ignoring acceptor-bound message from {}", id, from);
            }
        }
    }
}

fn drive_accept(node: &NetNode, proposer: &mut Proposer, config: &NetConfig) {
    while let Some(req) = proposer.accept() {
        let _ = node.broadcast(&WireMessage::AcceptReq(req), &config.acceptors);
    }
}
