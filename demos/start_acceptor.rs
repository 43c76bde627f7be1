//! Starts one acceptor, which listens indefinitely for prepare/accept
//! requests (and repeat requests) from proposers.
//!
//! Run as follows
//!     RUST_LOG=classic_paxos=info cargo run --example start_acceptor -- <acceptor_id> Config
//! where <acceptor_id> is this acceptor's 0-based index in `Config.toml`'s
//! `[acceptors]` table.

extern crate classic_paxos;
extern crate env_logger;
#[macro_use]
extern crate log;

use std::env;

use classic_paxos::message::WireMessage;
use classic_paxos::{Acceptor, NetConfig, NetNode};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        panic!("expected 2 arguments (acceptor_id, config_file) excluding the binary name");
    }

    let id: i32 = args[1].parse().expect("acceptor_id must be an integer");
    let config = NetConfig::load(&args[2]).expect("failed to load config");
    let addr = config.acceptor_addr(id).expect("no such acceptor id in config");

    let node = NetNode::bind(addr).expect("failed to bind acceptor socket");
    let mut acceptor = Acceptor::new(id);

    info!("acceptor {} listening on {}", id, addr);

    loop {
        let (msg, from) = match node.receive().expect("transport failure") {
            Some(pair) => pair,
            None => continue,
        };

        match msg {
            WireMessage::PrepareReq(pr) => {
                let rec = acceptor.receive_prepare(&pr);
                let ack = WireMessage::PrepareAck(classic_paxos::message::AcceptorAck::from_record(id, &rec));
                let _ = node.send(&ack, from);
            }
            WireMessage::AcceptReq(ar) => {
                let ballot = ar.ballot;
                let rec = acceptor.receive_accept(&ar);
                let accepted = rec.ballot == ballot;
                let ack = WireMessage::AcceptAck(classic_paxos::message::AcceptorAck::from_record(id, &rec));
                let _ = node.send(&ack, from);
                if accepted {
                    for learner in &config.learners {
                        let _ = node.send(&ack, *learner);
                    }
                }
            }
            WireMessage::RepeatReq(rr) => {
                if let Some(rec) = acceptor.receive_repeat(rr.iid) {
                    let ack = WireMessage::AcceptAck(classic_paxos::message::AcceptorAck::from_record(id, &rec));
                    let _ = node.send(&ack, from);
                }
            }
            WireMessage::PrepareAck(_) | WireMessage::AcceptAck(_) | WireMessage::Submit(_) => {
                trace_ignored(&msg, from);
            }
        }
    }
}

fn trace_ignored(msg: &WireMessage, from: std::net::SocketAddr) {
    trace!("acceptor: ignoring {:?} from {}", msg, from);
}
