//! Simulates an entire deployment locally: every acceptor, proposer, and
//! the learner run as threads in one process, talking over real UDP
//! sockets on loopback, driven by `Config.toml`.
//!
//! Run as follows
//!     RUST_LOG=classic_paxos=info cargo run --example simulate

extern crate bincode;
extern crate classic_paxos;
extern crate env_logger;
#[macro_use]
extern crate log;

use std::thread;

use classic_paxos::message::WireMessage;
use classic_paxos::{Acceptor, Learner, NetConfig, NetNode, Proposer};

fn main() {
    env_logger::init();

    let config = NetConfig::load("Config").expect("failed to load Config.toml");
    info!("{:?}", config);

    let mut handles = Vec::new();

    for (id, &addr) in config.acceptors.iter().enumerate() {
        let acceptor_id = id as i32;
        let cfg = config.clone();
        handles.push(thread::spawn(move || run_acceptor(acceptor_id, addr, cfg)));
    }

    for (id, &addr) in config.proposers.iter().enumerate() {
        let proposer_id = id as i32;
        let cfg = config.clone();
        handles.push(thread::spawn(move || run_proposer(proposer_id, addr, cfg)));
    }

    if let Some(&learner_addr) = config.learners.first() {
        let cfg = config.clone();
        handles.push(thread::spawn(move || run_learner(learner_addr, cfg)));
    }

    // Give the sockets a moment to bind before anyone submits a value.
    thread::sleep(std::time::Duration::from_millis(100));

    if let Some(&proposer_addr) = config.proposers.first() {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0").expect("client socket");
        let msg = WireMessage::Submit(classic_paxos::message::Submit {
            value: b"hello from simulate".to_vec(),
        });
        let encoded = bincode::serialize(&msg).expect("Submit always encodes");
        socket.send_to(&encoded, proposer_addr).expect("send to proposer");
    }

    for handle in handles {
        let _ = handle.join();
    }
}

fn run_acceptor(id: i32, addr: std::net::SocketAddr, config: NetConfig) {
    let node = NetNode::bind(addr).expect("bind acceptor socket");
    let mut acceptor = Acceptor::new(id);
    loop {
        let (msg, from) = match node.receive().expect("acceptor transport failure") {
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
                    for &learner in &config.learners {
                        let _ = node.send(&ack, learner);
                    }
                }
            }
            WireMessage::RepeatReq(rr) => {
                if let Some(rec) = acceptor.receive_repeat(rr.iid) {
                    let ack = WireMessage::AcceptAck(classic_paxos::message::AcceptorAck::from_record(id, &rec));
                    let _ = node.send(&ack, from);
                }
            }
            _ => {}
        }
    }
}

fn run_proposer(id: i32, addr: std::net::SocketAddr, config: NetConfig) {
    let node = NetNode::bind(addr).expect("bind proposer socket");
    let mut proposer = Proposer::new(id, config.quorum_size());
    loop {
        let (msg, _from) = match node.receive().expect("proposer transport failure") {
            Some(pair) => pair,
            None => continue,
        };
        match msg {
            WireMessage::Submit(submit) => {
                proposer.propose(submit.value);
                while let Some(req) = proposer.accept() {
                    let _ = node.broadcast(&WireMessage::AcceptReq(req), &config.acceptors);
                }
                if proposer.prepared_count() == 0 {
                    let req = proposer.prepare();
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                }
            }
            WireMessage::PrepareAck(ack) => {
                if let Some(req) = proposer.receive_prepare_ack(&ack) {
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                }
                while let Some(req) = proposer.accept() {
                    let _ = node.broadcast(&WireMessage::AcceptReq(req), &config.acceptors);
                }
            }
            WireMessage::AcceptAck(ack) => {
                if let Some(req) = proposer.receive_accept_ack(&ack) {
                    let _ = node.broadcast(&WireMessage::PrepareReq(req), &config.acceptors);
                }
            }
            _ => {}
        }
    }
}

fn run_learner(addr: std::net::SocketAddr, config: NetConfig) {
    let node = NetNode::bind(addr).expect("bind learner socket");
    let mut learner = Learner::new(config.quorum_size());
    loop {
        let (msg, _from) = match node.receive().expect("learner transport failure") {
            Some(pair) => pair,
            None => continue,
        };
        if let WireMessage::AcceptAck(ack) = msg {
            let iid = ack.iid;
            if let Some(value) = learner.observe(&ack) {
                info!("instance {} decided: {:?}", iid, String::from_utf8_lossy(value));
            }
        }
    }
}
