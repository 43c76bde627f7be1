//! Submits client values to one proposer, either interactively from
//! standard input or, if extra command-line arguments are given, by
//! sending each one in turn.
//!
//! Run as follows
//!     RUST_LOG=classic_paxos=info cargo run --example start_client -- <proposer_id> Config
//! to submit interactively (one line of input per submission), or
//!     RUST_LOG=classic_paxos=info cargo run --example start_client -- <proposer_id> Config v1 v2 ...
//! to submit v1, v2, etc. without further prompting.

extern crate bincode;
extern crate classic_paxos;
extern crate env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate text_io;

use std::env;
use std::io;
use std::io::prelude::*;
use std::net::UdpSocket;

use classic_paxos::message::{Submit, WireMessage};
use classic_paxos::NetConfig;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() < 3 {
        panic!("expected at least 2 arguments (proposer_id, config_file) excluding the binary name");
    }

    let proposer_id: i32 = args[1].parse().expect("proposer_id must be an integer");
    let config = NetConfig::load(&args[2]).expect("failed to load config");
    let proposer_addr = config.proposer_addr(proposer_id).expect("no such proposer id in config");

    let socket = UdpSocket::bind("0.0.0.0:0").expect("failed to bind client socket");

    let submit = |value: Vec<u8>| {
        let msg = WireMessage::Submit(Submit { value });
        let encoded = bincode::serialize(&msg).expect("Submit always encodes");
        socket
            .send_to(&encoded, proposer_addr)
            .expect("failed to send to proposer");
    };

    if args.len() == 3 {
        loop {
            print!("Enter a value: ");
            io::stdout().flush().expect("could not flush stdout");
            let line: String = read!("{}\n");
            submit(line.into_bytes());
        }
    } else {
        for value in args.iter().skip(3) {
            submit(value.clone().into_bytes());
        }
    }
}
