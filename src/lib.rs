extern crate bincode;
extern crate config;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate thiserror;

pub mod acceptor;
pub mod carray;
pub mod configurations;
pub mod error;
pub mod learner;
pub mod message;
pub mod net_node;
pub mod proposer;
pub mod quorum;
pub mod types;

pub use acceptor::{Acceptor, AcceptorRecord};
pub use configurations::NetConfig;
pub use error::{PaxosError, Result};
pub use learner::Learner;
pub use message::WireMessage;
pub use net_node::NetNode;
pub use proposer::Proposer;
