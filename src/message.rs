//! Wire message shapes, mirroring `libpaxos_messages.h`'s struct layouts
//! (`prepare_req`/`prepare_ack`/`accept_req`/`accept_ack`/`repeat_req`/
//! `submit`). Framing here is one `WireMessage` per UDP datagram,
//! bincode-encoded; see DESIGN.md for why this replaces a stream-style
//! `{type, data_size}` header.

use crate::types::{AcceptorId, Ballot, InstanceId, Value};

/// Phase 1a: proposer → all acceptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareReq {
    pub iid: InstanceId,
    pub ballot: Ballot,
}

/// Phase 2a: proposer → all acceptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptReq {
    pub iid: InstanceId,
    pub ballot: Ballot,
    pub value: Value,
}

/// Phase 1b/2b: acceptor → proposer(s). `prepare_ack` and `accept_ack`
/// share this shape on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptorAck {
    pub acceptor_id: AcceptorId,
    pub iid: InstanceId,
    pub ballot: Ballot,
    pub value_ballot: Ballot,
    pub value: Value,
}

pub type PrepareAck = AcceptorAck;
pub type AcceptAck = AcceptorAck;

/// Recovery request for a previously decided instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatReq {
    pub iid: InstanceId,
}

/// Client → proposer: a value to append to the pending-values FIFO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submit {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireMessage {
    PrepareReq(PrepareReq),
    PrepareAck(PrepareAck),
    AcceptReq(AcceptReq),
    AcceptAck(AcceptAck),
    RepeatReq(RepeatReq),
    Submit(Submit),
}

impl AcceptorAck {
    pub fn from_record(acceptor_id: AcceptorId, rec: &crate::acceptor::AcceptorRecord) -> Self {
        AcceptorAck {
            acceptor_id,
            iid: rec.iid,
            ballot: rec.ballot,
            value_ballot: rec.value_ballot,
            value: rec.value.clone(),
        }
    }
}
