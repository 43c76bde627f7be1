//! Per-acceptor state machine: ballot discipline and the accepted-value
//! store, structured after `evpaxos/evacceptor.c`'s `acceptor_*` calls
//! (the corresponding `struct acceptor`/`acceptor.h` half is not itself
//! included in the retrieved source, so this follows the shape implied
//! by its three callers in `handle_prepare_req`/`handle_accept_req`/
//! `handle_repeat_req`).

use std::collections::HashMap;

use log::{debug, trace};

use crate::message::{AcceptReq, PrepareReq};
use crate::types::{AcceptorId, Ballot, InstanceId, Value};

/// A snapshot of what this acceptor knows about one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptorRecord {
    pub iid: InstanceId,
    pub ballot: Ballot,
    pub value_ballot: Ballot,
    pub value: Value,
}

impl AcceptorRecord {
    fn fresh(iid: InstanceId) -> Self {
        AcceptorRecord {
            iid,
            ballot: 0,
            value_ballot: 0,
            value: Vec::new(),
        }
    }
}

/// One acceptor's durable-in-memory state: a sparse map from instance id
/// to the strongest promise and most recently accepted value.
pub struct Acceptor {
    id: AcceptorId,
    records: HashMap<InstanceId, AcceptorRecord>,
}

impl Acceptor {
    pub fn new(id: AcceptorId) -> Self {
        Acceptor {
            id,
            records: HashMap::new(),
        }
    }

    pub fn id(&self) -> AcceptorId {
        self.id
    }

    /// Phase 1b: promise not to accept ballots below `pr.ballot`, unless
    /// already promised higher (in which case this is a nack, revealed
    /// by the returned record's `ballot` exceeding the request's).
    pub fn receive_prepare(&mut self, pr: &PrepareReq) -> AcceptorRecord {
        let rec = self
            .records
            .entry(pr.iid)
            .or_insert_with(|| AcceptorRecord::fresh(pr.iid));

        if pr.ballot > rec.ballot {
            rec.ballot = pr.ballot;
            debug!("acceptor {}: promised iid {} ballot {}", self.id, pr.iid, pr.ballot);
        } else {
            trace!(
                "acceptor {}: prepare for iid {} ballot {} is stale, have ballot {}",
                self.id,
                pr.iid,
                pr.ballot,
                rec.ballot
            );
        }
        rec.clone()
    }

    /// Phase 2a: accept `ar.value` at `ar.ballot`, unless a higher ballot
    /// has already been promised (nack, same signal as above).
    pub fn receive_accept(&mut self, ar: &AcceptReq) -> AcceptorRecord {
        let rec = self
            .records
            .entry(ar.iid)
            .or_insert_with(|| AcceptorRecord::fresh(ar.iid));

        if ar.ballot >= rec.ballot {
            rec.ballot = ar.ballot;
            rec.value_ballot = ar.ballot;
            rec.value = ar.value.clone();
            debug!("acceptor {}: accepted iid {} ballot {}", self.id, ar.iid, ar.ballot);
        } else {
            trace!(
                "acceptor {}: accept for iid {} ballot {} is stale, have ballot {}",
                self.id,
                ar.iid,
                ar.ballot,
                rec.ballot
            );
        }
        rec.clone()
    }

    /// Retransmission support: return the current record iff this
    /// acceptor has ever accepted a value for `iid`.
    pub fn receive_repeat(&self, iid: InstanceId) -> Option<AcceptorRecord> {
        self.records
            .get(&iid)
            .filter(|rec| rec.value_ballot > 0)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(iid: InstanceId, ballot: Ballot) -> PrepareReq {
        PrepareReq { iid, ballot }
    }

    fn accept(iid: InstanceId, ballot: Ballot, value: &[u8]) -> AcceptReq {
        AcceptReq {
            iid,
            ballot,
            value: value.to_vec(),
        }
    }

    #[test]
    fn prepare_on_unseen_instance_creates_record() {
        let mut a = Acceptor::new(0);
        let rec = a.receive_prepare(&prepare(1, 10));
        assert_eq!(rec.iid, 1);
        assert_eq!(rec.ballot, 10);
        assert_eq!(rec.value_ballot, 0);
        assert!(rec.value.is_empty());
    }

    #[test]
    fn prepare_at_lower_ballot_is_a_nack() {
        let mut a = Acceptor::new(0);
        a.receive_prepare(&prepare(1, 10));
        let rec = a.receive_prepare(&prepare(1, 5));
        assert_eq!(rec.ballot, 10, "nack reveals the higher promised ballot");
    }

    #[test]
    fn accept_binds_value_and_bumps_ballot() {
        let mut a = Acceptor::new(0);
        a.receive_prepare(&prepare(1, 10));
        let rec = a.receive_accept(&accept(1, 10, b"x"));
        assert_eq!(rec.ballot, 10);
        assert_eq!(rec.value_ballot, 10);
        assert_eq!(rec.value, b"x");
    }

    #[test]
    fn accept_below_promised_ballot_is_a_nack() {
        let mut a = Acceptor::new(0);
        a.receive_prepare(&prepare(1, 10));
        let rec = a.receive_accept(&accept(1, 5, b"x"));
        assert_eq!(rec.ballot, 10);
        assert_eq!(rec.value_ballot, 0);
        assert!(rec.value.is_empty());
    }

    #[test]
    fn ballot_is_monotonic_across_calls() {
        let mut a = Acceptor::new(0);
        a.receive_prepare(&prepare(1, 10));
        a.receive_accept(&accept(1, 5, b"ignored"));
        a.receive_prepare(&prepare(1, 3));
        let rec = a.receive_prepare(&prepare(1, 10));
        assert_eq!(rec.ballot, 10);
    }

    #[test]
    fn repeat_returns_none_until_a_value_is_accepted() {
        let mut a = Acceptor::new(0);
        a.receive_prepare(&prepare(1, 10));
        assert!(a.receive_repeat(1).is_none());
        a.receive_accept(&accept(1, 10, b"x"));
        let rec = a.receive_repeat(1).expect("accepted value should be repeatable");
        assert_eq!(rec.value, b"x");
        assert!(a.receive_repeat(2).is_none(), "unknown instance");
    }
}
