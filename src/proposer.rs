//! Per-proposer state machine, modeled on `lib/proposer.c`: drives
//! instances through phase 1 and phase 2, adopts values from promises,
//! and retries under a strictly higher ballot on preemption.

use log::{debug, trace};

use crate::carray::CircularBuffer;
use crate::message::{AcceptAck, AcceptReq, PrepareAck, PrepareReq};
use crate::quorum::Quorum;
use crate::types::{Ballot, InstanceId, Value, MAX_PROPOSERS};

/// Smallest ballot that both exceeds `b` and is uniquely this proposer's,
/// i.e. `≡ id (mod MAX_PROPOSERS)`. For `b == 0` (no prior ballot) this is
/// simply `MAX_PROPOSERS + id`. For `b > 0`, a literal `MAX_PROPOSERS + b`
/// does not in general land back in proposer `id`'s residue class, so the
/// step is computed explicitly instead (see DESIGN.md).
fn next_ballot(id: i32, b: Ballot) -> Ballot {
    if b == 0 {
        return MAX_PROPOSERS + id;
    }
    let step = (id - b).rem_euclid(MAX_PROPOSERS);
    let step = if step == 0 { MAX_PROPOSERS } else { step };
    b + step
}

struct Instance {
    iid: InstanceId,
    ballot: Ballot,
    value_ballot: Ballot,
    value: Option<Value>,
    closed: bool,
    prepare_quorum: Quorum,
    accept_quorum: Quorum,
}

impl Instance {
    fn new(iid: InstanceId, ballot: Ballot, quorum_size: usize) -> Self {
        Instance {
            iid,
            ballot,
            value_ballot: 0,
            value: None,
            closed: false,
            prepare_quorum: Quorum::new(quorum_size),
            accept_quorum: Quorum::new(quorum_size),
        }
    }
}

/// Drives an unbounded sequence of Paxos instances to decision on behalf
/// of one proposer identity.
pub struct Proposer {
    id: i32,
    quorum_size: usize,
    values: CircularBuffer<Value>,
    next_prepare_iid: InstanceId,
    prepare_queue: CircularBuffer<Instance>,
    accept_queue: CircularBuffer<Instance>,
}

impl Proposer {
    pub fn new(id: i32, quorum_size: usize) -> Self {
        Proposer {
            id,
            quorum_size,
            values: CircularBuffer::new(),
            next_prepare_iid: 0,
            prepare_queue: CircularBuffer::new(),
            accept_queue: CircularBuffer::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Append a client value to the pending FIFO. No instance is claimed
    /// here; submission is decoupled from Paxos progress.
    pub fn propose(&mut self, value: Value) {
        self.values.push_back(value);
    }

    /// Instances currently in phase 1, used by the driver for rate control.
    pub fn prepared_count(&self) -> usize {
        self.prepare_queue.len()
    }

    /// Allocates a fresh instance and begins phase 1 for it. The caller
    /// (shim) is expected to broadcast the returned request to all
    /// acceptors.
    pub fn prepare(&mut self) -> PrepareReq {
        self.next_prepare_iid += 1;
        let iid = self.next_prepare_iid;
        let ballot = next_ballot(self.id, 0);
        let inst = Instance::new(iid, ballot, self.quorum_size);
        let req = PrepareReq { iid, ballot };
        debug!("proposer {}: prepare iid {} ballot {}", self.id, iid, ballot);
        self.prepare_queue.push_back(inst);
        req
    }

    /// Handles a phase 1b promise. Returns `Some` only when this promise
    /// reveals preemption, in which case the proposer has already bumped
    /// its ballot and the caller must broadcast the new `PrepareReq`.
    pub fn receive_prepare_ack(&mut self, ack: &PrepareAck) -> Option<PrepareReq> {
        let idx = self.prepare_queue.position(|inst| inst.iid == ack.iid)?;
        // Indexing is safe: `position` just found this index.
        let inst = self.prepare_queue.at_mut(idx).expect("found by position");

        if ack.ballot < inst.ballot {
            trace!(
                "proposer {}: promise for iid {} dropped, too old (ballot {} < {})",
                self.id,
                ack.iid,
                ack.ballot,
                inst.ballot
            );
            return None;
        }

        if ack.ballot > inst.ballot {
            debug!(
                "proposer {}: instance {} preempted, ballot {} ack ballot {}",
                self.id, inst.iid, inst.ballot, ack.ballot
            );
            return Some(preempt(self.id, inst));
        }

        // ack.ballot == inst.ballot
        if !inst.prepare_quorum.add(ack.acceptor_id) {
            trace!(
                "proposer {}: duplicate promise from {} for iid {}",
                self.id,
                ack.acceptor_id,
                inst.iid
            );
            return None;
        }

        if !ack.value.is_empty() {
            match inst.value {
                None => {
                    inst.value_ballot = ack.value_ballot;
                    inst.value = Some(ack.value.clone());
                }
                Some(_) if ack.value_ballot > inst.value_ballot => {
                    let displaced = inst.value.take().expect("value is Some");
                    self.values.push_back(displaced);
                    inst.value_ballot = ack.value_ballot;
                    inst.value = Some(ack.value.clone());
                }
                Some(_) if ack.value_ballot == inst.value_ballot => {
                    // Two promises agreeing on value_ballot is a full quorum
                    // only because QUORUM == 2 here; see DESIGN.md.
                    debug!("proposer {}: instance {} closed", self.id, inst.iid);
                    inst.closed = true;
                }
                Some(_) => {
                    trace!(
                        "proposer {}: value in promise for iid {} ignored, lower value_ballot",
                        self.id,
                        inst.iid
                    );
                }
            }
        }

        None
    }

    /// Opportunistic phase-2 driver: call whenever the shim has room to
    /// send. Drops instances already known `closed`, stalls if the head
    /// of the prepare queue has no value yet and none is pending.
    pub fn accept(&mut self) -> Option<AcceptReq> {
        loop {
            let closed = matches!(self.prepare_queue.front(), Some(inst) if inst.closed);
            if closed {
                self.prepare_queue.pop_front();
                continue;
            }
            break;
        }

        let ready = matches!(self.prepare_queue.front(), Some(inst) if inst.prepare_quorum.reached());
        if !ready {
            return None;
        }

        let needs_value = matches!(self.prepare_queue.front(), Some(inst) if inst.value.is_none());
        if needs_value {
            let value = self.values.pop_front()?;
            let inst = self.prepare_queue.front_mut().expect("checked above");
            inst.value = Some(value);
        }

        let inst = self.prepare_queue.pop_front().expect("checked above");
        let value = inst.value.clone().expect("value populated above");
        let req = AcceptReq {
            iid: inst.iid,
            ballot: inst.ballot,
            value,
        };
        debug!("proposer {}: accept iid {} ballot {}", self.id, inst.iid, inst.ballot);
        self.accept_queue.push_back(inst);
        Some(req)
    }

    /// Handles a phase 2b accept-ack. Returns `Some` only on preemption,
    /// in which case a new `PrepareReq` must be broadcast.
    pub fn receive_accept_ack(&mut self, ack: &AcceptAck) -> Option<PrepareReq> {
        let idx = self.accept_queue.position(|inst| inst.iid == ack.iid)?;
        let inst = self.accept_queue.at_mut(idx).expect("found by position");

        if ack.ballot == inst.ballot {
            debug_assert_eq!(ack.value_ballot, inst.ballot);
            if !inst.accept_quorum.add(ack.acceptor_id) {
                trace!(
                    "proposer {}: duplicate accept-ack from {} for iid {}",
                    self.id,
                    ack.acceptor_id,
                    inst.iid
                );
                return None;
            }
            if inst.accept_quorum.reached() {
                debug!("proposer {}: quorum reached for iid {}", self.id, inst.iid);
                self.accept_queue.take_first(|i| i.iid == ack.iid);
            }
            None
        } else {
            debug!(
                "proposer {}: instance {} preempted in accept phase, ballot {} ack ballot {}",
                self.id, inst.iid, inst.ballot, ack.ballot
            );
            let mut inst = self
                .accept_queue
                .take_first(|i| i.iid == ack.iid)
                .expect("just located by position");
            let req = preempt(self.id, &mut inst);
            self.prepare_queue.push_front(inst);
            Some(req)
        }
    }
}

/// Bumps `inst`'s ballot past any ballot seen so far and resets both
/// quorum trackers. `inst.value`/`inst.value_ballot` are retained: under
/// Paxos safety, anything already adopted remains a candidate across
/// retries.
fn preempt(id: i32, inst: &mut Instance) -> PrepareReq {
    inst.ballot = next_ballot(id, inst.ballot);
    inst.prepare_quorum.reset();
    inst.accept_quorum.reset();
    PrepareReq {
        iid: inst.iid,
        ballot: inst.ballot,
    }
}
