//! Watches accept-acks and surfaces the value once a majority of
//! acceptors have accepted the same ballot for an instance. Out-of-core
//! (a cluster only needs agreement among acceptors to be safe; learning
//! the outcome is a convenience), but still shipped so a deployment can
//! observe a decision end-to-end.

use std::collections::HashMap;

use log::{debug, info};

use crate::message::AcceptAck;
use crate::quorum::Quorum;
use crate::types::{Ballot, InstanceId, Value};

struct Tally {
    ballot: Ballot,
    value: Value,
    quorum: Quorum,
}

impl Tally {
    fn new(ballot: Ballot, value: Value, quorum_size: usize) -> Self {
        Tally {
            ballot,
            value,
            quorum: Quorum::new(quorum_size),
        }
    }
}

pub struct Learner {
    quorum_size: usize,
    tallies: HashMap<InstanceId, Tally>,
    decided: HashMap<InstanceId, Value>,
}

impl Learner {
    pub fn new(quorum_size: usize) -> Self {
        Learner {
            quorum_size,
            tallies: HashMap::new(),
            decided: HashMap::new(),
        }
    }

    /// Folds in one acceptor's accept-ack. Returns the decided value the
    /// first time this instance crosses a quorum; `None` otherwise,
    /// including on every call after the instance is already decided.
    pub fn observe(&mut self, ack: &AcceptAck) -> Option<&Value> {
        if self.decided.contains_key(&ack.iid) {
            return None;
        }

        let fresh_majority = {
            let tally = self
                .tallies
                .entry(ack.iid)
                .and_modify(|t| {
                    if ack.value_ballot > t.ballot {
                        t.ballot = ack.value_ballot;
                        t.value = ack.value.clone();
                        t.quorum.reset();
                    }
                })
                .or_insert_with(|| {
                    Tally::new(ack.value_ballot, ack.value.clone(), self.quorum_size)
                });

            if ack.value_ballot < tally.ballot {
                debug!(
                    "learner: stale accept-ack for instance {} at ballot {}, current tally is {}",
                    ack.iid, ack.value_ballot, tally.ballot
                );
                return None;
            }

            tally.quorum.add(ack.acceptor_id) && tally.quorum.reached()
        };

        if fresh_majority {
            let tally = self.tallies.remove(&ack.iid).expect("just inserted above");
            info!("learner: instance {} decided", ack.iid);
            self.decided.insert(ack.iid, tally.value);
            return self.decided.get(&ack.iid);
        }

        None
    }

    pub fn decided_value(&self, iid: InstanceId) -> Option<&Value> {
        self.decided.get(&iid)
    }
}
