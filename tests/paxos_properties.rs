//! Property tests for the invariants a classic Paxos core must hold
//! regardless of message interleaving: acceptor ballot monotonicity,
//! ballot residue/uniqueness, quorum idempotence, value preservation,
//! and cross-proposer agreement.

extern crate classic_paxos;
extern crate proptest;

use std::collections::HashSet;

use proptest::prelude::*;

use classic_paxos::acceptor::Acceptor;
use classic_paxos::message::{AcceptReq, AcceptorAck, PrepareReq};
use classic_paxos::proposer::Proposer;
use classic_paxos::quorum::Quorum;

const MAX_PROPOSERS: i32 = classic_paxos::types::MAX_PROPOSERS;

fn small_ballot() -> impl Strategy<Value = i32> {
    1..200i32
}

proptest! {
    /// `rec.ballot` never decreases across any sequence of prepare/accept
    /// calls against one acceptor and one instance, however the ballots
    /// in the calls are ordered.
    #[test]
    fn acceptor_ballot_is_monotonic(
        ops in prop::collection::vec(
            prop_oneof![
                small_ballot().prop_map(Op::Prepare),
                (small_ballot(), any::<u8>()).prop_map(|(b, v)| Op::Accept(b, vec![v])),
            ],
            0..50,
        )
    ) {
        let mut acceptor = Acceptor::new(0);
        let mut max_seen = 0;
        for op in ops {
            let rec = match op {
                Op::Prepare(ballot) => acceptor.receive_prepare(&PrepareReq { iid: 1, ballot }),
                Op::Accept(ballot, value) => acceptor.receive_accept(&AcceptReq { iid: 1, ballot, value }),
            };
            prop_assert!(rec.ballot >= max_seen);
            max_seen = rec.ballot;
        }
    }

    /// Every ballot a proposer ever puts on the wire is in its own
    /// residue class mod MAX_PROPOSERS, and ballots for the same
    /// instance strictly increase across repeated preemption.
    #[test]
    fn ballots_stay_in_residue_class_and_increase(
        id in 0..MAX_PROPOSERS,
        preempting_ballots in prop::collection::vec(1..500i32, 1..20),
    ) {
        let mut p = Proposer::new(id, 2);
        let first = p.prepare();
        prop_assert_eq!(first.ballot.rem_euclid(MAX_PROPOSERS), id.rem_euclid(MAX_PROPOSERS));

        let mut last_ballot = first.ballot;
        for raw in preempting_ballots {
            // force a ballot strictly above our current one so every ack is a preemption
            let nack_ballot = last_ballot + raw;
            let ack = AcceptorAck {
                acceptor_id: 5,
                iid: first.iid,
                ballot: nack_ballot,
                value_ballot: 0,
                value: Vec::new(),
            };
            if let Some(req) = p.receive_prepare_ack(&ack) {
                prop_assert!(req.ballot > last_ballot);
                prop_assert_eq!(req.ballot.rem_euclid(MAX_PROPOSERS), id.rem_euclid(MAX_PROPOSERS));
                last_ballot = req.ballot;
            }
        }
    }

    /// Adding the same acceptor id twice never increases the count, and
    /// a quorum of `required` distinct ids is always eventually reached.
    #[test]
    fn quorum_add_is_idempotent(
        required in 1..8usize,
        ids in prop::collection::vec(0..8i32, 0..30),
    ) {
        let mut q = Quorum::new(required);
        let mut seen = HashSet::new();
        for id in ids {
            let was_new = q.add(id);
            prop_assert_eq!(was_new, seen.insert(id));
            prop_assert_eq!(q.count(), seen.len());
        }
        prop_assert_eq!(q.reached(), seen.len() >= required);
    }

    /// A value handed to `propose` is never silently dropped: driving one
    /// instance to completion per proposed value, in order, accounts for
    /// every one of them on the wire exactly once.
    #[test]
    fn proposed_values_are_never_lost(
        values in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..8), 1..10),
    ) {
        let mut p = Proposer::new(0, 2);
        for v in &values {
            p.propose(v.clone());
        }

        let mut emitted = Vec::new();
        for _ in 0..values.len() {
            let pr = p.prepare();
            let ack0 = AcceptorAck { acceptor_id: 0, iid: pr.iid, ballot: pr.ballot, value_ballot: 0, value: Vec::new() };
            let ack1 = AcceptorAck { acceptor_id: 1, iid: pr.iid, ballot: pr.ballot, value_ballot: 0, value: Vec::new() };
            p.receive_prepare_ack(&ack0);
            p.receive_prepare_ack(&ack1);

            let req = p.accept().expect("a value is queued and the quorum is fresh");
            emitted.push(req.value);
        }

        prop_assert_eq!(emitted, values);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Prepare(i32),
    Accept(i32, Vec<u8>),
}

/// Two proposers racing over the same three acceptors never end up with
/// an accept quorum for different values on the same instance. This is
/// deterministic (no proptest inputs): it fixes one interleaving that
/// stresses promise-based value adoption across competing ballots, which
/// is the scenario Paxos's safety argument actually has to cover.
#[test]
fn two_proposers_racing_never_disagree() {
    let mut acceptors: Vec<Acceptor> = (0..3).map(Acceptor::new).collect();
    let mut p0 = Proposer::new(0, 2);
    let mut p1 = Proposer::new(1, 2);

    p0.propose(b"from-p0".to_vec());
    p1.propose(b"from-p1".to_vec());

    // p0 prepares first and gets promises from acceptors 0 and 1.
    let pr0 = p0.prepare();
    let rec_a = acceptors[0].receive_prepare(&pr0);
    let rec_b = acceptors[1].receive_prepare(&pr0);
    p0.receive_prepare_ack(&AcceptorAck { acceptor_id: 0, iid: pr0.iid, ballot: rec_a.ballot, value_ballot: rec_a.value_ballot, value: rec_a.value });
    p0.receive_prepare_ack(&AcceptorAck { acceptor_id: 1, iid: pr0.iid, ballot: rec_b.ballot, value_ballot: rec_b.value_ballot, value: rec_b.value });

    // p1 prepares second at a higher ballot, reaching all three acceptors
    // before p0 gets to accept, preempting p0's promise on instance 1.
    let pr1 = p1.prepare();
    assert!(pr1.ballot > pr0.ballot, "test fixture assumes p1's first ballot outranks p0's");
    let recs: Vec<_> = acceptors.iter_mut().map(|a| a.receive_prepare(&PrepareReq { iid: pr0.iid, ballot: pr1.ballot })).collect();
    for (i, rec) in recs.into_iter().enumerate() {
        p1.receive_prepare_ack(&AcceptorAck { acceptor_id: i as i32, iid: pr0.iid, ballot: rec.ballot, value_ballot: rec.value_ballot, value: rec.value });
    }

    // p0 now tries to accept at its stale ballot; every acceptor nacks it
    // because they have all promised the higher ballot p1 used.
    if let Some(req0) = p0.accept() {
        for acceptor in acceptors.iter_mut() {
            let rec = acceptor.receive_accept(&req0);
            assert!(rec.ballot >= req0.ballot, "a nack must reveal a ballot at least as high");
            if rec.value_ballot == req0.ballot {
                panic!("p0's stale-ballot accept must not be bound by any acceptor after p1 preempted it");
            }
        }
    }

    // p1 accepts at its own (higher, promised) ballot and reaches quorum.
    let req1 = p1.accept().expect("p1 holds a full promise quorum and has a value");
    for acceptor in acceptors.iter_mut() {
        let rec = acceptor.receive_accept(&req1);
        assert_eq!(rec.value_ballot, req1.ballot);
        assert_eq!(rec.value, req1.value);
    }

    // Whichever value any two acceptors ended up holding for this
    // instance, it is the same value on both.
    assert_eq!(acceptors[0].receive_repeat(pr0.iid).unwrap().value, acceptors[1].receive_repeat(pr0.iid).unwrap().value);
    assert_eq!(acceptors[1].receive_repeat(pr0.iid).unwrap().value, acceptors[2].receive_repeat(pr0.iid).unwrap().value);
}
