//! Scalar types shared by the acceptor and proposer engines.

/// Number of acceptors in this deployment, fixed at compile time: the
/// quorum size and the acceptor id range both derive from it.
pub const N_OF_ACCEPTORS: usize = 3;

/// Upper bound (exclusive) on proposer identifiers. Ballots generated by
/// proposer `id` always land in the residue class `id mod MAX_PROPOSERS`.
pub const MAX_PROPOSERS: i32 = 10;

/// Quorum size: a strict majority of `N_OF_ACCEPTORS`.
pub const QUORUM: usize = N_OF_ACCEPTORS / 2 + 1;

/// Largest value a client may submit. Bodies above this are discarded at
/// the transport boundary without touching core state.
pub const MAX_VALUE_SIZE: usize = 4096;

/// One slot in the decided log. Instance 0 is reserved and never used.
pub type InstanceId = u32;

/// A logical round number. `0` is the "no ballot" sentinel; only positive
/// values are ever assigned to an active ballot.
pub type Ballot = i32;

/// Identifies one acceptor, always in `[0, N_OF_ACCEPTORS)`.
pub type AcceptorId = i32;

/// An opaque, client-submitted payload.
pub type Value = Vec<u8>;
