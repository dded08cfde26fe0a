//! Quadrature transition table.
//!
//! Index is `(previous << 2) | new`, each state encoded as `(A << 1) | B`.
//! Forward rotation walks `00 -> 01 -> 11 -> 10 -> 00`, one count per state
//! change, four counts per electrical cycle.

use quadrature_traits::PhaseState;

/// Delta for every (previous, new) pair. Both-bits-changed entries are 0.
pub const QUAD_TABLE: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0, //
];

/// Counts produced by one full electrical cycle.
pub const COUNTS_PER_CYCLE: i64 = 4;

#[inline]
pub const fn table_index(prev: PhaseState, new: PhaseState) -> usize {
    ((prev.bits() << 2) | new.bits()) as usize
}

#[inline]
pub const fn decode(prev: PhaseState, new: PhaseState) -> i8 {
    QUAD_TABLE[table_index(prev, new)]
}

/// What a single observed transition means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same state on both reads.
    Idle,
    /// One line changed: a step of +1 or -1.
    Step(i8),
    /// Both lines changed at once; at least one edge was missed.
    DoubleStep,
}

#[inline]
pub const fn classify(prev: PhaseState, new: PhaseState) -> Transition {
    match decode(prev, new) {
        0 if prev.bits() == new.bits() => Transition::Idle,
        0 => Transition::DoubleStep,
        d => Transition::Step(d),
    }
}
