use quadrature_core::decode::{QUAD_TABLE, Transition, classify, decode};
use quadrature_traits::PhaseState;
use rstest::rstest;

fn s(bits: u8) -> PhaseState {
    PhaseState::from_bits(bits)
}

#[rstest]
// forward: 00 -> 01 -> 11 -> 10 -> 00
#[case(0b00, 0b01, 1)]
#[case(0b01, 0b11, 1)]
#[case(0b11, 0b10, 1)]
#[case(0b10, 0b00, 1)]
// reverse
#[case(0b01, 0b00, -1)]
#[case(0b11, 0b01, -1)]
#[case(0b10, 0b11, -1)]
#[case(0b00, 0b10, -1)]
// no change
#[case(0b00, 0b00, 0)]
#[case(0b01, 0b01, 0)]
#[case(0b11, 0b11, 0)]
#[case(0b10, 0b10, 0)]
// both bits changed
#[case(0b00, 0b11, 0)]
#[case(0b11, 0b00, 0)]
#[case(0b01, 0b10, 0)]
#[case(0b10, 0b01, 0)]
fn every_transition(#[case] prev: u8, #[case] new: u8, #[case] want: i8) {
    assert_eq!(decode(s(prev), s(new)), want);
}

#[test]
fn nonzero_exactly_for_single_bit_changes() {
    for prev in 0..4u8 {
        for new in 0..4u8 {
            let single_bit = (prev ^ new).count_ones() == 1;
            let d = QUAD_TABLE[usize::from((prev << 2) | new)];
            assert_eq!(d != 0, single_bit, "prev={prev:02b} new={new:02b}");
        }
    }
}

#[test]
fn one_cycle_sums_to_four() {
    let seq = [0b00, 0b01, 0b11, 0b10, 0b00];
    let sum: i32 = seq
        .windows(2)
        .map(|w| i32::from(decode(s(w[0]), s(w[1]))))
        .sum();
    assert_eq!(sum, 4);
}

#[rstest]
#[case(0b01, 0b01, Transition::Idle)]
#[case(0b01, 0b11, Transition::Step(1))]
#[case(0b01, 0b00, Transition::Step(-1))]
#[case(0b01, 0b10, Transition::DoubleStep)]
fn classification(#[case] prev: u8, #[case] new: u8, #[case] want: Transition) {
    assert_eq!(classify(s(prev), s(new)), want);
}
