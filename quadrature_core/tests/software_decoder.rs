use std::sync::Arc;

use quadrature_core::{DecoderCfg, EdgeHandle, Encoder};
use quadrature_hardware::SimulatedPhases;
use quadrature_traits::{ManualClock, PhaseState};
use rstest::rstest;

struct Rig {
    enc: Encoder,
    edges: EdgeHandle,
    phases: Arc<SimulatedPhases>,
    clock: ManualClock,
}

impl Rig {
    fn new(min_edge_interval_us: u64) -> Self {
        let phases = Arc::new(SimulatedPhases::new());
        let clock = ManualClock::starting_at(1_000);
        let mut enc = Encoder::builder()
            .with_phase_input(phases.clone())
            .with_decoder(DecoderCfg {
                min_edge_interval_us,
                use_index: true,
            })
            .with_clock(Box::new(clock.clone()))
            .build()
            .expect("build");
        enc.initialize().expect("init");
        let edges = enc.edge_handle();
        Self {
            enc,
            edges,
            phases,
            clock,
        }
    }

    /// One quadrature step `gap_us` after the previous one.
    fn step(&self, dir: i8, gap_us: u64) {
        self.clock.advance(gap_us);
        self.phases.advance(dir);
        self.edges.on_phase_change();
    }
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(250)]
fn forward_cycles_count_four_each(#[case] cycles: i64) {
    let rig = Rig::new(10);
    for _ in 0..cycles * 4 {
        rig.step(1, 100);
    }
    assert_eq!(rig.enc.position(), 4 * cycles);
    assert_eq!(rig.enc.direction(), 1);

    for _ in 0..cycles * 4 {
        rig.step(-1, 100);
    }
    assert_eq!(rig.enc.position(), 0);
    assert_eq!(rig.enc.direction(), -1);
}

#[test]
fn glitch_inside_interval_is_dropped() {
    let rig = Rig::new(10);
    rig.step(1, 100);
    assert_eq!(rig.enc.position(), 1);

    // 5 us after the accepted edge: rejected
    rig.step(1, 5);
    assert_eq!(rig.enc.position(), 1);
    assert_eq!(rig.enc.diagnostics().glitches_rejected, 1);

    // 10 us after the last accepted edge (5 + 5): accepted
    rig.step(1, 5);
    assert_eq!(rig.enc.position(), 2);
    assert_eq!(rig.enc.diagnostics().accepted_edges, 2);
}

#[test]
fn interval_measured_from_last_accepted_edge() {
    let rig = Rig::new(10);
    rig.step(1, 100);
    rig.step(1, 4); // rejected, t = +4
    rig.step(1, 4); // rejected, t = +8
    rig.step(1, 4); // accepted, t = +12 from the last accepted edge
    assert_eq!(rig.enc.position(), 2);
    assert_eq!(rig.enc.diagnostics().glitches_rejected, 2);
}

#[test]
fn double_step_is_absorbed_and_counted() {
    let rig = Rig::new(0);
    rig.step(1, 100); // 01
    rig.clock.advance(100);
    rig.phases.set(PhaseState::from_bits(0b10)); // skipped 11
    rig.edges.on_phase_change();
    assert_eq!(rig.enc.position(), 1);
    assert_eq!(rig.enc.diagnostics().invalid_transitions, 1);

    // decoding resumes from the new state: 10 -> 00 is forward
    rig.step(1, 100);
    assert_eq!(rig.enc.position(), 2);
}

#[test]
fn repeated_state_is_not_an_edge() {
    let rig = Rig::new(10);
    rig.step(1, 100);
    rig.clock.advance(100);
    rig.edges.on_phase_change();
    rig.edges.on_phase_change();
    assert_eq!(rig.enc.position(), 1);
    assert_eq!(rig.enc.diagnostics().accepted_edges, 1);
}

#[test]
fn record_transition_uses_caller_timestamp() {
    let rig = Rig::new(10);
    rig.edges.record_transition(PhaseState::from_bits(0b01), 5_000);
    rig.edges.record_transition(PhaseState::from_bits(0b11), 5_003);
    rig.edges.record_transition(PhaseState::from_bits(0b10), 5_020);
    assert_eq!(rig.enc.position(), 2);
}

#[test]
fn index_latch_is_consumed() {
    let rig = Rig::new(10);
    assert!(!rig.enc.index_observed());
    rig.edges.on_index();
    assert!(rig.enc.index_observed());
    assert!(!rig.enc.index_observed());
}

#[test]
fn index_ignored_when_disabled() {
    let phases = Arc::new(SimulatedPhases::new());
    let mut enc = Encoder::builder()
        .with_phase_input(phases)
        .with_decoder(DecoderCfg {
            min_edge_interval_us: 10,
            use_index: false,
        })
        .with_clock(Box::new(ManualClock::new()))
        .build()
        .expect("build");
    enc.initialize().expect("init");
    enc.edge_handle().on_index();
    assert!(!enc.index_observed());
}

#[test]
fn initialize_starts_from_current_line_state() {
    let phases = Arc::new(SimulatedPhases::new());
    phases.set(PhaseState::from_bits(0b11));
    let clock = ManualClock::starting_at(50);
    let mut enc = Encoder::builder()
        .with_phase_input(phases.clone())
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build");
    enc.initialize().expect("init");
    let edges = enc.edge_handle();
    clock.advance(100);
    phases.advance(1); // 11 -> 10
    edges.on_phase_change();
    assert_eq!(enc.position(), 1);
}
