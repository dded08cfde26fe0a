#![no_main]
use std::sync::Arc;

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use quadrature_core::decode::decode;
use quadrature_core::{DecoderCfg, Encoder};
use quadrature_hardware::SimulatedPhases;
use quadrature_traits::PhaseState;

#[derive(Debug, Arbitrary)]
struct Input {
    min_edge_interval_us: u8,
    edges: Vec<(u8, u16)>,
}

fuzz_target!(|input: Input| {
    let lines = Arc::new(SimulatedPhases::new());
    let Ok(mut enc) = Encoder::builder()
        .with_phase_input(lines.clone())
        .with_decoder(DecoderCfg {
            min_edge_interval_us: u64::from(input.min_edge_interval_us),
            use_index: false,
        })
        .build()
    else {
        return;
    };
    if enc.initialize().is_err() {
        return;
    }
    let edges = enc.edge_handle();

    // Mirror the glitch filter and decode table by hand.
    let mut now = 0u64;
    let mut prev = PhaseState::default();
    let mut last_accepted: Option<u64> = None;
    let mut want = 0i64;
    for (bits, gap) in input.edges {
        now += u64::from(gap);
        let state = PhaseState::from_bits(bits & 0b11);
        let delta = decode(prev, state);
        let accept = match last_accepted {
            None => true,
            Some(t) => now - t >= u64::from(input.min_edge_interval_us),
        };
        if delta != 0 && accept {
            last_accepted = Some(now);
            want += i64::from(delta);
        }
        prev = state;
        edges.record_transition(state, now);
    }
    assert_eq!(enc.position(), want);
});
