use std::hint::black_box;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use quadrature_core::velocity::{TickInput, VelocityEngine};
use quadrature_core::{DecoderCfg, EdgeTiming, Encoder, VelocityCfg};
use quadrature_hardware::SimulatedPhases;
use quadrature_traits::{ManualClock, PhaseState};

// Forward/backward jitter: mostly forward with an occasional reversal
fn synth_states(n: usize, seed: u32) -> Vec<PhaseState> {
    const FWD: [u8; 4] = [0b00, 0b01, 0b11, 0b10];
    let mut state = seed.max(1);
    let mut idx = 0usize;
    let mut v = Vec::with_capacity(n);
    for _ in 0..n {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        let step = if x % 8 == 0 { 3 } else { 1 };
        idx = (idx + step) % 4;
        v.push(PhaseState::from_bits(FWD[idx]));
    }
    v
}

pub fn bench_edge_handler(c: &mut Criterion) {
    let states = synth_states(4096, 0xC0FFEE);
    c.bench_function("edge_handler_4096", |b| {
        b.iter_batched(
            || {
                let mut enc = Encoder::builder()
                    .with_phase_input(Arc::new(SimulatedPhases::new()))
                    .with_decoder(DecoderCfg {
                        min_edge_interval_us: 0,
                        use_index: false,
                    })
                    .with_clock(Box::new(ManualClock::new()))
                    .build()
                    .unwrap();
                enc.initialize().unwrap();
                enc
            },
            |enc| {
                let edges = enc.edge_handle();
                for (t, s) in states.iter().enumerate() {
                    edges.record_transition(*s, t as u64);
                }
                black_box(enc.position())
            },
            BatchSize::SmallInput,
        );
    });
}

pub fn bench_velocity_tick(c: &mut Criterion) {
    c.bench_function("velocity_tick_1000", |b| {
        b.iter(|| {
            let mut e = VelocityEngine::new(VelocityCfg::default());
            e.restart(0, 0);
            let mut last = 0.0f32;
            for i in 1..=1000i64 {
                let now = i as u64 * 10_000;
                let est = e.update(TickInput {
                    position: i * 41,
                    now_us: now,
                    timing: Some(EdgeTiming {
                        last_edge_us: now,
                        interval_us: 244,
                        sign: 1,
                    }),
                    has_edge_timing: true,
                });
                last = est.filtered_cps;
            }
            black_box(last)
        });
    });
}

criterion_group!(benches, bench_edge_handler, bench_velocity_tick);
criterion_main!(benches);
