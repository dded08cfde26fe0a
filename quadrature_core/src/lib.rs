#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Quadrature decoding and velocity estimation (hardware-agnostic).
//!
//! All platform access goes through `quadrature_traits::PhaseInput`,
//! `quadrature_traits::PulseCounter` and `quadrature_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Decoding**: 16-entry transition table shared by both paths (`decode`)
//! - **Software path**: notification-context edge handler with glitch filter (`software`)
//! - **Hardware path**: bounded peripheral counter extended to 64 bits (`hardware`)
//! - **Shared state**: position, edge timing and diagnostics behind one
//!   critical section (`state`)
//! - **Velocity**: window/edge rate blending, EMA and stall detection (`velocity`)
//! - **Facade**: `Encoder`, built with a type-state `EncoderBuilder`
//! - **Sampler**: optional background thread driving the periodic tick (`sampler`)
//!
//! ## Units
//!
//! Positions are quadrature counts (`i64`), timestamps are microseconds from a
//! monotonic clock (`u64`), rates are counts per second (`f32`).

pub mod builder;
pub mod config;
pub mod conversions;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod hardware;
pub mod hw_error;
pub mod mocks;
pub mod sampler;
pub mod software;
pub mod state;
pub mod util;
pub mod velocity;

pub use builder::{EncoderBuilder, Missing, Set};
pub use config::{CounterCfg, DecodeMode, DecoderCfg, SamplingCfg, VelocityCfg};
pub use encoder::Encoder;
pub use error::{BuildError, EncoderError, Result};
pub use software::EdgeHandle;
pub use state::{Diagnostics, EdgeTiming};
pub use velocity::VelocityEstimate;
