//! Vitrine Animation System
//!
//! Frame-driven effects for the portfolio page.
//!
//! # Features
//!
//! - **Easing**: polynomial and CSS cubic-bezier curves
//! - **Frame Scheduler**: cancellable per-frame loops with fault isolation
//! - **Counters**: eased count-up of stat numbers
//! - **Progress Bars**: width fills read from `data-width`
//! - **Particles**: a drifting, self-linking particle field on a canvas
//! - **Text Scramble**: character-by-character text morphing

pub mod counter;
pub mod easing;
pub mod error;
pub mod particles;
pub mod progress;
pub mod scheduler;
pub mod scramble;

pub use counter::{CounterAnimator, CounterTask};
pub use easing::{ease_out_quart, lerp, Easing};
pub use error::{AnimationError, Result};
pub use particles::{Particle, ParticleConfig, ParticleSimulation, ParticleSystem};
pub use scheduler::{
    Frame, FrameCallback, FrameLoopHandle, FrameLoopId, FrameScheduler, FrameStatus, LoopState,
};
pub use scramble::{ScrambleCompletion, ScrambleEngine, ScrambleSlot, ScrambleTask};
