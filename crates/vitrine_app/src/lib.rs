//! Vitrine Application Runtime
//!
//! Ties the engines of `vitrine_animation` to a portfolio page.
//!
//! # Features
//!
//! - **Visibility Triggers**: edge-triggered, margin-aware viewport observers
//! - **Reveal Subscriptions**: section reveals, staggered card grids, counters,
//!   progress bars and active navigation
//! - **Pointer Effects**: 3D tilt, magnetic buttons and a tracking cursor
//! - **Scroll Effects**: header state, parallax and a scroll progress bar
//! - **Contact Form**: validation with a simulated send
//! - **Keyboard Shim**: Enter/Space activation for pointer widgets
//! - **Loading Screen**: startup delay before the engines start
//! - **Configuration**: `vitrine.toml` via serde
//!
//! [`Portfolio`] is the composition root that owns all of the above.

pub mod config;
pub mod demo;
pub mod error;
pub mod form;
pub mod keyboard;
pub mod pointer;
pub mod portfolio;
pub mod reveal;
pub mod scroll;
pub mod startup;
pub mod visibility;

pub use config::PortfolioConfig;
pub use error::{AppError, Result};
pub use form::{validate, ContactForm, SubmitOutcome, ValidationErrors};
pub use keyboard::KeyboardShim;
pub use pointer::{PointerEffects, PointerOutcome};
pub use portfolio::{FrameReport, Portfolio, TimerAction};
pub use reveal::{RevealTriggers, Trigger};
pub use scroll::ScrollEffects;
pub use startup::{Loader, LoaderPhase};
pub use visibility::{ObserverOptions, TriggerMode, VisibilityEntry, VisibilityObserver};
