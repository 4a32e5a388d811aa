//! Vitrine Paint API
//!
//! A small 2D drawing surface shaped after the HTML canvas 2D context.
//! Drawing calls are recorded as [`PaintCommand`]s so the frame a simulation
//! produced can be inspected, replayed onto a real backend, or asserted on in
//! tests.
//!
//! # Features
//!
//! - Filled circles and stroked line segments
//! - Global alpha with `save`/`restore` state stack
//! - Full-surface clears that drop the previous frame's commands

pub mod color;
pub mod context;
pub mod primitives;

pub use color::Color;
pub use context::{PaintCommand, PaintContext, StrokeStyle};
pub use primitives::{Circle, Line, Point, Rect};
