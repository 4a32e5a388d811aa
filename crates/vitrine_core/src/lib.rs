//! Vitrine Core Runtime
//!
//! This crate provides the foundational primitives every Vitrine engine is
//! built on:
//!
//! - **Page model**: an in-memory element tree with classes, attributes,
//!   text, layout rectangles and layered styles
//! - **Selectors**: CSS-style selector parsing and matching
//! - **Viewport**: scroll position, root margins and intersection ratios
//! - **Time**: cancellable timers, debounce and throttle gates
//! - **Randomness**: a seedable random source for deterministic tests
//!
//! # Example
//!
//! ```rust
//! use vitrine_core::{Element, Page};
//!
//! let mut page = Page::new();
//! let root = page.root();
//! let card = page.append(
//!     root,
//!     Element::new("div").class("skill-card").attr("data-width", "80"),
//! );
//!
//! let found = page.select(root, ".skill-card").unwrap();
//! assert_eq!(found, vec![card]);
//! assert_eq!(page.attribute(card, "data-width"), Some("80"));
//! ```

pub mod error;
pub mod events;
pub mod page;
pub mod random;
pub mod selector;
pub mod style;
pub mod time;
pub mod viewport;

pub use error::{CoreError, Result};
pub use events::{InputEvent, KeyCode};
pub use page::{Element, Node, NodeId, Page};
pub use random::RandomSource;
pub use selector::SelectorList;
pub use style::{ElementStyle, Length, Tilt, TransformLayers};
pub use time::{Debouncer, Throttle, TimerId, TimerQueue};
pub use viewport::{intersection_ratio, MarginValue, RootMargin, Viewport};

// Geometry is shared with the paint surface
pub use vitrine_paint::{Point, Rect};
