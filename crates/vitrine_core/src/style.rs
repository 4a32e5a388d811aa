//! Element style
//!
//! Every engine that moves an element writes its own transform layer, and the
//! layers are composed when the style is rendered. A button that is tilted
//! and magnetically pulled at the same time keeps both contributions.

use std::fmt;

/// A CSS length
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", v),
            Length::Percent(v) => write!(f, "{}%", v),
        }
    }
}

/// 3D tilt: `perspective(..) rotateX(..) rotateY(..) translateZ(..)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub perspective: f32,
    /// Degrees
    pub rotate_x: f32,
    /// Degrees
    pub rotate_y: f32,
    /// Pixels
    pub translate_z: f32,
}

impl Tilt {
    pub const PERSPECTIVE: f32 = 1000.0;

    /// Flat tilt with the default perspective
    pub const fn neutral() -> Self {
        Self {
            perspective: Self::PERSPECTIVE,
            rotate_x: 0.0,
            rotate_y: 0.0,
            translate_z: 0.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.rotate_x == 0.0 && self.rotate_y == 0.0 && self.translate_z == 0.0
    }
}

/// Independent transform contributions, one per effect
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformLayers {
    /// Scroll parallax offset (px)
    pub parallax_y: f32,
    /// Pointer tilt
    pub tilt: Option<Tilt>,
    /// Magnetic pull toward the pointer (px)
    pub magnetic: (f32, f32),
    /// Focus lift (px)
    pub lift_y: f32,
    /// Uniform scale
    pub scale: Option<f32>,
    /// Horizontal slide used by banners (px)
    pub slide_x: f32,
}

impl TransformLayers {
    pub fn is_identity(&self) -> bool {
        self.parallax_y == 0.0
            && self.tilt.map_or(true, |t| t.is_neutral())
            && self.magnetic == (0.0, 0.0)
            && self.lift_y == 0.0
            && self.scale.map_or(true, |s| s == 1.0)
            && self.slide_x == 0.0
    }

    /// Compose every active layer into a CSS transform value
    pub fn to_css(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(tilt) = self.tilt {
            parts.push(format!(
                "perspective({}px) rotateX({}deg) rotateY({}deg) translateZ({}px)",
                tilt.perspective, tilt.rotate_x, tilt.rotate_y, tilt.translate_z
            ));
        }
        if self.magnetic != (0.0, 0.0) {
            parts.push(format!(
                "translate({}px, {}px)",
                self.magnetic.0, self.magnetic.1
            ));
        }
        if self.slide_x != 0.0 {
            parts.push(format!("translateX({}px)", self.slide_x));
        }
        let dy = self.parallax_y + self.lift_y;
        if dy != 0.0 {
            parts.push(format!("translateY({}px)", dy));
        }
        if let Some(scale) = self.scale {
            parts.push(format!("scale({})", scale));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Inline style of one element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementStyle {
    pub transform: TransformLayers,
    pub width: Option<Length>,
    pub opacity: Option<f32>,
    /// Fixed-position offsets (px)
    pub left: Option<f32>,
    pub top: Option<f32>,
    /// CSS `animation-delay` in seconds
    pub animation_delay_s: Option<f32>,
}

impl ElementStyle {
    /// Render as inline CSS declarations
    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if !self.transform.is_identity() || self.transform.tilt.is_some() {
            decls.push(format!("transform: {}", self.transform.to_css()));
        }
        if let Some(width) = self.width {
            decls.push(format!("width: {}", width));
        }
        if let Some(opacity) = self.opacity {
            decls.push(format!("opacity: {}", opacity));
        }
        if let Some(left) = self.left {
            decls.push(format!("left: {}px", left));
        }
        if let Some(top) = self.top {
            decls.push(format!("top: {}px", top));
        }
        if let Some(delay) = self.animation_delay_s {
            decls.push(format!("animation-delay: {}s", delay));
        }
        decls.join("; ")
    }
}
