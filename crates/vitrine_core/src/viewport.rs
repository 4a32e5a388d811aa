//! Viewport geometry and intersection ratios

use crate::error::{CoreError, Result};
use vitrine_paint::{Point, Rect};

/// The visible window onto the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset (px)
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Visible area in document coordinates
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.height)
    }

    /// Convert a client position into document coordinates
    pub fn to_document(&self, client: Point) -> Point {
        Point::new(client.x, client.y + self.scroll_y)
    }

    /// Largest scroll offset for a document of the given height
    pub fn max_scroll(&self, document_height: f32) -> f32 {
        (document_height - self.height).max(0.0)
    }
}

/// One side of a root margin
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    Px(f32),
    /// Percentage of the viewport dimension along that axis
    Percent(f32),
}

impl MarginValue {
    fn resolve(self, extent: f32) -> f32 {
        match self {
            MarginValue::Px(v) => v,
            MarginValue::Percent(p) => extent * p / 100.0,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        if let Some(number) = token.strip_suffix("px") {
            number.parse().ok().map(MarginValue::Px)
        } else if let Some(number) = token.strip_suffix('%') {
            number.parse().ok().map(MarginValue::Percent)
        } else {
            // Only a bare zero is allowed without a unit
            token
                .parse::<f32>()
                .ok()
                .filter(|v| *v == 0.0)
                .map(MarginValue::Px)
        }
    }
}

/// Grows (positive) or shrinks (negative) the root rectangle before
/// intersecting, like `IntersectionObserver`'s `rootMargin`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(MarginValue::Px(0.0))
    }
}

impl RootMargin {
    pub const fn uniform(value: MarginValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn new(
        top: MarginValue,
        right: MarginValue,
        bottom: MarginValue,
        left: MarginValue,
    ) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Parse CSS margin shorthand with one to four values,
    /// e.g. `"0px 0px -50px 0px"` or `"-20% 0px"`
    pub fn parse(input: &str) -> Result<Self> {
        let values: Option<Vec<MarginValue>> =
            input.split_whitespace().map(MarginValue::parse).collect();
        let values = values.ok_or_else(|| CoreError::RootMargin(input.to_string()))?;
        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            _ => Err(CoreError::RootMargin(input.to_string())),
        }
    }

    /// Apply the margins to a root rectangle
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

/// Fraction of `target` visible inside `root`, in `[0, 1]`.
///
/// Zero-area targets count as fully visible when their origin lies inside
/// the root.
pub fn intersection_ratio(target: Rect, root: Rect) -> f32 {
    let area = target.area();
    if area <= 0.0 {
        return if root.contains(target.origin()) { 1.0 } else { 0.0 };
    }
    match target.intersection(&root) {
        Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shorthand_forms() {
        assert_eq!(
            RootMargin::parse("0px 0px -50px 0px").unwrap(),
            RootMargin::new(
                MarginValue::Px(0.0),
                MarginValue::Px(0.0),
                MarginValue::Px(-50.0),
                MarginValue::Px(0.0)
            )
        );
        assert_eq!(
            RootMargin::parse("-20% 0px").unwrap(),
            RootMargin::new(
                MarginValue::Percent(-20.0),
                MarginValue::Px(0.0),
                MarginValue::Percent(-20.0),
                MarginValue::Px(0.0)
            )
        );
        assert_eq!(RootMargin::parse("0").unwrap(), RootMargin::default());
        assert!(RootMargin::parse("10").is_err());
        assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
        assert!(RootMargin::parse("").is_err());
    }

    #[test]
    fn negative_margins_shrink_root() {
        let viewport = Viewport::new(1000.0, 800.0);
        let margin = RootMargin::parse("-20% 0px -20% 0px").unwrap();
        let root = margin.apply(viewport.rect());
        assert_eq!(root, Rect::new(0.0, 160.0, 1000.0, 480.0));
    }

    #[test]
    fn ratio_of_partially_visible_target() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        let target = Rect::new(0.0, 90.0, 100.0, 100.0);
        assert!((intersection_ratio(target, root) - 0.1).abs() < 1e-6);
        assert_eq!(intersection_ratio(Rect::new(0.0, 200.0, 10.0, 10.0), root), 0.0);
        assert_eq!(intersection_ratio(Rect::new(5.0, 5.0, 0.0, 0.0), root), 1.0);
    }

    #[test]
    fn client_document_conversion() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scroll_y = 250.0;
        let doc = viewport.to_document(Point::new(10.0, 20.0));
        assert_eq!(doc, Point::new(10.0, 270.0));
        assert_eq!(viewport.max_scroll(500.0), 0.0);
    }
}
