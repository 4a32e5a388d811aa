//! Progress bar fills

use crate::error::Result;
use vitrine_core::{CoreError, Length, NodeId, Page};

/// Delay between a skill card becoming visible and its bar filling
pub const FILL_DELAY_MS: f64 = 500.0;

/// Read a bar's `data-width`, clamped to `[0, 100]`
pub fn target_width(page: &Page, bar: NodeId) -> Result<f32> {
    let width: f32 = page.parse_attribute(bar, "data-width")?;
    if !width.is_finite() {
        return Err(CoreError::InvalidAttribute {
            attribute: "data-width".to_string(),
            value: width.to_string(),
        }
        .into());
    }
    Ok(width.clamp(0.0, 100.0))
}

/// Set the bar width to `percent`
pub fn fill(page: &mut Page, bar: NodeId, percent: f32) -> Result<()> {
    page.try_node(bar)?;
    if let Some(style) = page.style_mut(bar) {
        style.width = Some(Length::Percent(percent.clamp(0.0, 100.0)));
    }
    Ok(())
}

/// Fill a bar to its own `data-width`; returns the applied width
pub fn fill_to_target(page: &mut Page, bar: NodeId) -> Result<f32> {
    let width = target_width(page, bar)?;
    fill(page, bar, width)?;
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimationError;
    use vitrine_core::Element;

    fn bar(width: &str) -> (Page, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let bar = page.append(root, Element::new("div").class("progress-bar").attr("data-width", width));
        (page, bar)
    }

    #[test]
    fn fills_to_data_width() {
        let (mut page, bar) = bar("85");
        assert_eq!(fill_to_target(&mut page, bar).unwrap(), 85.0);
        assert_eq!(page.style(bar).unwrap().width, Some(Length::Percent(85.0)));
    }

    #[test]
    fn clamps_out_of_range() {
        let (page, bar) = bar("140");
        assert_eq!(target_width(&page, bar).unwrap(), 100.0);
        let (page, bar) = self::bar("-5");
        assert_eq!(target_width(&page, bar).unwrap(), 0.0);
    }

    #[test]
    fn rejects_garbage() {
        let (mut page, bar) = bar("wide");
        assert!(matches!(
            fill_to_target(&mut page, bar),
            Err(AnimationError::Core(CoreError::InvalidAttribute { .. }))
        ));
        assert_eq!(page.style(bar).unwrap().width, None);

        let (page, bar) = self::bar("NaN");
        assert!(target_width(&page, bar).is_err());
    }
}
