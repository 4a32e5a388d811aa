//! Keyboard activation
//!
//! Pointer-only widgets become reachable with Tab, and Enter or Space on a
//! focused one follows the same path as a click.

use crate::error::Result;
use vitrine_core::{KeyCode, NodeId, Page, SelectorList};

pub const FOCUSABLE_SELECTOR: &str = "[data-tilt], .btn, .nav-links a";

pub struct KeyboardShim {
    focusable: SelectorList,
}

impl KeyboardShim {
    /// Give every matching element `tabindex="0"` unless it already has one
    pub fn attach(page: &mut Page) -> Result<Self> {
        let focusable = SelectorList::parse(FOCUSABLE_SELECTOR)?;
        let targets = page.query_all(page.root(), &focusable);
        let mut added = 0;
        for node in &targets {
            if page.attribute(*node, "tabindex").is_none() {
                page.set_attribute(*node, "tabindex", "0");
                added += 1;
            }
        }
        tracing::debug!("{} of {} widgets made focusable", added, targets.len());
        Ok(Self { focusable })
    }

    /// The element a key press activates, if any
    pub fn activation_target(&self, page: &Page, target: NodeId, key: KeyCode) -> Option<NodeId> {
        if !key.is_activation() || !page.contains(target) {
            return None;
        }
        page.matches(target, &self.focusable).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Element;

    #[test]
    fn tabindex_and_activation() {
        let mut page = Page::new();
        let root = page.root();
        let card = page.append(root, Element::new("div").attr("data-tilt", ""));
        let button = page.append(root, Element::new("a").class("btn").attr("tabindex", "-1"));
        let plain = page.append(root, Element::new("p"));

        let shim = KeyboardShim::attach(&mut page).unwrap();
        assert_eq!(page.attribute(card, "tabindex"), Some("0"));
        assert_eq!(page.attribute(button, "tabindex"), Some("-1"));
        assert_eq!(page.attribute(plain, "tabindex"), None);

        assert_eq!(shim.activation_target(&page, card, KeyCode::ENTER), Some(card));
        assert_eq!(shim.activation_target(&page, button, KeyCode::SPACE), Some(button));
        assert_eq!(shim.activation_target(&page, card, KeyCode::TAB), None);
        assert_eq!(shim.activation_target(&page, plain, KeyCode::ENTER), None);
    }
}
