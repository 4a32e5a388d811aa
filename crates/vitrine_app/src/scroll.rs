//! Scroll effects
//!
//! Scroll notifications only record the latest offset; the work runs once per
//! frame in [`ScrollEffects::flush`], however many scroll events arrived.

use crate::config::ScrollConfig;
use crate::error::Result;
use vitrine_core::{Element, Length, NodeId, Page, Viewport};

pub const FLOATING_SELECTOR: &str = ".floating-element";
pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

/// Scroll progress in percent for a document of `document_height`
pub fn scroll_percent(scroll_y: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

pub struct ScrollEffects {
    config: ScrollConfig,
    header: Option<NodeId>,
    floating: Vec<(NodeId, f32)>,
    progress_bar: Option<NodeId>,
    /// Latest offset not yet applied
    pending: Option<f32>,
}

impl ScrollEffects {
    /// Find the header and floating elements; create the progress bar
    pub fn attach(page: &mut Page, config: &ScrollConfig) -> Result<Self> {
        let root = page.root();
        let header = page.select_first(root, "header")?;

        let floating = page
            .select(root, FLOATING_SELECTOR)?
            .into_iter()
            .map(|node| {
                let speed = match page.attribute(node, "data-speed") {
                    None => config.default_parallax_speed,
                    Some(_) => page.parse_attribute::<f32>(node, "data-speed").unwrap_or_else(|err| {
                        tracing::warn!("{}; using default parallax speed", err);
                        config.default_parallax_speed
                    }),
                };
                (node, speed)
            })
            .collect();

        let progress_bar = config
            .progress_bar
            .then(|| page.append(root, Element::new("div").class("scroll-progress")));
        if let Some(bar) = progress_bar {
            if let Some(style) = page.style_mut(bar) {
                style.width = Some(Length::Percent(0.0));
            }
        }

        Ok(Self {
            config: config.clone(),
            header,
            floating,
            progress_bar,
            pending: None,
        })
    }

    /// Record a scroll position for the next frame
    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.pending = Some(scroll_y);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the latest scroll position, if any. Returns true when work ran.
    pub fn flush(&mut self, page: &mut Page, viewport: &Viewport) -> bool {
        let Some(scroll_y) = self.pending.take() else {
            return false;
        };

        if let Some(header) = self.header {
            if scroll_y > self.config.header_threshold {
                page.add_class(header, "scrolled");
            } else {
                page.remove_class(header, "scrolled");
            }
        }

        for (node, speed) in &self.floating {
            if let Some(style) = page.style_mut(*node) {
                style.transform.parallax_y = -(scroll_y * speed);
            }
        }

        if let Some(bar) = self.progress_bar {
            let percent = scroll_percent(scroll_y, page.document_height(), viewport.height);
            if let Some(style) = page.style_mut(bar) {
                style.width = Some(Length::Percent(percent));
            }
        }
        true
    }

    pub fn progress_bar(&self) -> Option<NodeId> {
        self.progress_bar
    }

    /// Scroll offset that brings an in-page link's target under the header.
    /// `None` when the link does not point at an element on the page.
    pub fn anchor_target(&self, page: &Page, link: NodeId) -> Option<f32> {
        let href = page.attribute(link, "href")?;
        let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
        let target = page.element_by_id(id)?;
        let header_height = self.header.and_then(|h| page.rect(h)).map_or(0.0, |r| r.height);
        let top = page.rect(target)?.y - header_height;
        Some(top.max(0.0))
    }
}
