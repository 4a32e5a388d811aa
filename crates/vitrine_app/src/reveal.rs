//! Scroll reveal subscriptions
//!
//! Wires the page's markup contract to visibility observers:
//!
//! | Observer     | Targets                                                | Mode   |
//! |--------------|--------------------------------------------------------|--------|
//! | reveal       | `.animated-section`, `.reveal-text`, `.section-header` | repeat |
//! | stagger      | `.skills-grid`, `.projects-grid`                       | once   |
//! | counters     | `.stat-item`                                           | once   |
//! | progress     | `.skill-card`                                          | once   |
//! | navigation   | `section`                                              | repeat |

use crate::config::PortfolioConfig;
use crate::error::Result;
use crate::visibility::{ObserverOptions, TriggerMode, VisibilityObserver};
use vitrine_core::{NodeId, Page, Viewport};

pub const REVEAL_SELECTOR: &str = ".animated-section, .reveal-text, .section-header";
pub const GRID_SELECTOR: &str = ".skills-grid, .projects-grid";
pub const CARD_SELECTOR: &str = ".skill-card, .project-card";
pub const STAT_SELECTOR: &str = ".stat-item";
pub const SKILL_CARD_SELECTOR: &str = ".skill-card";
pub const SECTION_SELECTOR: &str = "section";
pub const NAV_LINK_SELECTOR: &str = ".nav-links a";

/// Class marking revealed content
pub const IN_VIEW: &str = "in-view";

/// Something a visibility transition asks the composition root to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// A reveal target entered the viewport
    Reveal(NodeId),
    /// A card grid entered; its cards reveal one after another
    Stagger(NodeId),
    /// A stat item entered; its number counts up
    Counter(NodeId),
    /// A skill card entered; its bar fills
    Progress(NodeId),
    /// A section is the one being read
    Section(NodeId),
}

/// All visibility subscriptions of a portfolio page
pub struct RevealTriggers {
    reveal: VisibilityObserver,
    stagger: VisibilityObserver,
    counters: VisibilityObserver,
    progress: VisibilityObserver,
    navigation: VisibilityObserver,
}

impl RevealTriggers {
    /// Observe every matching node currently on the page
    pub fn attach(page: &Page, config: &PortfolioConfig) -> Result<Self> {
        let reveal_options = ObserverOptions::new(config.reveal.threshold, config.reveal.root_margin()?);
        let nav_options = ObserverOptions::new(config.navigation.threshold, config.navigation.root_margin()?);
        let root = page.root();

        let mut triggers = Self {
            reveal: VisibilityObserver::new(reveal_options),
            stagger: VisibilityObserver::new(reveal_options),
            counters: VisibilityObserver::new(reveal_options),
            progress: VisibilityObserver::new(reveal_options),
            navigation: VisibilityObserver::new(nav_options),
        };
        triggers
            .reveal
            .observe_all(page.select(root, REVEAL_SELECTOR)?, TriggerMode::Repeat);
        triggers
            .stagger
            .observe_all(page.select(root, GRID_SELECTOR)?, TriggerMode::Once);
        triggers
            .counters
            .observe_all(page.select(root, STAT_SELECTOR)?, TriggerMode::Once);
        triggers
            .progress
            .observe_all(page.select(root, SKILL_CARD_SELECTOR)?, TriggerMode::Once);
        triggers
            .navigation
            .observe_all(page.select(root, SECTION_SELECTOR)?, TriggerMode::Repeat);

        tracing::debug!(
            "observing {} reveal, {} grid, {} stat, {} skill and {} section nodes",
            triggers.reveal.len(),
            triggers.stagger.len(),
            triggers.counters.len(),
            triggers.progress.len(),
            triggers.navigation.len()
        );
        Ok(triggers)
    }

    /// Evaluate every observer and collect the triggers that fired
    pub fn evaluate(&mut self, page: &Page, viewport: &Viewport) -> Vec<Trigger> {
        let mut fired = Vec::new();
        fired.extend(self.reveal.evaluate(page, viewport).into_iter().map(|e| Trigger::Reveal(e.node)));
        fired.extend(self.stagger.evaluate(page, viewport).into_iter().map(|e| Trigger::Stagger(e.node)));
        fired.extend(self.counters.evaluate(page, viewport).into_iter().map(|e| Trigger::Counter(e.node)));
        fired.extend(self.progress.evaluate(page, viewport).into_iter().map(|e| Trigger::Progress(e.node)));
        fired.extend(
            self.navigation
                .evaluate(page, viewport)
                .into_iter()
                .map(|e| Trigger::Section(e.node)),
        );
        fired
    }

    /// Nodes still waiting on a one-shot trigger
    pub fn pending_once(&self) -> usize {
        self.stagger.len() + self.counters.len() + self.progress.len()
    }

    pub fn navigation(&self) -> &VisibilityObserver {
        &self.navigation
    }
}

/// Mark a node revealed; returns false if it already was
pub fn reveal(page: &mut Page, node: NodeId) -> bool {
    page.add_class(node, IN_VIEW)
}

/// The underline element of a section header
pub fn header_line(page: &Page, header: NodeId) -> Option<NodeId> {
    if !page.has_class(header, "section-header") {
        return None;
    }
    page.select_first(header, ".header-line").ok().flatten()
}

/// Cards of a grid in document order
pub fn stagger_cards(page: &Page, grid: NodeId) -> Result<Vec<NodeId>> {
    Ok(page.select(grid, CARD_SELECTOR)?)
}

/// Highlight the navigation link pointing at `section`. Returns the link
/// that became active, if any.
pub fn activate_nav_link(page: &mut Page, section: NodeId) -> Result<Option<NodeId>> {
    let target = page.attribute(section, "id").map(|id| format!("#{}", id));
    let links = page.select(page.root(), NAV_LINK_SELECTOR)?;

    let mut active = None;
    for link in links {
        page.remove_class(link, "active");
        if target.is_some() && page.attribute(link, "href") == target.as_deref() {
            page.add_class(link, "active");
            active = Some(link);
        }
    }
    Ok(active)
}
