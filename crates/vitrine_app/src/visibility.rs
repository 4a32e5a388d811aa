//! Visibility triggers
//!
//! An `IntersectionObserver` stand-in. Observed nodes are measured against a
//! margin-adjusted viewport, and a node reports an entry only on the
//! transition from hidden to visible. Repeated "still visible" reports never
//! fire twice.

use vitrine_core::{intersection_ratio, NodeId, Page, RootMargin, Viewport};

/// Observer tuning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Minimum visible fraction, in `[0, 1]`
    pub threshold: f32,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(threshold: f32, root_margin: RootMargin) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            root_margin,
        }
    }

    /// A ratio counts as visible when something is showing and the
    /// threshold is met
    pub fn is_visible(&self, ratio: f32) -> bool {
        ratio > 0.0 && ratio >= self.threshold
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::new(0.0, RootMargin::default())
    }
}

/// What happens after a node first becomes visible
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fire once, then stop observing
    Once,
    /// Fire again each time the node re-enters
    Repeat,
}

/// A hidden-to-visible transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub node: NodeId,
    pub ratio: f32,
}

#[derive(Clone, Debug)]
struct Observation {
    node: NodeId,
    mode: TriggerMode,
    in_view: bool,
}

/// Tracks visibility of a set of nodes
#[derive(Clone, Debug, Default)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    observed: Vec<Observation>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: Vec::new(),
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start observing. Re-observing a node updates its mode and keeps its
    /// current state.
    pub fn observe(&mut self, node: NodeId, mode: TriggerMode) {
        match self.observed.iter_mut().find(|o| o.node == node) {
            Some(observation) => observation.mode = mode,
            None => self.observed.push(Observation {
                node,
                mode,
                in_view: false,
            }),
        }
    }

    pub fn observe_all(&mut self, nodes: impl IntoIterator<Item = NodeId>, mode: TriggerMode) {
        for node in nodes {
            self.observe(node, mode);
        }
    }

    pub fn unobserve(&mut self, node: NodeId) -> bool {
        let before = self.observed.len();
        self.observed.retain(|o| o.node != node);
        self.observed.len() != before
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.iter().any(|o| o.node == node)
    }

    pub fn is_in_view(&self, node: NodeId) -> bool {
        self.observed.iter().any(|o| o.node == node && o.in_view)
    }

    /// Number of observed nodes
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Measure every observed node against the viewport. Returns entries for
    /// the nodes that just became visible, in observation order. Nodes that
    /// left the page are dropped.
    pub fn evaluate(&mut self, page: &Page, viewport: &Viewport) -> Vec<VisibilityEntry> {
        let root = self.options.root_margin.apply(viewport.rect());

        let before = self.observed.len();
        self.observed.retain(|o| page.contains(o.node));
        if self.observed.len() != before {
            tracing::debug!("dropped {} removed nodes from observer", before - self.observed.len());
        }

        let ratios: Vec<(NodeId, f32)> = self
            .observed
            .iter()
            .filter_map(|o| page.rect(o.node).map(|rect| (o.node, intersection_ratio(rect, root))))
            .collect();
        ratios
            .into_iter()
            .filter_map(|(node, ratio)| self.report(node, ratio))
            .collect()
    }

    /// Feed a host-measured ratio for one node, with the same edge-triggered
    /// semantics as [`VisibilityObserver::evaluate`]
    pub fn report(&mut self, node: NodeId, ratio: f32) -> Option<VisibilityEntry> {
        let visible = self.options.is_visible(ratio);
        let index = self.observed.iter().position(|o| o.node == node)?;
        let observation = &mut self.observed[index];

        if !visible {
            observation.in_view = false;
            return None;
        }
        if observation.in_view {
            return None;
        }

        observation.in_view = true;
        if observation.mode == TriggerMode::Once {
            self.observed.remove(index);
        }
        Some(VisibilityEntry { node, ratio })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::{Element, MarginValue};

    fn tall_page() -> (Page, NodeId, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let top = page.append(root, Element::new("section").rect(0.0, 0.0, 1000.0, 400.0));
        let bottom = page.append(root, Element::new("section").rect(0.0, 2000.0, 1000.0, 400.0));
        (page, top, bottom)
    }

    fn reveal_options() -> ObserverOptions {
        ObserverOptions::new(
            0.1,
            RootMargin::new(
                MarginValue::Px(0.0),
                MarginValue::Px(0.0),
                MarginValue::Px(-50.0),
                MarginValue::Px(0.0),
            ),
        )
    }

    #[test]
    fn visible_at_start_fires_on_first_evaluation() {
        let (page, top, bottom) = tall_page();
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe_all([top, bottom], TriggerMode::Repeat);

        let entries = observer.evaluate(&page, &Viewport::new(1000.0, 800.0));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node, top);
        assert_eq!(entries[0].ratio, 1.0);
        assert!(observer.evaluate(&page, &Viewport::new(1000.0, 800.0)).is_empty());
    }

    #[test]
    fn once_reports_a_single_time() {
        let (_, top, _) = tall_page();
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(top, TriggerMode::Once);
        assert!(observer.report(top, 0.5).is_some());
        assert!(observer.report(top, 0.5).is_none());
        assert!(observer.report(top, 0.0).is_none());
        assert!(observer.report(top, 0.9).is_none());
        assert!(!observer.is_observed(top));
    }

    #[test]
    fn repeat_rearms_after_leaving() {
        let (_, top, _) = tall_page();
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(top, TriggerMode::Repeat);
        assert!(observer.report(top, 0.3).is_some());
        assert!(observer.report(top, 0.4).is_none());
        assert!(observer.report(top, 0.05).is_none());
        assert!(!observer.is_in_view(top));
        assert!(observer.report(top, 0.3).is_some());
    }

    #[test]
    fn zero_threshold_still_needs_some_overlap() {
        let (_, top, _) = tall_page();
        let mut observer = VisibilityObserver::new(ObserverOptions::default());
        observer.observe(top, TriggerMode::Repeat);
        assert!(observer.report(top, 0.0).is_none());
        assert!(observer.report(top, 0.01).is_some());
    }

    #[test]
    fn bottom_margin_delays_entry() {
        let (page, _, bottom) = tall_page();
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(bottom, TriggerMode::Once);

        // Viewport bottom at 2060 but the root stops at 2010: 10px of 400 visible
        let mut viewport = Viewport::new(1000.0, 800.0);
        viewport.scroll_y = 1260.0;
        assert!(observer.evaluate(&page, &viewport).is_empty());

        // 50px of 400 visible after the margin
        viewport.scroll_y = 1300.0;
        let entries = observer.evaluate(&page, &viewport);
        assert_eq!(entries.len(), 1);
        assert!((entries[0].ratio - 0.125).abs() < 1e-6);
    }

    #[test]
    fn removed_nodes_are_forgotten() {
        let (mut page, top, _) = tall_page();
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(top, TriggerMode::Repeat);
        page.remove(top);
        assert!(observer.evaluate(&page, &Viewport::new(1000.0, 800.0)).is_empty());
        assert!(observer.is_empty());
    }
}
