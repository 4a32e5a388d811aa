//! Pointer-driven effects
//!
//! - **Tilt** on `[data-tilt]`: 3D rotation toward the pointer
//! - **Magnetic** on `.btn`: a small pull toward the pointer
//! - **Cursor**: a tracking dot that grows over interactive elements
//! - **Glitch**: reports section titles the pointer just entered
//!
//! Enter and leave are derived from successive pointer positions, so the host
//! only forwards moves.

use crate::config::PointerConfig;
use crate::error::Result;
use rustc_hash::FxHashSet;
use vitrine_core::{Element, NodeId, Page, Point, Rect, SelectorList, Tilt, Viewport};

pub const TILT_SELECTOR: &str = "[data-tilt]";
pub const MAGNETIC_SELECTOR: &str = ".btn";
pub const INTERACTIVE_SELECTOR: &str = "a, button, .btn, [data-tilt]";
pub const GLITCH_SELECTOR: &str = ".section-header h2";

/// Cursor dot is 20px wide; offset so it is centred on the pointer
pub const CURSOR_OFFSET: f32 = 10.0;

const CURSOR_IDLE: (f32, f32) = (1.0, 0.3);
const CURSOR_ACTIVE: (f32, f32) = (2.0, 0.6);

/// Tilt for a pointer over an element centred at `center`
pub fn tilt_for(pointer: Point, center: Point, config: &PointerConfig) -> Tilt {
    Tilt {
        rotate_x: (pointer.y - center.y) / config.tilt_divisor,
        rotate_y: (center.x - pointer.x) / config.tilt_divisor,
        translate_z: config.tilt_depth_px,
        ..Tilt::neutral()
    }
}

/// Magnetic offset for a pointer over an element of the given size
pub fn magnetic_offset(pointer: Point, center: Point, width: f32, height: f32, strength: f32) -> (f32, f32) {
    let dx = if width > 0.0 { (pointer.x - center.x) / width * strength } else { 0.0 };
    let dy = if height > 0.0 { (pointer.y - center.y) / height * strength } else { 0.0 };
    (dx, dy)
}

/// What a pointer move changed beyond element styles
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerOutcome {
    /// Glitch headings the pointer just entered
    pub entered_headings: Vec<NodeId>,
    /// Whether the cursor is over an interactive element
    pub over_interactive: bool,
}

pub struct PointerEffects {
    config: PointerConfig,
    tilt_targets: Vec<NodeId>,
    magnetic_targets: Vec<NodeId>,
    /// Glitch headings with the text they settle back to
    glitch_targets: Vec<(NodeId, String)>,
    interactive: SelectorList,
    cursor: Option<NodeId>,
    hovered: FxHashSet<NodeId>,
}

impl PointerEffects {
    /// Collect targets and, if enabled, create the cursor element
    pub fn attach(page: &mut Page, config: &PointerConfig) -> Result<Self> {
        let root = page.root();
        let tilt_targets = if config.tilt {
            page.select(root, TILT_SELECTOR)?
        } else {
            Vec::new()
        };
        let magnetic_targets = if config.magnetic {
            page.select(root, MAGNETIC_SELECTOR)?
        } else {
            Vec::new()
        };
        let glitch_targets = page
            .select(root, GLITCH_SELECTOR)?
            .into_iter()
            .map(|node| (node, page.text(node).unwrap_or_default().to_string()))
            .collect();

        let cursor = config.cursor.then(|| {
            let cursor = page.append(root, Element::new("div").class("custom-cursor"));
            if let Some(style) = page.style_mut(cursor) {
                style.transform.scale = Some(CURSOR_IDLE.0);
                style.opacity = Some(CURSOR_IDLE.1);
            }
            cursor
        });

        Ok(Self {
            config: config.clone(),
            tilt_targets,
            magnetic_targets,
            glitch_targets,
            interactive: SelectorList::parse(INTERACTIVE_SELECTOR)?,
            cursor,
            hovered: FxHashSet::default(),
        })
    }

    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Text a glitch heading had when the effects were attached
    pub fn glitch_text(&self, heading: NodeId) -> Option<&str> {
        self.glitch_targets
            .iter()
            .find(|(node, _)| *node == heading)
            .map(|(_, text)| text.as_str())
    }

    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered.contains(&node)
    }

    /// Handle a pointer move in client coordinates
    pub fn pointer_move(&mut self, page: &mut Page, viewport: &Viewport, client: Point) -> PointerOutcome {
        let pointer = viewport.to_document(client);
        let mut outcome = PointerOutcome::default();

        for node in self.tilt_targets.clone() {
            match self.hit(page, node, pointer) {
                Some(rect) => {
                    let tilt = tilt_for(pointer, rect.center(), &self.config);
                    if let Some(style) = page.style_mut(node) {
                        style.transform.tilt = Some(tilt);
                    }
                }
                None if self.hovered.contains(&node) => reset_tilt(page, node),
                None => {}
            }
        }

        for node in self.magnetic_targets.clone() {
            match self.hit(page, node, pointer) {
                Some(rect) => {
                    let offset = magnetic_offset(
                        pointer,
                        rect.center(),
                        rect.width,
                        rect.height,
                        self.config.magnetic_strength,
                    );
                    if let Some(style) = page.style_mut(node) {
                        style.transform.magnetic = offset;
                    }
                }
                None if self.hovered.contains(&node) => reset_magnetic(page, node),
                None => {}
            }
        }

        for (node, _) in &self.glitch_targets {
            if self.hit(page, *node, pointer).is_some() && !self.hovered.contains(node) {
                outcome.entered_headings.push(*node);
            }
        }

        let snapshot: &Page = page;
        self.hovered = self
            .tilt_targets
            .iter()
            .chain(&self.magnetic_targets)
            .copied()
            .chain(self.glitch_targets.iter().map(|(node, _)| *node))
            .filter(|node| self.hit(snapshot, *node, pointer).is_some())
            .collect();

        outcome.over_interactive = snapshot
            .hit_test(pointer)
            .and_then(|hit| snapshot.closest(hit, &self.interactive))
            .is_some();

        if let Some(cursor) = self.cursor {
            let (scale, opacity) = if outcome.over_interactive {
                CURSOR_ACTIVE
            } else {
                CURSOR_IDLE
            };
            if let Some(style) = page.style_mut(cursor) {
                style.left = Some(client.x - CURSOR_OFFSET);
                style.top = Some(client.y - CURSOR_OFFSET);
                style.transform.scale = Some(scale);
                style.opacity = Some(opacity);
            }
        }

        outcome
    }

    /// The pointer left the document: every hovered element resets
    pub fn pointer_leave(&mut self, page: &mut Page) {
        for node in self.hovered.drain() {
            reset_tilt(page, node);
            reset_magnetic(page, node);
        }
        if let Some(cursor) = self.cursor {
            if let Some(style) = page.style_mut(cursor) {
                style.transform.scale = Some(CURSOR_IDLE.0);
                style.opacity = Some(CURSOR_IDLE.1);
            }
        }
    }

    /// Flatten every tilt (after a resize moves things around)
    pub fn reset_tilts(&self, page: &mut Page) {
        for node in &self.tilt_targets {
            reset_tilt(page, *node);
        }
    }

    /// Rect of `node` if it contains the pointer
    fn hit(&self, page: &Page, node: NodeId, pointer: Point) -> Option<Rect> {
        page.rect(node).filter(|rect| rect.area() > 0.0 && rect.contains(pointer))
    }
}

fn reset_tilt(page: &mut Page, node: NodeId) {
    if let Some(style) = page.style_mut(node) {
        if style.transform.tilt.is_some() {
            style.transform.tilt = Some(Tilt::neutral());
        }
    }
}

fn reset_magnetic(page: &mut Page, node: NodeId) {
    if let Some(style) = page.style_mut(node) {
        style.transform.magnetic = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_button() -> (Page, NodeId, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let card = page.append(
            root,
            Element::new("div").class("project-card").attr("data-tilt", "").rect(100.0, 100.0, 200.0, 200.0),
        );
        let button = page.append(
            root,
            Element::new("a")
                .classes("btn btn-primary")
                .attr("data-tilt", "")
                .rect(500.0, 100.0, 100.0, 40.0),
        );
        (page, card, button)
    }

    #[test]
    fn tilt_follows_pointer_offset() {
        let tilt = tilt_for(Point::new(250.0, 150.0), Point::new(200.0, 200.0), &PointerConfig::default());
        assert_eq!(tilt.rotate_x, -5.0);
        assert_eq!(tilt.rotate_y, -5.0);
        assert_eq!(tilt.translate_z, 20.0);
        assert_eq!(tilt.perspective, 1000.0);
    }

    #[test]
    fn magnetic_scales_with_size() {
        let offset = magnetic_offset(Point::new(600.0, 120.0), Point::new(550.0, 120.0), 100.0, 40.0, 10.0);
        assert_eq!(offset, (5.0, 0.0));
        assert_eq!(magnetic_offset(Point::ZERO, Point::ZERO, 0.0, 0.0, 10.0), (0.0, 0.0));
    }

    #[test]
    fn leave_resets_tilt_to_neutral() {
        let (mut page, card, _) = page_with_button();
        let mut effects = PointerEffects::attach(&mut page, &PointerConfig::default()).unwrap();
        let viewport = Viewport::new(1200.0, 800.0);

        effects.pointer_move(&mut page, &viewport, Point::new(120.0, 120.0));
        assert!(!page.style(card).unwrap().transform.tilt.unwrap().is_neutral());
        assert!(effects.is_hovered(card));

        effects.pointer_move(&mut page, &viewport, Point::new(900.0, 700.0));
        assert_eq!(page.style(card).unwrap().transform.tilt, Some(Tilt::neutral()));
        assert!(!effects.is_hovered(card));
    }

    #[test]
    fn tilt_and_magnetic_compose_on_one_button() {
        let (mut page, _, button) = page_with_button();
        let mut effects = PointerEffects::attach(&mut page, &PointerConfig::default()).unwrap();
        effects.pointer_move(&mut page, &Viewport::new(1200.0, 800.0), Point::new(575.0, 130.0));

        let transform = page.style(button).unwrap().transform;
        assert!(transform.tilt.is_some());
        assert_eq!(transform.magnetic, (2.5, 2.5));
        assert!(transform.to_css().contains("translate(2.5px, 2.5px)"));
        assert!(transform.to_css().starts_with("perspective(1000px)"));
    }

    #[test]
    fn cursor_tracks_and_grows_over_links() {
        let (mut page, _, _) = page_with_button();
        let mut effects = PointerEffects::attach(&mut page, &PointerConfig::default()).unwrap();
        let cursor = effects.cursor().unwrap();
        let viewport = Viewport::new(1200.0, 800.0);

        let outcome = effects.pointer_move(&mut page, &viewport, Point::new(520.0, 110.0));
        assert!(outcome.over_interactive);
        let style = page.style(cursor).unwrap();
        assert_eq!((style.left, style.top), (Some(510.0), Some(100.0)));
        assert_eq!((style.transform.scale, style.opacity), (Some(2.0), Some(0.6)));

        effects.pointer_move(&mut page, &viewport, Point::new(900.0, 700.0));
        let style = page.style(cursor).unwrap();
        assert_eq!((style.transform.scale, style.opacity), (Some(1.0), Some(0.3)));
    }

    #[test]
    fn glitch_fires_on_enter_only() {
        let mut page = Page::new();
        let root = page.root();
        page.append(
            root,
            Element::new("div")
                .class("section-header")
                .child(Element::new("h2").text("Projects").rect(0.0, 0.0, 300.0, 50.0)),
        );
        let mut effects = PointerEffects::attach(&mut page, &PointerConfig::default()).unwrap();
        let viewport = Viewport::new(1200.0, 800.0);

        assert_eq!(effects.pointer_move(&mut page, &viewport, Point::new(10.0, 10.0)).entered_headings.len(), 1);
        assert!(effects.pointer_move(&mut page, &viewport, Point::new(20.0, 10.0)).entered_headings.is_empty());
        effects.pointer_move(&mut page, &viewport, Point::new(500.0, 500.0));
        assert_eq!(effects.pointer_move(&mut page, &viewport, Point::new(10.0, 10.0)).entered_headings.len(), 1);
    }

    #[test]
    fn glitch_text_is_captured_at_attach() {
        let mut page = Page::new();
        let root = page.root();
        let header = page.append(
            root,
            Element::new("div")
                .class("section-header")
                .child(Element::new("h2").text("About").rect(0.0, 0.0, 300.0, 50.0)),
        );
        let heading = page.select_first(header, "h2").unwrap().unwrap();
        let effects = PointerEffects::attach(&mut page, &PointerConfig::default()).unwrap();

        page.set_text(heading, "Ab-ut");
        assert_eq!(effects.glitch_text(heading), Some("About"));
        assert_eq!(effects.glitch_text(header), None);
    }

    #[test]
    fn disabled_effects_leave_styles_alone() {
        let (mut page, card, _) = page_with_button();
        let config = PointerConfig {
            tilt: false,
            magnetic: false,
            cursor: false,
            ..PointerConfig::default()
        };
        let mut effects = PointerEffects::attach(&mut page, &config).unwrap();
        effects.pointer_move(&mut page, &Viewport::new(1200.0, 800.0), Point::new(120.0, 120.0));
        assert_eq!(page.style(card).unwrap().transform.tilt, None);
        assert_eq!(effects.cursor(), None);
    }
}
