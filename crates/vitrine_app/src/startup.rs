//! Loading screen

use crate::error::Result;
use vitrine_core::{Element, NodeId, Page};

pub const LOADER_SELECTOR: &str = ".loader";
pub const HERO_WORD_SELECTOR: &str = ".hero-title .word";
pub const LOADED: &str = "loaded";
pub const LOADER_TEXT: &str = "Loading Experience...";

/// Hero word `i` starts its entrance at `i * 0.1 + 0.5` seconds
const WORD_DELAY_STEP_S: f32 = 0.1;
const WORD_DELAY_BASE_S: f32 = 0.5;

/// Stages of the loading screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderPhase {
    Showing,
    FadingOut,
    Done,
}

pub struct Loader {
    node: NodeId,
    phase: LoaderPhase,
}

impl Loader {
    /// Use the page's own loader or append one
    pub fn show(page: &mut Page) -> Result<Self> {
        let root = page.root();
        let node = match page.select_first(root, LOADER_SELECTOR)? {
            Some(node) => node,
            None => page.append(
                root,
                Element::new("div").class("loader").children([
                    Element::new("div").class("spinner"),
                    Element::new("div").class("loader-text").text(LOADER_TEXT),
                ]),
            ),
        };
        if let Some(style) = page.style_mut(node) {
            style.opacity = Some(1.0);
        }
        Ok(Self {
            node,
            phase: LoaderPhase::Showing,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn phase(&self) -> LoaderPhase {
        self.phase
    }

    /// Start fading the loader out
    pub fn fade_out(&mut self, page: &mut Page) {
        if self.phase != LoaderPhase::Showing {
            return;
        }
        if let Some(style) = page.style_mut(self.node) {
            style.opacity = Some(0.0);
        }
        self.phase = LoaderPhase::FadingOut;
    }

    /// Drop the loader and mark the page loaded
    pub fn finish(&mut self, page: &mut Page) {
        if self.phase == LoaderPhase::Done {
            return;
        }
        page.remove(self.node);
        page.add_class(page.root(), LOADED);
        self.phase = LoaderPhase::Done;
        tracing::info!("page loaded");
    }
}

/// Stagger the hero headline's words. Returns how many were found.
pub fn stagger_hero_words(page: &mut Page) -> Result<usize> {
    let words = page.select(page.root(), HERO_WORD_SELECTOR)?;
    for (index, word) in words.iter().enumerate() {
        if let Some(style) = page.style_mut(*word) {
            style.animation_delay_s = Some(index as f32 * WORD_DELAY_STEP_S + WORD_DELAY_BASE_S);
        }
    }
    Ok(words.len())
}
