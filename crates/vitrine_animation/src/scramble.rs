//! Text scramble
//!
//! Morphs a node's text into new text. Each character position holds its old
//! character for a random number of frames, flickers through random symbols,
//! then settles on its new character.

use crate::error::{AnimationError, Result};
use crate::scheduler::{Frame, FrameCallback, FrameLoopHandle, FrameScheduler, FrameStatus};
use rustc_hash::FxHashMap;
use std::cell::Cell;
use std::rc::Rc;
use vitrine_core::{NodeId, Page, RandomSource};

/// Characters shown while a position is scrambling
pub const SYMBOLS: &str = "!<>-_\\/[]{}—=+*^?#________";

/// Exclusive upper bound for a slot's start frame and for its scramble length
pub const MAX_DELAY_FRAMES: usize = 40;

/// Chance per frame that a scrambling slot picks a new symbol
pub const SYMBOL_CHANGE_PROBABILITY: f32 = 0.28;

fn random_symbol(rng: &mut RandomSource) -> char {
    let count = SYMBOLS.chars().count();
    SYMBOLS.chars().nth(rng.int_below(count)).unwrap_or('_')
}

/// One character position
#[derive(Clone, Debug, PartialEq)]
pub struct ScrambleSlot {
    pub from: Option<char>,
    pub to: Option<char>,
    pub scramble_start: usize,
    pub reveal_frame: usize,
    pub current: Option<char>,
}

/// Resolves once a scramble has fully revealed its new text
///
/// A run that is cancelled never completes.
#[derive(Clone, Debug, Default)]
pub struct ScrambleCompletion(Rc<Cell<bool>>);

impl ScrambleCompletion {
    pub fn is_complete(&self) -> bool {
        self.0.get()
    }

    fn resolve(&self) {
        self.0.set(true);
    }
}

/// A scramble of one node
pub struct ScrambleTask {
    node: NodeId,
    queue: Vec<ScrambleSlot>,
    frame: usize,
    rng: RandomSource,
    completion: ScrambleCompletion,
}

impl ScrambleTask {
    /// Plan a scramble from `old` to `new` with random timings
    pub fn new(node: NodeId, old: &str, new: &str, mut rng: RandomSource) -> Self {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();
        let len = old.len().max(new.len());
        let queue = (0..len)
            .map(|i| {
                let scramble_start = rng.int_below(MAX_DELAY_FRAMES);
                ScrambleSlot {
                    from: old.get(i).copied(),
                    to: new.get(i).copied(),
                    scramble_start,
                    reveal_frame: scramble_start + rng.int_below(MAX_DELAY_FRAMES),
                    current: None,
                }
            })
            .collect();
        Self::from_slots(node, queue, rng)
    }

    /// Build a task from explicit slots
    pub fn from_slots(node: NodeId, queue: Vec<ScrambleSlot>, rng: RandomSource) -> Self {
        Self {
            node,
            queue,
            frame: 0,
            rng,
            completion: ScrambleCompletion::default(),
        }
    }

    pub fn slots(&self) -> &[ScrambleSlot] {
        &self.queue
    }

    pub fn completion(&self) -> ScrambleCompletion {
        self.completion.clone()
    }

    /// Render the current frame and advance. Returns the text and whether
    /// every slot has been revealed.
    pub fn render(&mut self) -> (String, bool) {
        let mut output = String::with_capacity(self.queue.len());
        let mut revealed = 0;

        for slot in &mut self.queue {
            if self.frame >= slot.reveal_frame {
                revealed += 1;
                output.extend(slot.to);
            } else if self.frame >= slot.scramble_start {
                let symbol = match slot.current {
                    Some(current) if !self.rng.chance(SYMBOL_CHANGE_PROBABILITY) => current,
                    _ => random_symbol(&mut self.rng),
                };
                slot.current = Some(symbol);
                output.push(symbol);
            } else {
                output.extend(slot.from);
            }
        }

        self.frame += 1;
        (output, revealed == self.queue.len())
    }

    /// Render into the page; resolves the completion when done
    fn render_into(&mut self, page: &mut Page) -> Result<FrameStatus> {
        if !page.contains(self.node) {
            return Err(AnimationError::NodeRemoved(self.node));
        }
        let (text, complete) = self.render();
        page.set_text(self.node, text);
        if complete {
            self.completion.resolve();
            Ok(FrameStatus::Done)
        } else {
            Ok(FrameStatus::Continue)
        }
    }
}

impl FrameCallback for ScrambleTask {
    fn on_frame(&mut self, frame: &mut Frame<'_>) -> Result<FrameStatus> {
        self.render_into(frame.page)
    }
}

/// Starts scrambles and keeps at most one per node
pub struct ScrambleEngine {
    rng: RandomSource,
    runs: FxHashMap<NodeId, FrameLoopHandle>,
}

impl ScrambleEngine {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            rng,
            runs: FxHashMap::default(),
        }
    }

    /// Scramble `node`'s text into `new_text`.
    ///
    /// The first frame is rendered before returning; later frames run on
    /// the scheduler. A scramble already running on the node is cancelled.
    pub fn set_text(
        &mut self,
        page: &mut Page,
        scheduler: &mut FrameScheduler,
        node: NodeId,
        new_text: &str,
    ) -> Result<ScrambleCompletion> {
        let old = page.try_node(node)?.text().to_string();

        self.runs.retain(|_, handle| handle.is_running());
        if let Some(previous) = self.runs.remove(&node) {
            previous.cancel();
        }

        let mut task = ScrambleTask::new(node, &old, new_text, self.rng.fork());
        let completion = task.completion();
        if task.render_into(page)? == FrameStatus::Continue {
            let handle = scheduler.request("scramble", task);
            self.runs.insert(node, handle);
        }
        Ok(completion)
    }

    pub fn is_running(&self, node: NodeId) -> bool {
        self.runs.get(&node).is_some_and(FrameLoopHandle::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vitrine_core::Element;

    fn heading(text: &str) -> (Page, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let h2 = page.append(root, Element::new("h2").text(text));
        (page, h2)
    }

    fn run_to_end(page: &mut Page, scheduler: &mut FrameScheduler) {
        let mut now = 0.0;
        for _ in 0..(2 * MAX_DELAY_FRAMES + 2) {
            now += 16.0;
            scheduler.tick(page, now);
        }
    }

    #[test]
    fn settles_on_new_text() {
        let (mut page, h2) = heading("About");
        let mut scheduler = FrameScheduler::new();
        let mut engine = ScrambleEngine::new(RandomSource::from_seed(11));

        let done = engine.set_text(&mut page, &mut scheduler, h2, "Projects").unwrap();
        assert!(!done.is_complete());
        run_to_end(&mut page, &mut scheduler);

        assert!(done.is_complete());
        assert_eq!(page.text(h2), Some("Projects"));
        assert!(!engine.is_running(h2));
    }

    #[test]
    fn slot_phases() {
        let slots = vec![
            ScrambleSlot {
                from: Some('a'),
                to: Some('x'),
                scramble_start: 2,
                reveal_frame: 4,
                current: None,
            },
            ScrambleSlot {
                from: None,
                to: Some('y'),
                scramble_start: 0,
                reveal_frame: 1,
                current: None,
            },
            ScrambleSlot {
                from: Some('c'),
                to: None,
                scramble_start: 0,
                reveal_frame: 0,
                current: None,
            },
        ];
        let mut task = ScrambleTask::from_slots(NodeId::default(), slots, RandomSource::from_seed(3));

        // Frame 0: slot 0 waiting, slot 1 scrambling, slot 2 revealed as empty
        let (text, done) = task.render();
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0], 'a');
        assert!(SYMBOLS.contains(chars[1]));
        assert!(!done);

        // Frame 1: slot 1 revealed
        let (text, _) = task.render();
        assert_eq!(text, "ay");

        // Frames 2 and 3: slot 0 scrambling
        for _ in 0..2 {
            let (text, done) = task.render();
            assert!(SYMBOLS.contains(text.chars().next().unwrap()));
            assert!(text.ends_with('y'));
            assert!(!done);
        }

        assert_eq!(task.render(), ("xy".to_string(), true));
    }

    #[test]
    fn timings_stay_in_bounds() {
        let task = ScrambleTask::new(NodeId::default(), "short", "a longer title", RandomSource::from_seed(5));
        assert_eq!(task.slots().len(), 14);
        for slot in task.slots() {
            assert!(slot.scramble_start < MAX_DELAY_FRAMES);
            assert!(slot.reveal_frame >= slot.scramble_start);
            assert!(slot.reveal_frame < slot.scramble_start + MAX_DELAY_FRAMES);
        }
        assert_eq!(task.slots()[5].from, None);
        assert_eq!(task.slots()[0].from, Some('s'));
    }

    #[test]
    fn retrigger_cancels_previous_completion() {
        let (mut page, h2) = heading("Skills");
        let mut scheduler = FrameScheduler::new();
        let mut engine = ScrambleEngine::new(RandomSource::from_seed(21));

        let first = engine.set_text(&mut page, &mut scheduler, h2, "Projects").unwrap();
        scheduler.tick(&mut page, 16.0);
        let second = engine.set_text(&mut page, &mut scheduler, h2, "Contact").unwrap();
        run_to_end(&mut page, &mut scheduler);

        assert!(!first.is_complete());
        assert!(second.is_complete());
        assert_eq!(page.text(h2), Some("Contact"));
    }

    #[test]
    fn empty_to_empty_completes_synchronously() {
        let (mut page, h2) = heading("");
        let mut scheduler = FrameScheduler::new();
        let mut engine = ScrambleEngine::new(RandomSource::from_seed(0));
        let done = engine.set_text(&mut page, &mut scheduler, h2, "").unwrap();
        assert!(done.is_complete());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn missing_node_is_an_error() {
        let (mut page, h2) = heading("x");
        page.remove(h2);
        let mut scheduler = FrameScheduler::new();
        let mut engine = ScrambleEngine::new(RandomSource::from_seed(0));
        assert!(engine.set_text(&mut page, &mut scheduler, h2, "y").is_err());
    }
}
