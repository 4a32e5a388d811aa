//! The portfolio composition root
//!
//! [`Portfolio`] owns the page, every engine, the timer queue and the frame
//! scheduler. The host drives it with [`Portfolio::frame`] once per display
//! frame and forwards input in between. Timestamps are milliseconds since
//! the portfolio was created; input is stamped with the latest frame time.
//!
//! # Example
//!
//! ```rust
//! use vitrine_app::{Portfolio, PortfolioConfig};
//! use vitrine_core::{Element, Page};
//!
//! let mut page = Page::new();
//! let root = page.root();
//! page.append(root, Element::new("section").class("animated-section").rect(0.0, 0.0, 800.0, 400.0));
//!
//! let mut portfolio = Portfolio::new(page, PortfolioConfig::default()).unwrap();
//! portfolio.frame(0.0);
//! portfolio.frame(1500.0);
//! assert!(portfolio.is_started());
//! ```

use crate::config::PortfolioConfig;
use crate::error::Result;
use crate::form::{ContactForm, FormTimer, SubmitOutcome};
use crate::keyboard::KeyboardShim;
use crate::pointer::{PointerEffects, PointerOutcome};
use crate::reveal::{self, RevealTriggers, Trigger, CARD_SELECTOR, REVEAL_SELECTOR};
use crate::scroll::{ScrollEffects, ANCHOR_SELECTOR};
use crate::startup::{self, Loader, LoaderPhase};
use vitrine_animation::{progress, CounterAnimator, FrameScheduler, ParticleConfig, ParticleSimulation, ParticleSystem, ScrambleEngine};
use vitrine_core::{
    Debouncer, InputEvent, KeyCode, Length, NodeId, Page, Point, RandomSource, SelectorList, TimerQueue, Viewport,
};

/// Viewport assumed until the host reports a size
pub const DEFAULT_VIEWPORT: (f32, f32) = (1280.0, 800.0);

pub const STAT_NUMBER_SELECTOR: &str = ".stat-number";
pub const PROGRESS_BAR_SELECTOR: &str = ".progress-bar";

/// Deferred work owned by the composition root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    /// Loading delay elapsed; start every engine
    Startup,
    /// Loader fade finished
    RemoveLoader,
    /// Extend a section header underline
    HeaderLine(NodeId),
    /// Reveal one card of a staggered grid
    RevealCard(NodeId),
    /// Fill a skill bar to its `data-width`
    FillProgress(NodeId),
    Form(FormTimer),
}

impl From<FormTimer> for TimerAction {
    fn from(timer: FormTimer) -> Self {
        TimerAction::Form(timer)
    }
}

/// What one call to [`Portfolio::frame`] did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Visibility transitions dispatched this frame
    pub triggers: Vec<Trigger>,
    /// Timers that came due
    pub timers: usize,
    /// Frame loops still registered after the tick
    pub active_loops: usize,
}

pub struct Portfolio {
    page: Page,
    viewport: Viewport,
    config: PortfolioConfig,
    scheduler: FrameScheduler,
    timers: TimerQueue<TimerAction>,
    rng: RandomSource,
    now_ms: f64,

    loader: Loader,
    started: bool,
    triggers: Option<RevealTriggers>,
    counters: CounterAnimator,
    scramble: ScrambleEngine,
    particles: Option<ParticleSystem>,
    pointer: Option<PointerEffects>,
    scroll: Option<ScrollEffects>,
    form: Option<ContactForm>,
    keyboard: Option<KeyboardShim>,
    anchors: SelectorList,
    resize: Debouncer<()>,
}

impl Portfolio {
    /// Show the loading screen and arm the startup timer
    pub fn new(mut page: Page, config: PortfolioConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => RandomSource::from_seed(seed),
            None => RandomSource::from_entropy(),
        };
        let loader = Loader::show(&mut page)?;
        let mut timers = TimerQueue::new();
        timers.schedule(config.startup_delay_ms, TimerAction::Startup);

        tracing::info!(
            "portfolio created with {} nodes, engines start in {}ms",
            page.len(),
            config.startup_delay_ms
        );
        Ok(Self {
            page,
            viewport: Viewport::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1),
            scheduler: FrameScheduler::new(),
            timers,
            scramble: ScrambleEngine::new(rng.fork()),
            rng,
            now_ms: 0.0,
            loader,
            started: false,
            triggers: None,
            counters: CounterAnimator::new(),
            particles: None,
            pointer: None,
            scroll: None,
            form: None,
            keyboard: None,
            anchors: SelectorList::parse(ANCHOR_SELECTOR)?,
            resize: Debouncer::new(config.resize_debounce_ms),
            config,
        })
    }

    /// Use a host-provided viewport size from the start
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport.width = width;
        self.viewport.height = height;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable page access for hosts that edit the document between frames
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn scramble(&self) -> &ScrambleEngine {
        &self.scramble
    }

    pub fn particles(&self) -> Option<&ParticleSystem> {
        self.particles.as_ref()
    }

    pub fn pointer(&self) -> Option<&PointerEffects> {
        self.pointer.as_ref()
    }

    pub fn scroll(&self) -> Option<&ScrollEffects> {
        self.scroll.as_ref()
    }

    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    pub fn loader_phase(&self) -> LoaderPhase {
        self.loader.phase()
    }

    /// Whether the engines have been initialised
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Timers still waiting
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advance to `now_ms`: run due timers, apply scroll, evaluate visibility
    /// and tick every frame loop
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        self.now_ms = now_ms;
        let mut report = FrameReport::default();

        let due = self.timers.drain_due(now_ms);
        report.timers = due.len();
        for action in due {
            self.run_timer(action);
        }

        if self.resize.poll(now_ms).is_some() {
            self.resize_settled();
        }

        if let Some(scroll) = self.scroll.as_mut() {
            scroll.flush(&mut self.page, &self.viewport);
        }

        let fired = match self.triggers.as_mut() {
            Some(triggers) => triggers.evaluate(&self.page, &self.viewport),
            None => Vec::new(),
        };
        for trigger in &fired {
            if let Err(err) = self.dispatch(*trigger) {
                tracing::warn!("{:?} skipped: {}", trigger, err);
            }
        }
        report.triggers = fired;

        report.active_loops = self.scheduler.tick(&mut self.page, now_ms);
        report
    }

    /// Stop every loop and drop pending timers
    pub fn shutdown(&mut self) {
        if let Some(particles) = &self.particles {
            particles.stop();
        }
        self.scheduler.cancel_all();
        self.timers.clear();
        self.resize.cancel();
        tracing::debug!("portfolio shut down at {}ms", self.now_ms);
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Forward any host event
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { position } => {
                self.pointer_move(position);
            }
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Click { target } => {
                self.click(target);
            }
            InputEvent::KeyDown { target, key } => {
                self.key_down(target, key);
            }
            InputEvent::Focus { target } => self.focus(target),
            InputEvent::Blur { target } => self.blur(target),
            InputEvent::Scroll { y } => self.scroll_to(y),
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Scroll the document; effects apply on the next frame
    pub fn scroll_to(&mut self, y: f32) {
        let y = y.clamp(0.0, self.viewport.max_scroll(self.page.document_height()));
        self.viewport.scroll_y = y;
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.on_scroll(y);
        }
    }

    pub fn pointer_move(&mut self, client: Point) -> PointerOutcome {
        let Some(pointer) = self.pointer.as_mut() else {
            return PointerOutcome::default();
        };
        let outcome = pointer.pointer_move(&mut self.page, &self.viewport, client);

        for heading in &outcome.entered_headings {
            let Some(text) = pointer.glitch_text(*heading) else {
                continue;
            };
            if let Err(err) = self.scramble.set_text(&mut self.page, &mut self.scheduler, *heading, text) {
                tracing::warn!("glitch on {:?} failed: {}", heading, err);
            }
        }
        outcome
    }

    pub fn pointer_leave(&mut self) {
        if let Some(pointer) = self.pointer.as_mut() {
            pointer.pointer_leave(&mut self.page);
        }
    }

    /// Activate `target` like a primary click. Returns whether anything
    /// handled it.
    pub fn click(&mut self, target: NodeId) -> bool {
        if !self.started || !self.page.contains(target) {
            return false;
        }

        if let Some(link) = self.page.closest(target, &self.anchors) {
            let destination = self
                .scroll
                .as_ref()
                .and_then(|scroll| scroll.anchor_target(&self.page, link));
            if let Some(y) = destination {
                tracing::debug!("anchor {:?} scrolls to {}", link, y);
                self.scroll_to(y);
                return true;
            }
        }

        let is_submit = self
            .form
            .as_ref()
            .and_then(ContactForm::submit_button)
            .is_some_and(|button| button == target || self.is_inside(target, button));
        if is_submit {
            self.submit_form();
            return true;
        }
        false
    }

    /// Enter or Space on a focusable widget clicks it
    pub fn key_down(&mut self, target: NodeId, key: KeyCode) -> bool {
        let activated = self
            .keyboard
            .as_ref()
            .and_then(|keyboard| keyboard.activation_target(&self.page, target, key));
        match activated {
            Some(node) => self.click(node),
            None => false,
        }
    }

    pub fn focus(&mut self, target: NodeId) {
        if let Some(form) = &self.form {
            form.focus(&mut self.page, target);
        }
    }

    pub fn blur(&mut self, target: NodeId) {
        if let Some(form) = &self.form {
            form.blur(&mut self.page, target);
        }
    }

    /// Submit the contact form. `None` when the page has no form or the
    /// engines are not running yet.
    pub fn submit_form(&mut self) -> Option<SubmitOutcome> {
        let form = self.form.as_mut()?;
        Some(form.submit(&mut self.page, &mut self.timers, self.now_ms))
    }

    /// The viewport changed size. Canvas and tilt resets wait for the
    /// resize to settle.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
        let y = self.viewport.scroll_y;
        self.scroll_to(y);
        self.resize.call(self.now_ms, ());
        if let Some(particles) = &self.particles {
            particles.notify_resize(self.now_ms);
        }
    }

    fn resize_settled(&mut self) {
        tracing::debug!("resize settled at {}x{}", self.viewport.width, self.viewport.height);
        if let Some(pointer) = &self.pointer {
            pointer.reset_tilts(&mut self.page);
        }
    }

    fn is_inside(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.page.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.page.parent(id);
        }
        false
    }

    // =========================================================================
    // Timers and triggers
    // =========================================================================

    /// Run now when motion is reduced or there is no delay, else schedule
    fn defer(&mut self, delay_ms: f64, action: TimerAction) {
        if self.config.reduced_motion || delay_ms <= 0.0 {
            self.run_timer(action);
        } else {
            self.timers.schedule(self.now_ms + delay_ms, action);
        }
    }

    fn run_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::Startup => {
                if let Err(err) = self.start_engines() {
                    tracing::error!("engine startup incomplete: {}", err);
                }
            }
            TimerAction::RemoveLoader => self.loader.finish(&mut self.page),
            TimerAction::HeaderLine(line) => {
                let width = self.config.reveal.header_line_width_px;
                if let Some(style) = self.page.style_mut(line) {
                    style.width = Some(Length::Px(width));
                }
            }
            TimerAction::RevealCard(card) => {
                reveal::reveal(&mut self.page, card);
            }
            TimerAction::FillProgress(bar) => {
                if let Err(err) = progress::fill_to_target(&mut self.page, bar) {
                    tracing::warn!("progress bar {:?} not filled: {}", bar, err);
                }
            }
            TimerAction::Form(timer) => {
                if let Some(form) = self.form.as_mut() {
                    form.on_timer(&mut self.page, &mut self.timers, self.now_ms, timer);
                }
            }
        }
    }

    fn start_engines(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let reduced = self.config.reduced_motion;

        self.loader.fade_out(&mut self.page);
        self.timers
            .schedule(self.now_ms + self.config.loader_fade_ms, TimerAction::RemoveLoader);
        startup::stagger_hero_words(&mut self.page)?;

        self.keyboard = Some(KeyboardShim::attach(&mut self.page)?);
        self.form = ContactForm::attach(&self.page, &self.config.form)?;

        let mut scroll = ScrollEffects::attach(&mut self.page, &self.config.scroll)?;
        scroll.on_scroll(self.viewport.scroll_y);
        self.scroll = Some(scroll);

        if reduced {
            self.reveal_all()?;
        } else {
            self.pointer = Some(PointerEffects::attach(&mut self.page, &self.config.pointer)?);
            self.start_particles()?;
        }

        self.triggers = Some(RevealTriggers::attach(&self.page, &self.config)?);
        tracing::info!(
            "engines started at {}ms{}",
            self.now_ms,
            if reduced { " with reduced motion" } else { "" }
        );
        Ok(())
    }

    fn start_particles(&mut self) -> Result<()> {
        let settings = &self.config.particles;
        if !settings.enabled {
            return Ok(());
        }
        let Some(container) = self.page.select_first(self.page.root(), &settings.container)? else {
            tracing::debug!("no `{}` on the page, particles disabled", settings.container);
            return Ok(());
        };
        let config = ParticleConfig {
            count: settings.count,
            link_distance: settings.link_distance,
            color: settings.color()?,
            ..ParticleConfig::default()
        };
        let simulation = ParticleSimulation::new(&self.page, container, config, self.rng.fork())?;
        self.particles = Some(simulation.start(&mut self.scheduler));
        Ok(())
    }

    /// Final states for everything the reveal observers would animate in
    fn reveal_all(&mut self) -> Result<()> {
        let root = self.page.root();
        let mut targets = self.page.select(root, REVEAL_SELECTOR)?;
        targets.extend(self.page.select(root, CARD_SELECTOR)?);
        for node in targets {
            reveal::reveal(&mut self.page, node);
            if let Some(line) = reveal::header_line(&self.page, node) {
                self.run_timer(TimerAction::HeaderLine(line));
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, trigger: Trigger) -> Result<()> {
        match trigger {
            Trigger::Reveal(node) => {
                reveal::reveal(&mut self.page, node);
                if let Some(line) = reveal::header_line(&self.page, node) {
                    self.defer(self.config.reveal.header_line_delay_ms, TimerAction::HeaderLine(line));
                }
            }
            Trigger::Stagger(grid) => {
                let stagger = self.config.reveal.stagger_ms;
                for (index, card) in reveal::stagger_cards(&self.page, grid)?.into_iter().enumerate() {
                    self.defer(index as f64 * stagger, TimerAction::RevealCard(card));
                }
            }
            Trigger::Counter(item) => {
                let Some(number) = self.page.select_first(item, STAT_NUMBER_SELECTOR)? else {
                    tracing::warn!("stat item {:?} has no `{}`", item, STAT_NUMBER_SELECTOR);
                    return Ok(());
                };
                let target: i64 = self.page.parse_attribute(item, "data-count")?;
                if self.config.reduced_motion {
                    self.counters.jump_to(&mut self.page, number, target);
                } else {
                    self.counters.animate(
                        &mut self.scheduler,
                        number,
                        0,
                        target,
                        self.config.counters.duration_ms,
                        self.now_ms,
                    );
                }
            }
            Trigger::Progress(card) => {
                if let Some(bar) = self.page.select_first(card, PROGRESS_BAR_SELECTOR)? {
                    self.defer(self.config.progress.fill_delay_ms, TimerAction::FillProgress(bar));
                }
            }
            Trigger::Section(section) => {
                reveal::activate_nav_link(&mut self.page, section)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::IN_VIEW;
    use vitrine_core::Element;

    fn config() -> PortfolioConfig {
        PortfolioConfig {
            seed: Some(7),
            ..PortfolioConfig::default()
        }
    }

    fn started(page: Page, config: PortfolioConfig) -> Portfolio {
        let mut portfolio = Portfolio::new(page, config).unwrap();
        portfolio.frame(0.0);
        portfolio.frame(1500.0);
        assert!(portfolio.is_started());
        portfolio
    }

    #[test]
    fn engines_wait_for_the_loader() {
        let mut portfolio = Portfolio::new(Page::new(), config()).unwrap();
        assert_eq!(portfolio.loader_phase(), LoaderPhase::Showing);
        portfolio.frame(1000.0);
        assert!(!portfolio.is_started());

        portfolio.frame(1500.0);
        assert!(portfolio.is_started());
        assert_eq!(portfolio.loader_phase(), LoaderPhase::FadingOut);
        assert!(!portfolio.page().has_class(portfolio.page().root(), "loaded"));

        portfolio.frame(2000.0);
        assert_eq!(portfolio.loader_phase(), LoaderPhase::Done);
        assert!(portfolio.page().has_class(portfolio.page().root(), "loaded"));
    }

    #[test]
    fn counter_reads_data_count() {
        let mut page = Page::new();
        let root = page.root();
        let item = page.append(
            root,
            Element::new("div")
                .class("stat-item")
                .attr("data-count", "42")
                .rect(0.0, 100.0, 200.0, 100.0)
                .child(Element::new("span").class("stat-number").text("0")),
        );
        let number = page.select_first(item, ".stat-number").unwrap().unwrap();

        let mut portfolio = started(page, config());
        assert!(portfolio.counters().is_running(number));
        portfolio.frame(1600.0);
        portfolio.frame(3600.0);
        assert_eq!(portfolio.page().text(number), Some("42+"));
    }

    #[test]
    fn bad_data_count_is_skipped() {
        let mut page = Page::new();
        let root = page.root();
        let item = page.append(
            root,
            Element::new("div")
                .class("stat-item")
                .attr("data-count", "lots")
                .rect(0.0, 100.0, 200.0, 100.0)
                .child(Element::new("span").class("stat-number").text("0")),
        );
        let number = page.select_first(item, ".stat-number").unwrap().unwrap();
        let mut portfolio = started(page, config());
        portfolio.frame(5000.0);
        assert_eq!(portfolio.page().text(number), Some("0"));
    }

    #[test]
    fn header_line_extends_after_delay() {
        let mut page = Page::new();
        let root = page.root();
        let header = page.append(
            root,
            Element::new("div")
                .class("section-header")
                .rect(0.0, 0.0, 800.0, 100.0)
                .child(Element::new("h2").text("About"))
                .child(Element::new("div").class("header-line")),
        );
        let line = page.select_first(header, ".header-line").unwrap().unwrap();

        let mut portfolio = started(page, config());
        assert!(portfolio.page().has_class(header, IN_VIEW));
        assert_eq!(portfolio.page().style(line).unwrap().width, None);
        portfolio.frame(1800.0);
        assert_eq!(portfolio.page().style(line).unwrap().width, Some(Length::Px(60.0)));
    }

    #[test]
    fn clicks_before_startup_are_ignored() {
        let mut page = Page::new();
        let root = page.root();
        let link = page.append(root, Element::new("a").attr("href", "#contact"));
        page.append(root, Element::new("section").id("contact").rect(0.0, 3000.0, 800.0, 600.0));
        let mut portfolio = Portfolio::new(page, config()).unwrap();
        assert!(!portfolio.click(link));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = config();
        bad.reveal.threshold = 3.0;
        assert!(Portfolio::new(Page::new(), bad).is_err());
    }
}
