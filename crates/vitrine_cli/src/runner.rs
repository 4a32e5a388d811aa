//! Scenario runner

use crate::scenario::{Scenario, Step};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use vitrine_app::{Portfolio, Trigger};
use vitrine_core::{KeyCode, NodeId, Point};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Passed,
    Failed,
}

/// Visibility triggers dispatched during the session, by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriggerCounts {
    pub reveal: usize,
    pub stagger: usize,
    pub counter: usize,
    pub progress: usize,
    pub section: usize,
}

impl TriggerCounts {
    fn record(&mut self, trigger: &Trigger) {
        match trigger {
            Trigger::Reveal(_) => self.reveal += 1,
            Trigger::Stagger(_) => self.stagger += 1,
            Trigger::Counter(_) => self.counter += 1,
            Trigger::Progress(_) => self.progress += 1,
            Trigger::Section(_) => self.section += 1,
        }
    }
}

/// Outcome of a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub frames: u64,
    pub elapsed_ms: f64,
    pub scroll_y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_section: Option<String>,
    /// Particles alive at the end
    pub particles: usize,
    /// Frame loops still registered at the end
    pub active_loops: usize,
    pub triggers: TriggerCounts,
}

impl SessionReport {
    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }
}

/// Drives a portfolio through a scenario at a fixed frame interval
pub struct Runner {
    portfolio: Portfolio,
    frame_ms: f64,
    report: SessionReport,
}

impl Runner {
    pub fn new(portfolio: Portfolio, frame_ms: f64) -> Self {
        Self {
            portfolio,
            frame_ms: frame_ms.max(1.0),
            report: SessionReport::default(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Run every step; the first failing step ends the session
    pub fn run(mut self, scenario: &Scenario) -> SessionReport {
        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::debug!("step {}: {:?}", index, step);
            if let Err(err) = self.step(step) {
                tracing::error!("step {} failed: {:#}", index, err);
                self.report.status = ReportStatus::Failed;
                self.report.failed_step = Some(index);
                self.report.message = Some(format!("{:#}", err));
                break;
            }
        }
        self.finish()
    }

    /// Run frames for `ms` of session time
    pub fn advance(&mut self, ms: f64) {
        let end = self.portfolio.now_ms() + ms;
        let mut now = self.portfolio.now_ms();
        while now < end {
            now = (now + self.frame_ms).min(end);
            let frame = self.portfolio.frame(now);
            for trigger in &frame.triggers {
                self.report.triggers.record(trigger);
            }
            self.report.active_loops = frame.active_loops;
            self.report.frames += 1;
        }
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Wait { ms } => self.advance(*ms as f64),
            Step::Scroll { y } => self.portfolio.scroll_to(*y),
            Step::Pointer { x, y } => {
                let outcome = self.portfolio.pointer_move(Point::new(*x, *y));
                for heading in outcome.entered_headings {
                    tracing::info!("glitching heading {:?}", heading);
                }
            }
            Step::PointerLeave => self.portfolio.pointer_leave(),
            Step::Resize { width, height } => self.portfolio.resize(*width, *height),
            Step::Click { selector } => {
                let node = self.node(selector)?;
                if !self.portfolio.click(node) {
                    tracing::info!("click on `{}` had no effect", selector);
                }
            }
            Step::Key { selector, key } => {
                let node = self.node(selector)?;
                let key = parse_key(key)?;
                self.portfolio.key_down(node, key);
            }
            Step::Focus { selector } => {
                let node = self.node(selector)?;
                self.portfolio.focus(node);
            }
            Step::Blur { selector } => {
                let node = self.node(selector)?;
                self.portfolio.blur(node);
            }
            Step::Fill { selector, value } => {
                let node = self.node(selector)?;
                self.portfolio.page_mut().set_attribute(node, "value", value.as_str());
            }
            Step::Submit => match self.portfolio.submit_form() {
                Some(outcome) => tracing::info!("form submitted: {:?}", outcome),
                None => bail!("no contact form is active"),
            },
            Step::AssertClass { selector, class } => {
                let node = self.node(selector)?;
                if !self.portfolio.page().has_class(node, class) {
                    bail!("`{}` does not have class `{}`", selector, class);
                }
            }
            Step::AssertText { selector, value } => {
                let node = self.node(selector)?;
                let text = self.portfolio.page().text(node).unwrap_or_default();
                if text != value {
                    bail!("`{}` has text {:?}, expected {:?}", selector, text, value);
                }
            }
        }
        Ok(())
    }

    /// First node matching `selector`
    fn node(&self, selector: &str) -> Result<NodeId> {
        let page = self.portfolio.page();
        page.select_first(page.root(), selector)
            .with_context(|| format!("bad selector `{}`", selector))?
            .with_context(|| format!("nothing matches `{}`", selector))
    }

    fn finish(mut self) -> SessionReport {
        let page = self.portfolio.page();
        self.report.elapsed_ms = self.portfolio.now_ms();
        self.report.scroll_y = self.portfolio.viewport().scroll_y;
        self.report.active_section = page
            .select_first(page.root(), ".nav-links a.active")
            .ok()
            .flatten()
            .and_then(|link| page.attribute(link, "href"))
            .map(str::to_string);
        self.report.particles = self
            .portfolio
            .particles()
            .map_or(0, |system| system.simulation().particles().len());
        self.portfolio.shutdown();
        self.report
    }
}

pub fn parse_key(name: &str) -> Result<KeyCode> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::ENTER,
        "space" | " " => KeyCode::SPACE,
        "tab" => KeyCode::TAB,
        "escape" | "esc" => KeyCode::ESCAPE,
        other => bail!("unknown key `{}`", other),
    })
}
