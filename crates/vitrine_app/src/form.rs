//! Contact form
//!
//! Client-side validation plus a simulated send: the submit button shows
//! progress, and a floating banner reports the outcome and dismisses itself.

use crate::config::FormConfig;
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use vitrine_core::{Element, NodeId, Page, TimerQueue};

pub const FORM_SELECTOR: &str = ".contact-form";
pub const SUBMIT_SELECTOR: &str = ".btn-primary";
pub const INPUT_SELECTOR: &str = "input, textarea";

pub const NAME_ERROR: &str = "Please enter a valid name";
pub const EMAIL_ERROR: &str = "Please enter a valid email address";
pub const MESSAGE_ERROR: &str = "Please enter a message with at least 10 characters";
pub const SUCCESS_MESSAGE: &str = "Thank you! I'll get back to you soon.";
pub const SENDING_LABEL: &str = "Sending...";
pub const SEND_LABEL: &str = "Send Message";

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;
const SENDING_SCALE: f32 = 0.95;
/// Banners start off-screen to the right
const BANNER_OFFSET_X: f32 = 400.0;
const FOCUS_LIFT_PX: f32 = -2.0;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern"))
}

/// Every rule a submission broke, in rule order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .0.join(". "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Check a submission. Rules run in order: name, email, message.
pub fn validate(name: &str, email: &str, message: &str) -> std::result::Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if name.chars().count() < MIN_NAME_CHARS {
        errors.push(NAME_ERROR.to_string());
    }
    if !email_pattern().is_match(email) {
        errors.push(EMAIL_ERROR.to_string());
    }
    if message.chars().count() < MIN_MESSAGE_CHARS {
        errors.push(MESSAGE_ERROR.to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Deferred form work
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormTimer {
    /// The simulated send finished
    FinishSending,
    /// Slide a banner into view
    SlideIn(NodeId),
    /// Remove a banner
    Dismiss(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    fn class(self) -> &'static str {
        match self {
            BannerKind::Success => "success",
            BannerKind::Error => "error",
        }
    }
}

/// Result of a submit attempt
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Rejected(ValidationErrors),
    Sending,
    /// A send is already in progress
    Busy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Sending,
}

pub struct ContactForm {
    config: FormConfig,
    form: NodeId,
    inputs: Vec<NodeId>,
    submit: Option<NodeId>,
    state: FormState,
}

impl ContactForm {
    /// Bind to the page's contact form, if it has one
    pub fn attach(page: &Page, config: &FormConfig) -> Result<Option<Self>> {
        let Some(form) = page.select_first(page.root(), FORM_SELECTOR)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            config: config.clone(),
            form,
            inputs: page.select(form, INPUT_SELECTOR)?,
            submit: page.select_first(form, SUBMIT_SELECTOR)?,
            state: FormState::Idle,
        }))
    }

    pub fn node(&self) -> NodeId {
        self.form
    }

    pub fn submit_button(&self) -> Option<NodeId> {
        self.submit
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Current value of the named field, empty when absent
    pub fn field(&self, page: &Page, name: &str) -> String {
        self.inputs
            .iter()
            .find(|input| page.attribute(**input, "name") == Some(name))
            .and_then(|input| page.attribute(*input, "value"))
            .unwrap_or_default()
            .to_string()
    }

    /// Validate and start the simulated send
    pub fn submit<T: From<FormTimer>>(
        &mut self,
        page: &mut Page,
        timers: &mut TimerQueue<T>,
        now_ms: f64,
    ) -> SubmitOutcome {
        if self.state == FormState::Sending {
            tracing::debug!("submit ignored while sending");
            return SubmitOutcome::Busy;
        }

        let name = self.field(page, "name");
        let email = self.field(page, "email");
        let message = self.field(page, "message");
        if let Err(errors) = validate(&name, &email, &message) {
            tracing::info!("contact form rejected: {}", errors);
            self.show_banner(page, timers, now_ms, &errors.to_string(), BannerKind::Error);
            return SubmitOutcome::Rejected(errors);
        }

        if let Some(button) = self.submit {
            page.set_text(button, SENDING_LABEL);
            if let Some(style) = page.style_mut(button) {
                style.transform.scale = Some(SENDING_SCALE);
            }
        }
        self.state = FormState::Sending;
        timers.schedule(now_ms + self.config.send_delay_ms, FormTimer::FinishSending.into());
        SubmitOutcome::Sending
    }

    /// Run a deferred form step
    pub fn on_timer<T: From<FormTimer>>(
        &mut self,
        page: &mut Page,
        timers: &mut TimerQueue<T>,
        now_ms: f64,
        timer: FormTimer,
    ) {
        match timer {
            FormTimer::FinishSending => self.finish_sending(page, timers, now_ms),
            FormTimer::SlideIn(banner) => {
                if let Some(style) = page.style_mut(banner) {
                    style.transform.slide_x = 0.0;
                }
            }
            FormTimer::Dismiss(banner) => {
                page.remove(banner);
            }
        }
    }

    fn finish_sending<T: From<FormTimer>>(&mut self, page: &mut Page, timers: &mut TimerQueue<T>, now_ms: f64) {
        self.show_banner(page, timers, now_ms, SUCCESS_MESSAGE, BannerKind::Success);
        for input in &self.inputs {
            page.set_attribute(*input, "value", "");
        }
        if let Some(button) = self.submit {
            page.set_text(button, SEND_LABEL);
            if let Some(style) = page.style_mut(button) {
                style.transform.scale = Some(1.0);
            }
        }
        self.state = FormState::Idle;
        tracing::info!("contact form sent");
    }

    /// Append a floating banner; it slides in shortly and later removes itself
    pub fn show_banner<T: From<FormTimer>>(
        &self,
        page: &mut Page,
        timers: &mut TimerQueue<T>,
        now_ms: f64,
        text: &str,
        kind: BannerKind,
    ) -> NodeId {
        let root = page.root();
        let banner = page.append(
            root,
            Element::new("div").class("form-message").class(kind.class()).text(text),
        );
        if let Some(style) = page.style_mut(banner) {
            style.transform.slide_x = BANNER_OFFSET_X;
        }
        timers.schedule(now_ms + self.config.banner_slide_delay_ms, FormTimer::SlideIn(banner).into());
        timers.schedule(now_ms + self.config.banner_dismiss_ms, FormTimer::Dismiss(banner).into());
        banner
    }

    /// Lift the field's container while it has focus
    pub fn focus(&self, page: &mut Page, input: NodeId) -> bool {
        self.set_lift(page, input, FOCUS_LIFT_PX)
    }

    pub fn blur(&self, page: &mut Page, input: NodeId) -> bool {
        self.set_lift(page, input, 0.0)
    }

    fn set_lift(&self, page: &mut Page, input: NodeId, lift: f32) -> bool {
        if !self.inputs.contains(&input) {
            return false;
        }
        let Some(parent) = page.parent(input) else {
            return false;
        };
        match page.style_mut(parent) {
            Some(style) => {
                style.transform.lift_y = lift;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form_page() -> Page {
        let mut page = Page::new();
        let root = page.root();
        page.append(
            root,
            Element::new("form").class("contact-form").children([
                Element::new("div")
                    .class("form-group")
                    .child(Element::new("input").attr("name", "name")),
                Element::new("div")
                    .class("form-group")
                    .child(Element::new("input").attr("name", "email")),
                Element::new("div")
                    .class("form-group")
                    .child(Element::new("textarea").attr("name", "message")),
                Element::new("button").classes("btn btn-primary").text(SEND_LABEL),
            ]),
        );
        page
    }

    fn fill(page: &mut Page, form: &ContactForm, name: &str, email: &str, message: &str) {
        for (field, value) in [("name", name), ("email", email), ("message", message)] {
            let input = form
                .inputs
                .iter()
                .copied()
                .find(|i| page.attribute(*i, "name") == Some(field))
                .unwrap();
            page.set_attribute(input, "value", value);
        }
    }

    #[test]
    fn validation_reports_all_rules_in_order() {
        let errors = validate("A", "bad-email", "short").unwrap_err();
        assert_eq!(errors.messages(), &[NAME_ERROR, EMAIL_ERROR, MESSAGE_ERROR]);
        assert_eq!(
            errors.to_string(),
            "Please enter a valid name. Please enter a valid email address. \
             Please enter a message with at least 10 characters"
        );
        assert_eq!(validate("Al", "a@b.com", "a valid message body"), Ok(()));
    }

    #[test]
    fn email_rule_edges() {
        assert!(validate("Al", "a@b", "a valid message body").is_err());
        assert!(validate("Al", "a b@c.d", "a valid message body").is_err());
        assert!(validate("Al", "a@@b.c", "a valid message body").is_err());
        assert!(validate("Al", "first.last@mail.example.org", "a valid message body").is_ok());
    }

    #[test]
    fn rejected_submit_shows_error_banner() {
        let mut page = form_page();
        let mut form = ContactForm::attach(&page, &FormConfig::default()).unwrap().unwrap();
        let mut timers: TimerQueue<FormTimer> = TimerQueue::new();
        fill(&mut page, &form, "A", "nope", "hi");

        let outcome = form.submit(&mut page, &mut timers, 0.0);
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        let banner = page.select_first(page.root(), ".form-message.error").unwrap().unwrap();
        assert!(page.text(banner).unwrap().starts_with(NAME_ERROR));
        assert_eq!(page.style(banner).unwrap().transform.slide_x, 400.0);

        for timer in timers.drain_due(100.0) {
            form.on_timer(&mut page, &mut timers, 100.0, timer);
        }
        assert_eq!(page.style(banner).unwrap().transform.slide_x, 0.0);
        for timer in timers.drain_due(4000.0) {
            form.on_timer(&mut page, &mut timers, 4000.0, timer);
        }
        assert!(!page.contains(banner));
    }

    #[test]
    fn successful_submit_round_trip() {
        let mut page = form_page();
        let mut form = ContactForm::attach(&page, &FormConfig::default()).unwrap().unwrap();
        let button = form.submit_button().unwrap();
        let mut timers: TimerQueue<FormTimer> = TimerQueue::new();
        fill(&mut page, &form, "Ada", "ada@example.com", "Hello there, nice portfolio!");

        assert_eq!(form.submit(&mut page, &mut timers, 0.0), SubmitOutcome::Sending);
        assert_eq!(page.text(button), Some(SENDING_LABEL));
        assert_eq!(page.style(button).unwrap().transform.scale, Some(0.95));
        assert_eq!(form.submit(&mut page, &mut timers, 10.0), SubmitOutcome::Busy);

        for timer in timers.drain_due(2000.0) {
            form.on_timer(&mut page, &mut timers, 2000.0, timer);
        }
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(page.text(button), Some(SEND_LABEL));
        assert_eq!(page.style(button).unwrap().transform.scale, Some(1.0));
        assert_eq!(form.field(&page, "email"), "");
        let banner = page.select_first(page.root(), ".form-message.success").unwrap().unwrap();
        assert_eq!(page.text(banner), Some(SUCCESS_MESSAGE));
        assert_eq!(timers.next_due(), Some(2100.0));
    }

    #[test]
    fn focus_lifts_parent() {
        let mut page = form_page();
        let form = ContactForm::attach(&page, &FormConfig::default()).unwrap().unwrap();
        let input = form.inputs[0];
        let group = page.parent(input).unwrap();
        assert!(form.focus(&mut page, input));
        assert_eq!(page.style(group).unwrap().transform.lift_y, -2.0);
        assert!(form.blur(&mut page, input));
        assert_eq!(page.style(group).unwrap().transform.lift_y, 0.0);
        assert!(!form.focus(&mut page, group));
    }

    #[test]
    fn page_without_form() {
        assert!(ContactForm::attach(&Page::new(), &FormConfig::default()).unwrap().is_none());
    }
}
