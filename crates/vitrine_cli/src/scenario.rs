//! Scripted sessions
//!
//! A scenario is a TOML list of steps:
//!
//! ```toml
//! [[steps]]
//! type = "wait"
//! ms = 1600
//!
//! [[steps]]
//! type = "scroll"
//! y = 800
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vitrine_app::form::SUCCESS_MESSAGE;

/// Steps run in order against one portfolio
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Run frames for `ms` milliseconds
    Wait { ms: u64 },
    Scroll { y: f32 },
    /// Pointer at a client position
    Pointer { x: f32, y: f32 },
    PointerLeave,
    Resize { width: f32, height: f32 },
    Click { selector: String },
    /// `enter`, `space`, `tab` or `escape` on the first match
    Key { selector: String, key: String },
    Focus { selector: String },
    Blur { selector: String },
    /// Set a form control's value
    Fill { selector: String, value: String },
    Submit,
    AssertClass { selector: String, class: String },
    AssertText { selector: String, value: String },
}

impl Scenario {
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// A tour of the sample page: load, count, fill, tilt, navigate and
    /// submit the contact form
    pub fn tour() -> Self {
        let select = |s: &str| s.to_string();
        Self {
            steps: vec![
                Step::Wait { ms: 1600 },
                Step::AssertClass {
                    selector: select(".nav-links a[href=\"#home\"]"),
                    class: select("active"),
                },
                Step::Pointer { x: 240.0, y: 478.0 },
                Step::Scroll { y: 800.0 },
                Step::Wait { ms: 2200 },
                Step::AssertText {
                    selector: select(".stat-number"),
                    value: select("50+"),
                },
                Step::Scroll { y: 1500.0 },
                Step::Wait { ms: 700 },
                Step::AssertClass {
                    selector: select(".skill-card"),
                    class: select("in-view"),
                },
                Step::Pointer { x: 300.0, y: 250.0 },
                Step::Key {
                    selector: select(".nav-links a[href=\"#contact\"]"),
                    key: select("enter"),
                },
                Step::Wait { ms: 100 },
                Step::Fill {
                    selector: select("[name=\"name\"]"),
                    value: select("Ada"),
                },
                Step::Fill {
                    selector: select("[name=\"email\"]"),
                    value: select("ada@example.com"),
                },
                Step::Fill {
                    selector: select("[name=\"message\"]"),
                    value: select("Loved the particle field!"),
                },
                Step::Click {
                    selector: select(".contact-form .btn-primary"),
                },
                Step::Wait { ms: 2100 },
                Step::AssertText {
                    selector: select(".form-message.success"),
                    value: select(SUCCESS_MESSAGE),
                },
                Step::PointerLeave,
                Step::Wait { ms: 4200 },
            ],
        }
    }
}
