//! Portfolio configuration (`vitrine.toml`)
//!
//! Every field has a default, so an empty file (or no file) yields the stock
//! behaviour and a partial file only overrides what it names.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vitrine_core::RootMargin;
use vitrine_paint::Color;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PortfolioConfig {
    /// Render final states instead of animating
    #[serde(default)]
    pub reduced_motion: bool,
    /// Seed for particle placement and scramble symbols; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Loading screen duration before effects start
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: f64,
    /// Loader fade-out before it is removed
    #[serde(default = "default_loader_fade")]
    pub loader_fade_ms: f64,
    /// Quiet period for resize handling
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: f64,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub counters: CounterConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub particles: ParticlesConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub form: FormConfig,
}

fn default_startup_delay() -> f64 {
    1500.0
}

fn default_loader_fade() -> f64 {
    500.0
}

fn default_resize_debounce() -> f64 {
    250.0
}

fn default_true() -> bool {
    true
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            seed: None,
            startup_delay_ms: default_startup_delay(),
            loader_fade_ms: default_loader_fade(),
            resize_debounce_ms: default_resize_debounce(),
            reveal: RevealConfig::default(),
            navigation: NavigationConfig::default(),
            counters: CounterConfig::default(),
            progress: ProgressConfig::default(),
            particles: ParticlesConfig::default(),
            pointer: PointerConfig::default(),
            scroll: ScrollConfig::default(),
            form: FormConfig::default(),
        }
    }
}

impl PortfolioConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: PortfolioConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check ranges and margin syntax
    pub fn validate(&self) -> Result<()> {
        check_threshold("reveal.threshold", self.reveal.threshold)?;
        check_threshold("navigation.threshold", self.navigation.threshold)?;
        self.reveal.root_margin()?;
        self.navigation.root_margin()?;
        for (key, value) in [
            ("startup_delay_ms", self.startup_delay_ms),
            ("loader_fade_ms", self.loader_fade_ms),
            ("resize_debounce_ms", self.resize_debounce_ms),
            ("counters.duration_ms", self.counters.duration_ms),
            ("progress.fill_delay_ms", self.progress.fill_delay_ms),
            ("form.send_delay_ms", self.form.send_delay_ms),
            ("form.banner_dismiss_ms", self.form.banner_dismiss_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AppError::ConfigValue {
                    key,
                    message: format!("expected a non-negative duration, got {}", value),
                });
            }
        }
        self.particles.color()?;
        if self.particles.link_distance <= 0.0 {
            return Err(AppError::ConfigValue {
                key: "particles.link_distance",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn check_threshold(key: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::ConfigValue {
            key,
            message: format!("threshold {} is outside [0, 1]", value),
        })
    }
}

/// Scroll-triggered reveal
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RevealConfig {
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f32,
    /// CSS margin shorthand applied to the viewport
    #[serde(default = "default_reveal_margin")]
    pub root_margin: String,
    /// Delay between consecutive cards of a grid
    #[serde(default = "default_stagger")]
    pub stagger_ms: f64,
    #[serde(default = "default_header_line_delay")]
    pub header_line_delay_ms: f64,
    #[serde(default = "default_header_line_width")]
    pub header_line_width_px: f32,
}

fn default_reveal_threshold() -> f32 {
    0.1
}

fn default_reveal_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_stagger() -> f64 {
    150.0
}

fn default_header_line_delay() -> f64 {
    300.0
}

fn default_header_line_width() -> f32 {
    60.0
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: default_reveal_threshold(),
            root_margin: default_reveal_margin(),
            stagger_ms: default_stagger(),
            header_line_delay_ms: default_header_line_delay(),
            header_line_width_px: default_header_line_width(),
        }
    }
}

impl RevealConfig {
    pub fn root_margin(&self) -> Result<RootMargin> {
        Ok(RootMargin::parse(&self.root_margin)?)
    }
}

/// Active navigation highlighting
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NavigationConfig {
    #[serde(default = "default_nav_threshold")]
    pub threshold: f32,
    #[serde(default = "default_nav_margin")]
    pub root_margin: String,
}

fn default_nav_threshold() -> f32 {
    0.6
}

fn default_nav_margin() -> String {
    "-20% 0px -20% 0px".to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            threshold: default_nav_threshold(),
            root_margin: default_nav_margin(),
        }
    }
}

impl NavigationConfig {
    pub fn root_margin(&self) -> Result<RootMargin> {
        Ok(RootMargin::parse(&self.root_margin)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_duration")]
    pub duration_ms: f64,
}

fn default_counter_duration() -> f64 {
    2000.0
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_counter_duration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgressConfig {
    #[serde(default = "default_fill_delay")]
    pub fill_delay_ms: f64,
}

fn default_fill_delay() -> f64 {
    500.0
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            fill_delay_ms: default_fill_delay(),
        }
    }
}

/// Hero particle field
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParticlesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selector of the element the canvas covers
    #[serde(default = "default_particle_container")]
    pub container: String,
    #[serde(default = "default_particle_count")]
    pub count: usize,
    #[serde(default = "default_link_distance")]
    pub link_distance: f32,
    /// `#rrggbb` fill and link color
    #[serde(default = "default_particle_color")]
    pub color: String,
}

fn default_particle_container() -> String {
    ".hero".to_string()
}

fn default_particle_count() -> usize {
    50
}

fn default_link_distance() -> f32 {
    100.0
}

fn default_particle_color() -> String {
    "#6366f1".to_string()
}

impl ParticlesConfig {
    pub fn color(&self) -> Result<Color> {
        Color::parse_hex(&self.color).ok_or_else(|| AppError::ConfigValue {
            key: "particles.color",
            message: format!("`{}` is not a hex color", self.color),
        })
    }
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            container: default_particle_container(),
            count: default_particle_count(),
            link_distance: default_link_distance(),
            color: default_particle_color(),
        }
    }
}

/// Tilt, magnetic buttons and the custom cursor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PointerConfig {
    #[serde(default = "default_true")]
    pub tilt: bool,
    #[serde(default = "default_true")]
    pub magnetic: bool,
    #[serde(default = "default_true")]
    pub cursor: bool,
    /// Pointer offset (px) per degree of tilt
    #[serde(default = "default_tilt_divisor")]
    pub tilt_divisor: f32,
    #[serde(default = "default_tilt_depth")]
    pub tilt_depth_px: f32,
    /// Largest magnetic pull (px) at a button edge
    #[serde(default = "default_magnetic_strength")]
    pub magnetic_strength: f32,
}

fn default_tilt_divisor() -> f32 {
    10.0
}

fn default_tilt_depth() -> f32 {
    20.0
}

fn default_magnetic_strength() -> f32 {
    10.0
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            tilt: true,
            magnetic: true,
            cursor: true,
            tilt_divisor: default_tilt_divisor(),
            tilt_depth_px: default_tilt_depth(),
            magnetic_strength: default_magnetic_strength(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrollConfig {
    /// Scroll offset past which the header gets `scrolled`
    #[serde(default = "default_header_threshold")]
    pub header_threshold: f32,
    /// Parallax speed for floating elements without `data-speed`
    #[serde(default = "default_parallax_speed")]
    pub default_parallax_speed: f32,
    #[serde(default = "default_true")]
    pub progress_bar: bool,
}

fn default_header_threshold() -> f32 {
    50.0
}

fn default_parallax_speed() -> f32 {
    0.5
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_threshold: default_header_threshold(),
            default_parallax_speed: default_parallax_speed(),
            progress_bar: true,
        }
    }
}

/// Contact form timings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FormConfig {
    /// Simulated send time
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: f64,
    #[serde(default = "default_banner_dismiss")]
    pub banner_dismiss_ms: f64,
    #[serde(default = "default_banner_slide_delay")]
    pub banner_slide_delay_ms: f64,
}

fn default_send_delay() -> f64 {
    2000.0
}

fn default_banner_dismiss() -> f64 {
    4000.0
}

fn default_banner_slide_delay() -> f64 {
    100.0
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay(),
            banner_dismiss_ms: default_banner_dismiss(),
            banner_slide_delay_ms: default_banner_slide_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vitrine_core::MarginValue;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(PortfolioConfig::from_toml_str("").unwrap(), PortfolioConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PortfolioConfig::from_toml_str(
            r#"
            reduced_motion = true
            seed = 7

            [particles]
            count = 12

            [navigation]
            threshold = 0.5
            "#,
        )
        .unwrap();
        assert!(config.reduced_motion);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.particles.count, 12);
        assert_eq!(config.particles.link_distance, 100.0);
        assert_eq!(config.navigation.threshold, 0.5);
        assert_eq!(config.navigation.root_margin, "-20% 0px -20% 0px");
        assert_eq!(config.counters.duration_ms, 2000.0);
    }

    #[test]
    fn margins_parse() {
        let config = PortfolioConfig::default();
        assert_eq!(config.reveal.root_margin().unwrap().bottom, MarginValue::Px(-50.0));
        assert_eq!(config.navigation.root_margin().unwrap().top, MarginValue::Percent(-20.0));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            PortfolioConfig::from_toml_str("[reveal]\nthreshold = 1.5"),
            Err(AppError::ConfigValue { key: "reveal.threshold", .. })
        ));
        assert!(matches!(
            PortfolioConfig::from_toml_str("[reveal]\nroot_margin = \"wide\""),
            Err(AppError::Core(_))
        ));
        assert!(matches!(
            PortfolioConfig::from_toml_str("startup_delay_ms = -1.0"),
            Err(AppError::ConfigValue { .. })
        ));
        assert!(matches!(
            PortfolioConfig::from_toml_str("reduced_motion = \"yes\""),
            Err(AppError::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PortfolioConfig::from_path(Path::new("/nonexistent/vitrine.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vitrine.toml"));
    }
}
