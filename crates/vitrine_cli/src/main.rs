//! Vitrine CLI
//!
//! Runs the sample portfolio page headlessly through a scripted session and
//! reports what fired:
//!
//! ```text
//! vitrine run                              # built-in tour
//! vitrine run --scenario session.toml --seed 7 --reduced-motion
//! vitrine config --config vitrine.toml     # print the effective config
//! vitrine validate "Ada" ada@example.com "Hello there!"
//! ```

mod runner;
mod scenario;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use runner::{Runner, SessionReport};
use scenario::Scenario;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vitrine_app::{demo, Portfolio, PortfolioConfig};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Headless runner for Vitrine portfolio pages", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the sample page through a session
    Run {
        /// Configuration file (vitrine.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scenario file; the built-in tour when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Random seed for particles and scramble symbols
        #[arg(long)]
        seed: Option<u64>,

        /// Render final states instead of animating
        #[arg(long)]
        reduced_motion: bool,

        /// Frame interval in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: f64,

        /// Viewport width
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height
        #[arg(long, default_value = "800")]
        height: f32,

        /// Also write the report as TOML
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check contact form input against the validation rules
    Validate {
        name: String,
        email: String,
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            scenario,
            seed,
            reduced_motion,
            frame_ms,
            width,
            height,
            report,
        } => {
            let mut config = load_config(config.as_deref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            config.reduced_motion |= reduced_motion;
            let scenario = match scenario {
                Some(path) => Scenario::from_path(&path)?,
                None => Scenario::tour(),
            };
            cmd_run(config, &scenario, frame_ms, (width, height), report.as_deref())
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Validate { name, email, message } => match vitrine_app::validate(&name, &email, &message) {
            Ok(()) => {
                println!("valid");
                Ok(())
            }
            Err(errors) => {
                for message in errors.messages() {
                    println!("  - {}", message);
                }
                bail!("{} validation error(s)", errors.messages().len())
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<PortfolioConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            PortfolioConfig::from_path(path).context("failed to load configuration")
        }
        None => Ok(PortfolioConfig::default()),
    }
}

fn cmd_run(
    config: PortfolioConfig,
    scenario: &Scenario,
    frame_ms: f64,
    (width, height): (f32, f32),
    report_path: Option<&Path>,
) -> Result<()> {
    tracing::info!(
        "Running {} steps (seed: {:?}, reduced motion: {})",
        scenario.steps.len(),
        config.seed,
        config.reduced_motion
    );
    let portfolio = Portfolio::new(demo::demo_page(), config)?.with_viewport(width, height);
    let report = Runner::new(portfolio, frame_ms).run(scenario);

    print_report(&report);
    if let Some(path) = report_path {
        std::fs::write(path, toml::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if report.is_failed() {
        bail!(
            "step {} failed: {}",
            report.failed_step.unwrap_or_default(),
            report.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!("Session {:?}", report.status);
    println!("  frames:          {}", report.frames);
    println!("  elapsed:         {}ms", report.elapsed_ms);
    println!("  scroll position: {}", report.scroll_y);
    if let Some(section) = &report.active_section {
        println!("  active section:  {}", section);
    }
    println!("  particles:       {}", report.particles);
    println!("  frame loops:     {}", report.active_loops);
    let t = &report.triggers;
    println!(
        "  triggers:        {} reveal, {} stagger, {} counter, {} progress, {} section",
        t.reveal, t.stagger, t.counter, t.progress, t.section
    );
}
