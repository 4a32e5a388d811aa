//! Particle background
//!
//! Drifting dots on a canvas sized to a container element, with faint lines
//! between any two dots closer than the link distance.
//!
//! Bounces reflect the velocity after the position update without clamping,
//! so a particle can overshoot an edge by at most one step.

use crate::error::{AnimationError, Result};
use crate::scheduler::{Frame, FrameCallback, FrameLoopHandle, FrameScheduler, FrameStatus};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use vitrine_core::{Debouncer, NodeId, Page, RandomSource};
use vitrine_paint::{Color, PaintContext, Point};

/// Quiet period before a resize is applied to the canvas
pub const RESIZE_DEBOUNCE_MS: f64 = 250.0;

/// Tunables for the particle field
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    /// Largest absolute speed per axis (px per frame)
    pub max_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Pairs closer than this are linked
    pub link_distance: f32,
    /// Alpha of a link between two coincident particles
    pub link_alpha: f32,
    pub color: Color,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            max_speed: 0.25,
            min_radius: 1.0,
            max_radius: 3.0,
            min_opacity: 0.2,
            max_opacity: 0.7,
            link_distance: 100.0,
            link_alpha: 0.2,
            color: Color::PRIMARY,
        }
    }
}

/// A single dot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    /// Random particle inside a `width` x `height` field
    pub fn random(rng: &mut RandomSource, config: &ParticleConfig, width: f32, height: f32) -> Self {
        Self {
            x: rng.range_f32(0.0, width),
            y: rng.range_f32(0.0, height),
            vx: rng.range_f32(-config.max_speed, config.max_speed),
            vy: rng.range_f32(-config.max_speed, config.max_speed),
            radius: rng.range_f32(config.min_radius, config.max_radius),
            opacity: rng.range_f32(config.min_opacity, config.max_opacity),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Integrate one step and bounce off the field edges
    pub fn update(&mut self, width: f32, height: f32) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }
    }
}

/// Alpha of the link between two particles `distance` apart, or `None` when
/// they are too far apart to link
pub fn link_alpha(distance: f32, config: &ParticleConfig) -> Option<f32> {
    if distance < config.link_distance {
        Some((config.link_distance - distance) / config.link_distance * config.link_alpha)
    } else {
        None
    }
}

/// The particle field and its canvas
pub struct ParticleSimulation {
    container: NodeId,
    config: ParticleConfig,
    particles: Vec<Particle>,
    canvas: PaintContext,
    rng: RandomSource,
    resize: Debouncer<()>,
}

impl ParticleSimulation {
    /// Size a canvas to `container` and scatter the particles over it
    pub fn new(page: &Page, container: NodeId, config: ParticleConfig, mut rng: RandomSource) -> Result<Self> {
        let bounds = page.try_node(container)?.rect();
        let particles = (0..config.count)
            .map(|_| Particle::random(&mut rng, &config, bounds.width, bounds.height))
            .collect();
        tracing::debug!(
            "particle field: {} particles on {}x{}",
            config.count,
            bounds.width,
            bounds.height
        );
        Ok(Self {
            container,
            config,
            particles,
            canvas: PaintContext::new(bounds.width, bounds.height),
            rng,
            resize: Debouncer::new(RESIZE_DEBOUNCE_MS),
        })
    }

    /// Build a simulation around explicit particles (no random placement)
    pub fn with_particles(
        page: &Page,
        container: NodeId,
        config: ParticleConfig,
        particles: Vec<Particle>,
    ) -> Result<Self> {
        let mut simulation = Self::new(
            page,
            container,
            ParticleConfig {
                count: 0,
                ..config
            },
            RandomSource::from_seed(0),
        )?;
        simulation.config.count = particles.len();
        simulation.particles = particles;
        Ok(simulation)
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn canvas(&self) -> &PaintContext {
        &self.canvas
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Note a viewport resize; the canvas follows after the quiet period
    pub fn notify_resize(&mut self, now_ms: f64) {
        self.resize.call(now_ms, ());
    }

    /// Advance and redraw one frame
    pub fn step(&mut self, page: &Page, now_ms: f64) -> Result<()> {
        let bounds = page
            .node(self.container)
            .ok_or(AnimationError::NodeRemoved(self.container))?
            .rect();
        if self.resize.poll(now_ms).is_some() {
            self.canvas.resize(bounds.width, bounds.height);
        }

        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.canvas.clear();

        for particle in &mut self.particles {
            particle.update(width, height);
        }
        for particle in &self.particles {
            self.canvas.save();
            self.canvas.set_global_alpha(particle.opacity);
            self.canvas.set_fill_color(self.config.color);
            self.canvas.fill_circle(particle.x, particle.y, particle.radius);
            self.canvas.restore();
        }

        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let Some(alpha) = link_alpha(a.position().distance(b.position()), &self.config) else {
                    continue;
                };
                self.canvas.save();
                self.canvas.set_global_alpha(alpha);
                self.canvas.set_stroke_color(self.config.color);
                self.canvas.set_line_width(1.0);
                self.canvas.stroke_line(a.position(), b.position());
                self.canvas.restore();
            }
        }
        Ok(())
    }

    /// Register the simulation with a scheduler
    pub fn start(self, scheduler: &mut FrameScheduler) -> ParticleSystem {
        let inner = Rc::new(RefCell::new(self));
        let handle = scheduler.request("particles", ParticleLoop(inner.clone()));
        ParticleSystem { inner, handle }
    }
}

struct ParticleLoop(Rc<RefCell<ParticleSimulation>>);

impl FrameCallback for ParticleLoop {
    fn on_frame(&mut self, frame: &mut Frame<'_>) -> Result<FrameStatus> {
        let mut simulation = self.0.borrow_mut();
        if !frame.page.contains(simulation.container) {
            tracing::debug!("particle container removed, stopping");
            simulation.particles.clear();
            return Ok(FrameStatus::Done);
        }
        simulation.step(frame.page, frame.now_ms)?;
        Ok(FrameStatus::Continue)
    }
}

/// A running particle field
pub struct ParticleSystem {
    inner: Rc<RefCell<ParticleSimulation>>,
    handle: FrameLoopHandle,
}

impl ParticleSystem {
    /// Stop animating and drop the particles
    pub fn stop(&self) {
        self.handle.cancel();
        let mut simulation = self.inner.borrow_mut();
        simulation.particles.clear();
        simulation.canvas.clear();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn handle(&self) -> &FrameLoopHandle {
        &self.handle
    }

    pub fn notify_resize(&self, now_ms: f64) {
        self.inner.borrow_mut().notify_resize(now_ms);
    }

    /// Borrow the simulation for inspection
    pub fn simulation(&self) -> Ref<'_, ParticleSimulation> {
        self.inner.borrow()
    }
}
