//! Paint context - the recording drawing API

use crate::color::Color;
use crate::primitives::{Circle, Line, Point, Rect};
use smallvec::SmallVec;

/// Stroke style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// A paint command for the renderer
///
/// Colors are already multiplied by the global alpha that was active when
/// the command was recorded.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    Clear { rect: Rect },
    FillCircle { circle: Circle, color: Color },
    StrokeLine { line: Line, style: StrokeStyle },
}

/// Mutable drawing state, saved and restored as a unit
#[derive(Clone, Copy, Debug)]
struct PaintState {
    global_alpha: f32,
    fill: Color,
    stroke: StrokeStyle,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            global_alpha: 1.0,
            fill: Color::BLACK,
            stroke: StrokeStyle::default(),
        }
    }
}

/// A fixed-size drawing surface that records its commands
pub struct PaintContext {
    width: f32,
    height: f32,
    commands: Vec<PaintCommand>,
    state: PaintState,
    state_stack: SmallVec<[PaintState; 4]>,
}

impl PaintContext {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            state: PaintState::default(),
            state_stack: SmallVec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resize the surface. Like assigning a canvas' dimensions, this wipes
    /// the content and resets the drawing state.
    pub fn resize(&mut self, width: f32, height: f32) {
        tracing::debug!("paint surface resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.commands.clear();
        self.state = PaintState::default();
        self.state_stack.clear();
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of filled circles recorded since the last full clear
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::FillCircle { .. }))
            .count()
    }

    /// Number of stroked lines recorded since the last full clear
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::StrokeLine { .. }))
            .count()
    }

    // === State ===

    pub fn save(&mut self) {
        self.state_stack.push(self.state);
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        // Canvas ignores out-of-range alpha instead of clamping
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke.color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        if width > 0.0 {
            self.state.stroke.width = width;
        }
    }

    // === Drawing ===

    /// Clear a region. A clear covering the whole surface drops every
    /// command recorded before it.
    pub fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let rect = Rect::new(x, y, width, height);
        let covers = x <= 0.0 && y <= 0.0 && x + width >= self.width && y + height >= self.height;
        if covers {
            self.commands.clear();
        }
        self.commands.push(PaintCommand::Clear { rect });
    }

    /// Clear the whole surface
    pub fn clear(&mut self) {
        self.clear_rect(0.0, 0.0, self.width, self.height);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        self.commands.push(PaintCommand::FillCircle {
            circle: Circle::new(Point::new(cx, cy), radius),
            color: self.state.fill.mul_alpha(self.state.global_alpha),
        });
    }

    pub fn stroke_line(&mut self, from: Point, to: Point) {
        let mut style = self.state.stroke;
        style.color = style.color.mul_alpha(self.state.global_alpha);
        self.commands.push(PaintCommand::StrokeLine {
            line: Line::new(from, to),
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_alpha_is_baked_into_commands() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        ctx.save();
        ctx.set_global_alpha(0.5);
        ctx.set_fill_color(Color::WHITE);
        ctx.fill_circle(10.0, 10.0, 2.0);
        ctx.restore();
        ctx.fill_circle(20.0, 20.0, 2.0);

        match &ctx.commands()[..] {
            [PaintCommand::FillCircle { color: first, .. }, PaintCommand::FillCircle { color: second, .. }] =>
            {
                assert!((first.a - 0.5).abs() < f32::EPSILON);
                assert_eq!(second.a, 1.0);
                assert_eq!(second.r, 0.0);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn full_clear_drops_previous_frame() {
        let mut ctx = PaintContext::new(50.0, 50.0);
        ctx.fill_circle(1.0, 1.0, 1.0);
        ctx.stroke_line(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        assert_eq!(ctx.commands().len(), 2);

        ctx.clear();
        assert_eq!(ctx.commands().len(), 1);
        assert_eq!(ctx.circle_count(), 0);
        assert_eq!(ctx.line_count(), 0);
    }

    #[test]
    fn partial_clear_keeps_history() {
        let mut ctx = PaintContext::new(50.0, 50.0);
        ctx.fill_circle(1.0, 1.0, 1.0);
        ctx.clear_rect(10.0, 10.0, 5.0, 5.0);
        assert_eq!(ctx.circle_count(), 1);
    }

    #[test]
    fn out_of_range_alpha_is_ignored() {
        let mut ctx = PaintContext::new(10.0, 10.0);
        ctx.set_global_alpha(0.3);
        ctx.set_global_alpha(1.5);
        assert!((ctx.global_alpha() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn resize_wipes_state() {
        let mut ctx = PaintContext::new(10.0, 10.0);
        ctx.set_global_alpha(0.3);
        ctx.fill_circle(1.0, 1.0, 1.0);
        ctx.resize(20.0, 40.0);
        assert_eq!(ctx.width(), 20.0);
        assert_eq!(ctx.height(), 40.0);
        assert!(ctx.commands().is_empty());
        assert_eq!(ctx.global_alpha(), 1.0);
    }
}
