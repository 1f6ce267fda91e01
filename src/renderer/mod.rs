//! Backend-agnostic draw list
//!
//! Games describe each frame as a list of filled shapes and text in logical
//! pixel coordinates; a frontend rasterizes the list.

mod canvas;

pub use canvas::{Canvas, Viewport};

use glam::Vec2;

use crate::sim::Rect;
use crate::sim::state::ScoreReport;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);
    pub const GRAY: Color = Color(128, 128, 128);
    pub const DARK_GRAY: Color = Color(40, 40, 40);
    pub const RED: Color = Color(220, 50, 50);
    pub const GREEN: Color = Color(50, 220, 50);
    pub const BLUE: Color = Color(50, 100, 220);
    pub const YELLOW: Color = Color(255, 220, 50);
    pub const ORANGE: Color = Color(255, 150, 50);
    pub const CYAN: Color = Color(50, 220, 220);
    pub const PURPLE: Color = Color(180, 50, 180);

    /// Brighten (positive) or darken (negative) every channel
    pub fn shade(self, amount: i16) -> Color {
        let f = |c: u8| (c as i16 + amount).clamp(0, 255) as u8;
        Color(f(self.0), f(self.1), f(self.2))
    }

    /// Linear blend toward `other` (t = 0 keeps self)
    pub fn mix(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color(f(self.0, other.0), f(self.1, other.1), f(self.2, other.2))
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A single draw primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { rect: Rect, color: Color },
    Frame { rect: Rect, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Line { from: Vec2, to: Vec2, color: Color },
    Text { pos: Vec2, text: String, color: Color, align: Align },
}

/// Shapes for one frame, painted in order
#[derive(Debug, Clone)]
pub struct DrawList {
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub shapes: Vec<Shape>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: Color::BLACK,
            shapes: Vec::new(),
        }
    }

    /// Reset and fill the background
    pub fn clear(&mut self, color: Color) {
        self.background = color;
        self.shapes.clear();
    }

    pub fn rect(&mut self, rect: Rect, color: Color) {
        self.shapes.push(Shape::Rect { rect, color });
    }

    pub fn frame(&mut self, rect: Rect, color: Color) {
        self.shapes.push(Shape::Frame { rect, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.shapes.push(Shape::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.shapes.push(Shape::Line { from, to, color });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Color, align: Align) {
        self.shapes.push(Shape::Text {
            pos,
            text: text.into(),
            color,
            align,
        });
    }

    /// Text centred horizontally on the screen
    pub fn title(&mut self, y: f32, text: impl Into<String>, color: Color) {
        let x = self.width / 2.0;
        self.text(Vec2::new(x, y), text, color, Align::Center);
    }

    /// Darkened panel with a border, used for menus and overlays
    pub fn panel(&mut self, rect: Rect, fill: Color, border: Color) {
        self.rect(rect, fill);
        self.frame(rect, border);
    }

    /// Centred dialog box with a heading and lines of text
    pub fn dialog(&mut self, heading: &str, lines: &[String], accent: Color) {
        let line_h = 28.0;
        let h = 90.0 + lines.len() as f32 * line_h;
        let w = (self.width * 0.7).min(560.0);
        let rect = Rect::new((self.width - w) / 2.0, (self.height - h) / 2.0, w, h);
        self.panel(rect, Color(15, 15, 25), accent);
        self.title(rect.y + 30.0, heading, accent);
        for (i, line) in lines.iter().enumerate() {
            self.title(rect.y + 75.0 + i as f32 * line_h, line.clone(), Color::WHITE);
        }
    }

    /// Leaderboard table for a records screen
    pub fn leaderboard(&mut self, heading: &str, report: &ScoreReport, accent: Color) {
        let mut lines = Vec::new();
        if report.unavailable {
            lines.push("Leaderboard unavailable".to_string());
        } else if report.top.is_empty() {
            lines.push("No scores yet".to_string());
        } else {
            for (i, entry) in report.top.iter().enumerate() {
                lines.push(format!(
                    "{:>2}. {:<12} {:>7}  {}",
                    i + 1,
                    entry.name,
                    entry.score,
                    entry.date
                ));
            }
        }
        lines.push(String::new());
        lines.push("ESC to go back".to_string());
        self.dialog(heading, &lines, accent);
    }

    /// Lines describing a finished run's submission
    pub fn report_lines(report: &ScoreReport) -> Vec<String> {
        let mut lines = Vec::new();
        if report.unavailable {
            lines.push("Score not saved (leaderboard offline)".to_string());
        } else if report.saved {
            if report.new_record {
                lines.push("NEW RECORD!".to_string());
            }
            if let Some(best) = report.best {
                lines.push(format!("Best: {best}"));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_shapes() {
        let mut list = DrawList::new(100.0, 100.0);
        list.rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        list.clear(Color::BLUE);
        assert!(list.shapes.is_empty());
        assert_eq!(list.background, Color::BLUE);
    }

    #[test]
    fn test_shade_and_mix_clamp() {
        assert_eq!(Color(250, 10, 100).shade(40), Color(255, 50, 140));
        assert_eq!(Color(250, 10, 100).shade(-40), Color(210, 0, 60));
        assert_eq!(Color::BLACK.mix(Color::WHITE, 2.0), Color::WHITE);
    }

    #[test]
    fn test_report_lines() {
        let report = ScoreReport {
            saved: true,
            new_record: true,
            best: Some(42),
            ..Default::default()
        };
        let lines = DrawList::report_lines(&report);
        assert_eq!(lines, vec!["NEW RECORD!".to_string(), "Best: 42".to_string()]);
    }
}
