//! Terminal rasterizer for draw lists
//!
//! Each character cell shows two stacked logical pixels using the upper
//! half-block glyph: the foreground is the top pixel, the background the
//! bottom one. Text snaps to whole cells and is painted last.

use glam::Vec2;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as Area;
use ratatui::style::Color as TermColor;
use ratatui::widgets::Widget;

use super::{Align, Color, DrawList, Shape};
use crate::sim::Rect;

const HALF_BLOCK: &str = "▀";

/// Mapping between terminal cells and logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Terminal area the game occupies
    pub area: Area,
    /// Pixels per logical unit
    pub scale: f32,
    /// Pixel grid size
    pub grid_w: usize,
    pub grid_h: usize,
    /// Letterbox offset in pixels
    pub offset_x: usize,
    pub offset_y: usize,
}

impl Viewport {
    /// Fit a logical resolution into a terminal area, preserving aspect ratio
    pub fn fit(area: Area, logical_w: f32, logical_h: f32) -> Self {
        let px_w = area.width as f32;
        let px_h = area.height as f32 * 2.0;
        let scale = (px_w / logical_w).min(px_h / logical_h).max(f32::EPSILON);
        let grid_w = ((logical_w * scale).floor() as usize).max(1);
        let grid_h = ((logical_h * scale).floor() as usize).max(1);
        Self {
            area,
            scale,
            grid_w,
            grid_h,
            offset_x: (px_w as usize).saturating_sub(grid_w) / 2,
            offset_y: (px_h as usize).saturating_sub(grid_h) / 2,
        }
    }

    /// Terminal cell to logical coordinates (None outside the game area)
    pub fn to_logical(&self, column: u16, row: u16) -> Option<Vec2> {
        if column < self.area.x || row < self.area.y {
            return None;
        }
        let px = (column - self.area.x) as f32 + 0.5 - self.offset_x as f32;
        let py = ((row - self.area.y) as f32 + 0.5) * 2.0 - self.offset_y as f32;
        if px < 0.0 || py < 0.0 || px >= self.grid_w as f32 || py >= self.grid_h as f32 {
            return None;
        }
        Some(Vec2::new(px / self.scale, py / self.scale))
    }

    /// Logical point to pixel coordinates within the grid
    fn to_pixel(&self, p: Vec2) -> (f32, f32) {
        (p.x * self.scale, p.y * self.scale)
    }
}

/// Pixel buffer built from a draw list
struct Raster {
    w: usize,
    h: usize,
    pixels: Vec<Color>,
}

impl Raster {
    fn new(w: usize, h: usize, fill: Color) -> Self {
        Self {
            w,
            h,
            pixels: vec![fill; w * h],
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.pixels[y as usize * self.w + x as usize] = color;
        }
    }

    fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.w + x]
    }

    /// Pixel span whose centres fall inside [lo, hi); never empty
    fn span(lo: f32, hi: f32) -> (i64, i64) {
        let start = (lo - 0.5).ceil() as i64;
        let end = (hi - 0.5).ceil() as i64;
        if end > start {
            (start, end)
        } else {
            let mid = ((lo + hi) / 2.0).floor() as i64;
            (mid, mid + 1)
        }
    }

    fn fill_rect(&mut self, vp: &Viewport, rect: &Rect, color: Color) {
        let (x0, y0) = vp.to_pixel(Vec2::new(rect.left(), rect.top()));
        let (x1, y1) = vp.to_pixel(Vec2::new(rect.right(), rect.bottom()));
        let (sx, ex) = Self::span(x0, x1);
        let (sy, ey) = Self::span(y0, y1);
        for y in sy.max(0)..ey.min(self.h as i64) {
            for x in sx.max(0)..ex.min(self.w as i64) {
                self.put(x, y, color);
            }
        }
    }

    fn frame_rect(&mut self, vp: &Viewport, rect: &Rect, color: Color) {
        let (x0, y0) = vp.to_pixel(Vec2::new(rect.left(), rect.top()));
        let (x1, y1) = vp.to_pixel(Vec2::new(rect.right(), rect.bottom()));
        let (sx, ex) = Self::span(x0, x1);
        let (sy, ey) = Self::span(y0, y1);
        for x in sx..ex {
            self.put(x, sy, color);
            self.put(x, ey - 1, color);
        }
        for y in sy..ey {
            self.put(sx, y, color);
            self.put(ex - 1, y, color);
        }
    }

    fn fill_circle(&mut self, vp: &Viewport, center: Vec2, radius: f32, color: Color) {
        let (cx, cy) = vp.to_pixel(center);
        let r = radius * vp.scale;
        let mut painted = false;
        for y in (cy - r).floor() as i64..=(cy + r).ceil() as i64 {
            for x in (cx - r).floor() as i64..=(cx + r).ceil() as i64 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.put(x, y, color);
                    painted = true;
                }
            }
        }
        if !painted {
            self.put(cx.floor() as i64, cy.floor() as i64, color);
        }
    }

    fn line(&mut self, vp: &Viewport, from: Vec2, to: Vec2, color: Color) {
        let (x0, y0) = vp.to_pixel(from);
        let (x1, y1) = vp.to_pixel(to);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.put(x.floor() as i64, y.floor() as i64, color);
        }
    }
}

fn term(color: Color) -> TermColor {
    TermColor::Rgb(color.0, color.1, color.2)
}

/// Widget that paints a draw list into a terminal buffer
pub struct Canvas<'a> {
    list: &'a DrawList,
}

impl<'a> Canvas<'a> {
    pub fn new(list: &'a DrawList) -> Self {
        Self { list }
    }
}

impl Widget for Canvas<'_> {
    fn render(self, area: Area, buf: &mut Buffer) {
        let vp = Viewport::fit(area, self.list.width, self.list.height);
        let mut raster = Raster::new(vp.grid_w, vp.grid_h, self.list.background);

        for shape in &self.list.shapes {
            match shape {
                Shape::Rect { rect, color } => raster.fill_rect(&vp, rect, *color),
                Shape::Frame { rect, color } => raster.frame_rect(&vp, rect, *color),
                Shape::Circle {
                    center,
                    radius,
                    color,
                } => raster.fill_circle(&vp, *center, *radius, *color),
                Shape::Line { from, to, color } => raster.line(&vp, *from, *to, *color),
                Shape::Text { .. } => {}
            }
        }

        // Letterbox bars stay black
        for row in 0..area.height {
            for col in 0..area.width {
                let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) else {
                    continue;
                };
                let px = col as usize;
                let top = (row as usize * 2).checked_sub(vp.offset_y);
                let bottom = (row as usize * 2 + 1).checked_sub(vp.offset_y);
                let sample = |py: Option<usize>| -> Color {
                    match (px.checked_sub(vp.offset_x), py) {
                        (Some(x), Some(y)) if x < raster.w && y < raster.h => raster.get(x, y),
                        _ => Color::BLACK,
                    }
                };
                cell.set_symbol(HALF_BLOCK)
                    .set_fg(term(sample(top)))
                    .set_bg(term(sample(bottom)));
            }
        }

        for shape in &self.list.shapes {
            let Shape::Text {
                pos,
                text,
                color,
                align,
            } = shape
            else {
                continue;
            };
            let (px, py) = vp.to_pixel(*pos);
            let row = ((py + vp.offset_y as f32) / 2.0).floor() as i64;
            let len = text.chars().count() as i64;
            let anchor = (px + vp.offset_x as f32).round() as i64;
            let start = match align {
                Align::Left => anchor,
                Align::Center => anchor - len / 2,
                Align::Right => anchor - len,
            };
            if row < 0 || row >= area.height as i64 {
                continue;
            }
            for (i, ch) in text.chars().enumerate() {
                let col = start + i as i64;
                if col < 0 || col >= area.width as i64 {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row as u16)) {
                    let behind = cell.fg;
                    cell.set_char(ch).set_fg(term(*color)).set_bg(behind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_preserves_aspect() {
        let vp = Viewport::fit(Area::new(0, 0, 100, 40), 800.0, 600.0);
        // 100 px wide, 80 px tall available; height is the limit
        assert!((vp.scale - 80.0 / 600.0).abs() < 1e-6);
        assert_eq!(vp.grid_h, 80);
        assert!(vp.grid_w <= 100);
    }

    #[test]
    fn test_to_logical_round_trip() {
        let vp = Viewport::fit(Area::new(0, 0, 80, 30), 800.0, 600.0);
        let p = vp.to_logical(40, 15).unwrap();
        assert!((p.x - 400.0).abs() < 15.0);
        assert!((p.y - 300.0).abs() < 25.0);
        assert!(vp.to_logical(200, 200).is_none());
    }

    #[test]
    fn test_tiny_rect_still_paints() {
        let mut list = DrawList::new(800.0, 600.0);
        list.clear(Color::BLACK);
        list.rect(Rect::new(400.0, 300.0, 1.0, 1.0), Color::WHITE);

        let area = Area::new(0, 0, 40, 15);
        let mut buf = Buffer::empty(area);
        Canvas::new(&list).render(area, &mut buf);

        let white = term(Color::WHITE);
        let lit = buf
            .content()
            .iter()
            .any(|c| c.fg == white || c.bg == white);
        assert!(lit);
    }

    #[test]
    fn test_text_is_written() {
        let mut list = DrawList::new(800.0, 600.0);
        list.title(300.0, "HI", Color::YELLOW);

        let area = Area::new(0, 0, 80, 30);
        let mut buf = Buffer::empty(area);
        Canvas::new(&list).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("HI"));
    }
}
