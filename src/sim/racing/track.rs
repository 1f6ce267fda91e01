//! Tile tracks
//!
//! Each circuit is a closed parametric centerline stamped onto a tile grid.
//! The same centerline, sampled more coarsely, gives the AI waypoints, the
//! checkpoint positions and the starting grid.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::car::Car;
use crate::sim::Rect;

pub const TILE: f32 = 32.0;

/// Checkpoint box edge in pixels
const CHECKPOINT_SIZE: f32 = 96.0;
/// Spacing of the starting grid rows, in waypoints
const GRID_ROW_STEP: usize = 2;
/// Lateral offset of the two grid columns
const GRID_COLUMN_OFFSET: f32 = 16.0;
/// Samples used when stamping a centerline
const STAMP_SAMPLES: usize = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Grass,
    Road,
    Border,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Oval,
    Serpentine,
    FigureEight,
}

#[derive(Debug)]
pub struct TrackInfo {
    /// Leaderboard board name
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: &'static str,
    pub description: &'static str,
    pub shape: Shape,
    pub cols: usize,
    pub rows: usize,
    /// AI waypoints around one lap
    pub waypoints: usize,
}

pub const TRACKS: [TrackInfo; 3] = [
    TrackInfo {
        id: "track1",
        name: "Speedway",
        difficulty: "Easy",
        description: "Oval with gentle curves",
        shape: Shape::Oval,
        cols: 40,
        rows: 30,
        waypoints: 96,
    },
    TrackInfo {
        id: "track2",
        name: "Serpent",
        difficulty: "Medium",
        description: "Chicanes and tight bends",
        shape: Shape::Serpentine,
        cols: 50,
        rows: 35,
        waypoints: 120,
    },
    TrackInfo {
        id: "track3",
        name: "Inferno",
        difficulty: "Hard",
        description: "Figure eight with a crossing",
        shape: Shape::FigureEight,
        cols: 45,
        rows: 35,
        waypoints: 150,
    },
];

/// Centerline position in tile units for lap fraction `s` in [0, 1)
fn centerline(info: &TrackInfo, s: f32) -> Vec2 {
    let (w, h) = (info.cols as f32, info.rows as f32);
    match info.shape {
        Shape::Oval => {
            // Start at the top of the ellipse and run clockwise
            let t = s * TAU - PI / 2.0;
            Vec2::new(
                (w / 2.0).floor() + t.cos() * w * 0.35,
                (h / 2.0).floor() + t.sin() * h * 0.35,
            )
        }
        Shape::Serpentine => {
            let t = s * TAU;
            Vec2::new(
                w * 0.5 + t.cos() * w * 0.36,
                h * 0.5 + t.sin() * h * 0.28 + (t * 4.0).sin() * h * 0.07,
            )
        }
        Shape::FigureEight => {
            // Offset so the start line is clear of the crossing
            let t = s * TAU + PI / 4.0;
            Vec2::new(
                w * 0.5 + t.sin() * w * 0.35,
                h * 0.5 + (t * 2.0).sin() * h * 0.35 * 0.7,
            )
        }
    }
}

fn to_pixels(tile: Vec2) -> Vec2 {
    (tile + Vec2::splat(0.5)) * TILE
}

/// Heading in degrees (0 is up, clockwise) along a direction vector
pub fn bearing(dir: Vec2) -> f32 {
    dir.x.atan2(-dir.y).to_degrees()
}

#[derive(Debug, Clone)]
pub struct Track {
    pub index: usize,
    pub cols: usize,
    pub rows: usize,
    pub tiles: Vec<Tile>,
    /// Passed in order 0, 1, 2, then 0 again for a lap
    pub checkpoints: [Rect; 3],
    /// Starting grid, pole position first, with the heading at each slot
    pub spawns: Vec<(Vec2, f32)>,
    /// AI waypoints in pixels
    pub path: Vec<Vec2>,
}

impl Track {
    pub fn generate(index: usize) -> Self {
        let index = index.min(TRACKS.len() - 1);
        let info = &TRACKS[index];
        let mut track = Self {
            index,
            cols: info.cols,
            rows: info.rows,
            tiles: vec![Tile::Grass; info.cols * info.rows],
            checkpoints: [Rect::default(); 3],
            spawns: Vec::new(),
            path: Vec::new(),
        };

        match info.shape {
            Shape::Oval => track.paint_oval(),
            Shape::Serpentine => track.stamp(3.0, 4.0),
            Shape::FigureEight => track.stamp(2.5, 3.5),
        }

        track.path = (0..info.waypoints)
            .map(|i| to_pixels(centerline(info, i as f32 / info.waypoints as f32)))
            .collect();

        let n = track.path.len();
        for (k, checkpoint) in track.checkpoints.iter_mut().enumerate() {
            let p = track.path[k * n / 3];
            *checkpoint = Rect::centered(p, CHECKPOINT_SIZE, CHECKPOINT_SIZE);
        }

        // Two columns, three rows behind the start line
        for slot in 0..6 {
            let row = slot / 2;
            let i = n - GRID_ROW_STEP * (row + 1);
            let here = track.path[i];
            let ahead = track.path[(i + 1) % n];
            let dir = (ahead - here).normalize_or_zero();
            let side = Vec2::new(-dir.y, dir.x);
            let offset = if slot % 2 == 0 {
                -GRID_COLUMN_OFFSET
            } else {
                GRID_COLUMN_OFFSET
            };
            track.spawns.push((here + side * offset, bearing(dir)));
        }

        track
    }

    pub fn info(&self) -> &'static TrackInfo {
        &TRACKS[self.index]
    }

    /// Size in pixels
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * TILE, self.rows as f32 * TILE)
    }

    pub fn tile(&self, col: i32, row: i32) -> Option<Tile> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        Some(self.tiles[row as usize * self.cols + col as usize])
    }

    pub fn tile_at(&self, pos: Vec2) -> Option<Tile> {
        self.tile((pos.x / TILE).floor() as i32, (pos.y / TILE).floor() as i32)
    }

    fn set(&mut self, col: i32, row: i32, tile: Tile) {
        if self.tile(col, row).is_some() {
            self.tiles[row as usize * self.cols + col as usize] = tile;
        }
    }

    /// Elliptic ring; the road band wins where it overlaps a border band
    fn paint_oval(&mut self) {
        let (cx, cy) = ((self.cols / 2) as f32, (self.rows / 2) as f32);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let dx = (col as f32 - cx) / (self.cols as f32 * 0.35);
                let dy = (row as f32 - cy) / (self.rows as f32 * 0.35);
                let d = dx * dx + dy * dy;
                let tile = if 0.7 < d && d < 1.3 {
                    Tile::Road
                } else if (0.6 < d && d < 0.75) || (1.25 < d && d < 1.4) {
                    Tile::Border
                } else {
                    continue;
                };
                self.set(col as i32, row as i32, tile);
            }
        }
    }

    /// Stamp discs along the centerline: borders first, road on top
    fn stamp(&mut self, road: f32, border: f32) {
        let info = &TRACKS[self.index];
        let centers: Vec<(i32, i32)> = (0..STAMP_SAMPLES)
            .map(|i| {
                let p = centerline(info, i as f32 / STAMP_SAMPLES as f32);
                (p.x as i32, p.y as i32)
            })
            .collect();
        let reach = border.ceil() as i32;

        for (radius, tile) in [(border, Tile::Border), (road, Tile::Road)] {
            for &(x, y) in &centers {
                for dy in -reach..=reach {
                    for dx in -reach..=reach {
                        let d = ((dx * dx + dy * dy) as f32).sqrt();
                        if d < radius {
                            self.set(x + dx, y + dy, tile);
                        }
                    }
                }
            }
        }
    }

    /// Bounce a car off the first border tile it touches
    pub fn collide(&self, car: &mut Car) -> bool {
        let rect = car.collision_rect();
        let col = (car.pos.x / TILE).floor() as i32;
        let row = (car.pos.y / TILE).floor() as i32;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.tile(col + dx, row + dy) != Some(Tile::Border) {
                    continue;
                }
                let tile = Rect::new(
                    (col + dx) as f32 * TILE,
                    (row + dy) as f32 * TILE,
                    TILE,
                    TILE,
                );
                if rect.intersects(&tile) {
                    let normal = (car.pos - tile.center()).normalize_or_zero();
                    if normal != Vec2::ZERO {
                        car.handle_collision(normal);
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Index of the first checkpoint the car overlaps, after crediting it
    pub fn check_checkpoint(&self, car: &mut Car) -> Option<usize> {
        let rect = car.collision_rect();
        let hit = self.checkpoints.iter().position(|c| rect.intersects(c))?;
        car.pass_checkpoint(hit);
        Some(hit)
    }
}
