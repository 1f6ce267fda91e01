//! Fixed brick layouts
//!
//! Cell values: 0 empty, 1 normal, 2 resistant, 3 strong, 9 indestructible.

use super::{BRICK_H, BRICK_OFFSET_LEFT, BRICK_OFFSET_TOP, BRICK_PADDING, BRICK_W, Brick};
use crate::renderer::Color;
use crate::sim::Rect;

pub const INDESTRUCTIBLE: u8 = 9;

/// One playable layout
#[derive(Debug)]
pub struct LevelDef {
    pub name: &'static str,
    pub difficulty: &'static str,
    pub layout: &'static [[u8; 10]],
}

pub const LEVELS: [LevelDef; 5] = [
    LevelDef {
        name: "Inicio",
        difficulty: "Easy",
        layout: &[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ],
    },
    LevelDef {
        name: "Pirámide",
        difficulty: "Easy",
        layout: &[
            [0, 0, 0, 0, 1, 1, 0, 0, 0, 0],
            [0, 0, 0, 1, 1, 1, 1, 0, 0, 0],
            [0, 0, 1, 1, 2, 2, 1, 1, 0, 0],
            [0, 1, 1, 2, 2, 2, 2, 1, 1, 0],
            [1, 1, 2, 2, 3, 3, 2, 2, 1, 1],
        ],
    },
    LevelDef {
        name: "Fortaleza",
        difficulty: "Medium",
        layout: &[
            [9, 0, 1, 1, 1, 1, 1, 1, 0, 9],
            [9, 0, 2, 2, 2, 2, 2, 2, 0, 9],
            [9, 0, 1, 1, 3, 3, 1, 1, 0, 9],
            [9, 0, 2, 2, 2, 2, 2, 2, 0, 9],
            [9, 0, 1, 1, 1, 1, 1, 1, 0, 9],
        ],
    },
    LevelDef {
        name: "Laberinto",
        difficulty: "Medium",
        layout: &[
            [2, 2, 0, 2, 2, 2, 2, 0, 2, 2],
            [2, 0, 0, 0, 2, 2, 0, 0, 0, 2],
            [0, 0, 3, 0, 0, 0, 0, 3, 0, 0],
            [2, 0, 0, 0, 2, 2, 0, 0, 0, 2],
            [2, 2, 0, 2, 2, 2, 2, 0, 2, 2],
            [0, 0, 0, 0, 1, 1, 0, 0, 0, 0],
        ],
    },
    LevelDef {
        name: "Desafío",
        difficulty: "Hard",
        layout: &[
            [9, 9, 9, 9, 9, 9, 9, 9, 9, 9],
            [9, 3, 3, 3, 3, 3, 3, 3, 3, 9],
            [9, 3, 2, 2, 2, 2, 2, 2, 3, 9],
            [9, 3, 2, 1, 1, 1, 1, 2, 3, 9],
            [9, 3, 2, 1, 0, 0, 1, 2, 3, 9],
            [9, 3, 2, 1, 1, 1, 1, 2, 3, 9],
            [9, 3, 2, 2, 2, 2, 2, 2, 3, 9],
            [9, 3, 3, 3, 3, 3, 3, 3, 3, 9],
            [9, 9, 9, 9, 9, 9, 9, 9, 9, 9],
        ],
    },
];

/// Base tint per level
const LEVEL_TINTS: [Color; 5] = [
    Color(255, 100, 100),
    Color(255, 180, 100),
    Color(255, 255, 100),
    Color(100, 255, 100),
    Color(100, 180, 255),
];

/// Brick color for a level and type
pub fn brick_color(level: usize, kind: u8) -> Color {
    let base = LEVEL_TINTS.get(level).copied().unwrap_or(Color(200, 100, 100));
    match kind {
        INDESTRUCTIBLE => Color(80, 80, 80),
        3 => base.shade(40),
        2 => base,
        _ => base.shade(-40),
    }
}

/// Lay out the bricks of a level (None for an index past the last level)
pub fn build_bricks(level: usize) -> Option<Vec<Brick>> {
    let def = LEVELS.get(level)?;
    let mut bricks = Vec::new();
    for (row, cells) in def.layout.iter().enumerate() {
        for (col, &kind) in cells.iter().enumerate() {
            if kind == 0 {
                continue;
            }
            let x = BRICK_OFFSET_LEFT + col as f32 * (BRICK_W + BRICK_PADDING);
            let y = BRICK_OFFSET_TOP + row as f32 * (BRICK_H + BRICK_PADDING);
            bricks.push(Brick::new(
                Rect::new(x, y, BRICK_W, BRICK_H),
                kind,
                brick_color(level, kind),
            ));
        }
    }
    Some(bricks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_level_has_thirty_bricks() {
        let bricks = build_bricks(0).unwrap();
        assert_eq!(bricks.len(), 30);
        assert_eq!(bricks[0].rect, Rect::new(35.0, 80.0, 60.0, 25.0));
        assert_eq!(bricks[1].rect.x, 100.0);
    }

    #[test]
    fn test_every_level_is_clearable() {
        for level in 0..LEVELS.len() {
            let bricks = build_bricks(level).unwrap();
            assert!(bricks.iter().any(|b| !b.indestructible()));
        }
        assert!(build_bricks(LEVELS.len()).is_none());
    }
}
