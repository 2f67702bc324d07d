//! Level layouts
//!
//! A level is plain data: the static platform set plus spawn points. Loading
//! a level replaces every entity and the whole platform set.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Platform, PlatformKind};
use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// 1-based level number
    pub number: u32,
    pub player_spawn: Vec2,
    pub platforms: Vec<Platform>,
    pub enemy_spawns: Vec<Vec2>,
    pub collectibles: Vec<Vec2>,
}

fn ground() -> Platform {
    Platform::new(0.0, WORLD_HEIGHT - 40.0, WORLD_WIDTH, 40.0, PlatformKind::Ground)
}

fn ledge(x: f32, y: f32, width: f32) -> Platform {
    Platform::new(x, y, width, 20.0, PlatformKind::Ledge)
}

/// `count` collectibles in a row, 30 units apart
fn row(x: f32, y: f32, count: u32) -> impl Iterator<Item = Vec2> {
    (0..count).map(move |i| Vec2::new(x + i as f32 * 30.0, y))
}

impl Level {
    /// The built-in three-level campaign
    pub fn campaign() -> Vec<Level> {
        vec![Self::meadow(), Self::terraces(), Self::zigzag()]
    }

    fn meadow() -> Level {
        let h = WORLD_HEIGHT;
        Level {
            number: 1,
            player_spawn: PLAYER_SPAWN,
            platforms: vec![
                ground(),
                ledge(200.0, h - 120.0, 200.0),
                ledge(500.0, h - 180.0, 200.0),
                ledge(100.0, h - 240.0, 200.0),
                ledge(400.0, h - 300.0, 200.0),
            ],
            enemy_spawns: vec![Vec2::new(300.0, h - 80.0), Vec2::new(600.0, h - 220.0)],
            collectibles: row(250.0, h - 150.0, 5)
                .chain(row(550.0, h - 210.0, 5))
                .chain(row(150.0, h - 270.0, 5))
                .collect(),
        }
    }

    fn terraces() -> Level {
        let h = WORLD_HEIGHT;
        Level {
            number: 2,
            player_spawn: PLAYER_SPAWN,
            platforms: vec![
                ground(),
                ledge(100.0, h - 150.0, 150.0),
                ledge(350.0, h - 180.0, 150.0),
                ledge(600.0, h - 150.0, 150.0),
                ledge(200.0, h - 250.0, 150.0),
                ledge(450.0, h - 300.0, 150.0),
            ],
            enemy_spawns: vec![
                Vec2::new(150.0, h - 190.0),
                Vec2::new(400.0, h - 220.0),
                Vec2::new(650.0, h - 190.0),
                Vec2::new(250.0, h - 290.0),
            ],
            collectibles: row(120.0, h - 180.0, 3)
                .chain(row(370.0, h - 210.0, 3))
                .chain(row(620.0, h - 180.0, 3))
                .chain(row(220.0, h - 280.0, 3))
                .chain(row(470.0, h - 330.0, 3))
                .collect(),
        }
    }

    fn zigzag() -> Level {
        let h = WORLD_HEIGHT;
        let mut platforms = vec![ground()];
        // Rising staircase left to right, then a second one back right to left
        platforms.extend((0..6).map(|i| ledge(100.0 + i as f32 * 100.0, h - 100.0 - i as f32 * 30.0, 80.0)));
        platforms.extend((0..6).map(|i| ledge(700.0 - i as f32 * 100.0, h - 280.0 - i as f32 * 15.0, 80.0)));
        platforms.push(ledge(300.0, h - 220.0, 200.0));

        Level {
            number: 3,
            // The first step sits on the usual spawn point
            player_spawn: Vec2::new(30.0, PLAYER_SPAWN.y),
            platforms,
            enemy_spawns: vec![
                Vec2::new(150.0, h - 140.0),
                Vec2::new(350.0, h - 140.0),
                Vec2::new(550.0, h - 140.0),
                Vec2::new(250.0, h - 260.0),
                Vec2::new(450.0, h - 260.0),
                Vec2::new(400.0, h - 360.0),
            ],
            collectibles: (0..20)
                .map(|i| Vec2::new(100.0 + (i % 5) as f32 * 150.0, h - 180.0 - (i / 5) as f32 * 60.0))
                .collect(),
        }
    }
}
