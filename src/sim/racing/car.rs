//! Car physics and lap bookkeeping

use glam::Vec2;

use super::track::{Tile, Track};
use crate::renderer::Color;
use crate::sim::Rect;
use crate::{heading, normalize_degrees};

pub const ACCELERATION: f32 = 0.3;
/// Coasting decay; braking is twice this
pub const DECELERATION: f32 = 0.15;
pub const FRICTION: f32 = 0.05;
pub const MAX_SPEED: f32 = 12.0;
pub const MIN_SPEED: f32 = -6.0;
/// Degrees per tick at full speed
pub const TURN_SPEED: f32 = 4.0;
pub const DRIFT_FACTOR: f32 = 0.92;
const GRIP_FACTOR: f32 = 0.7;
pub const OFFTRACK_FRICTION: f32 = 0.3;
const COLLISION_SPEED_FACTOR: f32 = 0.5;
/// Seconds between wall bounces
const COLLISION_COOLDOWN: f32 = 0.2;
/// Speed above which a sideways slide counts as a drift
const DRIFT_SPEED: f32 = 8.0;
const DRIFT_ANGLE: f32 = 15.0;
/// Laps not shorter than this count
const MIN_LAP_TIME: f32 = 1.0;

pub const MAX_LAPS: u32 = 3;
pub const CAR_W: f32 = 20.0;
pub const CAR_H: f32 = 32.0;

pub const CAR_COLORS: [Color; 6] = [
    Color(255, 50, 50),
    Color(50, 150, 255),
    Color(50, 255, 50),
    Color(255, 255, 50),
    Color(255, 150, 50),
    Color(200, 50, 200),
];

/// Pedal and wheel state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub pos: Vec2,
    /// Degrees, 0 is up, clockwise positive
    pub angle: f32,
    /// Signed speed along the heading
    pub speed: f32,
    pub vel: Vec2,
    pub color: Color,
    pub controls: Controls,
    pub offtrack: bool,
    pub drifting: bool,
    pub collision_cooldown: f32,

    /// Current lap, 1-based
    pub lap: u32,
    /// Last checkpoint credited
    pub checkpoint: usize,
    pub lap_times: Vec<f32>,
    pub lap_time: f32,
    pub total_time: f32,
    /// Race position, 1-based
    pub position: usize,
    pub finished: bool,
}

impl Car {
    pub fn new(pos: Vec2, angle: f32, color: Color) -> Self {
        Self {
            pos,
            angle,
            speed: 0.0,
            vel: Vec2::ZERO,
            color,
            controls: Controls::default(),
            offtrack: false,
            drifting: false,
            collision_cooldown: 0.0,
            lap: 1,
            checkpoint: 0,
            lap_times: Vec::new(),
            lap_time: 0.0,
            total_time: 0.0,
            position: 1,
            finished: false,
        }
    }

    /// Unit vector the nose points along
    pub fn forward(&self) -> Vec2 {
        heading(self.angle - 90.0)
    }

    pub fn update(&mut self, dt: f32, track: &Track) {
        if self.finished {
            return;
        }
        self.lap_time += dt;
        self.total_time += dt;
        self.collision_cooldown = (self.collision_cooldown - dt).max(0.0);

        self.apply_controls();
        self.apply_physics();
        self.offtrack = track.tile_at(self.pos) != Some(Tile::Road);
    }

    fn apply_controls(&mut self) {
        let c = self.controls;
        if c.accelerate {
            self.speed += ACCELERATION;
        } else if c.brake {
            self.speed -= DECELERATION * 2.0;
        } else if self.speed > 0.0 {
            self.speed = (self.speed - DECELERATION).max(0.0);
        } else if self.speed < 0.0 {
            self.speed = (self.speed + DECELERATION).min(0.0);
        }
        self.speed = self.speed.clamp(MIN_SPEED, MAX_SPEED);

        if self.speed.abs() > 0.5 {
            let turn = TURN_SPEED * self.speed.abs() / MAX_SPEED;
            if c.left {
                self.angle -= turn;
            }
            if c.right {
                self.angle += turn;
            }
        }
    }

    fn apply_physics(&mut self) {
        let target = self.forward() * self.speed;
        let blend = if self.drifting { DRIFT_FACTOR } else { GRIP_FACTOR };
        self.vel = self.vel * blend + target * (1.0 - blend);

        if self.offtrack {
            self.vel *= 1.0 - OFFTRACK_FRICTION;
            self.speed *= 1.0 - OFFTRACK_FRICTION;
        } else {
            self.vel *= 1.0 - FRICTION;
        }
        self.pos += self.vel;

        self.drifting = if self.vel.length_squared() > f32::EPSILON {
            let travel = self.vel.x.atan2(-self.vel.y).to_degrees();
            normalize_degrees(self.angle - travel).abs() > DRIFT_ANGLE
                && self.speed.abs() > DRIFT_SPEED
        } else {
            false
        };
    }

    /// Wall bounce: halve speed, reflect velocity, push clear
    pub fn handle_collision(&mut self, normal: Vec2) {
        if self.collision_cooldown > 0.0 {
            return;
        }
        self.speed *= COLLISION_SPEED_FACTOR;
        self.vel -= 2.0 * self.vel.dot(normal) * normal;
        self.pos += self.vel * 2.0;
        self.collision_cooldown = COLLISION_COOLDOWN;
    }

    /// Credit checkpoint `id` when it is the next one in order
    pub fn pass_checkpoint(&mut self, id: usize) {
        let next = id == self.checkpoint + 1 || (id == 0 && self.checkpoint == 2);
        if !next {
            return;
        }
        self.checkpoint = id;
        if id == 0 {
            self.complete_lap();
        }
    }

    fn complete_lap(&mut self) {
        if self.lap_time <= MIN_LAP_TIME {
            return;
        }
        self.lap_times.push(self.lap_time);
        self.lap_time = 0.0;
        self.lap += 1;
        if self.lap > MAX_LAPS {
            self.finished = true;
        }
    }

    pub fn best_lap(&self) -> Option<f32> {
        self.lap_times.iter().copied().reduce(f32::min)
    }

    /// Race progress used for ordering
    pub fn progress(&self) -> f32 {
        self.lap as f32 * 100.0 + self.checkpoint as f32 * 30.0 - self.lap_time
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed.abs() * 10.0
    }

    /// Unrotated hit box
    pub fn collision_rect(&self) -> Rect {
        Rect::centered(self.pos, CAR_W, CAR_H)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn car_on_road() -> (Car, Track) {
        let track = Track::generate(0);
        let (pos, angle) = track.spawns[0];
        (Car::new(pos, angle, CAR_COLORS[0]), track)
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut car = Car::new(Vec2::ZERO, 0.0, CAR_COLORS[0]);
        car.controls.accelerate = true;
        for _ in 0..60 {
            car.apply_controls();
        }
        assert_eq!(car.speed, MAX_SPEED);

        car.controls = Controls {
            brake: true,
            ..Default::default()
        };
        for _ in 0..100 {
            car.apply_controls();
        }
        assert_eq!(car.speed, MIN_SPEED);
    }

    #[test]
    fn test_coasting_decays_to_zero() {
        let (mut car, track) = car_on_road();
        car.speed = 1.0;
        for _ in 0..10 {
            car.update(SIM_DT, &track);
        }
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn test_no_steering_when_stopped() {
        let (mut car, track) = car_on_road();
        let start = car.angle;
        car.controls.left = true;
        car.update(SIM_DT, &track);
        assert_eq!(car.angle, start);
    }

    #[test]
    fn test_steering_scales_with_speed() {
        let mut car = Car::new(Vec2::ZERO, 0.0, CAR_COLORS[0]);
        car.speed = MAX_SPEED;
        car.controls = Controls {
            accelerate: true,
            right: true,
            ..Default::default()
        };
        car.apply_controls();
        assert!((car.angle - TURN_SPEED).abs() < 1e-4);

        car.speed = MAX_SPEED / 2.0;
        car.controls.accelerate = false;
        car.controls.brake = true;
        let before = car.angle;
        car.apply_controls();
        let expected = TURN_SPEED * car.speed / MAX_SPEED;
        assert!((car.angle - before - expected).abs() < 1e-4);
    }

    #[test]
    fn test_collision_halves_speed_and_starts_cooldown() {
        let mut car = Car::new(Vec2::new(100.0, 100.0), 0.0, CAR_COLORS[0]);
        car.speed = 10.0;
        car.vel = Vec2::new(0.0, -5.0);
        car.handle_collision(Vec2::new(0.0, 1.0));
        assert_eq!(car.speed, 5.0);
        assert!(car.vel.y > 0.0);
        assert_eq!(car.collision_cooldown, COLLISION_COOLDOWN);

        // Ignored during the cooldown
        car.handle_collision(Vec2::new(0.0, -1.0));
        assert_eq!(car.speed, 5.0);
    }

    #[test]
    fn test_checkpoints_must_be_in_order() {
        let mut car = Car::new(Vec2::ZERO, 0.0, CAR_COLORS[0]);
        car.lap_time = 10.0;
        car.pass_checkpoint(2);
        assert_eq!(car.checkpoint, 0);
        car.pass_checkpoint(1);
        car.pass_checkpoint(0);
        assert_eq!(car.lap, 1);
        car.pass_checkpoint(2);
        car.pass_checkpoint(0);
        assert_eq!(car.lap, 2);
        assert_eq!(car.lap_times, vec![10.0]);
        assert_eq!(car.lap_time, 0.0);
    }

    #[test]
    fn test_short_lap_is_not_counted() {
        let mut car = Car::new(Vec2::ZERO, 0.0, CAR_COLORS[0]);
        car.lap_time = 0.5;
        car.pass_checkpoint(1);
        car.pass_checkpoint(2);
        car.pass_checkpoint(0);
        assert_eq!(car.lap, 1);
    }

    #[test]
    fn test_third_lap_finishes() {
        let mut car = Car::new(Vec2::ZERO, 0.0, CAR_COLORS[0]);
        for _ in 0..MAX_LAPS {
            car.lap_time = 20.0;
            for id in [1, 2, 0] {
                car.pass_checkpoint(id);
            }
        }
        assert!(car.finished);
        assert_eq!(car.best_lap(), Some(20.0));
    }
}
