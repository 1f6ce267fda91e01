//! Waypoint-following rivals

use glam::Vec2;

use super::car::{Car, Controls};
use super::track::bearing;
use crate::normalize_degrees;
use crate::sim::RngState;

/// Seconds between decisions
const REACTION_TIME: f32 = 0.1;
const BASE_SPEED: f32 = 8.0;
/// Distance at which a waypoint counts as reached
const WAYPOINT_RADIUS: f32 = 50.0;
/// Heading error tolerated before steering
const STEER_DEADZONE: f32 = 5.0;
/// Heading error that calls for braking
const BRAKE_ANGLE: f32 = 45.0;
const STUCK_TIME: f32 = 2.0;
const REVERSE_SPEED: f32 = -3.0;
const OVERTAKE_RANGE: f32 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AiDriver {
    /// Index of the driven car in the race
    pub car: usize,
    /// 0 is cautious, 1 is reckless
    pub aggression: f32,
    pub waypoint: usize,
    pub target_speed: f32,
    pub brake_distance: f32,
    reaction_timer: f32,
    stuck_timer: f32,
    last_pos: Vec2,
}

impl AiDriver {
    pub fn new(car: usize, start: Vec2, aggression: f32) -> Self {
        Self {
            car,
            aggression,
            waypoint: 0,
            target_speed: BASE_SPEED * (0.8 + aggression * 0.4),
            brake_distance: 100.0 * (1.5 - aggression * 0.5),
            reaction_timer: 0.0,
            stuck_timer: 0.0,
            last_pos: start,
        }
    }

    fn lookahead(&self) -> usize {
        (2.0 + self.aggression * 3.0) as usize
    }

    /// Re-plan this driver's controls when its reaction timer is up
    pub fn update(&mut self, dt: f32, cars: &mut [Car], path: &[Vec2], rng: &mut RngState) {
        self.reaction_timer += dt;
        if self.reaction_timer < REACTION_TIME || path.is_empty() {
            return;
        }
        let interval = self.reaction_timer;
        self.reaction_timer = 0.0;

        let me = &cars[self.car];
        let pos = me.pos;
        let angle = me.angle;
        let speed = me.speed;

        let target = path[(self.waypoint + self.lookahead()) % path.len()];
        let to_target = target - pos;
        if to_target.length() < WAYPOINT_RADIUS {
            self.waypoint = (self.waypoint + 1) % path.len();
        }

        let diff = normalize_degrees(bearing(to_target) - angle);
        let mut controls = Controls {
            left: diff < -STEER_DEADZONE,
            right: diff > STEER_DEADZONE,
            ..Default::default()
        };

        if diff.abs() > BRAKE_ANGLE || self.obstacle_ahead(cars) {
            controls.brake = true;
        } else if speed.abs() < self.target_speed {
            controls.accelerate = true;
        }

        if rng.chance(self.aggression as f64 * 0.01) {
            let near = cars
                .iter()
                .enumerate()
                .any(|(i, c)| i != self.car && c.pos.distance(pos) < OVERTAKE_RANGE);
            if near {
                let go_left = rng.chance(0.5);
                controls.left = go_left;
                controls.right = !go_left;
            }
        }

        let car = &mut cars[self.car];
        if self.check_stuck(interval, car) {
            controls = Controls {
                brake: true,
                ..Default::default()
            };
            car.speed = REVERSE_SPEED;
        }
        car.controls = controls;
    }

    /// Another car close ahead within the braking cone
    fn obstacle_ahead(&self, cars: &[Car]) -> bool {
        let me = &cars[self.car];
        cars.iter().enumerate().any(|(i, other)| {
            if i == self.car {
                return false;
            }
            let delta = other.pos - me.pos;
            delta.length() < self.brake_distance
                && normalize_degrees(bearing(delta) - me.angle).abs() < BRAKE_ANGLE
        })
    }

    /// True once the car has pushed against something for too long
    fn check_stuck(&mut self, interval: f32, car: &Car) -> bool {
        let moved = car.pos.distance(self.last_pos);
        self.last_pos = car.pos;
        if moved < 1.0 && car.speed.abs() > 1.0 {
            self.stuck_timer += interval;
            if self.stuck_timer > STUCK_TIME {
                self.stuck_timer = 0.0;
                return true;
            }
        } else {
            self.stuck_timer = 0.0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::racing::car::CAR_COLORS;

    fn straight_path() -> Vec<Vec2> {
        (0..20).map(|i| Vec2::new(100.0, 1000.0 - i as f32 * 100.0)).collect()
    }

    #[test]
    fn test_aggression_parameters() {
        let ai = AiDriver::new(0, Vec2::ZERO, 0.5);
        assert!((ai.target_speed - 8.0).abs() < 1e-4);
        assert!((ai.brake_distance - 125.0).abs() < 1e-4);
        assert_eq!(ai.lookahead(), 3);
    }

    #[test]
    fn test_waits_for_reaction_time() {
        let path = straight_path();
        let mut cars = vec![Car::new(Vec2::new(100.0, 1000.0), 0.0, CAR_COLORS[1])];
        let mut ai = AiDriver::new(0, cars[0].pos, 0.5);
        let mut rng = RngState::new(1);
        ai.update(0.05, &mut cars, &path, &mut rng);
        assert_eq!(cars[0].controls, Controls::default());
        ai.update(0.06, &mut cars, &path, &mut rng);
        assert!(cars[0].controls.accelerate);
    }

    #[test]
    fn test_steers_toward_target() {
        // Facing right while the path runs up
        let path = straight_path();
        let mut cars = vec![Car::new(Vec2::new(100.0, 1000.0), 90.0, CAR_COLORS[1])];
        let mut ai = AiDriver::new(0, cars[0].pos, 0.5);
        let mut rng = RngState::new(1);
        ai.update(0.2, &mut cars, &path, &mut rng);
        assert!(cars[0].controls.left);
        assert!(cars[0].controls.brake);
    }

    #[test]
    fn test_brakes_behind_another_car() {
        let path = straight_path();
        let mut cars = vec![
            Car::new(Vec2::new(100.0, 1000.0), 0.0, CAR_COLORS[1]),
            Car::new(Vec2::new(100.0, 920.0), 0.0, CAR_COLORS[2]),
        ];
        let mut ai = AiDriver::new(0, cars[0].pos, 0.5);
        let mut rng = RngState::new(1);
        ai.update(0.2, &mut cars, &path, &mut rng);
        assert!(cars[0].controls.brake);
        assert!(!cars[0].controls.accelerate);
    }

    #[test]
    fn test_reverses_when_stuck() {
        let path = straight_path();
        let mut cars = vec![Car::new(Vec2::new(100.0, 1000.0), 0.0, CAR_COLORS[1])];
        cars[0].speed = 5.0;
        let mut ai = AiDriver::new(0, cars[0].pos, 0.5);
        let mut rng = RngState::new(1);
        let mut reversed = false;
        for _ in 0..25 {
            cars[0].speed = 5.0;
            ai.update(0.1, &mut cars, &path, &mut rng);
            if cars[0].speed == REVERSE_SPEED {
                reversed = true;
                break;
            }
        }
        assert!(reversed);
        assert!(cars[0].controls.brake);
    }
}
