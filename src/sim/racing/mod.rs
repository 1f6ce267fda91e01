//! Top-down racing
//!
//! Three laps against up to five waypoint-following rivals on a tile track.
//! The score is the total race time in whole seconds, so lower is better,
//! with one leaderboard per track.

pub mod ai;
pub mod car;
pub mod track;

use glam::Vec2;

use self::ai::AiDriver;
use self::car::{CAR_COLORS, Car, MAX_LAPS};
use self::track::{TILE, TRACKS, Tile, Track};
use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 1200.0;
const HEIGHT: f32 = 800.0;
const CAMERA_SMOOTHNESS: f32 = 0.1;
pub const MAX_OPPONENTS: usize = 5;

const BACKGROUND: Color = Color(40, 40, 40);
const GRASS: Color = Color(50, 120, 50);
const ROAD: Color = Color(80, 80, 80);
const BORDER: Color = Color(200, 50, 50);
const CHECKPOINT: Color = Color(255, 255, 100);

pub static INFO: GameInfo = GameInfo {
    title: "Racing Game",
    db_name: "Racing Game",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::LowerIsBetter,
    names: NamePolicy::Prompt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Racing,
    Paused,
    Results,
    Records,
}

/// Format seconds as MM:SS.cc
pub fn format_race_time(seconds: f32) -> String {
    let s = seconds.max(0.0);
    let minutes = (s / 60.0) as u32;
    let secs = (s % 60.0) as u32;
    let centis = ((s % 1.0) * 100.0) as u32;
    format!("{minutes:02}:{secs:02}.{centis:02}")
}

#[derive(Debug, Clone)]
pub struct Racing {
    pub phase: GamePhase,
    /// Selected entry in `TRACKS`
    pub selected: usize,
    pub opponents: usize,
    pub track: Track,
    /// Player first, then the rivals
    pub cars: Vec<Car>,
    pub drivers: Vec<AiDriver>,
    /// Top-left of the view in track pixels
    pub camera: Vec2,
    pub report: Option<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Racing {
    pub fn new(seed: u64, opponents: usize) -> Self {
        Self {
            phase: GamePhase::Menu,
            selected: 0,
            opponents: opponents.clamp(1, MAX_OPPONENTS),
            track: Track::generate(0),
            cars: Vec::new(),
            drivers: Vec::new(),
            camera: Vec2::ZERO,
            report: None,
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> Option<&Car> {
        self.cars.first()
    }

    pub fn board(&self) -> String {
        TRACKS[self.selected].id.to_string()
    }

    /// Build the grid for the selected track
    pub fn start_race(&mut self) {
        self.track = Track::generate(self.selected);
        let rivals = self.opponents.min(self.track.spawns.len() - 1);

        self.cars = self
            .track
            .spawns
            .iter()
            .take(rivals + 1)
            .enumerate()
            .map(|(i, &(pos, angle))| Car::new(pos, angle, CAR_COLORS[i % CAR_COLORS.len()]))
            .collect();
        self.drivers = (1..self.cars.len())
            .map(|i| AiDriver::new(i, self.cars[i].pos, 0.5 + (i - 1) as f32 * 0.1))
            .collect();

        self.report = None;
        self.update_camera(true);
        self.phase = GamePhase::Racing;
        log::info!(
            "Race on {} with {rivals} rivals",
            self.track.info().name
        );
    }

    fn update_race(&mut self, input: &TickInput, dt: f32) {
        if let Some(player) = self.cars.first_mut() {
            player.controls.accelerate = input.up;
            player.controls.brake = input.down;
            player.controls.left = input.left;
            player.controls.right = input.right;
        }

        for i in 0..self.cars.len() {
            if let Some(driver) = self.drivers.iter_mut().find(|d| d.car == i) {
                driver.update(dt, &mut self.cars, &self.track.path, &mut self.rng);
            }
            let car = &mut self.cars[i];
            car.update(dt, &self.track);
            if !car.finished {
                self.track.collide(car);
                self.track.check_checkpoint(car);
            }
        }

        self.update_positions();
        self.update_camera(false);

        if self.cars.first().is_some_and(|p| p.finished) {
            self.finish_race();
        }
    }

    /// Rank by laps, then checkpoints, then time into the lap
    fn update_positions(&mut self) {
        let mut order: Vec<(usize, f32)> = self
            .cars
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.progress()))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (rank, (i, _)) in order.into_iter().enumerate() {
            self.cars[i].position = rank + 1;
        }
    }

    fn update_camera(&mut self, snap: bool) {
        let Some(player) = self.cars.first() else {
            return;
        };
        let target = player.pos - Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        if snap {
            self.camera = target;
        } else {
            self.camera += (target - self.camera) * CAMERA_SMOOTHNESS;
        }
        let max = (self.track.size() - Vec2::new(WIDTH, HEIGHT)).max(Vec2::ZERO);
        self.camera = self.camera.clamp(Vec2::ZERO, max);
    }

    fn finish_race(&mut self) {
        let Some(player) = self.cars.first() else {
            return;
        };
        let score = player.total_time as i64;
        log::info!(
            "Race finished in position {} after {}",
            player.position,
            format_race_time(player.total_time)
        );
        self.events.push(GameEvent::RunFinished {
            score,
            board: Some(self.board()),
        });
        self.phase = GamePhase::Results;
    }

    fn open_records(&mut self) {
        self.report = None;
        self.events.push(GameEvent::RequestLeaderboard {
            board: Some(self.board()),
        });
        self.phase = GamePhase::Records;
    }

    fn update_menu(&mut self, input: &TickInput) {
        let count = TRACKS.len();
        for key in &input.pressed {
            match key {
                Key::Right => self.selected = (self.selected + 1) % count,
                Key::Left => self.selected = (self.selected + count - 1) % count,
                Key::Char('t' | 'T') => self.selected = (self.selected + 1) % count,
                Key::Up | Key::Char('+' | '=') => {
                    self.opponents = (self.opponents + 1).min(MAX_OPPONENTS)
                }
                Key::Down | Key::Char('-') => self.opponents = self.opponents.saturating_sub(1).max(1),
                _ => {}
            }
        }
        if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
            self.start_race();
        } else if input.letter_pressed('r') {
            self.open_records();
        } else if input.was_pressed(Key::Back) {
            self.events.push(GameEvent::Quit);
        }
    }

    fn draw_race(&self, list: &mut DrawList) {
        list.clear(BACKGROUND);
        let cam = self.camera;

        let first_col = (cam.x / TILE).floor().max(0.0) as i32;
        let first_row = (cam.y / TILE).floor().max(0.0) as i32;
        let cols = (WIDTH / TILE).ceil() as i32 + 1;
        let rows = (HEIGHT / TILE).ceil() as i32 + 1;
        for row in first_row..first_row + rows {
            for col in first_col..first_col + cols {
                let Some(tile) = self.track.tile(col, row) else {
                    continue;
                };
                let color = match tile {
                    Tile::Grass => GRASS,
                    Tile::Road => ROAD,
                    Tile::Border => BORDER,
                };
                let rect = Rect::new(col as f32 * TILE - cam.x, row as f32 * TILE - cam.y, TILE, TILE);
                list.rect(rect, color);
            }
        }

        for (i, cp) in self.track.checkpoints.iter().enumerate() {
            let rect = cp.translate(-cam);
            list.frame(rect, CHECKPOINT);
            list.text(rect.center(), (i + 1).to_string(), CHECKPOINT, Align::Center);
        }

        // Player last so it stays on top
        for car in self.cars.iter().skip(1).chain(self.cars.first()) {
            let p = car.pos - cam;
            list.circle(p + Vec2::splat(3.0), car::CAR_W / 2.0, Color::BLACK);
            list.circle(p, car::CAR_W / 2.0, car.color);
            list.line(p, p + car.forward() * car::CAR_H * 0.6, Color::WHITE);
        }

        self.draw_hud(list);
    }

    fn draw_hud(&self, list: &mut DrawList) {
        let Some(player) = self.player() else {
            return;
        };
        list.panel(Rect::new(10.0, 10.0, 260.0, 170.0), Color::BLACK, Color::GRAY);
        let lap = player.lap.min(MAX_LAPS);
        let lines = [
            format!("Lap: {lap}/{MAX_LAPS}"),
            format!("Pos: {}/{}", player.position, self.cars.len()),
            format!("Time: {}", format_race_time(player.total_time)),
            format!(
                "Best: {}",
                player
                    .best_lap()
                    .map(format_race_time)
                    .unwrap_or_else(|| "--:--.--".to_string())
            ),
            format!("{:.0} km/h", player.speed_kmh()),
        ];
        for (i, line) in lines.iter().enumerate() {
            list.text(Vec2::new(25.0, 35.0 + i as f32 * 30.0), line.clone(), Color::WHITE, Align::Left);
        }
        if player.offtrack {
            list.title(HEIGHT - 40.0, "OFF TRACK", Color::ORANGE);
        }
    }
}

impl Game for Racing {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Menu => self.update_menu(input),
            GamePhase::Racing => {
                if input.pause_pressed() {
                    self.phase = GamePhase::Paused;
                    return;
                }
                self.update_race(input, dt);
            }
            GamePhase::Paused => {
                if input.pause_pressed() || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Racing;
                } else if input.letter_pressed('r') {
                    self.start_race();
                } else if input.letter_pressed('m') {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::Results => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start_race();
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.letter_pressed('m') || input.was_pressed(Key::Back) {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::Records => {
                if input.was_pressed(Key::Back) || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Menu;
                }
            }
        }
    }

    fn draw(&self, list: &mut DrawList) {
        match self.phase {
            GamePhase::Menu => {
                list.clear(BACKGROUND);
                list.title(120.0, "RACING GAME", Color::WHITE);
                list.title(180.0, "Top-Down Racing", Color::GRAY);
                let track = &TRACKS[self.selected];
                list.title(280.0, "Press ENTER to start", Color::YELLOW);
                list.title(
                    340.0,
                    format!("< Track: {} ({}) >", track.name, track.difficulty),
                    Color::GREEN,
                );
                list.title(380.0, track.description, Color::GRAY);
                list.title(430.0, format!("Rivals: {}  (up/down)", self.opponents), Color::GREEN);
                list.title(520.0, "Arrows - Drive    ESC/P - Pause", Color::WHITE);
                list.title(560.0, "R - Records    ESC - Exit", Color::WHITE);
            }
            GamePhase::Racing => self.draw_race(list),
            GamePhase::Paused => {
                self.draw_race(list);
                list.dialog(
                    "PAUSED",
                    &[
                        "ESC  Continue".to_string(),
                        "R  Restart".to_string(),
                        "M  Menu".to_string(),
                    ],
                    Color::YELLOW,
                );
            }
            GamePhase::Results => {
                self.draw_race(list);
                let Some(player) = self.player() else {
                    return;
                };
                let heading = if player.position == 1 {
                    "VICTORY!"
                } else {
                    "RACE OVER"
                };
                let mut lines = vec![
                    format!("Final position: {}", player.position),
                    format!("Total time: {}", format_race_time(player.total_time)),
                    format!(
                        "Best lap: {}",
                        format_race_time(player.best_lap().unwrap_or(0.0))
                    ),
                    format!("Track: {}", self.track.info().name),
                ];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("ENTER  Race again    R  Records    M  Menu".to_string());
                list.dialog(heading, &lines, Color::YELLOW);
            }
            GamePhase::Records => {
                list.clear(BACKGROUND);
                let report = self.report.clone().unwrap_or_default();
                let heading = format!("BEST TIMES - {}", TRACKS[self.selected].name);
                list.leaderboard(&heading, &report, Color::YELLOW);
            }
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_report(&mut self, report: ScoreReport) {
        self.report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn press(key: Key) -> TickInput {
        TickInput {
            pressed: vec![key],
            ..Default::default()
        }
    }

    #[test]
    fn test_start_race_places_grid() {
        let mut game = Racing::new(1, 3);
        game.tick(&press(Key::Confirm), SIM_DT);
        assert_eq!(game.phase, GamePhase::Racing);
        assert_eq!(game.cars.len(), 4);
        assert_eq!(game.drivers.len(), 3);
        assert!((game.drivers[2].aggression - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_menu_adjusts_track_and_rivals() {
        let mut game = Racing::new(1, 3);
        game.tick(&press(Key::Right), SIM_DT);
        assert_eq!(game.selected, 1);
        game.tick(&press(Key::Left), SIM_DT);
        game.tick(&press(Key::Left), SIM_DT);
        assert_eq!(game.selected, 2);
        for _ in 0..10 {
            game.tick(&press(Key::Up), SIM_DT);
        }
        assert_eq!(game.opponents, MAX_OPPONENTS);
        for _ in 0..10 {
            game.tick(&press(Key::Down), SIM_DT);
        }
        assert_eq!(game.opponents, 1);
    }

    #[test]
    fn test_player_accelerates_forward() {
        let mut game = Racing::new(1, 1);
        game.start_race();
        let start = game.cars[0].pos;
        let forward = game.cars[0].forward();
        let input = TickInput {
            up: true,
            ..Default::default()
        };
        for _ in 0..30 {
            game.tick(&input, SIM_DT);
        }
        assert!((game.cars[0].pos - start).dot(forward) > 20.0);
    }

    #[test]
    fn test_rivals_drive_themselves() {
        let mut game = Racing::new(1, 1);
        game.start_race();
        let start = game.cars[1].pos;
        for _ in 0..120 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert!(game.cars[1].pos.distance(start) > 50.0);
        assert_eq!(game.cars[0].pos, game.track.spawns[0].0);
    }

    #[test]
    fn test_positions_follow_progress() {
        let mut game = Racing::new(1, 2);
        game.start_race();
        game.cars[2].lap = 2;
        game.cars[1].checkpoint = 1;
        game.update_positions();
        assert_eq!(game.cars[2].position, 1);
        assert_eq!(game.cars[1].position, 2);
        assert_eq!(game.cars[0].position, 3);
    }

    #[test]
    fn test_camera_stays_on_track() {
        let mut game = Racing::new(1, 1);
        game.start_race();
        game.cars[0].pos = Vec2::new(-500.0, -500.0);
        game.update_camera(true);
        assert_eq!(game.camera, Vec2::ZERO);
        game.cars[0].pos = game.track.size() + Vec2::splat(500.0);
        game.update_camera(true);
        assert_eq!(game.camera, game.track.size() - Vec2::new(WIDTH, HEIGHT));
    }

    #[test]
    fn test_finishing_reports_total_time() {
        let mut game = Racing::new(1, 1);
        game.selected = 1;
        game.start_race();
        game.cars[0].finished = true;
        game.cars[0].total_time = 93.7;
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::Results);
        let events = game.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::RunFinished {
                score: 93,
                board: Some("track2".to_string()),
            }]
        );
    }

    #[test]
    fn test_rivals_complete_a_lap_on_every_track() {
        for index in 0..TRACKS.len() {
            let mut game = Racing::new(7, 3);
            game.selected = index;
            game.start_race();
            // Idle player parked off the map so it never blocks the grid
            game.cars[0].pos = Vec2::splat(-10_000.0);

            let ticks = (240.0 / SIM_DT) as usize;
            for _ in 0..ticks {
                game.tick(&TickInput::default(), SIM_DT);
            }
            assert_eq!(game.phase, GamePhase::Racing);
            let laps: Vec<usize> = game.cars[1..].iter().map(|c| c.lap_times.len()).collect();
            assert!(
                laps.iter().any(|&n| n >= 1),
                "no rival finished a lap on track {index}: {laps:?}"
            );
        }
    }

    #[test]
    fn test_race_time_format() {
        assert_eq!(format_race_time(75.5), "01:15.50");
    }
}
