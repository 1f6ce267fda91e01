//! Snake with six rule variants
//!
//! The field is a 40x30 grid of 20 px cells. Each mode keeps its own
//! leaderboard, stored under the mode name as the board suffix.

use std::collections::VecDeque;

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
/// Cell size in pixels
const CELL: f32 = 20.0;
const COLS: i32 = 40;
const ROWS: i32 = 30;

/// Steps per second
const BASE_RATE: f32 = 12.0;
const MAX_RATE: f32 = 30.0;
const OBSTACLES: usize = 15;
/// Contra Reloj time limit in seconds
const TIME_LIMIT: f32 = 60.0;

pub static INFO: GameInfo = GameInfo {
    title: "Snake",
    db_name: "Snake",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::HigherIsBetter,
    names: NamePolicy::Arcade,
};

pub type Cell = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Classic,
    Speed,
    Portal,
    Maze,
    Poison,
    TimeAttack,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Classic,
        Mode::Speed,
        Mode::Portal,
        Mode::Maze,
        Mode::Poison,
        Mode::TimeAttack,
    ];

    /// Display name, also the leaderboard board
    pub fn name(self) -> &'static str {
        match self {
            Mode::Classic => "Clásico",
            Mode::Speed => "Velocidad",
            Mode::Portal => "Portal",
            Mode::Maze => "Laberinto",
            Mode::Poison => "Veneno",
            Mode::TimeAttack => "Contra Reloj",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Mode::Classic => "The traditional snake",
            Mode::Speed => "Faster with every apple",
            Mode::Portal => "Pass through the edges",
            Mode::Maze => "Avoid the obstacles",
            Mode::Poison => "Avoid the purple apple",
            Mode::TimeAttack => "60 seconds",
        }
    }

    fn color(self) -> Color {
        match self {
            Mode::Classic => Color(0, 255, 0),
            Mode::Speed => Color(255, 255, 0),
            Mode::Portal => Color(0, 255, 255),
            Mode::Maze => Color(150, 0, 255),
            Mode::Poison => Color(255, 0, 150),
            Mode::TimeAttack => Color(255, 165, 0),
        }
    }

    fn index(self) -> usize {
        Mode::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Mode selection
    Menu,
    Playing,
    Paused,
    /// Leaderboard for the current mode, play resumes afterwards
    Records,
    GameOver,
}

/// The snake body, head at the back
#[derive(Debug, Clone, PartialEq)]
pub struct Serpent {
    pub body: VecDeque<Cell>,
    /// Direction of the next step
    pub direction: Cell,
    /// Direction of the last completed step
    pub heading: Cell,
    growing: bool,
}

impl Serpent {
    pub fn new(start: Cell) -> Self {
        Self {
            body: VecDeque::from([start]),
            direction: (0, 0),
            heading: (0, 0),
            growing: false,
        }
    }

    pub fn head(&self) -> Cell {
        self.body.back().copied().unwrap_or((0, 0))
    }

    /// Turn unless it would reverse onto the last step
    pub fn steer(&mut self, dir: Cell) {
        let (hx, hy) = self.heading;
        if (dir.0 != 0 && hx == 0) || (dir.1 != 0 && hy == 0) {
            self.direction = dir;
        }
    }

    pub fn moving(&self) -> bool {
        self.direction != (0, 0)
    }

    /// Advance one cell; `wrap` teleports across the edges
    fn step(&mut self, wrap: bool) {
        if !self.moving() {
            return;
        }
        let (x, y) = self.head();
        let mut next = (x + self.direction.0, y + self.direction.1);
        if wrap {
            next = (next.0.rem_euclid(COLS), next.1.rem_euclid(ROWS));
        }
        self.body.push_back(next);
        if self.growing {
            self.growing = false;
        } else {
            self.body.pop_front();
        }
        self.heading = self.direction;
    }

    fn grow(&mut self) {
        self.growing = true;
    }

    pub fn hits_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().rev().skip(1).any(|c| *c == head)
    }

    pub fn out_of_bounds(&self) -> bool {
        let (x, y) = self.head();
        x < 0 || x >= COLS || y < 0 || y >= ROWS
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    pub phase: GamePhase,
    pub mode: Mode,
    pub serpent: Serpent,
    pub apple: Cell,
    pub poison: Option<Cell>,
    pub obstacles: Vec<Cell>,
    pub score: i64,
    /// Seconds of play in this run
    pub elapsed: f32,
    /// Best score seen this session, per mode
    pub best: [i64; 6],
    pub report: Option<ScoreReport>,
    step_timer: f32,
    rng: RngState,
    events: Vec<GameEvent>,
}

fn cell_rect(cell: Cell) -> Rect {
    Rect::new(cell.0 as f32 * CELL, cell.1 as f32 * CELL, CELL, CELL)
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            mode: Mode::Classic,
            serpent: Serpent::new((COLS / 2, ROWS / 2)),
            apple: (0, 0),
            poison: None,
            obstacles: Vec::new(),
            score: 0,
            elapsed: 0.0,
            best: [0; 6],
            report: None,
            step_timer: 0.0,
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    pub fn start(&mut self, mode: Mode) {
        log::debug!("Snake run in mode {}", mode.name());
        self.mode = mode;
        self.serpent = Serpent::new((COLS / 2, ROWS / 2));
        self.score = 0;
        self.elapsed = 0.0;
        self.step_timer = 0.0;
        self.poison = None;
        self.obstacles.clear();
        self.report = None;

        self.apple = self.free_apple_cell(&[]);
        match mode {
            Mode::Poison => {
                let apple = self.apple;
                self.poison = Some(self.free_apple_cell(&[apple]));
            }
            Mode::Maze => self.place_obstacles(),
            _ => {}
        }
        self.phase = GamePhase::Playing;
    }

    /// Random apple cell avoiding the body and `extra`
    fn free_apple_cell(&mut self, extra: &[Cell]) -> Cell {
        loop {
            let cell = (self.rng.range(0..COLS - 1), self.rng.range(0..ROWS - 1));
            if !self.serpent.occupies(cell) && !extra.contains(&cell) {
                return cell;
            }
        }
    }

    fn place_obstacles(&mut self) {
        while self.obstacles.len() < OBSTACLES {
            let cell = (self.rng.range(0..COLS), self.rng.range(0..ROWS));
            if !self.serpent.occupies(cell) && cell != self.apple && !self.obstacles.contains(&cell) {
                self.obstacles.push(cell);
            }
        }
    }

    /// Steps per second for the current mode and score
    pub fn step_rate(&self) -> f32 {
        match self.mode {
            Mode::Speed => (BASE_RATE + 2.0 * self.score as f32).min(MAX_RATE),
            _ => BASE_RATE,
        }
    }

    pub fn time_left(&self) -> f32 {
        (TIME_LIMIT - self.elapsed.floor()).max(0.0)
    }

    fn steer_from(&mut self, input: &TickInput) {
        for key in &input.pressed {
            let dir = match key {
                Key::Up => (0, -1),
                Key::Down => (0, 1),
                Key::Left => (-1, 0),
                Key::Right => (1, 0),
                _ => continue,
            };
            self.serpent.steer(dir);
        }
    }

    /// One movement step; returns false when the run ends
    pub fn advance(&mut self) -> bool {
        self.serpent.step(self.mode == Mode::Portal);

        if self.mode != Mode::Portal && self.serpent.out_of_bounds() {
            return false;
        }
        if self.serpent.hits_itself() {
            return false;
        }
        let head = self.serpent.head();
        if self.obstacles.contains(&head) {
            return false;
        }

        if head == self.apple {
            self.score += 1;
            self.serpent.grow();
            let mut taken = self.obstacles.clone();
            taken.extend(self.poison);
            self.apple = self.free_apple_cell(&taken);
        }

        if self.poison == Some(head) {
            return false;
        }
        true
    }

    fn game_over(&mut self) {
        let slot = self.mode.index();
        self.best[slot] = self.best[slot].max(self.score);
        log::info!("Snake {} run over: {}", self.mode.name(), self.score);
        self.events.push(GameEvent::RunFinished {
            score: self.score,
            board: Some(self.mode.name().to_string()),
        });
        self.phase = GamePhase::GameOver;
    }

    fn update_playing(&mut self, input: &TickInput, dt: f32) {
        if input.was_pressed(Key::Back) {
            self.phase = GamePhase::Paused;
            return;
        }
        if input.letter_pressed('p') {
            self.report = None;
            self.events.push(GameEvent::RequestLeaderboard {
                board: Some(self.mode.name().to_string()),
            });
            self.phase = GamePhase::Records;
            return;
        }

        self.steer_from(input);

        if self.serpent.moving() {
            self.elapsed += dt;
        }
        if self.mode == Mode::TimeAttack && self.serpent.moving() && self.time_left() <= 0.0 {
            self.game_over();
            return;
        }

        self.step_timer += dt;
        let interval = 1.0 / self.step_rate();
        while self.step_timer >= interval {
            self.step_timer -= interval;
            if !self.advance() {
                self.game_over();
                return;
            }
        }
    }

    fn draw_field(&self, list: &mut DrawList) {
        for x in 0..=COLS {
            let px = x as f32 * CELL;
            list.line(Vec2::new(px, 0.0), Vec2::new(px, HEIGHT), Color(20, 20, 20));
        }
        for y in 0..=ROWS {
            let py = y as f32 * CELL;
            list.line(Vec2::new(0.0, py), Vec2::new(WIDTH, py), Color(20, 20, 20));
        }

        for cell in &self.obstacles {
            list.rect(cell_rect(*cell), Color(100, 100, 100));
        }
        list.rect(cell_rect(self.apple), Color(255, 0, 0));
        if let Some(poison) = self.poison {
            list.rect(cell_rect(poison), Color(150, 0, 255));
        }

        let len = self.serpent.body.len();
        for (i, cell) in self.serpent.body.iter().enumerate() {
            let color = if i + 1 == len {
                Color(0, 255, 0)
            } else {
                Color(0, 200, 0)
            };
            list.rect(cell_rect(*cell).inset(1.0), color);
        }

        list.text(
            Vec2::new(10.0, 15.0),
            format!("Score: {}", self.score),
            Color::WHITE,
            Align::Left,
        );
        list.title(15.0, self.mode.name(), self.mode.color());
        let right = if self.mode == Mode::TimeAttack {
            format!("Time: {}", self.time_left() as u32)
        } else {
            format!("Best: {}", self.best[self.mode.index()])
        };
        list.text(Vec2::new(WIDTH - 10.0, 15.0), right, Color::WHITE, Align::Right);
        if !self.serpent.moving() {
            list.title(HEIGHT / 2.0 + 60.0, "Arrow keys to start", Color::GRAY);
        }
    }
}

impl Game for Snake {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Menu => {
                if let Some(d) = input.digit() {
                    if let Some(mode) = (d as usize).checked_sub(1).and_then(|i| Mode::ALL.get(i)) {
                        self.start(*mode);
                    }
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Playing => self.update_playing(input, dt),
            GamePhase::Paused => {
                if input.was_pressed(Key::Back) || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Playing;
                } else if input.letter_pressed('m') {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::Records => {
                if input.was_pressed(Key::Back) || input.letter_pressed('p') {
                    self.phase = GamePhase::Playing;
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start(self.mode);
                } else if input.letter_pressed('m') || input.was_pressed(Key::Back) {
                    self.phase = GamePhase::Menu;
                }
            }
        }
    }

    fn draw(&self, list: &mut DrawList) {
        list.clear(Color::BLACK);
        match self.phase {
            GamePhase::Menu => {
                list.title(70.0, "SNAKE", Color(0, 255, 0));
                list.title(110.0, "Choose a mode (1-6)", Color::GRAY);
                for (i, mode) in Mode::ALL.iter().enumerate() {
                    let y = 160.0 + i as f32 * 65.0;
                    let rect = Rect::new(150.0, y, 500.0, 55.0);
                    list.panel(rect, Color(20, 20, 20), mode.color());
                    list.text(
                        Vec2::new(170.0, y + 18.0),
                        format!("{}. {}", i + 1, mode.name()),
                        mode.color(),
                        Align::Left,
                    );
                    list.text(
                        Vec2::new(170.0, y + 38.0),
                        mode.description(),
                        Color::GRAY,
                        Align::Left,
                    );
                    list.text(
                        Vec2::new(630.0, y + 28.0),
                        format!("Best: {}", self.best[i]),
                        Color::WHITE,
                        Align::Right,
                    );
                }
            }
            GamePhase::Playing => self.draw_field(list),
            GamePhase::Paused => {
                self.draw_field(list);
                list.dialog(
                    "PAUSED",
                    &["ESC  Continue".to_string(), "M  Modes".to_string()],
                    Color::YELLOW,
                );
            }
            GamePhase::Records => {
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard(&format!("TOP 10 - {}", self.mode.name()), &report, self.mode.color());
            }
            GamePhase::GameOver => {
                self.draw_field(list);
                let mut lines = vec![
                    format!("Score: {}", self.score),
                    format!("Best: {}", self.best[self.mode.index()]),
                ];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("ENTER  Retry    M  Modes".to_string());
                list.dialog("GAME OVER", &lines, Color::RED);
            }
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_report(&mut self, report: ScoreReport) {
        if let Some(best) = report.best {
            let slot = self.mode.index();
            self.best[slot] = self.best[slot].max(best);
        }
        self.report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn press(key: Key) -> TickInput {
        TickInput {
            pressed: vec![key],
            ..Default::default()
        }
    }

    #[test]
    fn test_snake_waits_for_direction() {
        let mut game = Snake::new(1);
        game.start(Mode::Classic);
        for _ in 0..30 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(game.serpent.head(), (20, 15));
        assert_eq!(game.elapsed, 0.0);
    }

    #[test]
    fn test_snake_cannot_reverse() {
        let mut serpent = Serpent::new((5, 5));
        serpent.steer((1, 0));
        serpent.step(false);
        serpent.steer((-1, 0));
        assert_eq!(serpent.direction, (1, 0));
        serpent.steer((0, 1));
        assert_eq!(serpent.direction, (0, 1));
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        // Up then Left within one step must not fold back onto the body
        let mut serpent = Serpent::new((5, 5));
        serpent.steer((1, 0));
        serpent.step(false);
        serpent.steer((0, -1));
        serpent.steer((-1, 0));
        assert_eq!(serpent.direction, (0, -1));
    }

    #[test]
    fn test_eating_grows_on_next_step() {
        let mut game = Snake::new(3);
        game.start(Mode::Classic);
        game.apple = (21, 15);
        game.serpent.steer((1, 0));
        assert!(game.advance());
        assert_eq!(game.score, 1);
        assert_eq!(game.serpent.body.len(), 1);
        assert!(game.advance());
        assert_eq!(game.serpent.body.len(), 2);
        assert!(!game.serpent.occupies(game.apple));
    }

    #[test]
    fn test_wall_kills_in_classic() {
        let mut game = Snake::new(3);
        game.start(Mode::Classic);
        game.serpent = Serpent::new((COLS - 1, 3));
        game.apple = (0, 0);
        game.serpent.steer((1, 0));
        assert!(!game.advance());
    }

    #[test]
    fn test_portal_wraps() {
        let mut game = Snake::new(3);
        game.start(Mode::Portal);
        game.serpent = Serpent::new((COLS - 1, 3));
        game.apple = (10, 10);
        game.serpent.steer((1, 0));
        assert!(game.advance());
        assert_eq!(game.serpent.head(), (0, 3));
    }

    #[test]
    fn test_poison_ends_run() {
        let mut game = Snake::new(3);
        game.start(Mode::Poison);
        game.poison = Some((21, 15));
        game.apple = (0, 0);
        game.serpent.steer((1, 0));
        assert!(!game.advance());
    }

    #[test]
    fn test_maze_places_obstacles() {
        let mut game = Snake::new(9);
        game.start(Mode::Maze);
        assert_eq!(game.obstacles.len(), OBSTACLES);
        assert!(!game.obstacles.contains(&game.apple));
        assert!(!game.obstacles.contains(&(COLS / 2, ROWS / 2)));
    }

    #[test]
    fn test_speed_mode_rate() {
        let mut game = Snake::new(1);
        game.start(Mode::Speed);
        game.score = 3;
        assert_eq!(game.step_rate(), 18.0);
        game.score = 20;
        assert_eq!(game.step_rate(), MAX_RATE);
    }

    #[test]
    fn test_time_attack_expires() {
        let mut game = Snake::new(1);
        game.start(Mode::TimeAttack);
        game.tick(&press(Key::Up), SIM_DT);
        game.elapsed = TIME_LIMIT;
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
        let events = game.drain_events();
        assert!(matches!(
            &events[0],
            GameEvent::RunFinished { board: Some(b), .. } if b == "Contra Reloj"
        ));
    }

    #[test]
    fn test_p_opens_mode_leaderboard() {
        let mut game = Snake::new(1);
        game.start(Mode::Portal);
        game.tick(&press(Key::Char('p')), SIM_DT);
        assert_eq!(game.phase, GamePhase::Records);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RequestLeaderboard {
                board: Some("Portal".to_string())
            }]
        );
        game.tick(&press(Key::Back), SIM_DT);
        assert_eq!(game.phase, GamePhase::Playing);
    }

    fn arb_dir() -> impl Strategy<Value = Cell> {
        prop_oneof![Just((1, 0)), Just((-1, 0)), Just((0, 1)), Just((0, -1))]
    }

    proptest! {
        #[test]
        fn test_body_never_overlaps(seed in any::<u64>(), dirs in prop::collection::vec(arb_dir(), 1..200)) {
            let mut game = Snake::new(seed);
            game.start(Mode::Portal);
            for dir in dirs {
                game.serpent.steer(dir);
                if !game.advance() {
                    break;
                }
                let mut cells: Vec<Cell> = game.serpent.body.iter().copied().collect();
                cells.sort();
                cells.dedup();
                prop_assert_eq!(cells.len(), game.serpent.body.len());
            }
        }
    }
}
