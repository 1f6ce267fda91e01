//! Dino runner
//!
//! Jump over cacti that scroll in ever faster. The score climbs every tick
//! and the sky turns to night for a stretch every 700 points.

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 300.0;

const GROUND_Y: f32 = 250.0;
const DINO_X: f32 = 50.0;
const DINO_W: f32 = 44.0;
const DINO_H: f32 = 47.0;
const DINO_GROUND_Y: f32 = GROUND_Y - DINO_H;
const GRAVITY: f32 = 0.8;
const JUMP_VELOCITY: f32 = -15.0;
/// Collision box shrink on every side
const HITBOX_INSET: f32 = 5.0;

const INITIAL_SPEED: f32 = 6.0;
const SPEED_INCREMENT: f32 = 0.002;
const SCORE_INCREMENT: f32 = 0.15;

const CACTUS_SMALL: (f32, f32) = (17.0, 35.0);
const CACTUS_LARGE: (f32, f32) = (25.0, 50.0);
const OBSTACLE_MIN_DISTANCE: f32 = 300.0;
const OBSTACLE_MAX_DISTANCE: f32 = 600.0;

const CHECKPOINT_SCORE: u32 = 100;
const NIGHT_CYCLE: u32 = 700;
const NIGHT_LENGTH: u32 = 200;

const CLOUD_W: f32 = 46.0;
const CLOUD_H: f32 = 14.0;
const CLOUD_SPEED: f32 = 1.0;
const STAR_SIZE: f32 = 4.0;
const SKY_ITEMS: usize = 4;

const DAY_BG: Color = Color(247, 247, 247);
const NIGHT_BG: Color = Color(32, 33, 36);
const DAY_INK: Color = Color(83, 83, 83);
const NIGHT_INK: Color = Color(150, 150, 150);

pub static INFO: GameInfo = GameInfo {
    title: "Dino Chrome",
    db_name: "Dino Chrome",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::HigherIsBetter,
    names: NamePolicy::Settings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Playing,
    Paused,
    GameOver,
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dino {
    pub y: f32,
    pub vy: f32,
    pub jumping: bool,
    pub dead: bool,
}

impl Dino {
    fn new() -> Self {
        Self {
            y: DINO_GROUND_Y,
            vy: 0.0,
            jumping: false,
            dead: false,
        }
    }

    /// Only from the ground
    pub fn jump(&mut self) {
        if !self.jumping && !self.dead {
            self.jumping = true;
            self.vy = JUMP_VELOCITY;
        }
    }

    fn update(&mut self) {
        if self.dead || !self.jumping {
            return;
        }
        self.vy += GRAVITY;
        self.y += self.vy;
        if self.y >= DINO_GROUND_Y {
            self.y = DINO_GROUND_Y;
            self.vy = 0.0;
            self.jumping = false;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(DINO_X, self.y, DINO_W, DINO_H)
    }

    pub fn hitbox(&self) -> Rect {
        self.rect().inset(HITBOX_INSET)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cactus {
    pub x: f32,
    pub large: bool,
}

impl Cactus {
    pub fn rect(&self) -> Rect {
        let (w, h) = if self.large { CACTUS_LARGE } else { CACTUS_SMALL };
        Rect::new(self.x, GROUND_Y - h, w, h)
    }
}

/// Cloud by day, star by night
#[derive(Debug, Clone, PartialEq)]
pub struct SkyItem {
    pub pos: Vec2,
    pub star: bool,
}

#[derive(Debug, Clone)]
pub struct DinoRun {
    pub phase: GamePhase,
    /// First jump press starts the scroll
    pub started: bool,
    pub dino: Dino,
    pub cacti: Vec<Cactus>,
    pub sky: Vec<SkyItem>,
    pub speed: f32,
    pub score: f32,
    pub best: i64,
    pub last_checkpoint: u32,
    /// Seconds the checkpoint flash stays on screen
    pub checkpoint_flash: f32,
    pub spawn_timer: f32,
    pub next_spawn: f32,
    pub ground_offset: f32,
    pub report: Option<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl DinoRun {
    pub fn new(seed: u64) -> Self {
        let mut rng = RngState::new(seed);
        let next_spawn = rng.range(1.5..2.5);
        Self {
            phase: GamePhase::Menu,
            started: false,
            dino: Dino::new(),
            cacti: Vec::new(),
            sky: Vec::new(),
            speed: INITIAL_SPEED,
            score: 0.0,
            best: 0,
            last_checkpoint: 0,
            checkpoint_flash: 0.0,
            spawn_timer: 0.0,
            next_spawn,
            ground_offset: 0.0,
            report: None,
            rng,
            events: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.started = false;
        self.dino = Dino::new();
        self.cacti.clear();
        self.speed = INITIAL_SPEED;
        self.score = 0.0;
        self.last_checkpoint = 0;
        self.checkpoint_flash = 0.0;
        self.spawn_timer = 0.0;
        self.next_spawn = self.rng.range(1.5..2.5);
        self.ground_offset = 0.0;
        self.report = None;
        self.sky = (0..SKY_ITEMS)
            .map(|i| SkyItem {
                pos: Vec2::new(
                    i as f32 * WIDTH / SKY_ITEMS as f32 + self.rng.range(0.0..100.0),
                    self.rng.range(30.0..120.0),
                ),
                star: false,
            })
            .collect();
        self.phase = GamePhase::Playing;
    }

    pub fn night(&self) -> bool {
        let score = self.score as u32;
        score >= NIGHT_CYCLE && score % NIGHT_CYCLE < NIGHT_LENGTH
    }

    fn spawn_cactus(&mut self) {
        // small, small, large
        let large = self.rng.range(0..3) == 2;
        self.cacti.push(Cactus { x: WIDTH, large });
    }

    fn update_sky(&mut self) {
        let night = self.night();
        for item in &mut self.sky {
            item.pos.x -= CLOUD_SPEED;
            item.star = night;
        }
        let width = if night { STAR_SIZE } else { CLOUD_W };
        for i in 0..self.sky.len() {
            if self.sky[i].pos.x < -width {
                let x = WIDTH + self.rng.range(0.0..300.0);
                let y = self.rng.range(30.0..120.0);
                self.sky[i].pos = Vec2::new(x, y);
            }
        }
    }

    fn update_playing(&mut self, input: &TickInput, dt: f32) {
        if input.pause_pressed() {
            self.phase = GamePhase::Paused;
            return;
        }

        let jump = input.was_pressed(Key::Action) || input.was_pressed(Key::Up);
        if jump {
            if self.started {
                self.dino.jump();
            } else {
                self.started = true;
            }
        }
        if !self.started {
            return;
        }

        self.dino.update();

        self.speed += SPEED_INCREMENT;
        for cactus in &mut self.cacti {
            cactus.x -= self.speed;
        }
        self.cacti.retain(|c| c.x >= -c.rect().w);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.next_spawn {
            self.spawn_cactus();
            self.spawn_timer = 0.0;
            let distance = self.rng.range(OBSTACLE_MIN_DISTANCE..OBSTACLE_MAX_DISTANCE);
            self.next_spawn = distance / self.speed / 60.0;
        }

        self.ground_offset = (self.ground_offset + self.speed) % 20.0;
        self.update_sky();

        self.score += SCORE_INCREMENT;
        let checkpoint = self.score as u32 / CHECKPOINT_SCORE;
        if checkpoint > self.last_checkpoint {
            self.last_checkpoint = checkpoint;
            self.checkpoint_flash = 1.0;
        }
        self.checkpoint_flash = (self.checkpoint_flash - dt).max(0.0);

        let hitbox = self.dino.hitbox();
        if self.cacti.iter().any(|c| hitbox.intersects(&c.rect())) {
            self.dino.dead = true;
            let score = self.score as i64;
            self.best = self.best.max(score);
            log::info!("Dino run over: {score}");
            self.events.push(GameEvent::RunFinished { score, board: None });
            self.phase = GamePhase::GameOver;
        }
    }

    fn draw_scene(&self, list: &mut DrawList) {
        let night = self.night();
        list.clear(if night { NIGHT_BG } else { DAY_BG });
        let ink = if night { NIGHT_INK } else { DAY_INK };

        for item in &self.sky {
            if item.star {
                list.rect(Rect::new(item.pos.x, item.pos.y, STAR_SIZE, STAR_SIZE), Color::WHITE);
            } else {
                list.rect(Rect::new(item.pos.x, item.pos.y, CLOUD_W, CLOUD_H), Color(220, 220, 220));
            }
        }

        list.line(Vec2::new(0.0, GROUND_Y), Vec2::new(WIDTH, GROUND_Y), ink);
        let mut x = -self.ground_offset;
        while x < WIDTH {
            list.line(Vec2::new(x, GROUND_Y + 4.0), Vec2::new(x + 3.0, GROUND_Y + 4.0), ink);
            x += 20.0;
        }

        for cactus in &self.cacti {
            let r = cactus.rect();
            list.rect(r, ink);
            // arms
            list.rect(Rect::new(r.x - 4.0, r.y + r.h * 0.3, 4.0, r.h * 0.3), ink);
            list.rect(Rect::new(r.right(), r.y + r.h * 0.2, 4.0, r.h * 0.3), ink);
        }

        let body = self.dino.rect();
        list.rect(Rect::new(body.x, body.y + 12.0, 30.0, 25.0), ink);
        list.rect(Rect::new(body.x + 20.0, body.y, 24.0, 18.0), ink);
        list.rect(Rect::new(body.x + 6.0, body.y + 37.0, 6.0, 10.0), ink);
        list.rect(Rect::new(body.x + 18.0, body.y + 37.0, 6.0, 10.0), ink);
        let eye = if self.dino.dead { Color::RED } else if night { NIGHT_BG } else { DAY_BG };
        list.rect(Rect::new(body.x + 34.0, body.y + 4.0, 4.0, 4.0), eye);

        let flash = self.checkpoint_flash > 0.0 && (self.checkpoint_flash * 8.0) as u32 % 2 == 0;
        if !flash {
            list.text(
                Vec2::new(WIDTH - 20.0, 20.0),
                format!("HI {:05}  {:05}", self.best, self.score as u32),
                ink,
                Align::Right,
            );
        }
        if !self.started {
            list.title(120.0, "Press SPACE or UP to start", ink);
        }
    }
}

impl Game for DinoRun {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Menu => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start();
                } else if input.letter_pressed('r') {
                    self.report = None;
                    self.events.push(GameEvent::RequestLeaderboard { board: None });
                    self.phase = GamePhase::Records;
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Playing => self.update_playing(input, dt),
            GamePhase::Paused => {
                if input.pause_pressed() || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Playing;
                } else if input.letter_pressed('m') {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start();
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
                list.clear(DAY_BG);
                list.title(80.0, "DINO CHROME", DAY_INK);
                list.title(140.0, "ENTER  Play", DAY_INK);
                list.title(170.0, "R  Records", DAY_INK);
                list.title(200.0, "ESC  Exit", DAY_INK);
            }
            GamePhase::Playing => self.draw_scene(list),
            GamePhase::Paused => {
                self.draw_scene(list);
                list.title(HEIGHT / 2.0, "PAUSED", Color::ORANGE);
            }
            GamePhase::GameOver => {
                self.draw_scene(list);
                let mut lines = vec![format!("Score: {}", self.score as u32)];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("ENTER  Retry    M  Menu".to_string());
                list.dialog("GAME OVER", &lines, Color::RED);
            }
            GamePhase::Records => {
                list.clear(DAY_BG);
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard("TOP 10", &report, DAY_INK);
            }
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_report(&mut self, report: ScoreReport) {
        if let Some(best) = report.best {
            self.best = self.best.max(best);
        }
        self.report = Some(report);
    }
}
