//! Arkanoid
//!
//! A paddle, one or more balls, five fixed brick layouts and falling
//! power-ups. The run is scored across levels and submitted when the last
//! life is lost or the final layout is cleared.

mod levels;

pub use levels::{INDESTRUCTIBLE, LEVELS, LevelDef, brick_color, build_bricks};

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder, Side, collision_side};
use crate::heading;
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

const PADDLE_W: f32 = 100.0;
const PADDLE_H: f32 = 15.0;
const PADDLE_SPEED: f32 = 8.0;
const PADDLE_Y: f32 = HEIGHT - 50.0;
const PADDLE_LERP: f32 = 0.3;

const BALL_RADIUS: f32 = 8.0;
const BALL_SPEED: f32 = 6.0;
const BALL_SPEED_STEP: f32 = 0.1;
const BALL_MAX_SPEED: f32 = 12.0;
/// Serve position, just above the paddle
const BALL_START: Vec2 = Vec2::new(WIDTH / 2.0, PADDLE_Y - 30.0);

const BRICK_W: f32 = 60.0;
const BRICK_H: f32 = 25.0;
const BRICK_PADDING: f32 = 5.0;
const BRICK_OFFSET_TOP: f32 = 80.0;
const BRICK_OFFSET_LEFT: f32 = 35.0;

const POWERUP_SIZE: f32 = 30.0;
const POWERUP_FALL: f32 = 3.0;
const POWERUP_CHANCE: f64 = 0.15;
/// Seconds a timed power-up lasts
const POWERUP_DURATION: f32 = 10.0;

const INITIAL_LIVES: u32 = 3;
const BONUS_PERFECT_LEVEL: i64 = 500;
const BONUS_POWERUP: i64 = 50;

pub static INFO: GameInfo = GameInfo {
    title: "Arkanoid",
    db_name: "Arkanoid",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::HigherIsBetter,
    names: NamePolicy::Settings,
};

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    LevelSelect,
    Playing,
    Paused,
    /// Layout cleared, waiting to continue
    LevelClear,
    GameOver { won: bool },
    Records,
}

/// A destructible (or not) brick
#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    pub rect: Rect,
    /// Remaining hits
    pub hits: u8,
    /// Type the brick was built with
    pub kind: u8,
    pub color: Color,
}

impl Brick {
    pub fn new(rect: Rect, kind: u8, color: Color) -> Self {
        Self {
            rect,
            hits: kind,
            kind,
            color,
        }
    }

    pub fn indestructible(&self) -> bool {
        self.kind == INDESTRUCTIBLE
    }

    /// Register a hit, returns true when the brick breaks
    pub fn hit(&mut self) -> bool {
        if self.indestructible() {
            return false;
        }
        self.hits = self.hits.saturating_sub(1);
        self.hits == 0
    }

    pub fn points(&self) -> i64 {
        match self.kind {
            1 => 10,
            2 => 20,
            3 => 30,
            _ => 0,
        }
    }

    /// Color dimmed by damage taken
    fn current_color(&self) -> Color {
        if self.indestructible() || self.kind == 0 {
            return self.color;
        }
        let f = self.hits as f32 / self.kind as f32;
        Color::BLACK.mix(self.color, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds of piercing left
    pub pierce_timer: f32,
}

impl Ball {
    pub fn new(pos: Vec2, angle_degrees: f32) -> Self {
        Self {
            pos,
            vel: heading(angle_degrees) * BALL_SPEED,
            pierce_timer: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, BALL_RADIUS * 2.0, BALL_RADIUS * 2.0)
    }

    pub fn piercing(&self) -> bool {
        self.pierce_timer > 0.0
    }

    /// Move one tick and bounce off the side walls and ceiling
    fn advance(&mut self, dt: f32) {
        self.pos += self.vel;

        if self.pos.x - BALL_RADIUS <= 0.0 {
            self.pos.x = BALL_RADIUS;
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x + BALL_RADIUS >= WIDTH {
            self.pos.x = WIDTH - BALL_RADIUS;
            self.vel.x = -self.vel.x.abs();
        }
        if self.pos.y - BALL_RADIUS <= 0.0 {
            self.pos.y = BALL_RADIUS;
            self.vel.y = self.vel.y.abs();
        }

        if self.pierce_timer > 0.0 {
            self.pierce_timer = (self.pierce_timer - dt).max(0.0);
        }

        let speed = self.vel.length();
        if speed > BALL_MAX_SPEED {
            self.vel *= BALL_MAX_SPEED / speed;
        }
    }

    /// Angle depends on where the paddle was struck
    fn bounce_paddle(&mut self, paddle: &Rect) {
        let impact = ((self.pos.x - paddle.center().x) / (paddle.w / 2.0)).clamp(-1.0, 1.0);
        let speed = self.vel.length();
        self.vel = heading(-90.0 + impact * 60.0) * speed;
        if self.vel.y > 0.0 {
            self.vel.y = -self.vel.y;
        }
        self.pos.y = paddle.top() - BALL_RADIUS;
    }

    fn reflect(&mut self, side: Side) {
        if side.is_vertical() {
            self.vel.y = -self.vel.y;
        } else {
            self.vel.x = -self.vel.x;
        }
    }

    fn scale_speed(&mut self, factor: f32) {
        self.vel *= factor;
    }

    fn increase_speed(&mut self) {
        let speed = self.vel.length();
        if speed > 0.0 && speed < BALL_MAX_SPEED {
            self.scale_speed((speed + BALL_SPEED_STEP) / speed);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub target_x: f32,
    pub width: f32,
    /// Seconds until a size power-up wears off
    pub size_timer: f32,
}

impl Paddle {
    fn new() -> Self {
        let x = (WIDTH - PADDLE_W) / 2.0;
        Self {
            x,
            target_x: x,
            width: PADDLE_W,
            size_timer: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, PADDLE_Y, self.width, PADDLE_H)
    }

    fn update(&mut self, input: &TickInput, use_mouse: bool, dt: f32) {
        if use_mouse {
            if let Some(p) = input.pointer {
                self.target_x = p.x - self.width / 2.0;
            }
        }
        if input.left {
            self.target_x -= PADDLE_SPEED;
        }
        if input.right {
            self.target_x += PADDLE_SPEED;
        }
        self.target_x = self.target_x.clamp(0.0, WIDTH - self.width);
        self.x += (self.target_x - self.x) * PADDLE_LERP;

        if self.size_timer > 0.0 {
            self.size_timer -= dt;
            if self.size_timer <= 0.0 {
                self.size_timer = 0.0;
                self.width = PADDLE_W;
            }
        }
    }

    fn resize(&mut self, width: f32) {
        self.width = width;
        self.size_timer = POWERUP_DURATION;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerKind {
    Expand,
    Shrink,
    Multiball,
    Slow,
    Fast,
    Pierce,
    Life,
}

impl PowerKind {
    const ALL: [PowerKind; 7] = [
        PowerKind::Expand,
        PowerKind::Shrink,
        PowerKind::Multiball,
        PowerKind::Slow,
        PowerKind::Fast,
        PowerKind::Pierce,
        PowerKind::Life,
    ];
    const WEIGHTS: [u32; 7] = [25, 10, 20, 15, 10, 15, 5];

    fn color(self) -> Color {
        match self {
            PowerKind::Expand => Color(100, 255, 100),
            PowerKind::Shrink => Color(255, 100, 100),
            PowerKind::Multiball => Color(255, 255, 100),
            PowerKind::Slow => Color(100, 200, 255),
            PowerKind::Fast => Color(255, 150, 50),
            PowerKind::Pierce => Color(255, 100, 255),
            PowerKind::Life => Color(255, 50, 50),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            PowerKind::Expand => "<>",
            PowerKind::Shrink => "><",
            PowerKind::Multiball => "oo",
            PowerKind::Slow => "v",
            PowerKind::Fast => "^",
            PowerKind::Pierce => "!",
            PowerKind::Life => "+",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PowerKind::Expand => "Big paddle",
            PowerKind::Shrink => "Small paddle",
            PowerKind::Multiball => "Multiball",
            PowerKind::Slow => "Slow",
            PowerKind::Fast => "Fast",
            PowerKind::Pierce => "Piercing",
            PowerKind::Life => "Extra life",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    /// Centre
    pub pos: Vec2,
    pub kind: PowerKind,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, POWERUP_SIZE, POWERUP_SIZE)
    }
}

/// Full Arkanoid state
#[derive(Debug, Clone)]
pub struct Arkanoid {
    pub phase: GamePhase,
    pub level: usize,
    pub score: i64,
    pub lives: u32,
    pub lives_lost_in_level: u32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub powerups: Vec<PowerUp>,
    /// Recent pickups shown in the HUD
    pub recent: Vec<PowerKind>,
    pub use_mouse: bool,
    pub report: Option<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Arkanoid {
    pub fn new(seed: u64, use_mouse: bool) -> Self {
        Self {
            phase: GamePhase::Menu,
            level: 0,
            score: 0,
            lives: INITIAL_LIVES,
            lives_lost_in_level: 0,
            paddle: Paddle::new(),
            balls: Vec::new(),
            bricks: Vec::new(),
            powerups: Vec::new(),
            recent: Vec::new(),
            use_mouse,
            report: None,
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    fn serve_ball(&mut self) -> Ball {
        let angle = self.rng.range(-120.0..-60.0);
        Ball::new(BALL_START, angle)
    }

    /// Start a fresh run at a level
    pub fn start_run(&mut self, level: usize) {
        self.score = 0;
        self.lives = INITIAL_LIVES;
        self.report = None;
        self.start_level(level);
    }

    pub fn start_level(&mut self, level: usize) {
        let Some(bricks) = build_bricks(level) else {
            log::warn!("No Arkanoid level {level}");
            self.phase = GamePhase::Menu;
            return;
        };
        log::debug!("Arkanoid level {} ({})", level + 1, LEVELS[level].name);
        self.level = level;
        self.bricks = bricks;
        self.paddle = Paddle::new();
        self.balls = vec![self.serve_ball()];
        self.powerups.clear();
        self.recent.clear();
        self.lives_lost_in_level = 0;
        self.phase = GamePhase::Playing;
    }

    fn finish(&mut self, won: bool) {
        log::info!("Arkanoid run over: score {} (won: {won})", self.score);
        self.events.push(GameEvent::RunFinished {
            score: self.score,
            board: None,
        });
        self.phase = GamePhase::GameOver { won };
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.lives_lost_in_level += 1;
        if self.lives == 0 {
            self.finish(false);
        } else {
            self.balls = vec![self.serve_ball()];
            self.paddle = Paddle::new();
        }
    }

    fn open_records(&mut self) {
        self.report = None;
        self.events.push(GameEvent::RequestLeaderboard { board: None });
        self.phase = GamePhase::Records;
    }

    fn update_playing(&mut self, input: &TickInput, dt: f32) {
        if input.pause_pressed() {
            self.phase = GamePhase::Paused;
            return;
        }
        if input.letter_pressed('m') {
            self.use_mouse = !self.use_mouse;
        }

        self.paddle.update(input, self.use_mouse, dt);

        let mut i = 0;
        while i < self.balls.len() {
            self.balls[i].advance(dt);

            let paddle = self.paddle.rect();
            let ball = &mut self.balls[i];
            if ball.vel.y > 0.0 && ball.rect().intersects(&paddle) {
                ball.bounce_paddle(&paddle);
            }

            self.hit_bricks(i);

            if self.balls[i].pos.y - BALL_RADIUS > HEIGHT {
                self.balls.remove(i);
            } else {
                i += 1;
            }
        }

        if self.balls.is_empty() {
            self.lose_life();
            if self.phase != GamePhase::Playing {
                return;
            }
        }

        self.update_powerups();

        if self.bricks.iter().all(Brick::indestructible) {
            self.clear_level();
        }
    }

    /// Resolve brick contacts for one ball
    fn hit_bricks(&mut self, ball_index: usize) {
        let mut j = 0;
        while j < self.bricks.len() {
            let ball_rect = self.balls[ball_index].rect();
            if !ball_rect.intersects(&self.bricks[j].rect) {
                j += 1;
                continue;
            }

            let piercing = self.balls[ball_index].piercing();
            if !piercing {
                let side = collision_side(&ball_rect, &self.bricks[j].rect);
                self.balls[ball_index].reflect(side);
            }

            if self.bricks[j].hit() {
                let brick = self.bricks.remove(j);
                self.score += brick.points();
                self.maybe_drop(brick.rect.center());
                for ball in &mut self.balls {
                    ball.increase_speed();
                }
            } else {
                j += 1;
            }

            if !piercing {
                break;
            }
        }
    }

    fn maybe_drop(&mut self, pos: Vec2) {
        if self.rng.chance(POWERUP_CHANCE) {
            let kind = PowerKind::ALL[self.rng.weighted(&PowerKind::WEIGHTS)];
            self.powerups.push(PowerUp { pos, kind });
        }
    }

    fn update_powerups(&mut self) {
        let paddle = self.paddle.rect();
        let mut collected = Vec::new();
        self.powerups.retain_mut(|p| {
            p.pos.y += POWERUP_FALL;
            if p.rect().intersects(&paddle) {
                collected.push(p.kind);
                return false;
            }
            p.pos.y <= HEIGHT
        });
        for kind in collected {
            self.apply_powerup(kind);
        }
    }

    pub fn apply_powerup(&mut self, kind: PowerKind) {
        self.score += BONUS_POWERUP;
        match kind {
            PowerKind::Expand => self.paddle.resize((PADDLE_W * 1.5).min(WIDTH * 0.3)),
            PowerKind::Shrink => self.paddle.resize((PADDLE_W * 0.6).max(50.0)),
            PowerKind::Multiball => {
                if let Some(first) = self.balls.first() {
                    let ball = Ball::new(first.pos, -45.0);
                    self.balls.push(ball);
                }
            }
            PowerKind::Slow => {
                for ball in &mut self.balls {
                    let speed = ball.vel.length();
                    if speed > 0.0 {
                        ball.scale_speed(0.7f32.max(BALL_SPEED / speed));
                    }
                }
            }
            PowerKind::Fast => {
                for ball in &mut self.balls {
                    let speed = ball.vel.length();
                    if speed > 0.0 {
                        ball.scale_speed(1.3f32.min(BALL_MAX_SPEED / speed));
                    }
                }
            }
            PowerKind::Pierce => {
                for ball in &mut self.balls {
                    ball.pierce_timer = POWERUP_DURATION;
                }
            }
            PowerKind::Life => self.lives += 1,
        }
        self.recent.push(kind);
        if self.recent.len() > 3 {
            self.recent.remove(0);
        }
    }

    fn clear_level(&mut self) {
        if self.lives_lost_in_level == 0 {
            self.score += BONUS_PERFECT_LEVEL;
        }
        if self.level + 1 >= LEVELS.len() {
            self.finish(true);
        } else {
            self.phase = GamePhase::LevelClear;
        }
    }

    fn draw_field(&self, list: &mut DrawList) {
        for brick in &self.bricks {
            let color = brick.current_color();
            list.rect(brick.rect, color);
            if brick.indestructible() {
                let mut x = brick.rect.x;
                while x < brick.rect.right() {
                    list.line(
                        Vec2::new(x, brick.rect.top()),
                        Vec2::new(x, brick.rect.bottom()),
                        Color(100, 100, 100),
                    );
                    x += 8.0;
                }
                list.frame(brick.rect, Color(120, 120, 120));
            } else {
                list.frame(brick.rect, color.shade(-40));
                if brick.hits > 1 {
                    list.text(
                        brick.rect.center(),
                        brick.hits.to_string(),
                        Color::WHITE,
                        Align::Center,
                    );
                }
            }
        }

        list.rect(self.paddle.rect(), Color(100, 200, 255));

        for ball in &self.balls {
            if ball.piercing() {
                list.circle(ball.pos, BALL_RADIUS + 2.0, Color(255, 150, 150));
            }
            list.circle(ball.pos, BALL_RADIUS, Color::WHITE);
        }

        for p in &self.powerups {
            list.rect(p.rect(), p.kind.color());
            list.frame(p.rect(), Color::WHITE);
            list.text(p.pos, p.kind.symbol(), Color::WHITE, Align::Center);
        }

        list.text(
            Vec2::new(10.0, 20.0),
            format!("Score: {}", self.score),
            Color::WHITE,
            Align::Left,
        );
        list.title(20.0, format!("Level {}: {}", self.level + 1, LEVELS[self.level].name), Color::CYAN);
        list.text(
            Vec2::new(WIDTH - 10.0, 20.0),
            format!("Lives: {}", self.lives),
            Color::RED,
            Align::Right,
        );
        for (i, kind) in self.recent.iter().enumerate() {
            list.text(
                Vec2::new(10.0, 45.0 + i as f32 * 18.0),
                kind.label(),
                kind.color(),
                Align::Left,
            );
        }
    }
}

impl Game for Arkanoid {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Menu => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start_run(0);
                } else if input.letter_pressed('l') {
                    self.phase = GamePhase::LevelSelect;
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.letter_pressed('m') {
                    self.use_mouse = !self.use_mouse;
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::LevelSelect => {
                if let Some(d) = input.digit() {
                    let level = d as usize;
                    if (1..=LEVELS.len()).contains(&level) {
                        self.start_run(level - 1);
                    }
                } else if input.was_pressed(Key::Back) {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::Playing => self.update_playing(input, dt),
            GamePhase::Paused => {
                if input.pause_pressed() || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Playing;
                } else if input.letter_pressed('r') {
                    self.start_level(self.level);
                } else if input.letter_pressed('m') {
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::LevelClear => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start_level(self.level + 1);
                } else if input.letter_pressed('m') || input.was_pressed(Key::Back) {
                    // Leaving between levels still banks the run
                    self.finish(true);
                    self.phase = GamePhase::Menu;
                }
            }
            GamePhase::GameOver { .. } => {
                if input.was_pressed(Key::Confirm) {
                    self.start_run(0);
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
        list.clear(Color(20, 20, 30));
        match self.phase {
            GamePhase::Menu => {
                list.title(150.0, "ARKANOID", Color::CYAN);
                let control = if self.use_mouse { "mouse" } else { "keyboard" };
                let lines = [
                    "ENTER  Play".to_string(),
                    "L  Level select".to_string(),
                    "R  Records".to_string(),
                    format!("M  Control: {control}"),
                    "ESC  Exit".to_string(),
                ];
                for (i, line) in lines.iter().enumerate() {
                    list.title(260.0 + i as f32 * 40.0, line.clone(), Color::WHITE);
                }
            }
            GamePhase::LevelSelect => {
                list.title(80.0, "SELECT LEVEL", Color::CYAN);
                for (i, def) in LEVELS.iter().enumerate() {
                    let row = i / 3;
                    let col = i % 3;
                    let rect = Rect::new(
                        150.0 + col as f32 * 200.0,
                        150.0 + row as f32 * 150.0,
                        150.0,
                        100.0,
                    );
                    list.panel(rect, Color(40, 40, 60), brick_color(i, 2));
                    list.text(
                        rect.center() - Vec2::new(0.0, 20.0),
                        format!("{}", i + 1),
                        Color::WHITE,
                        Align::Center,
                    );
                    list.text(rect.center(), def.name, Color::WHITE, Align::Center);
                    list.text(
                        rect.center() + Vec2::new(0.0, 20.0),
                        def.difficulty,
                        Color::GRAY,
                        Align::Center,
                    );
                }
                list.title(HEIGHT - 60.0, "Press 1-5, ESC to go back", Color::GRAY);
            }
            GamePhase::Playing => self.draw_field(list),
            GamePhase::Paused => {
                self.draw_field(list);
                let lines = [
                    "ESC/P  Continue".to_string(),
                    "R  Restart level".to_string(),
                    "M  Menu".to_string(),
                ];
                list.dialog("PAUSED", &lines, Color::YELLOW);
            }
            GamePhase::LevelClear => {
                self.draw_field(list);
                let mut lines = vec![
                    format!("{} cleared", LEVELS[self.level].name),
                    format!("Score: {}", self.score),
                ];
                if self.lives_lost_in_level == 0 {
                    lines.push(format!("Perfect! +{BONUS_PERFECT_LEVEL}"));
                }
                lines.push("ENTER  Next level    M  Menu".to_string());
                list.dialog("LEVEL COMPLETE", &lines, Color::GREEN);
            }
            GamePhase::GameOver { won } => {
                let (heading, accent) = if won {
                    ("VICTORY", Color::GREEN)
                } else {
                    ("GAME OVER", Color::RED)
                };
                let mut lines = vec![format!("Score: {}", self.score)];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("ENTER  Play again    M  Menu".to_string());
                list.dialog(heading, &lines, accent);
            }
            GamePhase::Records => {
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard("TOP SCORES", &report, Color::CYAN);
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

    fn playing() -> Arkanoid {
        let mut game = Arkanoid::new(12345, false);
        game.start_run(0);
        game
    }

    #[test]
    fn test_ball_reflects_off_side_wall() {
        let mut ball = Ball::new(Vec2::new(10.0, 300.0), 180.0);
        assert!(ball.vel.x < 0.0);
        ball.advance(SIM_DT);
        assert!(ball.vel.x > 0.0);
        assert_eq!(ball.pos.x, BALL_RADIUS);
    }

    #[test]
    fn test_ball_reflects_off_ceiling() {
        let mut ball = Ball::new(Vec2::new(400.0, 10.0), -90.0);
        ball.advance(SIM_DT);
        assert!(ball.vel.y > 0.0);
    }

    #[test]
    fn test_brick_breaks_when_hits_reach_zero() {
        let mut brick = Brick::new(Rect::new(0.0, 0.0, BRICK_W, BRICK_H), 2, Color::RED);
        assert!(!brick.hit());
        assert_eq!(brick.hits, 1);
        assert!(brick.hit());
    }

    #[test]
    fn test_indestructible_brick_survives() {
        let mut brick = Brick::new(Rect::new(0.0, 0.0, BRICK_W, BRICK_H), INDESTRUCTIBLE, Color::GRAY);
        for _ in 0..10 {
            assert!(!brick.hit());
        }
        assert_eq!(brick.points(), 0);
    }

    #[test]
    fn test_paddle_bounce_goes_up_and_keeps_speed() {
        let paddle = Rect::new(350.0, PADDLE_Y, PADDLE_W, PADDLE_H);
        let mut ball = Ball::new(Vec2::new(390.0, PADDLE_Y), 80.0);
        let speed = ball.vel.length();
        ball.bounce_paddle(&paddle);
        assert!(ball.vel.y < 0.0);
        assert!(ball.vel.x < 0.0, "left of centre deflects left");
        assert!((ball.vel.length() - speed).abs() < 1e-4);
        assert_eq!(ball.pos.y, PADDLE_Y - BALL_RADIUS);
    }

    #[test]
    fn test_normal_ball_stops_after_first_brick() {
        let mut game = playing();
        game.bricks = vec![
            Brick::new(Rect::new(380.0, 200.0, BRICK_W, BRICK_H), 1, Color::RED),
            Brick::new(Rect::new(380.0, 200.0, BRICK_W, BRICK_H), 1, Color::RED),
            Brick::new(Rect::new(0.0, 0.0, BRICK_W, BRICK_H), 1, Color::RED),
        ];
        game.balls = vec![Ball::new(Vec2::new(400.0, 230.0), -90.0)];
        game.hit_bricks(0);
        assert_eq!(game.bricks.len(), 2);
        assert!(game.balls[0].vel.y > 0.0);
        assert_eq!(game.score, 10);
    }

    #[test]
    fn test_piercing_ball_keeps_going() {
        let mut game = playing();
        game.bricks = vec![
            Brick::new(Rect::new(380.0, 200.0, BRICK_W, BRICK_H), 1, Color::RED),
            Brick::new(Rect::new(380.0, 200.0, BRICK_W, BRICK_H), 3, Color::RED),
            Brick::new(Rect::new(0.0, 0.0, BRICK_W, BRICK_H), 1, Color::RED),
        ];
        let mut ball = Ball::new(Vec2::new(400.0, 230.0), -90.0);
        ball.pierce_timer = 5.0;
        game.balls = vec![ball];
        game.hit_bricks(0);
        assert_eq!(game.bricks.len(), 2);
        assert_eq!(game.bricks[0].hits, 2);
        assert!(game.balls[0].vel.y < 0.0);
    }

    #[test]
    fn test_losing_last_ball_costs_a_life() {
        let mut game = playing();
        game.balls = vec![Ball::new(Vec2::new(400.0, HEIGHT + 20.0), 90.0)];
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.lives, INITIAL_LIVES - 1);
        assert_eq!(game.balls.len(), 1);
        assert_eq!(game.phase, GamePhase::Playing);
    }

    #[test]
    fn test_last_life_finishes_run() {
        let mut game = playing();
        game.lives = 1;
        game.score = 120;
        game.balls = vec![Ball::new(Vec2::new(400.0, HEIGHT + 20.0), 90.0)];
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver { won: false });
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RunFinished {
                score: 120,
                board: None
            }]
        );
    }

    #[test]
    fn test_perfect_clear_awards_bonus() {
        let mut game = playing();
        game.bricks = vec![Brick::new(Rect::new(0.0, 0.0, BRICK_W, BRICK_H), INDESTRUCTIBLE, Color::GRAY)];
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::LevelClear);
        assert_eq!(game.score, BONUS_PERFECT_LEVEL);
    }

    #[test]
    fn test_final_level_clear_submits() {
        let mut game = Arkanoid::new(1, false);
        game.start_run(LEVELS.len() - 1);
        game.lives_lost_in_level = 1;
        game.bricks.retain(Brick::indestructible);
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver { won: true });
        assert_eq!(game.drain_events().len(), 1);
    }

    #[test]
    fn test_powerups() {
        let mut game = playing();
        game.apply_powerup(PowerKind::Expand);
        assert_eq!(game.paddle.width, 150.0);
        game.apply_powerup(PowerKind::Shrink);
        assert_eq!(game.paddle.width, 60.0);
        game.apply_powerup(PowerKind::Life);
        assert_eq!(game.lives, INITIAL_LIVES + 1);
        game.apply_powerup(PowerKind::Multiball);
        assert_eq!(game.balls.len(), 2);
        game.apply_powerup(PowerKind::Fast);
        assert!(game.balls.iter().all(|b| b.vel.length() <= BALL_MAX_SPEED + 1e-3));
        assert_eq!(game.score, 5 * BONUS_POWERUP);
        assert_eq!(game.recent.len(), 3);
    }

    #[test]
    fn test_pause_toggle() {
        let mut game = playing();
        let pause = TickInput {
            pressed: vec![Key::Back],
            ..Default::default()
        };
        game.tick(&pause, SIM_DT);
        assert_eq!(game.phase, GamePhase::Paused);
        let frozen = game.balls[0].pos;
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.balls[0].pos, frozen);
        game.tick(&pause, SIM_DT);
        assert_eq!(game.phase, GamePhase::Playing);
    }

    #[test]
    fn test_records_requests_leaderboard() {
        let mut game = Arkanoid::new(1, false);
        let input = TickInput {
            pressed: vec![Key::Char('r')],
            ..Default::default()
        };
        game.tick(&input, SIM_DT);
        assert_eq!(game.phase, GamePhase::Records);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RequestLeaderboard { board: None }]
        );
    }
}
