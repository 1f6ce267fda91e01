//! Flappy Bird

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::heading;
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 400.0;
const HEIGHT: f32 = 600.0;
/// Top of the ground strip
const GROUND_Y: f32 = 550.0;

const BIRD_X: f32 = 100.0;
const BIRD_RADIUS: f32 = 15.0;
const GRAVITY: f32 = 0.5;
const FLAP: f32 = -10.0;

const PIPE_W: f32 = 60.0;
const PIPE_GAP: f32 = 200.0;
const PIPE_SPEED: f32 = 3.0;
const PIPE_SPACING: f32 = 300.0;
const GAP_MIN: i32 = 100;
const GAP_MAX: i32 = HEIGHT as i32 - 100 - PIPE_GAP as i32;

const SKY: Color = Color(135, 206, 235);
const EARTH: Color = Color(222, 184, 135);

pub static INFO: GameInfo = GameInfo {
    title: "Flappy Bird",
    db_name: "Flappy Bird",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::HigherIsBetter,
    names: NamePolicy::Arcade,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, space to start
    Ready,
    Playing,
    Paused,
    GameOver,
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub y: f32,
    pub vy: f32,
    pub alive: bool,
}

impl Bird {
    fn new() -> Self {
        Self {
            y: HEIGHT / 2.0,
            vy: 0.0,
            alive: true,
        }
    }

    pub fn flap(&mut self) {
        if self.alive {
            self.vy = FLAP;
        }
    }

    fn update(&mut self) {
        if !self.alive {
            return;
        }
        self.vy += GRAVITY;
        self.y += self.vy;
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = 0.0;
        }
    }

    /// Tilt in degrees, nose up while rising
    pub fn tilt(&self) -> f32 {
        if self.vy < 0.0 {
            (-self.vy * 3.0).min(30.0)
        } else {
            (-self.vy * 3.0).max(-90.0)
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(
            Vec2::new(BIRD_X, self.y),
            BIRD_RADIUS * 2.0,
            BIRD_RADIUS * 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Top of the gap
    pub gap_y: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn top(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_W, self.gap_y)
    }

    pub fn bottom(&self) -> Rect {
        let y = self.gap_y + PIPE_GAP;
        Rect::new(self.x, y, PIPE_W, HEIGHT - y)
    }

    pub fn hits(&self, bird: &Rect) -> bool {
        bird.intersects(&self.top()) || bird.intersects(&self.bottom())
    }
}

#[derive(Debug, Clone)]
pub struct Flappy {
    pub phase: GamePhase,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub score: i64,
    pub best: i64,
    pub frames: u32,
    pub report: Option<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Ready,
            bird: Bird::new(),
            pipes: Vec::new(),
            score: 0,
            best: 0,
            frames: 0,
            report: None,
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    fn pipe_at(&mut self, x: f32) -> Pipe {
        Pipe {
            x,
            gap_y: self.rng.range(GAP_MIN..=GAP_MAX) as f32,
            passed: false,
        }
    }

    pub fn start(&mut self) {
        self.bird = Bird::new();
        self.score = 0;
        self.frames = 0;
        self.report = None;
        self.pipes = vec![self.pipe_at(WIDTH + 100.0)];
        self.phase = GamePhase::Playing;
    }

    /// One physics step; returns false when the bird dies
    pub fn step(&mut self) -> bool {
        self.bird.update();
        if self.bird.y + BIRD_RADIUS >= GROUND_Y || self.bird.y - BIRD_RADIUS <= 0.0 {
            self.bird.alive = false;
            return false;
        }

        let bird = self.bird.rect();
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
            if pipe.hits(&bird) {
                self.bird.alive = false;
                return false;
            }
            if !pipe.passed && pipe.x + PIPE_W < BIRD_X {
                pipe.passed = true;
                self.score += 1;
            }
        }
        self.pipes.retain(|p| p.x + PIPE_W >= 0.0);

        self.frames += 1;
        if self.frames as f32 >= PIPE_SPACING / PIPE_SPEED {
            let pipe = self.pipe_at(WIDTH);
            self.pipes.push(pipe);
            self.frames = 0;
        }
        true
    }

    fn draw_scene(&self, list: &mut DrawList) {
        list.clear(SKY);
        for pipe in &self.pipes {
            for rect in [pipe.top(), pipe.bottom()] {
                list.rect(rect, Color(0, 200, 0));
                list.frame(rect, Color(0, 150, 0));
            }
            // Lips
            list.rect(Rect::new(pipe.x - 4.0, pipe.gap_y - 20.0, PIPE_W + 8.0, 20.0), Color(0, 150, 0));
            list.rect(
                Rect::new(pipe.x - 4.0, pipe.gap_y + PIPE_GAP, PIPE_W + 8.0, 20.0),
                Color(0, 150, 0),
            );
        }

        list.rect(Rect::new(0.0, GROUND_Y, WIDTH, HEIGHT - GROUND_Y), EARTH);
        list.line(Vec2::new(0.0, GROUND_Y), Vec2::new(WIDTH, GROUND_Y), Color(0, 150, 0));

        let center = Vec2::new(BIRD_X, self.bird.y);
        let body = if self.bird.alive { Color::YELLOW } else { Color::RED };
        list.circle(center, BIRD_RADIUS, body);
        let facing = heading(-self.bird.tilt());
        list.circle(center + facing * 8.0 + Vec2::new(0.0, -5.0), 3.0, Color::BLACK);
        list.line(center + facing * BIRD_RADIUS, center + facing * (BIRD_RADIUS + 8.0), Color::ORANGE);

        list.title(50.0, self.score.to_string(), Color::WHITE);
    }
}

impl Game for Flappy {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, _dt: f32) {
        match self.phase {
            GamePhase::Ready => {
                if input.was_pressed(Key::Action) {
                    self.start();
                } else if input.letter_pressed('r') {
                    self.report = None;
                    self.events.push(GameEvent::RequestLeaderboard { board: None });
                    self.phase = GamePhase::Records;
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Playing => {
                if input.pause_pressed() {
                    self.phase = GamePhase::Paused;
                    return;
                }
                if input.was_pressed(Key::Action) || input.was_pressed(Key::Up) {
                    self.bird.flap();
                }
                if !self.step() {
                    self.best = self.best.max(self.score);
                    log::info!("Flappy run over: {}", self.score);
                    self.events.push(GameEvent::RunFinished {
                        score: self.score,
                        board: None,
                    });
                    self.phase = GamePhase::GameOver;
                }
            }
            GamePhase::Paused => {
                if input.pause_pressed() || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Playing;
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Key::Action) {
                    self.start();
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Records => {
                if input.was_pressed(Key::Back) || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Ready;
                }
            }
        }
    }

    fn draw(&self, list: &mut DrawList) {
        match self.phase {
            GamePhase::Ready => {
                list.clear(SKY);
                list.rect(Rect::new(0.0, GROUND_Y, WIDTH, HEIGHT - GROUND_Y), EARTH);
                list.circle(Vec2::new(WIDTH / 2.0, 220.0), BIRD_RADIUS, Color::YELLOW);
                list.title(150.0, "FLAPPY BIRD", Color::WHITE);
                list.title(300.0, "SPACE to start", Color::BLUE);
                list.title(330.0, "R  Records", Color::BLUE);
                list.title(360.0, "ESC  Exit", Color::BLUE);
            }
            GamePhase::Playing => self.draw_scene(list),
            GamePhase::Paused => {
                self.draw_scene(list);
                list.title(HEIGHT / 2.0, "PAUSED", Color::WHITE);
            }
            GamePhase::GameOver => {
                self.draw_scene(list);
                let mut lines = vec![format!("Score: {}", self.score), format!("Best: {}", self.best)];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("SPACE  Play".to_string());
                lines.push("ESC  Exit".to_string());
                list.dialog("GAME OVER", &lines, Color::RED);
            }
            GamePhase::Records => {
                list.clear(SKY);
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard("TOP 10", &report, Color::YELLOW);
            }
        }
        if self.phase == GamePhase::Playing && self.score == 0 && self.pipes.iter().all(|p| !p.passed) {
            list.text(
                Vec2::new(WIDTH / 2.0, GROUND_Y + 25.0),
                "SPACE to flap",
                Color::BLACK,
                Align::Center,
            );
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn playing(seed: u64) -> Flappy {
        let mut game = Flappy::new(seed);
        game.start();
        game
    }

    #[test]
    fn test_first_pipe_position_and_gap_range() {
        let game = playing(4);
        assert_eq!(game.pipes.len(), 1);
        assert_eq!(game.pipes[0].x, 500.0);
        let gap = game.pipes[0].gap_y as i32;
        assert!((GAP_MIN..=GAP_MAX).contains(&gap));
    }

    #[test]
    fn test_gravity_and_flap() {
        let mut game = playing(1);
        game.step();
        assert_eq!(game.bird.vy, GRAVITY);
        game.bird.flap();
        game.step();
        assert_eq!(game.bird.vy, FLAP + GRAVITY);
    }

    #[test]
    fn test_pipe_scores_once() {
        let mut game = playing(1);
        // Safe gap around the bird, already past the bird's x
        game.pipes = vec![Pipe {
            x: BIRD_X - PIPE_W - 2.0,
            gap_y: game.bird.y - 100.0,
            passed: false,
        }];
        game.bird.vy = -GRAVITY;
        assert!(game.step());
        assert_eq!(game.score, 1);
        game.bird.vy = -GRAVITY;
        assert!(game.step());
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_ground_kills() {
        let mut game = playing(1);
        game.bird.y = GROUND_Y - BIRD_RADIUS;
        assert!(!game.step());
        assert!(!game.bird.alive);
    }

    #[test]
    fn test_pipe_collision_ends_run() {
        let mut game = playing(1);
        game.pipes = vec![Pipe {
            x: BIRD_X - 10.0,
            gap_y: 100.0,
            passed: false,
        }];
        game.bird.y = 320.0;
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RunFinished {
                score: 0,
                board: None
            }]
        );
    }

    #[test]
    fn test_pipes_spawn_every_hundred_frames() {
        let mut game = playing(1);
        game.pipes.clear();
        for _ in 0..100 {
            game.bird.vy = -GRAVITY;
            assert!(game.step());
        }
        assert_eq!(game.pipes.len(), 1);
        assert_eq!(game.pipes[0].x, WIDTH);
    }
}
