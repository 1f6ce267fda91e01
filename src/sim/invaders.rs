//! Space Invaders
//!
//! A marching 5x11 formation that speeds up as it thins out, four
//! destructible barriers and return fire from the bottom row.

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

const PLAYER_W: f32 = 50.0;
const PLAYER_H: f32 = 40.0;
const PLAYER_Y: f32 = HEIGHT - 80.0;
const PLAYER_SPEED: f32 = 5.0;
const START_LIVES: u32 = 3;

const ALIEN_W: f32 = 40.0;
const ALIEN_H: f32 = 30.0;
const ALIEN_ROWS: usize = 5;
const ALIEN_COLS: usize = 11;
const ALIEN_SPACING_X: f32 = 60.0;
const ALIEN_SPACING_Y: f32 = 50.0;
const FORMATION_TOP: f32 = 80.0;
const ALIEN_SPEED: f32 = 1.0;
/// Extra base speed per cleared wave
const LEVEL_SPEEDUP: f32 = 0.5;
const ALIEN_DROP: f32 = 30.0;
const ALIEN_POINTS: [u32; 3] = [30, 20, 10];

const SHOT_W: f32 = 4.0;
const SHOT_H: f32 = 15.0;
const SHOT_SPEED: f32 = 7.0;
const ALIEN_SHOT_SPEED: f32 = 4.0;
/// Seconds between player shots
const SHOT_COOLDOWN: f32 = 0.5;
/// Seconds between alien shots
const ALIEN_FIRE_MIN: f32 = 1.0;
const ALIEN_FIRE_MAX: f32 = 2.0;

const BARRIERS: usize = 4;
const BARRIER_W: f32 = 80.0;
const BARRIER_H: f32 = 60.0;
const BARRIER_Y: f32 = HEIGHT - 150.0;
const BARRIER_HP: u32 = 5;

/// Seconds the wave banner stays up
const BANNER_TIME: f32 = 2.0;

const ALIEN_COLORS: [Color; 3] = [Color(255, 0, 255), Color(0, 255, 255), Color(0, 255, 0)];

pub static INFO: GameInfo = GameInfo {
    title: "Space Invaders",
    db_name: "Space Invaders",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::HigherIsBetter,
    names: NamePolicy::Arcade,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamePhase {
    Title,
    Playing,
    Paused,
    /// Banner between waves
    WaveClear { timer: f32 },
    GameOver,
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alien {
    pub pos: Vec2,
    /// 0 top rows, 2 bottom rows
    pub kind: usize,
    pub alive: bool,
}

impl Alien {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, ALIEN_W, ALIEN_H)
    }

    pub fn points(&self) -> u32 {
        ALIEN_POINTS[self.kind]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formation {
    pub aliens: Vec<Alien>,
    /// 1 right, -1 left
    pub dir: f32,
    /// Speed before the thinning multiplier
    pub base_speed: f32,
}

impl Formation {
    pub fn new(level: u32) -> Self {
        let start_x = ((WIDTH - ALIEN_COLS as f32 * ALIEN_SPACING_X) / 2.0).floor();
        let aliens = (0..ALIEN_ROWS)
            .flat_map(|row| {
                (0..ALIEN_COLS).map(move |col| Alien {
                    pos: Vec2::new(
                        start_x + col as f32 * ALIEN_SPACING_X,
                        FORMATION_TOP + row as f32 * ALIEN_SPACING_Y,
                    ),
                    kind: row / 2,
                    alive: true,
                })
            })
            .collect();
        Self {
            aliens,
            dir: 1.0,
            base_speed: ALIEN_SPEED + LEVEL_SPEEDUP * level.saturating_sub(1) as f32,
        }
    }

    pub fn alive(&self) -> usize {
        self.aliens.iter().filter(|a| a.alive).count()
    }

    /// Marching speed: faster as the formation thins
    pub fn speed(&self) -> f32 {
        let alive = self.alive();
        let factor = if alive < 10 {
            2.0
        } else if alive < 20 {
            1.5
        } else {
            1.0
        };
        self.base_speed * factor
    }

    /// March one tick, dropping and reversing at a wall
    pub fn update(&mut self) {
        let at_wall = self.aliens.iter().filter(|a| a.alive).any(|a| {
            (a.pos.x <= 0.0 && self.dir < 0.0) || (a.pos.x >= WIDTH - ALIEN_W && self.dir > 0.0)
        });
        if at_wall {
            self.dir = -self.dir;
            for alien in self.aliens.iter_mut().filter(|a| a.alive) {
                alien.pos.y += ALIEN_DROP;
            }
        }
        let step = self.speed() * self.dir;
        for alien in self.aliens.iter_mut().filter(|a| a.alive) {
            alien.pos.x += step;
        }
    }

    /// Lowest living alien of each column
    pub fn shooters(&self) -> Vec<usize> {
        let mut bottom: Vec<Option<usize>> = vec![None; ALIEN_COLS];
        for (i, alien) in self.aliens.iter().enumerate() {
            if alien.alive {
                bottom[i % ALIEN_COLS] = Some(i);
            }
        }
        bottom.into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Barrier {
    pub rect: Rect,
    pub hp: u32,
}

impl Barrier {
    pub fn alive(&self) -> bool {
        self.hp > 0
    }

    pub fn damage(&mut self) {
        self.hp = self.hp.saturating_sub(1);
    }

    pub fn color(&self) -> Color {
        let health = self.hp as f32 / BARRIER_HP as f32;
        if health > 0.6 {
            Color(0, 255, 0)
        } else if health > 0.3 {
            Color::YELLOW
        } else {
            Color::RED
        }
    }
}

fn barriers() -> Vec<Barrier> {
    let gap = ((WIDTH - BARRIERS as f32 * BARRIER_W) / (BARRIERS as f32 + 1.0)).floor();
    (0..BARRIERS)
        .map(|i| Barrier {
            rect: Rect::new(gap + i as f32 * (BARRIER_W + gap), BARRIER_Y, BARRIER_W, BARRIER_H),
            hp: BARRIER_HP,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Invaders {
    pub phase: GamePhase,
    /// Left edge of the cannon
    pub player_x: f32,
    pub formation: Formation,
    pub barriers: Vec<Barrier>,
    /// Top-left corners of player shots
    pub shots: Vec<Vec2>,
    pub alien_shots: Vec<Vec2>,
    pub score: i64,
    pub lives: u32,
    pub level: u32,
    pub best: i64,
    pub report: Option<ScoreReport>,
    cooldown: f32,
    alien_fire_timer: f32,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Invaders {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Title,
            player_x: (WIDTH / 2.0 - PLAYER_W / 2.0).floor(),
            formation: Formation::new(1),
            barriers: barriers(),
            shots: Vec::new(),
            alien_shots: Vec::new(),
            score: 0,
            lives: START_LIVES,
            level: 1,
            best: 0,
            report: None,
            cooldown: 0.0,
            alien_fire_timer: ALIEN_FIRE_MAX,
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        let seed = self.rng.next_seed();
        let best = self.best;
        *self = Self::new(seed);
        self.best = best;
        self.alien_fire_timer = self.next_fire_delay();
        self.phase = GamePhase::Playing;
    }

    fn next_fire_delay(&mut self) -> f32 {
        self.rng.range(ALIEN_FIRE_MIN..=ALIEN_FIRE_MAX)
    }

    pub fn player_rect(&self) -> Rect {
        Rect::new(self.player_x, PLAYER_Y, PLAYER_W, PLAYER_H)
    }

    /// Fire if the cannon has cooled down
    pub fn fire(&mut self) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        let x = self.player_x + (PLAYER_W / 2.0).floor() - (SHOT_W / 2.0).floor();
        self.shots.push(Vec2::new(x, PLAYER_Y));
        self.cooldown = SHOT_COOLDOWN;
        true
    }

    fn shot_rect(p: Vec2) -> Rect {
        Rect::new(p.x, p.y, SHOT_W, SHOT_H)
    }

    /// Advance one tick; false when the run is over
    pub fn step(&mut self, dt: f32) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.formation.update();

        if self
            .formation
            .aliens
            .iter()
            .any(|a| a.alive && a.rect().bottom() >= PLAYER_Y)
        {
            log::info!("Invaders landed on level {}", self.level);
            self.lives = 0;
            return false;
        }

        for shot in &mut self.shots {
            shot.y -= SHOT_SPEED;
        }
        self.shots.retain(|s| s.y >= 0.0 && s.y <= HEIGHT);

        // Aliens take the shot before barriers
        let mut spent = vec![false; self.shots.len()];
        for (i, shot) in self.shots.iter().enumerate() {
            let rect = Self::shot_rect(*shot);
            if let Some(alien) = self
                .formation
                .aliens
                .iter_mut()
                .find(|a| a.alive && a.rect().intersects(&rect))
            {
                alien.alive = false;
                self.score += alien.points() as i64;
                spent[i] = true;
            }
        }
        for (i, shot) in self.shots.iter().enumerate() {
            if spent[i] {
                continue;
            }
            let rect = Self::shot_rect(*shot);
            if let Some(barrier) = self
                .barriers
                .iter_mut()
                .find(|b| b.alive() && b.rect.intersects(&rect))
            {
                barrier.damage();
                spent[i] = true;
            }
        }
        let mut keep = spent.iter().map(|s| !s);
        self.shots.retain(|_| keep.next().unwrap_or(true));

        if !self.update_alien_fire(dt) {
            return false;
        }

        if self.formation.alive() == 0 {
            log::info!("Wave {} cleared, score {}", self.level, self.score);
            self.phase = GamePhase::WaveClear { timer: BANNER_TIME };
        }
        true
    }

    /// Returns false when the last life is lost
    fn update_alien_fire(&mut self, dt: f32) -> bool {
        self.alien_fire_timer -= dt;
        if self.alien_fire_timer <= 0.0 {
            let shooters = self.formation.shooters();
            if !shooters.is_empty() {
                let pick = shooters[self.rng.range(0..shooters.len())];
                let rect = self.formation.aliens[pick].rect();
                self.alien_shots
                    .push(Vec2::new(rect.center().x - SHOT_W / 2.0, rect.bottom()));
            }
            self.alien_fire_timer = self.next_fire_delay();
        }

        for shot in &mut self.alien_shots {
            shot.y += ALIEN_SHOT_SPEED;
        }
        self.alien_shots.retain(|s| s.y <= HEIGHT);

        let barriers = &mut self.barriers;
        self.alien_shots.retain(|s| {
            let rect = Self::shot_rect(*s);
            match barriers.iter_mut().find(|b| b.alive() && b.rect.intersects(&rect)) {
                Some(barrier) => {
                    barrier.damage();
                    false
                }
                None => true,
            }
        });

        let player = self.player_rect();
        if self
            .alien_shots
            .iter()
            .any(|s| Self::shot_rect(*s).intersects(&player))
        {
            self.alien_shots.clear();
            self.lives = self.lives.saturating_sub(1);
            log::debug!("Cannon hit, {} lives left", self.lives);
            if self.lives == 0 {
                return false;
            }
        }
        true
    }

    fn next_wave(&mut self) {
        self.level += 1;
        self.formation = Formation::new(self.level);
        self.barriers = barriers();
        self.shots.clear();
        self.alien_shots.clear();
        self.alien_fire_timer = self.next_fire_delay();
        self.phase = GamePhase::Playing;
    }

    fn game_over(&mut self) {
        self.best = self.best.max(self.score);
        log::info!("Invaders run over: {} on level {}", self.score, self.level);
        self.events.push(GameEvent::RunFinished {
            score: self.score,
            board: None,
        });
        self.phase = GamePhase::GameOver;
    }

    fn open_records(&mut self) {
        self.report = None;
        self.events.push(GameEvent::RequestLeaderboard { board: None });
        self.phase = GamePhase::Records;
    }

    fn draw_scene(&self, list: &mut DrawList) {
        list.clear(Color::BLACK);

        for barrier in self.barriers.iter().filter(|b| b.alive()) {
            list.rect(barrier.rect, barrier.color());
        }

        for alien in self.formation.aliens.iter().filter(|a| a.alive) {
            let r = alien.rect();
            let color = ALIEN_COLORS[alien.kind];
            list.rect(Rect::new(r.x + 5.0, r.y + 5.0, r.w - 10.0, r.h - 12.0), color);
            // Legs
            list.rect(Rect::new(r.x, r.bottom() - 8.0, 8.0, 8.0), color);
            list.rect(Rect::new(r.right() - 8.0, r.bottom() - 8.0, 8.0, 8.0), color);
            list.rect(Rect::new(r.x + 12.0, r.y + 10.0, 5.0, 5.0), Color::BLACK);
            list.rect(Rect::new(r.right() - 17.0, r.y + 10.0, 5.0, 5.0), Color::BLACK);
        }

        for shot in &self.shots {
            list.rect(Self::shot_rect(*shot), Color::YELLOW);
        }
        for shot in &self.alien_shots {
            list.rect(Self::shot_rect(*shot), Color::RED);
        }

        if self.lives > 0 {
            let p = self.player_rect();
            list.rect(Rect::new(p.x, p.y + 15.0, p.w, p.h - 15.0), Color(0, 255, 0));
            list.rect(Rect::new(p.center().x - 5.0, p.y, 10.0, 15.0), Color(0, 255, 0));
        }

        list.text(Vec2::new(10.0, 20.0), format!("SCORE: {}", self.score), Color::WHITE, Align::Left);
        list.text(
            Vec2::new(WIDTH / 2.0, 20.0),
            format!("LEVEL: {}", self.level),
            Color::CYAN,
            Align::Center,
        );
        list.text(
            Vec2::new(WIDTH - 10.0, 20.0),
            format!("LIVES: {}", self.lives),
            Color::WHITE,
            Align::Right,
        );
    }
}

impl Game for Invaders {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Title => {
                if input.was_pressed(Key::Action) || input.was_pressed(Key::Confirm) {
                    self.start();
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Playing => {
                if input.pause_pressed() {
                    self.phase = GamePhase::Paused;
                    return;
                }
                if input.was_pressed(Key::Action) {
                    self.fire();
                }
                if input.left && self.player_x > 0.0 {
                    self.player_x -= PLAYER_SPEED;
                }
                if input.right && self.player_x < WIDTH - PLAYER_W {
                    self.player_x += PLAYER_SPEED;
                }
                if !self.step(dt) {
                    self.game_over();
                }
            }
            GamePhase::Paused => {
                if input.pause_pressed() || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Playing;
                } else if input.letter_pressed('m') {
                    self.phase = GamePhase::Title;
                }
            }
            GamePhase::WaveClear { timer } => {
                let timer = timer - dt;
                if timer <= 0.0 {
                    self.next_wave();
                } else {
                    self.phase = GamePhase::WaveClear { timer };
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Key::Action) || input.was_pressed(Key::Confirm) {
                    self.start();
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::Records => {
                if input.was_pressed(Key::Back) || input.was_pressed(Key::Confirm) {
                    self.phase = GamePhase::Title;
                }
            }
        }
    }

    fn draw(&self, list: &mut DrawList) {
        match self.phase {
            GamePhase::Title => {
                list.clear(Color::BLACK);
                list.title(150.0, "SPACE INVADERS", Color(0, 255, 0));
                for (kind, color) in ALIEN_COLORS.iter().enumerate() {
                    list.title(
                        250.0 + kind as f32 * 40.0,
                        format!("= {} POINTS", ALIEN_POINTS[kind]),
                        *color,
                    );
                }
                list.title(420.0, "Arrows to move, SPACE to fire", Color::WHITE);
                list.title(470.0, "Press SPACE to start", Color::YELLOW);
                list.title(510.0, "R  Records    ESC  Exit", Color::GRAY);
                if self.best > 0 {
                    list.title(60.0, format!("HI-SCORE {}", self.best), Color::WHITE);
                }
            }
            GamePhase::Playing => self.draw_scene(list),
            GamePhase::Paused => {
                self.draw_scene(list);
                list.dialog(
                    "PAUSED",
                    &["ESC  Continue".to_string(), "M  Title".to_string()],
                    Color(0, 255, 0),
                );
            }
            GamePhase::WaveClear { .. } => {
                self.draw_scene(list);
                list.dialog(
                    "LEVEL COMPLETE!",
                    &[format!("Level {} cleared", self.level)],
                    Color::CYAN,
                );
            }
            GamePhase::GameOver => {
                self.draw_scene(list);
                let mut lines = vec![
                    format!("Score: {}", self.score),
                    format!("Level: {}", self.level),
                ];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("SPACE  Play again    R  Records    ESC  Exit".to_string());
                list.dialog("GAME OVER", &lines, Color::RED);
            }
            GamePhase::Records => {
                list.clear(Color::BLACK);
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard("HIGH SCORES", &report, Color(0, 255, 0));
            }
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_report(&mut self, report: ScoreReport) {
        self.best = self.best.max(report.best.unwrap_or(0));
        self.report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn playing() -> Invaders {
        let mut game = Invaders::new(4);
        game.start();
        // Hold alien fire unless a test wants it
        game.alien_fire_timer = f32::MAX;
        game
    }

    #[test]
    fn test_formation_layout() {
        let f = Formation::new(1);
        assert_eq!(f.aliens.len(), 55);
        assert_eq!(f.aliens[0].pos, Vec2::new(70.0, 80.0));
        assert_eq!(f.aliens[0].points(), 30);
        assert_eq!(f.aliens[2 * ALIEN_COLS].points(), 20);
        assert_eq!(f.aliens[4 * ALIEN_COLS].points(), 10);
    }

    #[test]
    fn test_speed_multiplier_stacks_on_level() {
        let mut f = Formation::new(3);
        assert_eq!(f.speed(), 2.0);
        for alien in f.aliens.iter_mut().skip(15) {
            alien.alive = false;
        }
        assert_eq!(f.speed(), 3.0);
        for alien in f.aliens.iter_mut().skip(5) {
            alien.alive = false;
        }
        assert_eq!(f.speed(), 4.0);
    }

    #[test]
    fn test_formation_drops_at_wall() {
        let mut f = Formation::new(1);
        let y = f.aliens[0].pos.y;
        let mut ticks = 0;
        while f.dir > 0.0 && ticks < 1000 {
            f.update();
            ticks += 1;
        }
        assert_eq!(f.aliens[0].pos.y, y + ALIEN_DROP);
        assert!(f.aliens.iter().all(|a| a.pos.x + ALIEN_W <= WIDTH + ALIEN_SPEED));
    }

    #[test]
    fn test_barrier_layout() {
        let b = barriers();
        assert_eq!(b.len(), 4);
        assert_eq!(b[0].rect.x, 96.0);
        assert_eq!(b[1].rect.x, 272.0);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut game = playing();
        assert!(game.fire());
        assert!(!game.fire());
        for _ in 0..31 {
            game.step(SIM_DT);
        }
        assert!(game.fire());
    }

    #[test]
    fn test_shot_kills_alien_before_barrier() {
        let mut game = playing();
        let target = game.formation.aliens[4 * ALIEN_COLS].rect();
        game.shots.push(Vec2::new(target.center().x, target.bottom() + 2.0));
        game.step(SIM_DT);
        assert!(!game.formation.aliens[4 * ALIEN_COLS].alive);
        assert_eq!(game.score, 10);
        assert!(game.shots.is_empty());
    }

    #[test]
    fn test_shot_damages_barrier() {
        let mut game = playing();
        let b = game.barriers[0].rect;
        game.shots.push(Vec2::new(b.center().x, b.bottom() + 3.0));
        game.step(SIM_DT);
        assert_eq!(game.barriers[0].hp, BARRIER_HP - 1);
        assert!(game.shots.is_empty());
    }

    #[test]
    fn test_alien_shot_costs_life() {
        let mut game = playing();
        let p = game.player_rect();
        game.alien_shots.push(Vec2::new(p.center().x, p.y - 5.0));
        game.step(SIM_DT);
        assert_eq!(game.lives, START_LIVES - 1);
        assert!(game.alien_shots.is_empty());
    }

    #[test]
    fn test_aliens_fire_from_bottom_row() {
        let mut game = playing();
        game.alien_fire_timer = 0.0;
        game.step(SIM_DT);
        assert_eq!(game.alien_shots.len(), 1);
        let shot = game.alien_shots[0];
        let bottom_row_y = game.formation.aliens[4 * ALIEN_COLS].rect().bottom();
        assert!(shot.y >= bottom_row_y);
    }

    #[test]
    fn test_invasion_ends_run() {
        let mut game = playing();
        game.score = 250;
        for alien in &mut game.formation.aliens {
            alien.pos.y += 400.0;
        }
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.lives, 0);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RunFinished {
                score: 250,
                board: None,
            }]
        );
    }

    #[test]
    fn test_cleared_wave_advances_level() {
        let mut game = playing();
        for alien in &mut game.formation.aliens {
            alien.alive = false;
        }
        game.tick(&TickInput::default(), SIM_DT);
        assert!(matches!(game.phase, GamePhase::WaveClear { .. }));
        for _ in 0..(BANNER_TIME / SIM_DT) as usize + 2 {
            game.tick(&TickInput::default(), SIM_DT);
            if game.phase == GamePhase::Playing {
                break;
            }
        }
        assert_eq!(game.level, 2);
        assert_eq!(game.formation.alive(), 55);
        assert_eq!(game.formation.base_speed, ALIEN_SPEED + LEVEL_SPEEDUP);
    }
}
