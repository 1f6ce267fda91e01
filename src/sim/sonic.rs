//! Sonic-style platformer
//!
//! Run right through a scrolling zone collecting rings. Rings double as
//! health: a hit drops ten of them and a hit with none left ends the run.

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const TICKS_PER_SECOND: u32 = 60;

const GRAVITY: f32 = 0.8;
const ACCELERATION: f32 = 0.5;
const FRICTION: f32 = 0.9;
const MAX_SPEED: f32 = 8.0;
const JUMP_VELOCITY: f32 = -16.0;
const MAX_FALL_SPEED: f32 = 20.0;
const STOMP_BOUNCE: f32 = -10.0;
/// Ticks a jump is still allowed after leaving a ledge
const COYOTE_TICKS: u32 = 6;
const INVINCIBLE_TICKS: u32 = 120;

const PLAYER_SIZE: f32 = 40.0;
const PLAYER_START: Vec2 = Vec2::new(100.0, 100.0);

const LEVEL_WIDTH: f32 = 3000.0;
const GROUND_Y: f32 = HEIGHT - 50.0;
const PLATFORMS: usize = 15;
const PLATFORM_H: f32 = 20.0;
const RING_RADIUS: f32 = 10.0;
const RINGS_PER_LEVEL: usize = 20;
const ENEMY_SIZE: f32 = 30.0;
const ENEMIES_PER_LEVEL: usize = 5;
const ENEMY_SPEED: f32 = 2.0;
const PATROL_RANGE: f32 = 100.0;
/// Distance from the right edge that completes a zone
const GOAL_MARGIN: f32 = 200.0;
/// Player's distance from the left edge of the view
const SCROLL_MARGIN: f32 = 300.0;
const STOMP_RINGS: u32 = 5;
const HIT_RINGS: u32 = 10;
/// Seconds the zone banner stays up
const BANNER_TIME: f32 = 2.0;
/// Time bonus ceiling in seconds
const TIME_BONUS: u32 = 3600;

const SKY: Color = Color(135, 206, 250);
const GRASS: Color = Color(34, 139, 34);
const DIRT: Color = Color(139, 69, 19);
const SONIC_BLUE: Color = Color(0, 100, 200);
const RING_GOLD: Color = Color(255, 215, 0);

pub static INFO: GameInfo = GameInfo {
    title: "Sonic The Hedgehog",
    db_name: "Sonic",
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
    /// Banner between zones
    ZoneClear { timer: f32 },
    GameOver,
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
    pub facing_right: bool,
    pub alive: bool,
    /// Ticks of invincibility left
    pub invincible: u32,
    coyote: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            on_ground: false,
            facing_right: true,
            alive: true,
            invincible: 0,
            coyote: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    pub fn run(&mut self, dir: f32) {
        self.vel.x += ACCELERATION * dir;
        self.facing_right = dir > 0.0;
    }

    /// Jump from the ground or within the coyote window
    pub fn jump(&mut self) -> bool {
        if !self.on_ground && self.coyote == 0 {
            return false;
        }
        self.vel.y = JUMP_VELOCITY;
        self.on_ground = false;
        self.coyote = 0;
        true
    }

    /// One physics tick, resolving each axis against the platforms
    pub fn update(&mut self, platforms: &[Rect]) {
        self.vel.x = (self.vel.x * FRICTION).clamp(-MAX_SPEED, MAX_SPEED);
        // Gravity always pulls so a grounded player keeps probing the floor
        self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL_SPEED);

        self.pos.x += self.vel.x;
        for plat in platforms {
            if !self.rect().intersects(plat) {
                continue;
            }
            if self.vel.x > 0.0 {
                self.pos.x = plat.left() - PLAYER_SIZE;
            } else if self.vel.x < 0.0 {
                self.pos.x = plat.right();
            }
            self.vel.x = 0.0;
        }

        self.pos.y += self.vel.y;
        let was_on_ground = self.on_ground;
        self.on_ground = false;
        for plat in platforms {
            if !self.rect().intersects(plat) {
                continue;
            }
            if self.vel.y > 0.0 && self.pos.y < plat.top() {
                self.pos.y = plat.top() - PLAYER_SIZE;
                self.vel.y = 0.0;
                self.on_ground = true;
            } else if self.vel.y < 0.0 && self.pos.y > plat.top() {
                self.pos.y = plat.bottom();
                self.vel.y = 0.0;
            }
        }

        if self.on_ground || was_on_ground {
            self.coyote = COYOTE_TICKS;
        } else {
            self.coyote = self.coyote.saturating_sub(1);
        }

        if self.pos.y > HEIGHT {
            self.alive = false;
        }
        self.invincible = self.invincible.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub center: Vec2,
    pub collected: bool,
    /// Spin animation angle in degrees
    pub spin: f32,
}

impl Ring {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.center, RING_RADIUS * 2.0, RING_RADIUS * 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub pos: Vec2,
    pub dir: f32,
    /// Patrol centre
    pub origin: f32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            dir: 1.0,
            origin: pos.x,
            alive: true,
        }
    }

    pub fn update(&mut self) {
        self.pos.x += ENEMY_SPEED * self.dir;
        if self.pos.x <= self.origin - PATROL_RANGE || self.pos.x >= self.origin + PATROL_RANGE {
            self.dir = -self.dir;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, ENEMY_SIZE, ENEMY_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub width: f32,
    /// Ground first, then the floating ledges
    pub platforms: Vec<Rect>,
    pub rings: Vec<Ring>,
    pub enemies: Vec<Enemy>,
}

impl Level {
    pub fn generate(rng: &mut RngState) -> Self {
        let width = LEVEL_WIDTH;
        let mut platforms = vec![Rect::new(0.0, GROUND_Y, width, HEIGHT - GROUND_Y)];
        for _ in 0..PLATFORMS {
            let x = rng.range(200..=(width as i32 - 300)) as f32;
            let y = rng.range(200..=(HEIGHT as i32 - 150)) as f32;
            let w = rng.range(100..=200) as f32;
            platforms.push(Rect::new(x, y, w, PLATFORM_H));
        }

        let rings = (0..RINGS_PER_LEVEL)
            .map(|_| Ring {
                center: Vec2::new(
                    rng.range(100..=(width as i32 - 100)) as f32,
                    rng.range(100..=(HEIGHT as i32 - 100)) as f32,
                ),
                collected: false,
                spin: 0.0,
            })
            .collect();

        // Patrolling on the ground
        let enemies = (0..ENEMIES_PER_LEVEL)
            .map(|_| {
                let x = rng.range(300..=(width as i32 - 300)) as f32;
                Enemy::new(Vec2::new(x, GROUND_Y - ENEMY_SIZE))
            })
            .collect();

        Self {
            width,
            platforms,
            rings,
            enemies,
        }
    }

    fn update(&mut self) {
        for ring in self.rings.iter_mut().filter(|r| !r.collected) {
            ring.spin = (ring.spin + 5.0) % 360.0;
        }
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            enemy.update();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sonic {
    pub phase: GamePhase,
    pub player: Player,
    pub level: Level,
    /// 1-based zone number
    pub zone: u32,
    pub rings: u32,
    /// Ticks survived across all zones
    pub ticks: u32,
    pub camera_x: f32,
    pub best: i64,
    pub report: Option<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Sonic {
    pub fn new(seed: u64) -> Self {
        let mut rng = RngState::new(seed);
        let level = Level::generate(&mut rng);
        Self {
            phase: GamePhase::Title,
            player: Player::new(PLAYER_START),
            level,
            zone: 1,
            rings: 0,
            ticks: 0,
            camera_x: 0.0,
            best: 0,
            report: None,
            rng,
            events: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.level = Level::generate(&mut self.rng);
        self.player = Player::new(PLAYER_START);
        self.zone = 1;
        self.rings = 0;
        self.ticks = 0;
        self.camera_x = 0.0;
        self.report = None;
        self.phase = GamePhase::Playing;
    }

    pub fn seconds(&self) -> u32 {
        self.ticks / TICKS_PER_SECOND
    }

    pub fn score(&self) -> i64 {
        self.rings as i64 * 100 + TIME_BONUS.saturating_sub(self.seconds()) as i64
    }

    fn update_camera(&mut self) {
        let max = (self.level.width - WIDTH).max(0.0);
        self.camera_x = (self.player.pos.x - SCROLL_MARGIN).clamp(0.0, max);
    }

    /// Advance one tick; false when the player died
    pub fn step(&mut self) -> bool {
        self.ticks += 1;
        self.player.update(&self.level.platforms);
        if !self.player.alive {
            return false;
        }
        self.level.update();
        self.update_camera();

        let body = self.player.rect();
        for ring in self.level.rings.iter_mut().filter(|r| !r.collected) {
            if body.intersects(&ring.rect()) {
                ring.collected = true;
                self.rings += 1;
            }
        }

        if self.player.invincible == 0 {
            for enemy in self.level.enemies.iter_mut().filter(|e| e.alive) {
                if !body.intersects(&enemy.rect()) {
                    continue;
                }
                if self.player.vel.y > 0.0 && self.player.pos.y < enemy.pos.y {
                    enemy.alive = false;
                    self.player.vel.y = STOMP_BOUNCE;
                    self.rings += STOMP_RINGS;
                } else if self.rings > 0 {
                    self.rings = self.rings.saturating_sub(HIT_RINGS);
                    self.player.invincible = INVINCIBLE_TICKS;
                    break;
                } else {
                    self.player.alive = false;
                    return false;
                }
            }
        }

        if self.player.pos.x > self.level.width - GOAL_MARGIN {
            log::info!("Zone {} cleared with {} rings", self.zone, self.rings);
            self.phase = GamePhase::ZoneClear { timer: BANNER_TIME };
        }
        true
    }

    fn next_zone(&mut self) {
        self.zone += 1;
        self.level = Level::generate(&mut self.rng);
        self.player = Player::new(PLAYER_START);
        self.camera_x = 0.0;
        self.phase = GamePhase::Playing;
    }

    fn game_over(&mut self) {
        let score = self.score();
        self.best = self.best.max(score);
        log::info!(
            "Sonic run over in zone {}: {} rings, {}s, score {score}",
            self.zone,
            self.rings,
            self.seconds()
        );
        self.events.push(GameEvent::RunFinished { score, board: None });
        self.phase = GamePhase::GameOver;
    }

    fn open_records(&mut self) {
        self.report = None;
        self.events.push(GameEvent::RequestLeaderboard { board: None });
        self.phase = GamePhase::Records;
    }

    fn draw_scene(&self, list: &mut DrawList) {
        list.clear(SKY);
        let cam = Vec2::new(self.camera_x, 0.0);
        let visible = |r: &Rect| r.right() >= cam.x && r.left() <= cam.x + WIDTH;

        for (i, plat) in self.level.platforms.iter().enumerate() {
            if !visible(plat) {
                continue;
            }
            let r = plat.translate(-cam);
            let r = Rect::new(r.x.max(0.0), r.y, r.right().min(WIDTH) - r.x.max(0.0), r.h);
            list.rect(r, DIRT);
            let grass = if i == 0 { 10.0 } else { 6.0 };
            list.rect(Rect::new(r.x, r.y, r.w, grass), GRASS);
        }

        // Goal post
        let goal_x = self.level.width - GOAL_MARGIN - cam.x;
        if (0.0..WIDTH).contains(&goal_x) {
            list.line(Vec2::new(goal_x, GROUND_Y), Vec2::new(goal_x, GROUND_Y - 120.0), Color::GRAY);
            list.circle(Vec2::new(goal_x, GROUND_Y - 130.0), 12.0, RING_GOLD);
        }

        for ring in self.level.rings.iter().filter(|r| !r.collected) {
            if !visible(&ring.rect()) {
                continue;
            }
            let c = ring.center - cam;
            let squash = ring.spin.to_radians().cos().abs().max(0.3);
            list.circle(c, RING_RADIUS * squash.max(0.5), RING_GOLD);
            list.circle(c, RING_RADIUS * 0.5 * squash, SKY);
        }

        for enemy in self.level.enemies.iter().filter(|e| e.alive) {
            if !visible(&enemy.rect()) {
                continue;
            }
            let r = enemy.rect().translate(-cam);
            list.rect(r, Color(200, 0, 0));
            list.rect(Rect::new(r.x + 5.0, r.y + 8.0, 6.0, 6.0), Color::WHITE);
            list.rect(Rect::new(r.right() - 11.0, r.y + 8.0, 6.0, 6.0), Color::WHITE);
        }

        // Blink while invincible
        if self.player.alive && (self.player.invincible / 6) % 2 == 0 {
            let r = self.player.rect().translate(-cam);
            list.circle(r.center(), PLAYER_SIZE / 2.0, SONIC_BLUE);
            let eye_x = if self.player.facing_right { 8.0 } else { -8.0 };
            list.circle(r.center() + Vec2::new(eye_x, -6.0), 5.0, Color::WHITE);
            list.rect(Rect::new(r.x + 8.0, r.bottom() - 6.0, 24.0, 6.0), Color::RED);
        }

        let secs = self.seconds();
        list.text(Vec2::new(15.0, 25.0), format!("RINGS: {}", self.rings), RING_GOLD, Align::Left);
        let time_color = if secs > 300 { Color::RED } else { Color::WHITE };
        list.text(
            Vec2::new(15.0, 55.0),
            format!("TIME: {}:{:02}", secs / 60, secs % 60),
            time_color,
            Align::Left,
        );
        list.text(Vec2::new(WIDTH - 15.0, 25.0), format!("ZONE {}", self.zone), Color::CYAN, Align::Right);
    }
}

impl Game for Sonic {
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
                if input.was_pressed(Key::Action) || input.was_pressed(Key::Up) {
                    self.player.jump();
                }
                if input.left {
                    self.player.run(-1.0);
                }
                if input.right {
                    self.player.run(1.0);
                }
                if !self.step() {
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
            GamePhase::ZoneClear { timer } => {
                let timer = timer - dt;
                if timer <= 0.0 {
                    self.next_zone();
                } else {
                    self.phase = GamePhase::ZoneClear { timer };
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Key::Action) || input.was_pressed(Key::Confirm) {
                    self.start();
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.was_pressed(Key::Back) {
                    self.phase = GamePhase::Title;
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
                list.clear(SONIC_BLUE.shade(-60));
                list.title(HEIGHT / 2.0 - 100.0, "SONIC", RING_GOLD);
                list.title(HEIGHT / 2.0 - 40.0, "THE HEDGEHOG", Color::WHITE);
                list.title(HEIGHT / 2.0 + 80.0, "Arrows to run", Color::WHITE);
                list.title(HEIGHT / 2.0 + 110.0, "SPACE to jump", Color::WHITE);
                list.title(HEIGHT / 2.0 + 150.0, "Press SPACE to start", RING_GOLD);
                list.title(HEIGHT / 2.0 + 190.0, "R  Records    ESC  Exit", Color::GRAY);
                if self.best > 0 {
                    list.title(40.0, format!("BEST {}", self.best), Color::WHITE);
                }
            }
            GamePhase::Playing => self.draw_scene(list),
            GamePhase::Paused => {
                self.draw_scene(list);
                list.dialog(
                    "PAUSED",
                    &["ESC  Continue".to_string(), "M  Title".to_string()],
                    SONIC_BLUE,
                );
            }
            GamePhase::ZoneClear { .. } => {
                self.draw_scene(list);
                list.dialog("ZONE COMPLETE!", &[format!("Zone {}", self.zone)], RING_GOLD);
            }
            GamePhase::GameOver => {
                self.draw_scene(list);
                let secs = self.seconds();
                let mut lines = vec![
                    format!("Rings: {}", self.rings),
                    format!("Time: {}:{:02}", secs / 60, secs % 60),
                    format!("Zone: {}", self.zone),
                    format!("Score: {}", self.score()),
                ];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                lines.push("SPACE  Play again    R  Records".to_string());
                list.dialog("GAME OVER", &lines, Color::RED);
            }
            GamePhase::Records => {
                list.clear(SONIC_BLUE.shade(-60));
                let report = self.report.clone().unwrap_or_default();
                list.leaderboard("TOP SCORES", &report, RING_GOLD);
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

    fn ground() -> Rect {
        Rect::new(0.0, GROUND_Y, LEVEL_WIDTH, HEIGHT - GROUND_Y)
    }

    /// A zone with only the ground
    fn flat_game() -> Sonic {
        let mut game = Sonic::new(3);
        game.start();
        game.level = Level {
            width: LEVEL_WIDTH,
            platforms: vec![ground()],
            rings: Vec::new(),
            enemies: Vec::new(),
        };
        game.player.pos = Vec2::new(100.0, GROUND_Y - PLAYER_SIZE);
        game.player.update(&game.level.platforms);
        game
    }

    #[test]
    fn test_generated_level_contents() {
        let mut rng = RngState::new(9);
        let level = Level::generate(&mut rng);
        assert_eq!(level.platforms.len(), PLATFORMS + 1);
        assert_eq!(level.rings.len(), RINGS_PER_LEVEL);
        assert_eq!(level.enemies.len(), ENEMIES_PER_LEVEL);
        for enemy in &level.enemies {
            assert_eq!(enemy.rect().bottom(), GROUND_Y);
        }
    }

    #[test]
    fn test_player_rests_on_ground() {
        let mut player = Player::new(Vec2::new(100.0, 300.0));
        let platforms = [ground()];
        for _ in 0..120 {
            player.update(&platforms);
        }
        assert!(player.on_ground);
        assert_eq!(player.pos.y, GROUND_Y - PLAYER_SIZE);
        // Stays grounded tick after tick
        for _ in 0..10 {
            player.update(&platforms);
            assert!(player.on_ground);
        }
    }

    #[test]
    fn test_jump_needs_footing() {
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        assert!(!player.jump());
        let platforms = [ground()];
        for _ in 0..120 {
            player.update(&platforms);
        }
        assert!(player.jump());
        assert_eq!(player.vel.y, JUMP_VELOCITY);
    }

    #[test]
    fn test_coyote_jump_after_ledge() {
        let ledge = Rect::new(0.0, 300.0, 100.0, PLATFORM_H);
        let mut player = Player::new(Vec2::new(50.0, 300.0 - PLAYER_SIZE));
        player.update(&[ledge]);
        assert!(player.on_ground);
        // Step off the ledge
        player.pos.x = 200.0;
        for _ in 0..3 {
            player.update(&[ledge]);
        }
        assert!(!player.on_ground);
        assert!(player.jump());

        let mut late = Player::new(Vec2::new(200.0, 100.0));
        for _ in 0..10 {
            late.update(&[ledge]);
        }
        assert!(!late.jump());
    }

    #[test]
    fn test_wall_stops_running() {
        let wall = Rect::new(200.0, 400.0, 50.0, 150.0);
        let mut player = Player::new(Vec2::new(150.0, GROUND_Y - PLAYER_SIZE));
        let platforms = [ground(), wall];
        for _ in 0..30 {
            player.run(1.0);
            player.update(&platforms);
        }
        assert_eq!(player.pos.x, wall.left() - PLAYER_SIZE);
    }

    #[test]
    fn test_head_bump() {
        let ceiling = Rect::new(0.0, 400.0, 400.0, PLATFORM_H);
        let mut player = Player::new(Vec2::new(100.0, 430.0));
        player.vel.y = JUMP_VELOCITY;
        player.update(&[ceiling]);
        assert_eq!(player.pos.y, ceiling.bottom());
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_ring_collection() {
        let mut game = flat_game();
        let center = game.player.rect().center();
        game.level.rings.push(Ring {
            center,
            collected: false,
            spin: 0.0,
        });
        assert!(game.step());
        assert_eq!(game.rings, 1);
        assert!(game.level.rings[0].collected);
    }

    #[test]
    fn test_stomp_kills_enemy() {
        let mut game = flat_game();
        game.level.enemies.push(Enemy::new(Vec2::new(100.0, GROUND_Y - ENEMY_SIZE)));
        game.player.pos = Vec2::new(100.0, GROUND_Y - ENEMY_SIZE - PLAYER_SIZE - 5.0);
        game.player.vel.y = 8.0;
        game.player.on_ground = false;
        // Keep the enemy still for the check
        game.level.enemies[0].dir = 0.0;
        assert!(game.step());
        assert!(!game.level.enemies[0].alive);
        assert_eq!(game.player.vel.y, STOMP_BOUNCE);
        assert_eq!(game.rings, STOMP_RINGS);
    }

    #[test]
    fn test_side_hit_costs_rings() {
        let mut game = flat_game();
        game.rings = 12;
        let mut enemy = Enemy::new(game.player.pos + Vec2::new(20.0, PLAYER_SIZE - ENEMY_SIZE));
        enemy.dir = 0.0;
        game.level.enemies.push(enemy);
        assert!(game.step());
        assert_eq!(game.rings, 2);
        assert!(game.player.invincible > 0);

        // Invincible: a second touch is ignored
        assert!(game.step());
        assert_eq!(game.rings, 2);
    }

    #[test]
    fn test_hit_without_rings_ends_run() {
        let mut game = flat_game();
        game.ticks = 60 * 100;
        let mut enemy = Enemy::new(game.player.pos + Vec2::new(20.0, PLAYER_SIZE - ENEMY_SIZE));
        enemy.dir = 0.0;
        game.level.enemies.push(enemy);
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
        let events = game.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::RunFinished {
                score: (TIME_BONUS - 100) as i64,
                board: None,
            }]
        );
    }

    #[test]
    fn test_falling_off_is_fatal() {
        let mut game = flat_game();
        game.level.platforms.clear();
        let mut alive = true;
        for _ in 0..120 {
            alive = game.step();
            if !alive {
                break;
            }
        }
        assert!(!alive);
        assert!(!game.player.alive);
    }

    #[test]
    fn test_zone_clear_keeps_rings_and_time() {
        let mut game = flat_game();
        game.rings = 7;
        game.player.pos.x = LEVEL_WIDTH - GOAL_MARGIN + 10.0;
        game.tick(&TickInput::default(), SIM_DT);
        assert!(matches!(game.phase, GamePhase::ZoneClear { .. }));
        let ticks = game.ticks;

        let mut waited = 0;
        while matches!(game.phase, GamePhase::ZoneClear { .. }) && waited < 1000 {
            game.tick(&TickInput::default(), SIM_DT);
            waited += 1;
        }
        assert!((119..=121).contains(&waited));
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.zone, 2);
        assert_eq!(game.rings, 7);
        assert_eq!(game.ticks, ticks);
        assert_eq!(game.player.pos, PLAYER_START);
    }

    #[test]
    fn test_camera_keeps_margin() {
        let mut game = flat_game();
        game.player.pos.x = 1000.0;
        game.update_camera();
        assert_eq!(game.camera_x, 1000.0 - SCROLL_MARGIN);
        game.player.pos.x = 50.0;
        game.update_camera();
        assert_eq!(game.camera_x, 0.0);
    }
}
