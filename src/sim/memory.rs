//! Memory matching
//!
//! Flip two cards per move looking for pairs. The score is moves plus
//! seconds, so lower is better, and each level has its own leaderboard.

use glam::Vec2;

use super::state::{GameEvent, Key, RngState, ScoreReport, TickInput};
use super::{Game, GameInfo, NamePolicy, Rect, ScoreOrder};
use crate::format_clock;
use crate::renderer::{Align, Color, DrawList};

const WIDTH: f32 = 1200.0;
const HEIGHT: f32 = 800.0;
const HUD_HEIGHT: f32 = 80.0;
const CARD_MARGIN: f32 = 10.0;

/// Flip animation progress per second
const FLIP_SPEED: f32 = 15.0;
/// Seconds both cards stay up before being judged
const REVEAL_DELAY: f32 = 1.0;
const MATCH_FLASH: f32 = 0.5;
/// Entries listed per level on the records screen
const RECORDS_SHOWN: usize = 5;

const BACKGROUND: Color = Color(245, 245, 250);
const CARD_BACK: Color = Color(100, 150, 255);
const CARD_HOVER: Color = Color(120, 170, 255);
const CARD_FRONT: Color = Color::WHITE;
const TEXT: Color = Color(50, 50, 50);
const SUCCESS: Color = Color(80, 200, 120);
const HIGHLIGHT: Color = Color(255, 230, 100);

/// (rows, cols, name) per level
pub const LEVELS: [(usize, usize, &str); 3] = [
    (4, 4, "Level 1 - Easy"),
    (4, 5, "Level 2 - Medium"),
    (6, 6, "Level 3 - Hard"),
];

/// Face colors for pair ids
const FACES: [Color; 18] = [
    Color(230, 60, 60),
    Color(60, 160, 230),
    Color(60, 200, 90),
    Color(240, 200, 40),
    Color(170, 80, 220),
    Color(250, 140, 40),
    Color(40, 200, 200),
    Color(230, 90, 170),
    Color(120, 80, 40),
    Color(90, 90, 90),
    Color(150, 210, 60),
    Color(30, 60, 160),
    Color(200, 30, 100),
    Color(0, 130, 110),
    Color(255, 120, 120),
    Color(140, 140, 230),
    Color(200, 170, 120),
    Color(20, 20, 20),
];

pub static INFO: GameInfo = GameInfo {
    title: "Memory Game",
    db_name: "Memory Game",
    width: WIDTH,
    height: HEIGHT,
    order: ScoreOrder::LowerIsBetter,
    names: NamePolicy::Prompt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    LevelSelect,
    Playing,
    Paused,
    Victory,
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub rect: Rect,
    /// Pair id
    pub id: usize,
    pub face_up: bool,
    /// 0 face down, 1 face up
    pub flip: f32,
    pub matched: bool,
    pub flash: f32,
}

impl Card {
    fn new(rect: Rect, id: usize) -> Self {
        Self {
            rect,
            id,
            face_up: false,
            flip: 0.0,
            matched: false,
            flash: 0.0,
        }
    }

    fn update(&mut self, dt: f32) {
        let target = if self.face_up { 1.0 } else { 0.0 };
        if self.flip < target {
            self.flip = (self.flip + FLIP_SPEED * dt).min(target);
        } else if self.flip > target {
            self.flip = (self.flip - FLIP_SPEED * dt).max(target);
        }
        self.flash = (self.flash - dt).max(0.0);
    }

    /// Showing its face (past the halfway point of the flip)
    pub fn showing(&self) -> bool {
        self.flip >= 0.5
    }
}

/// Square card size and top-left offset for a grid
pub fn layout(rows: usize, cols: usize) -> (f32, f32, f32) {
    let available_w = WIDTH - CARD_MARGIN * (cols as f32 + 1.0);
    let available_h = HEIGHT - HUD_HEIGHT - CARD_MARGIN * (rows as f32 + 1.0);
    let size = (available_w / cols as f32)
        .floor()
        .min((available_h / rows as f32).floor());
    let total_w = size * cols as f32 + CARD_MARGIN * (cols as f32 - 1.0);
    let total_h = size * rows as f32 + CARD_MARGIN * (rows as f32 - 1.0);
    let offset_x = ((WIDTH - total_w) / 2.0).floor();
    let offset_y = HUD_HEIGHT + ((HEIGHT - HUD_HEIGHT - total_h) / 2.0).floor();
    (size, offset_x, offset_y)
}

#[derive(Debug, Clone)]
pub struct Memory {
    pub phase: GamePhase,
    /// 1-based level
    pub level: usize,
    pub cards: Vec<Card>,
    /// Indices of the cards turned this move
    pub pending: Vec<usize>,
    pub moves: u32,
    pub pairs_found: usize,
    pub elapsed: f32,
    /// Seconds left before the pending pair is judged
    pub reveal_timer: f32,
    /// Keyboard selection
    pub cursor: usize,
    pub hover: Option<usize>,
    pub report: Option<ScoreReport>,
    /// Leaderboards for each level, in `LEVELS` order, as they arrive
    pub records: Vec<ScoreReport>,
    rng: RngState,
    events: Vec<GameEvent>,
}

impl Memory {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            level: 1,
            cards: Vec::new(),
            pending: Vec::new(),
            moves: 0,
            pairs_found: 0,
            elapsed: 0.0,
            reveal_timer: 0.0,
            cursor: 0,
            hover: None,
            report: None,
            records: Vec::new(),
            rng: RngState::new(seed),
            events: Vec::new(),
        }
    }

    fn dims(&self) -> (usize, usize) {
        let (rows, cols, _) = LEVELS[self.level - 1];
        (rows, cols)
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn board(&self) -> String {
        format!("Level{}", self.level)
    }

    /// Deal a shuffled board for the selected level
    pub fn start(&mut self) {
        let (rows, cols) = self.dims();
        let (size, ox, oy) = layout(rows, cols);
        let pairs = rows * cols / 2;
        let mut ids: Vec<usize> = (0..pairs).chain(0..pairs).collect();
        self.rng.shuffle(&mut ids);

        self.cards = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let (row, col) = (i / cols, i % cols);
                let rect = Rect::new(
                    ox + col as f32 * (size + CARD_MARGIN),
                    oy + row as f32 * (size + CARD_MARGIN),
                    size,
                    size,
                );
                Card::new(rect, id)
            })
            .collect();
        self.pending.clear();
        self.moves = 0;
        self.pairs_found = 0;
        self.elapsed = 0.0;
        self.reveal_timer = 0.0;
        self.cursor = 0;
        self.report = None;
        self.phase = GamePhase::Playing;
    }

    pub fn score(&self) -> i64 {
        (self.moves as f32 + self.elapsed) as i64
    }

    /// Turn a card over; ignored while a pair is being judged
    pub fn flip(&mut self, index: usize) {
        if self.reveal_timer > 0.0 || self.pending.len() >= 2 {
            return;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return;
        };
        if card.face_up || card.matched || self.pending.contains(&index) {
            return;
        }
        card.face_up = true;
        self.pending.push(index);
        if self.pending.len() == 2 {
            self.moves += 1;
            self.reveal_timer = REVEAL_DELAY;
        }
    }

    fn card_at(&self, p: Vec2) -> Option<usize> {
        self.cards.iter().position(|c| c.rect.contains(p))
    }

    fn judge(&mut self) {
        if let [a, b] = self.pending[..] {
            if self.cards[a].id == self.cards[b].id {
                for i in [a, b] {
                    self.cards[i].matched = true;
                    self.cards[i].flash = MATCH_FLASH;
                }
                self.pairs_found += 1;
                if self.pairs_found == self.total_pairs() {
                    self.win();
                }
            } else {
                self.cards[a].face_up = false;
                self.cards[b].face_up = false;
            }
        }
        self.pending.clear();
    }

    fn win(&mut self) {
        let score = self.score();
        log::info!("Memory level {} won: {} moves, score {score}", self.level, self.moves);
        self.events.push(GameEvent::RunFinished {
            score,
            board: Some(self.board()),
        });
        self.phase = GamePhase::Victory;
    }

    fn move_cursor(&mut self, input: &TickInput) {
        let (rows, cols) = self.dims();
        let (mut row, mut col) = (self.cursor / cols, self.cursor % cols);
        for key in &input.pressed {
            match key {
                Key::Left => col = (col + cols - 1) % cols,
                Key::Right => col = (col + 1) % cols,
                Key::Up => row = (row + rows - 1) % rows,
                Key::Down => row = (row + 1) % rows,
                _ => {}
            }
        }
        self.cursor = row * cols + col;
    }

    fn update_playing(&mut self, input: &TickInput, dt: f32) {
        if input.pause_pressed() {
            self.phase = GamePhase::Paused;
            return;
        }

        self.elapsed += dt;
        self.move_cursor(input);
        self.hover = input.pointer.and_then(|p| self.card_at(p));

        if let Some(index) = input.click.and_then(|p| self.card_at(p)) {
            self.flip(index);
        }
        if input.was_pressed(Key::Action) || input.was_pressed(Key::Confirm) {
            self.flip(self.cursor);
        }

        for card in &mut self.cards {
            card.update(dt);
        }

        if self.reveal_timer > 0.0 {
            self.reveal_timer -= dt;
            if self.reveal_timer <= 0.0 {
                self.reveal_timer = 0.0;
                self.judge();
            }
        }
    }

    fn open_records(&mut self) {
        self.records.clear();
        for level in 1..=LEVELS.len() {
            self.events.push(GameEvent::RequestLeaderboard {
                board: Some(format!("Level{level}")),
            });
        }
        self.phase = GamePhase::Records;
    }

    fn draw_records(&self, list: &mut DrawList) {
        list.clear(BACKGROUND);
        list.title(60.0, "RECORDS", CARD_BACK);
        for (i, (_, _, name)) in LEVELS.iter().enumerate() {
            let top = 120.0 + i as f32 * 215.0;
            list.title(top, *name, SUCCESS);
            let lines: Vec<String> = match self.records.get(i) {
                None => vec!["Loading...".to_string()],
                Some(report) if report.unavailable => vec!["Leaderboard unavailable".to_string()],
                Some(report) if report.top.is_empty() => vec!["No scores yet".to_string()],
                Some(report) => report
                    .top
                    .iter()
                    .take(RECORDS_SHOWN)
                    .enumerate()
                    .map(|(rank, entry)| {
                        format!(
                            "{}. {:<12} {:>5}  {}",
                            rank + 1,
                            entry.name,
                            entry.score,
                            entry.date
                        )
                    })
                    .collect(),
            };
            for (row, line) in lines.into_iter().enumerate() {
                list.title(top + 36.0 + row as f32 * 28.0, line, TEXT);
            }
        }
        list.title(HEIGHT - 30.0, "ESC to go back", Color::GRAY);
    }

    fn draw_board(&self, list: &mut DrawList) {
        list.clear(BACKGROUND);
        list.rect(Rect::new(0.0, 0.0, WIDTH, HUD_HEIGHT), Color::WHITE);
        list.text(
            Vec2::new(20.0, 40.0),
            LEVELS[self.level - 1].2,
            CARD_BACK,
            Align::Left,
        );
        list.title(40.0, format!("Moves: {}", self.moves), TEXT);
        list.text(
            Vec2::new(WIDTH * 0.7, 40.0),
            format!("Pairs: {}/{}", self.pairs_found, self.total_pairs()),
            TEXT,
            Align::Center,
        );
        list.text(
            Vec2::new(WIDTH - 20.0, 40.0),
            format!("Time: {}", format_clock(self.elapsed)),
            TEXT,
            Align::Right,
        );

        for (i, card) in self.cards.iter().enumerate() {
            // Width shrinks through the middle of a flip
            let scale = (card.flip * std::f32::consts::PI).cos().abs();
            let w = card.rect.w * scale;
            if w < 5.0 {
                continue;
            }
            let rect = Rect::new(card.rect.center().x - w / 2.0, card.rect.y, w, card.rect.h);
            list.rect(rect.translate(Vec2::splat(5.0)), Color(210, 210, 215));
            if card.showing() {
                list.rect(rect, CARD_FRONT);
                let face = FACES[card.id % FACES.len()];
                list.circle(rect.center(), rect.w.min(rect.h) * 0.3, face);
                let glyph = char::from(b'A' + (card.id % 26) as u8);
                list.text(rect.center(), glyph.to_string(), Color::WHITE, Align::Center);
            } else {
                let color = if self.hover == Some(i) { CARD_HOVER } else { CARD_BACK };
                list.rect(rect, color);
            }
            if card.flash > 0.0 {
                list.frame(rect, HIGHLIGHT);
                list.frame(rect.inset(2.0), HIGHLIGHT);
            } else if card.matched {
                list.frame(rect, SUCCESS);
            }
            if i == self.cursor {
                list.frame(rect.inset(-4.0), TEXT);
            }
        }
    }
}

impl Game for Memory {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            GamePhase::Menu => {
                if input.was_pressed(Key::Confirm) || input.was_pressed(Key::Action) {
                    self.start();
                } else if input.letter_pressed('l') {
                    self.phase = GamePhase::LevelSelect;
                } else if input.letter_pressed('r') {
                    self.open_records();
                } else if input.was_pressed(Key::Back) {
                    self.events.push(GameEvent::Quit);
                }
            }
            GamePhase::LevelSelect => {
                if let Some(d) = input.digit() {
                    if (1..=LEVELS.len()).contains(&(d as usize)) {
                        self.level = d as usize;
                        self.phase = GamePhase::Menu;
                    }
                } else if input.was_pressed(Key::Back) {
                    self.phase = GamePhase::Menu;
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
            GamePhase::Victory => {
                for card in &mut self.cards {
                    card.update(dt);
                }
                if input.was_pressed(Key::Confirm) {
                    if self.level < LEVELS.len() {
                        self.level += 1;
                    }
                    self.start();
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
                list.title(150.0, "MEMORY GAME", CARD_BACK);
                list.title(210.0, format!("Selected: {}", LEVELS[self.level - 1].2), TEXT);
                let lines = ["ENTER  Play", "L  Choose level", "R  Records", "ESC  Exit"];
                for (i, line) in lines.iter().enumerate() {
                    list.title(320.0 + i as f32 * 50.0, *line, TEXT);
                }
            }
            GamePhase::LevelSelect => {
                list.clear(BACKGROUND);
                list.title(150.0, "CHOOSE LEVEL", CARD_BACK);
                for (i, (rows, cols, name)) in LEVELS.iter().enumerate() {
                    let color = if i + 1 == self.level { SUCCESS } else { TEXT };
                    list.title(
                        280.0 + i as f32 * 60.0,
                        format!("{}. {name} ({rows}x{cols})", i + 1),
                        color,
                    );
                }
                list.title(520.0, "Press 1-3, ESC to go back", Color::GRAY);
            }
            GamePhase::Playing => self.draw_board(list),
            GamePhase::Paused => {
                self.draw_board(list);
                list.dialog(
                    "PAUSED",
                    &["ESC  Continue".to_string(), "M  Menu".to_string()],
                    CARD_BACK,
                );
            }
            GamePhase::Victory => {
                self.draw_board(list);
                let mut lines = vec![
                    LEVELS[self.level - 1].2.to_string(),
                    format!("Time: {}", format_clock(self.elapsed)),
                    format!("Moves: {}", self.moves),
                    format!("Score: {}", self.score()),
                ];
                if let Some(report) = &self.report {
                    lines.extend(DrawList::report_lines(report));
                }
                let next = if self.level < LEVELS.len() { "Next level" } else { "Play again" };
                lines.push(format!("ENTER  {next}    R  Records    M  Menu"));
                list.dialog("VICTORY!", &lines, SUCCESS);
            }
            GamePhase::Records => self.draw_records(list),
        }
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_report(&mut self, report: ScoreReport) {
        if self.phase == GamePhase::Records {
            if self.records.len() < LEVELS.len() {
                self.records.push(report);
            }
        } else {
            self.report = Some(report);
        }
    }
}
