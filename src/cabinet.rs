//! Cabinet: one game plus its name entry overlay and leaderboard
//!
//! Games only raise events. The cabinet decides whether a name is needed,
//! writes the score and hands a `ScoreReport` back.

use crate::highscores::ScoreStore;
use crate::name_entry::NameEntry;
use crate::renderer::{Color, DrawList};
use crate::sim::{Game, GameEvent, GameInfo, Key, NamePolicy, ScoreReport, TickInput};

/// Longest free-form name
const PROMPT_NAME_LEN: usize = 20;

/// A finished run waiting for its name
#[derive(Debug, Clone)]
struct PendingRun {
    score: i64,
    board: Option<String>,
    entry: NameEntry,
}

pub struct Cabinet<G: Game> {
    game: G,
    store: Option<ScoreStore>,
    /// Name for `NamePolicy::Settings`
    username: String,
    /// Name typed once for `NamePolicy::Prompt`
    session_name: Option<String>,
    pending: Option<PendingRun>,
    quit: bool,
}

impl<G: Game> Cabinet<G> {
    pub fn new(game: G, store: Option<ScoreStore>, username: impl Into<String>) -> Self {
        Self {
            game,
            store,
            username: username.into(),
            session_name: None,
            pending: None,
            quit: false,
        }
    }

    pub fn info(&self) -> &'static GameInfo {
        self.game.info()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Hand the store back so a launcher can reuse it for the next game
    pub fn into_store(self) -> Option<ScoreStore> {
        self.store
    }

    pub fn is_entering_name(&self) -> bool {
        self.pending.is_some()
    }

    pub fn wants_quit(&self) -> bool {
        self.quit
    }

    /// Advance the overlay or the game by one step
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if self.pending.is_some() {
            self.tick_name_entry(input);
            return;
        }
        self.game.tick(input, dt);
        for event in self.game.drain_events() {
            self.handle_event(event);
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        self.game.draw(list);
        if let Some(run) = &self.pending {
            let heading = if run.entry.is_arcade() {
                "ENTER YOUR INITIALS"
            } else {
                "ENTER YOUR NAME"
            };
            let lines = vec![
                format!("Score: {}", run.score),
                String::new(),
                run.entry.display(),
                String::new(),
                "ENTER to save    ESC to skip".to_string(),
            ];
            list.dialog(heading, &lines, Color::YELLOW);
        }
    }

    fn tick_name_entry(&mut self, input: &TickInput) {
        let Some(run) = self.pending.as_mut() else {
            return;
        };
        for key in &input.pressed {
            match *key {
                Key::Char(c) => {
                    run.entry.push(c);
                }
                Key::Digit(d) => {
                    run.entry.push(char::from(b'0' + d));
                }
                Key::Action => {
                    run.entry.push(' ');
                }
                Key::Backspace => run.entry.backspace(),
                Key::Confirm => {
                    if let Some(name) = run.entry.accept() {
                        let score = run.score;
                        let board = run.board.clone();
                        self.pending = None;
                        if self.game.info().names == NamePolicy::Prompt {
                            self.session_name = Some(name.clone());
                        }
                        self.submit(&name, score, board.as_deref());
                        return;
                    }
                }
                Key::Back => {
                    log::debug!("Name entry skipped");
                    self.pending = None;
                    self.game.show_report(ScoreReport::default());
                    return;
                }
                _ => {}
            }
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::RunFinished { score, board } => self.run_finished(score, board),
            GameEvent::RequestLeaderboard { board } => self.request_leaderboard(board.as_deref()),
            GameEvent::Quit => self.quit = true,
        }
    }

    fn run_finished(&mut self, score: i64, board: Option<String>) {
        let info = self.game.info();
        log::info!("{} run finished with {score}", info.title);
        if self.store.is_none() {
            self.game.show_report(ScoreReport {
                unavailable: true,
                ..Default::default()
            });
            return;
        }

        match info.names {
            NamePolicy::Settings => {
                let name = self.username.clone();
                self.submit(&name, score, board.as_deref());
            }
            NamePolicy::Prompt if self.session_name.is_some() => {
                let name = self.session_name.clone().unwrap_or_default();
                self.submit(&name, score, board.as_deref());
            }
            policy => {
                if score <= 0 {
                    self.game.show_report(ScoreReport::default());
                    return;
                }
                let entry = match policy {
                    NamePolicy::Arcade => NameEntry::arcade(),
                    _ => NameEntry::free(PROMPT_NAME_LEN),
                };
                self.pending = Some(PendingRun {
                    score,
                    board,
                    entry,
                });
            }
        }
    }

    fn submit(&mut self, name: &str, score: i64, board: Option<&str>) {
        let info = self.game.info();
        let Some(store) = self.store.as_mut() else {
            self.game.show_report(ScoreReport {
                unavailable: true,
                ..Default::default()
            });
            return;
        };
        let username = match board {
            Some(board) => format!("{name}-{board}"),
            None => name.to_string(),
        };
        let report = match store.submit(&username, info.db_name, score, info.order, board) {
            Ok(outcome) => ScoreReport {
                saved: true,
                new_record: outcome.new_record,
                best: outcome.best,
                top: outcome.top,
                unavailable: false,
            },
            Err(e) => {
                log::warn!("Could not save score for {}: {e}", info.db_name);
                ScoreReport {
                    unavailable: true,
                    ..Default::default()
                }
            }
        };
        self.game.show_report(report);
    }

    fn request_leaderboard(&mut self, board: Option<&str>) {
        let info = self.game.info();
        let report = match self.store.as_mut() {
            Some(store) => match store.leaderboard(info.db_name, info.order, board) {
                Ok(top) => ScoreReport {
                    top,
                    ..Default::default()
                },
                Err(e) => {
                    log::warn!("Could not load leaderboard for {}: {e}", info.db_name);
                    ScoreReport {
                        unavailable: true,
                        ..Default::default()
                    }
                }
            },
            None => ScoreReport {
                unavailable: true,
                ..Default::default()
            },
        };
        self.game.show_report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScoreOrder;

    static ARCADE: GameInfo = GameInfo {
        title: "Arcade Test",
        db_name: "Arcade Test",
        width: 100.0,
        height: 100.0,
        order: ScoreOrder::HigherIsBetter,
        names: NamePolicy::Arcade,
    };

    static PROMPT: GameInfo = GameInfo {
        title: "Prompt Test",
        db_name: "Prompt Test",
        width: 100.0,
        height: 100.0,
        order: ScoreOrder::LowerIsBetter,
        names: NamePolicy::Prompt,
    };

    static SETTINGS: GameInfo = GameInfo {
        title: "Settings Test",
        db_name: "Settings Test",
        width: 100.0,
        height: 100.0,
        order: ScoreOrder::HigherIsBetter,
        names: NamePolicy::Settings,
    };

    /// Game that raises whatever events a test queues
    struct FakeGame {
        info: &'static GameInfo,
        queued: Vec<GameEvent>,
        ticks: u32,
        reports: Vec<ScoreReport>,
    }

    impl FakeGame {
        fn new(info: &'static GameInfo) -> Self {
            Self {
                info,
                queued: Vec::new(),
                ticks: 0,
                reports: Vec::new(),
            }
        }
    }

    impl Game for FakeGame {
        fn info(&self) -> &'static GameInfo {
            self.info
        }

        fn tick(&mut self, _input: &TickInput, _dt: f32) {
            self.ticks += 1;
        }

        fn draw(&self, list: &mut DrawList) {
            list.clear(Color::BLACK);
        }

        fn drain_events(&mut self) -> Vec<GameEvent> {
            std::mem::take(&mut self.queued)
        }

        fn show_report(&mut self, report: ScoreReport) {
            self.reports.push(report);
        }
    }

    fn cabinet(info: &'static GameInfo) -> Cabinet<FakeGame> {
        let store = ScoreStore::open_url("sqlite::memory:").unwrap();
        Cabinet::new(FakeGame::new(info), Some(store), "SETTINGS")
    }

    fn finish(cab: &mut Cabinet<FakeGame>, score: i64, board: Option<&str>) {
        cab.game_mut().queued.push(GameEvent::RunFinished {
            score,
            board: board.map(str::to_string),
        });
        cab.tick(&TickInput::default(), 0.0);
    }

    fn type_keys(cab: &mut Cabinet<FakeGame>, text: &str) {
        let mut pressed: Vec<Key> = text.chars().map(Key::Char).collect();
        pressed.push(Key::Confirm);
        cab.tick(
            &TickInput {
                pressed,
                ..Default::default()
            },
            0.0,
        );
    }

    #[test]
    fn test_arcade_entry_submits_initials() {
        let mut cab = cabinet(&ARCADE);
        finish(&mut cab, 120, None);
        assert!(cab.is_entering_name());

        let ticks = cab.game().ticks;
        type_keys(&mut cab, "abc");
        assert!(!cab.is_entering_name());
        assert_eq!(cab.game().ticks, ticks);

        let report = cab.game().reports.last().unwrap();
        assert!(report.saved);
        assert!(report.new_record);
        assert_eq!(report.best, Some(120));
        assert_eq!(report.top[0].name, "ABC");
    }

    #[test]
    fn test_confirm_needs_three_letters() {
        let mut cab = cabinet(&ARCADE);
        finish(&mut cab, 10, None);
        type_keys(&mut cab, "ab");
        assert!(cab.is_entering_name());
        assert!(cab.game().reports.is_empty());
    }

    #[test]
    fn test_zero_score_skips_entry() {
        let mut cab = cabinet(&ARCADE);
        finish(&mut cab, 0, None);
        assert!(!cab.is_entering_name());
        let report = cab.game().reports.last().unwrap();
        assert!(!report.saved);
        assert!(!report.unavailable);
    }

    #[test]
    fn test_escape_skips_saving() {
        let mut cab = cabinet(&ARCADE);
        finish(&mut cab, 50, None);
        cab.tick(
            &TickInput {
                pressed: vec![Key::Back],
                ..Default::default()
            },
            0.0,
        );
        assert!(!cab.is_entering_name());
        assert!(!cab.game().reports.last().unwrap().saved);
    }

    #[test]
    fn test_prompt_name_is_remembered_with_board() {
        let mut cab = cabinet(&PROMPT);
        finish(&mut cab, 40, Some("Level1"));
        type_keys(&mut cab, "Ana");
        let report = cab.game().reports.last().unwrap();
        assert!(report.saved);
        assert_eq!(report.top[0].name, "Ana");

        finish(&mut cab, 30, Some("Level1"));
        assert!(!cab.is_entering_name());
        let report = cab.game().reports.last().unwrap();
        assert!(report.new_record);
        assert_eq!(report.best, Some(30));
        assert_eq!(report.top.len(), 2);
    }

    #[test]
    fn test_settings_policy_uses_username() {
        let mut cab = cabinet(&SETTINGS);
        finish(&mut cab, 0, None);
        assert!(!cab.is_entering_name());
        let report = cab.game().reports.last().unwrap();
        assert!(report.saved);
        assert_eq!(report.top[0].name, "SETTINGS");
    }

    #[test]
    fn test_missing_store_is_unavailable() {
        let mut cab = Cabinet::new(FakeGame::new(&ARCADE), None, "SETTINGS");
        finish(&mut cab, 500, None);
        assert!(!cab.is_entering_name());
        assert!(cab.game().reports.last().unwrap().unavailable);
    }

    #[test]
    fn test_leaderboard_request() {
        let mut cab = cabinet(&SETTINGS);
        finish(&mut cab, 75, None);
        cab.game_mut()
            .queued
            .push(GameEvent::RequestLeaderboard { board: None });
        cab.tick(&TickInput::default(), 0.0);

        let report = cab.game().reports.last().unwrap();
        assert!(!report.saved);
        assert_eq!(report.top.len(), 1);
        assert_eq!(report.top[0].score, 75);
    }

    #[test]
    fn test_quit_event() {
        let mut cab = cabinet(&ARCADE);
        cab.game_mut().queued.push(GameEvent::Quit);
        cab.tick(&TickInput::default(), 0.0);
        assert!(cab.wants_quit());
    }
}
