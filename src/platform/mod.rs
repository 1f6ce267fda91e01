//! Terminal frontend
//!
//! Handles the parts the simulations never see:
//! - Raw mode, alternate screen, mouse capture
//! - Input events (see `input`)
//! - Fixed-step accumulator and frame pacing
//! - Logging to a file so the screen stays clean

pub mod input;

use std::io::{self, Stdout};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use crossterm::{cursor, execute};
use glam::Vec2;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use self::input::InputState;
use crate::cabinet::Cabinet;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;
use crate::highscores::ScoreStore;
use crate::renderer::{Align, Canvas, Color, DrawList, Viewport};
use crate::settings::{Settings, log_file_path};
use crate::sim::Game;

pub type Backend = CrosstermBackend<Stdout>;

/// Route `log` output to the log file (RUST_LOG overrides the level)
pub fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file_path().and_then(|path| {
        Ok(std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?)
    }) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // Nowhere to write without garbling the screen
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    // A launcher may already have installed the logger
    let _ = builder.try_init();
}

/// Open the configured score database, or run without one
pub fn open_store(settings: &Settings) -> Option<ScoreStore> {
    match settings
        .database_file()
        .and_then(|path| ScoreStore::open(&path))
    {
        Ok(store) => Some(store),
        Err(e) => {
            log::warn!("Leaderboard unavailable: {e}");
            None
        }
    }
}

/// Raw-mode terminal, restored on drop
pub struct Session {
    pub terminal: Terminal<Backend>,
    enhanced: bool,
}

impl Session {
    pub fn enter() -> Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        match Self::setup() {
            Ok(session) => Ok(session),
            Err(e) => {
                restore(false);
                Err(e)
            }
        }
    }

    fn setup() -> Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        log::debug!("Terminal ready (key release events: {enhanced})");
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(Self { terminal, enhanced })
    }

    /// Release events are reported by this terminal
    pub fn enhanced(&self) -> bool {
        self.enhanced
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        restore(self.enhanced);
    }
}

fn restore(enhanced: bool) {
    let mut stdout = io::stdout();
    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen, cursor::Show);
    let _ = disable_raw_mode();
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore(true);
        previous(info);
    }));
}

/// Frame-rate counter averaged over the last second
#[derive(Debug)]
struct FpsCounter {
    frames: u32,
    since: Instant,
    fps: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
            fps: 0,
        }
    }

    fn frame(&mut self, now: Instant) -> u32 {
        self.frames += 1;
        let elapsed = now.duration_since(self.since).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = (self.frames as f32 / elapsed).round() as u32;
            self.frames = 0;
            self.since = now;
        }
        self.fps
    }
}

/// Fixed-step accumulator
#[derive(Debug, Default)]
pub struct Stepper {
    accumulator: f32,
}

impl Stepper {
    /// Number of `SIM_DT` steps owed for a real frame delta
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }
}

/// Drive a cabinet until the game quits or Ctrl+C
pub fn run<G: Game>(
    session: &mut Session,
    cabinet: &mut Cabinet<G>,
    settings: &Settings,
) -> Result<()> {
    let info = cabinet.info();
    log::info!("{} starting", info.title);

    let frame_time = Duration::from_secs_f32(1.0 / settings.effective_fps() as f32);
    let mut input = InputState::new(session.enhanced());
    let mut list = DrawList::new(info.width, info.height);
    let mut viewport: Option<Viewport> = None;
    let mut stepper = Stepper::default();
    let mut fps = FpsCounter::new();
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            input.handle(&ev, viewport.as_ref(), Instant::now());
        }
        if input.quit_requested() {
            log::info!("{} interrupted", info.title);
            break;
        }

        let now = Instant::now();
        let steps = stepper.advance(now.duration_since(last).as_secs_f32());
        last = now;
        for _ in 0..steps {
            cabinet.tick(&input.snapshot(now), SIM_DT);
            input.clear_one_shots();
            if cabinet.wants_quit() {
                break;
            }
        }
        if cabinet.wants_quit() {
            log::info!("{} closed", info.title);
            break;
        }

        list.clear(Color::BLACK);
        cabinet.draw(&mut list);
        let shown = fps.frame(now);
        if settings.show_fps {
            list.text(
                Vec2::new(info.width - 8.0, 8.0),
                format!("{shown} FPS"),
                Color::GRAY,
                Align::Right,
            );
        }
        session.terminal.draw(|frame| {
            let area = frame.area();
            viewport = Some(Viewport::fit(area, info.width, info.height));
            frame.render_widget(Canvas::new(&list), area);
        })?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            // Wakes early on input
            event::poll(frame_time - elapsed)?;
        }
    }
    Ok(())
}

/// Run one game in its own terminal session
pub fn play<G: Game>(game: G, settings: &Settings) -> Result<()> {
    let store = open_store(settings);
    let mut cabinet = Cabinet::new(game, store, settings.username.clone());
    let mut session = Session::enter()?;
    run(&mut session, &mut cabinet, settings)
}

/// Map a top-level result to a process exit code
pub fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepper_accumulates() {
        let mut stepper = Stepper::default();
        assert_eq!(stepper.advance(SIM_DT * 0.5), 0);
        assert_eq!(stepper.advance(SIM_DT * 0.6), 1);
        assert_eq!(stepper.advance(SIM_DT * 2.0), 2);
    }

    #[test]
    fn test_stepper_caps_long_frames() {
        let mut stepper = Stepper::default();
        // Clamped to MAX_FRAME_DT, about six steps
        let steps = stepper.advance(5.0);
        assert!((5..=6).contains(&steps));
        assert!(steps <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_fps_counter() {
        let start = Instant::now();
        let mut fps = FpsCounter {
            frames: 0,
            since: start,
            fps: 0,
        };
        for i in 1..=39 {
            assert_eq!(fps.frame(start + Duration::from_millis(i * 25)), 0);
        }
        assert_eq!(fps.frame(start + Duration::from_millis(1000)), 40);
    }
}
