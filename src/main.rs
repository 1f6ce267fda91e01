//! Arcade launcher
//!
//! Lists the eight games and runs the chosen one in the same terminal
//! session, returning to the menu when it quits.

use std::process::ExitCode;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Flex, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};

use arcade_suite::platform::{self, Session};
use arcade_suite::sim::state::clock_seed;
use arcade_suite::sim::{
    Game, GameInfo, arkanoid, dino, flappy, invaders, memory, racing, snake, sonic,
};
use arcade_suite::{Cabinet, Result, ScoreStore, Settings};

static GAMES: [&GameInfo; 8] = [
    &arkanoid::INFO,
    &snake::INFO,
    &dino::INFO,
    &flappy::INFO,
    &memory::INFO,
    &racing::INFO,
    &sonic::INFO,
    &invaders::INFO,
];

/// What the menu asked for
enum Choice {
    Play(usize),
    Quit,
}

fn main() -> ExitCode {
    platform::init_logging();
    log::info!("Arcade launcher starting");
    let settings = Settings::load();
    platform::exit_code(run(&settings))
}

fn run(settings: &Settings) -> Result<()> {
    let mut store = platform::open_store(settings);
    let mut session = Session::enter()?;
    let mut state = ListState::default().with_selected(Some(0));

    loop {
        match menu(&mut session, &mut state)? {
            Choice::Quit => break,
            Choice::Play(index) => {
                log::info!("Launching {}", GAMES[index].title);
                store = launch(index, &mut session, settings, store)?;
                session.terminal.clear()?;
            }
        }
    }
    log::info!("Arcade launcher closed");
    Ok(())
}

fn launch(
    index: usize,
    session: &mut Session,
    settings: &Settings,
    store: Option<ScoreStore>,
) -> Result<Option<ScoreStore>> {
    let game = build(index, clock_seed(), settings);
    let mut cabinet = Cabinet::new(game, store, settings.username.clone());
    platform::run(session, &mut cabinet, settings)?;
    Ok(cabinet.into_store())
}

/// Construct the game listed at `index` in `GAMES`
fn build(index: usize, seed: u64, settings: &Settings) -> Box<dyn Game> {
    match index {
        0 => Box::new(arkanoid::Arkanoid::new(seed, settings.mouse_paddle)),
        1 => Box::new(snake::Snake::new(seed)),
        2 => Box::new(dino::DinoRun::new(seed)),
        3 => Box::new(flappy::Flappy::new(seed)),
        4 => Box::new(memory::Memory::new(seed)),
        5 => Box::new(racing::Racing::new(seed, settings.effective_opponents())),
        6 => Box::new(sonic::Sonic::new(seed)),
        _ => Box::new(invaders::Invaders::new(seed)),
    }
}

/// Show the menu until a game is picked or the player leaves
fn menu(session: &mut Session, state: &mut ListState) -> Result<Choice> {
    loop {
        session.terminal.draw(|frame| {
            let [area] = Layout::horizontal([Constraint::Length(40)])
                .flex(Flex::Center)
                .areas(frame.area());
            let [list_area, help_area] =
                Layout::vertical([Constraint::Length(GAMES.len() as u16 + 2), Constraint::Length(2)])
                    .flex(Flex::Center)
                    .areas(area);

            let items: Vec<ListItem> = GAMES
                .iter()
                .enumerate()
                .map(|(i, info)| ListItem::new(format!(" {}  {}", i + 1, info.title)))
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title(Line::from(" ARCADE ").centered()),
                )
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                );
            frame.render_stateful_widget(list, list_area, state);

            let help = Paragraph::new("ENTER play   1-8 pick   ESC quit")
                .style(Style::default().fg(Color::DarkGray))
                .centered();
            frame.render_widget(help, help_area);
        })?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Choice::Quit);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k' | 'w') => state.select_previous(),
            KeyCode::Down | KeyCode::Char('j' | 's') => state.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                return Ok(Choice::Play(state.selected().unwrap_or(0).min(GAMES.len() - 1)));
            }
            KeyCode::Char(c @ '1'..='8') => {
                return Ok(Choice::Play(c as usize - '1' as usize));
            }
            KeyCode::Esc | KeyCode::Char('q') => return Ok(Choice::Quit),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_menu_entry_builds_its_game() {
        let settings = Settings::default();
        for (index, info) in GAMES.iter().enumerate() {
            let game = build(index, 1, &settings);
            assert_eq!(game.info().title, info.title, "menu entry {}", index + 1);
            assert_eq!(game.info().db_name, info.db_name);
        }
    }

    #[test]
    fn test_menu_titles_are_distinct() {
        let mut titles: Vec<&str> = GAMES.iter().map(|info| info.title).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), GAMES.len());
    }
}
