//! Terminal events to `TickInput`
//!
//! Terminals with the keyboard enhancement protocol report key releases, so
//! held keys clear exactly. Elsewhere a held key is one that was seen within
//! the last `HOLD_DECAY`.

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::renderer::Viewport;
use crate::sim::{Key, TickInput};

/// How long a key counts as held without a repeat
pub const HOLD_DECAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    Left,
    Right,
    Up,
    Down,
    Action,
}

#[derive(Debug)]
pub struct InputState {
    /// Release events are reported
    enhanced: bool,
    /// Last press per held control, indexed by `Hold`
    held: [Option<Instant>; 5],
    pressed: Vec<Key>,
    pointer: Option<glam::Vec2>,
    click: Option<glam::Vec2>,
    quit: bool,
}

impl InputState {
    pub fn new(enhanced: bool) -> Self {
        Self {
            enhanced,
            held: [None; 5],
            pressed: Vec::new(),
            pointer: None,
            click: None,
            quit: false,
        }
    }

    /// Ctrl+C was pressed
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn handle(&mut self, event: &Event, viewport: Option<&Viewport>, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                let Some(p) = viewport.and_then(|vp| vp.to_logical(mouse.column, mouse.row))
                else {
                    return;
                };
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer = Some(p),
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.pointer = Some(p);
                        self.click = Some(p);
                    }
                    _ => {}
                }
            }
            Event::FocusLost => self.held = [None; 5],
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.quit = true;
            return;
        }

        let hold = hold_for(key.code);
        match key.kind {
            KeyEventKind::Release => {
                if let Some(h) = hold {
                    self.held[h as usize] = None;
                }
            }
            KeyEventKind::Repeat => {
                if let Some(h) = hold {
                    self.held[h as usize] = Some(now);
                }
            }
            KeyEventKind::Press => {
                if let Some(h) = hold {
                    self.held[h as usize] = Some(now);
                }
                self.pressed.extend(keys_for(key.code));
            }
        }
    }

    fn is_held(&self, hold: Hold, now: Instant) -> bool {
        match self.held[hold as usize] {
            Some(_) if self.enhanced => true,
            Some(at) => now.duration_since(at) < HOLD_DECAY,
            None => false,
        }
    }

    /// Input for the next tick
    pub fn snapshot(&self, now: Instant) -> TickInput {
        TickInput {
            left: self.is_held(Hold::Left, now),
            right: self.is_held(Hold::Right, now),
            up: self.is_held(Hold::Up, now),
            down: self.is_held(Hold::Down, now),
            action: self.is_held(Hold::Action, now),
            pressed: self.pressed.clone(),
            pointer: self.pointer,
            click: self.click,
        }
    }

    /// Forget one-shot presses once a tick has seen them
    pub fn clear_one_shots(&mut self) {
        self.pressed.clear();
        self.click = None;
    }
}

fn hold_for(code: KeyCode) -> Option<Hold> {
    match code {
        KeyCode::Left | KeyCode::Char('a' | 'A') => Some(Hold::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => Some(Hold::Right),
        KeyCode::Up | KeyCode::Char('w' | 'W') => Some(Hold::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Some(Hold::Down),
        KeyCode::Char(' ') => Some(Hold::Action),
        _ => None,
    }
}

/// One-shot keys raised by a press; WASD also counts as arrows
fn keys_for(code: KeyCode) -> Vec<Key> {
    match code {
        KeyCode::Left => vec![Key::Left],
        KeyCode::Right => vec![Key::Right],
        KeyCode::Up => vec![Key::Up],
        KeyCode::Down => vec![Key::Down],
        KeyCode::Enter => vec![Key::Confirm],
        KeyCode::Esc => vec![Key::Back],
        KeyCode::Backspace => vec![Key::Backspace],
        KeyCode::Char(' ') => vec![Key::Action],
        KeyCode::Char(c) => {
            if let Some(d) = c.to_digit(10) {
                return vec![Key::Digit(d as u8)];
            }
            let arrow = match c.to_ascii_lowercase() {
                'a' => Some(Key::Left),
                'd' => Some(Key::Right),
                'w' => Some(Key::Up),
                's' => Some(Key::Down),
                _ => None,
            };
            arrow.into_iter().chain([Key::Char(c)]).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_press_raises_one_shot_and_hold() {
        let now = Instant::now();
        let mut input = InputState::new(false);
        input.handle(&key(KeyCode::Left, KeyEventKind::Press), None, now);
        let tick = input.snapshot(now);
        assert!(tick.left);
        assert_eq!(tick.pressed, vec![Key::Left]);

        input.clear_one_shots();
        assert!(input.snapshot(now).pressed.is_empty());
    }

    #[test]
    fn test_hold_decays_without_repeats() {
        let now = Instant::now();
        let mut input = InputState::new(false);
        input.handle(&key(KeyCode::Char(' '), KeyEventKind::Press), None, now);
        assert!(input.snapshot(now + Duration::from_millis(100)).action);
        assert!(!input.snapshot(now + Duration::from_millis(200)).action);
    }

    #[test]
    fn test_enhanced_hold_lasts_until_release() {
        let now = Instant::now();
        let mut input = InputState::new(true);
        input.handle(&key(KeyCode::Up, KeyEventKind::Press), None, now);
        assert!(input.snapshot(now + Duration::from_secs(5)).up);
        input.handle(&key(KeyCode::Up, KeyEventKind::Release), None, now);
        assert!(!input.snapshot(now).up);
    }

    #[test]
    fn test_wasd_and_digits() {
        assert_eq!(keys_for(KeyCode::Char('W')), vec![Key::Up, Key::Char('W')]);
        assert_eq!(keys_for(KeyCode::Char('7')), vec![Key::Digit(7)]);
        assert_eq!(keys_for(KeyCode::Char('p')), vec![Key::Char('p')]);
        assert_eq!(keys_for(KeyCode::Esc), vec![Key::Back]);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = InputState::new(false);
        let event = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        input.handle(&event, None, Instant::now());
        assert!(input.quit_requested());
        assert!(input.snapshot(Instant::now()).pressed.is_empty());
    }
}
