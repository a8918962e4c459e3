use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Terminal input as seen by the app loop.
#[derive(Clone, Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// What a key press asks the quiz to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// A digit or a leading minus sign for the answer being typed.
    Type(char),
    Erase,
    Submit,
    Up,
    Down,
    Difficulty(char),
    Home,
    Quit,
}

/// Maps a key to a command. Releases and unbound keys map to nothing.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => Some(Command::Type(c)),
        KeyCode::Char(c @ ('e' | 'n' | 'h')) => Some(Command::Difficulty(c)),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Backspace => Some(Command::Erase),
        KeyCode::Enter => Some(Command::Submit),
        KeyCode::Up => Some(Command::Up),
        KeyCode::Down => Some(Command::Down),
        KeyCode::Esc => Some(Command::Home),
        _ => None,
    }
}

/// Source of terminal input.
pub trait InputSource: Send + 'static {
    /// Waits up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct CrosstermInput {
    rx: Receiver<InputEvent>,
}

impl CrosstermInput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => Some(InputEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => Some(InputEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for CrosstermInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed input for headless runs and tests.
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the app one event at a time, yielding `Tick` when idle.
pub struct Runner<S: InputSource> {
    input: S,
    tick: Duration,
}

impl<S: InputSource> Runner<S> {
    pub fn new(input: S, tick: Duration) -> Self {
        Self { input, tick }
    }

    pub fn step(&self) -> InputEvent {
        match self.input.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                InputEvent::Tick
            }
        }
    }
}
