use std::io::{IsTerminal, stdin};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("standard input is not an interactive terminal")]
    NotInteractive,

    #[error("terminal device error: {0}")]
    Device(#[from] std::io::Error),
}

/// Scoped raw-mode acquisition. The previous terminal mode is restored
/// when the guard drops, on every exit path.
///
/// While a guard is alive, no other reader may block on stdin; the watcher
/// is the sole stdin consumer for the duration of a request.
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn acquire() -> Result<Self, TerminalError> {
        if !stdin().is_terminal() {
            return Err(TerminalError::NotInteractive);
        }
        terminal::enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Source of single keystrokes with a bounded wait.
///
/// The watcher depends only on this trait, so tests can script key
/// sequences and other frontends can plug in their own reader.
pub trait KeySource: Send + 'static {
    /// Prepare the source for key-at-a-time reads.
    fn open(&mut self) -> Result<(), TerminalError>;

    /// Wait up to `timeout` for one keystroke. `Ok(None)` means the
    /// timeout elapsed with no input.
    fn try_read_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>, TerminalError>;
}

/// Reads keystrokes from the real terminal, holding raw mode while open.
#[derive(Default)]
pub struct TerminalKeys {
    guard: Option<RawModeGuard>,
}

impl TerminalKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for TerminalKeys {
    fn open(&mut self) -> Result<(), TerminalError> {
        self.guard = Some(RawModeGuard::acquire()?);
        Ok(())
    }

    fn try_read_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>, TerminalError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key.code));
            }
        }
        Ok(None)
    }
}

/// Parses a configured key name ("esc", "enter", "tab", or a single
/// character) into a key code.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    match name.trim().to_ascii_lowercase().as_str() {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counters shared with the test body so it can assert session
    /// lifecycle properties after the source has been moved into a
    /// watcher thread.
    #[derive(Default)]
    pub struct SourceState {
        opened: AtomicUsize,
        closed: AtomicUsize,
        overlaps: AtomicUsize,
        open_now: AtomicBool,
    }

    impl SourceState {
        pub fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        pub fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }

        /// Times a second session was opened before the first closed.
        pub fn overlaps(&self) -> usize {
            self.overlaps.load(Ordering::SeqCst)
        }
    }

    /// Deterministic [`KeySource`]: plays back a fixed key script, then
    /// goes quiet. Each scripted step consumes `step_delay` of real time.
    pub struct ScriptedKeys {
        steps: VecDeque<Option<KeyCode>>,
        step_delay: Duration,
        fail_open: bool,
        is_open: bool,
        state: Arc<SourceState>,
    }

    impl ScriptedKeys {
        pub fn script(steps: Vec<Option<KeyCode>>, step_delay: Duration) -> Self {
            Self {
                steps: steps.into(),
                step_delay,
                fail_open: false,
                is_open: false,
                state: Arc::default(),
            }
        }

        /// A source that never produces a key.
        pub fn quiet() -> Self {
            Self::script(Vec::new(), Duration::from_millis(5))
        }

        /// A source whose `open` fails, as on a non-interactive stdin.
        pub fn failing() -> Self {
            let mut keys = Self::quiet();
            keys.fail_open = true;
            keys
        }

        pub fn state(&self) -> Arc<SourceState> {
            Arc::clone(&self.state)
        }
    }

    impl KeySource for ScriptedKeys {
        fn open(&mut self) -> Result<(), TerminalError> {
            if self.fail_open {
                return Err(TerminalError::NotInteractive);
            }
            if self.state.open_now.swap(true, Ordering::SeqCst) {
                self.state.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            self.state.opened.fetch_add(1, Ordering::SeqCst);
            self.is_open = true;
            Ok(())
        }

        fn try_read_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>, TerminalError> {
            match self.steps.pop_front() {
                Some(step) => {
                    std::thread::sleep(self.step_delay.min(timeout));
                    Ok(step)
                }
                None => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    impl Drop for ScriptedKeys {
        fn drop(&mut self) {
            if self.is_open {
                self.state.open_now.store(false, Ordering::SeqCst);
                self.state.closed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_keys() {
        assert_eq!(parse_key_name("esc"), Some(KeyCode::Esc));
        assert_eq!(parse_key_name("Escape"), Some(KeyCode::Esc));
        assert_eq!(parse_key_name("enter"), Some(KeyCode::Enter));
        assert_eq!(parse_key_name("tab"), Some(KeyCode::Tab));
    }

    #[test]
    fn parses_single_characters() {
        assert_eq!(parse_key_name("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key_name(" x "), Some(KeyCode::Char('x')));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(parse_key_name("hyperspace"), None);
        assert_eq!(parse_key_name(""), None);
    }
}
