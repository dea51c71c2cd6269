use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crate::domain::{Settings, Message, YaalaError};

pub struct Controller {
    event_poll_time: u64
}

impl Controller {
    pub fn new(settings: &Settings) -> Self {
        Self {
            event_poll_time: settings.event_poll_time,
        }
    }

    pub fn handle_event(&self) -> Result<Option<Message>, YaalaError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
                && key.kind == event::KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
        Ok(None)
    }

    // Raw mode swallows SIGINT, so Ctrl-C arrives here as a key.
    fn handle_key(&self, key: KeyEvent) -> Message {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Message::Interrupt,
            _ => Message::RawKey(key),
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

}
