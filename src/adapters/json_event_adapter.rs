//! Session events as JSON lines.

use crate::ports::event_port::{EventPort, SessionEvent};
use std::io::Write;

pub struct JsonEventAdapter<W: Write> {
    out: W,
}

impl<W: Write> JsonEventAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonEventAdapter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> EventPort for JsonEventAdapter<W> {
    fn publish(&mut self, event: &SessionEvent) {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"));
        if let Err(e) = written {
            log::warn!("failed to write {} event: {}", event.name(), e);
        }
    }
}
