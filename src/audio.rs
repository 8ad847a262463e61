//! Audio boundary: sound cues drained from the session are handed to a sink.

use crate::game::SoundEvent;
use log::debug;
use std::io::Write;

pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Drops every cue (default).
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, event: SoundEvent) {
        debug!("sound {event:?}");
    }
}

/// Rings the terminal bell on a match and at game over.
#[derive(Debug, Default)]
pub struct Bell;

impl AudioSink for Bell {
    fn play(&mut self, event: SoundEvent) {
        debug!("sound {event:?}");
        if matches!(event, SoundEvent::Match | SoundEvent::GameOver) {
            let mut out = std::io::stdout();
            // A failed bell is not worth interrupting the game for.
            let _ = out.write_all(b"\x07").and_then(|()| out.flush());
        }
    }
}

pub fn sink(bell: bool) -> Box<dyn AudioSink> {
    if bell { Box::new(Bell) } else { Box::new(Silent) }
}
