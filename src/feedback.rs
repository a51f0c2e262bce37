use std::io::{self, Write};

use thiserror::Error;
use tracing::debug;

/// Moments in a workout that deserve a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Pause,
    Resume,
    Finish,
}

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("sound output unavailable")]
    Unavailable,

    #[error("failed to emit cue")]
    Io(#[from] io::Error),
}

pub trait Feedback {
    fn notify(&mut self, cue: Cue) -> Result<(), FeedbackError>;
}

/// Rings the terminal bell
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Feedback for TerminalBell<W> {
    fn notify(&mut self, _cue: Cue) -> Result<(), FeedbackError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Used when sound is turned off in the config
pub struct Muted;

impl Feedback for Muted {
    fn notify(&mut self, _cue: Cue) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable)
    }
}

/// Best-effort cue delivery: try the primary (sound), fall back to a visual flash.
///
/// `signal` never fails; the UI picks up the flash with `take_flash`.
pub struct FeedbackChain {
    primary: Box<dyn Feedback>,
    flash: Option<Cue>,
}

impl FeedbackChain {
    pub fn new(primary: Box<dyn Feedback>) -> Self {
        Self {
            primary,
            flash: None,
        }
    }

    pub fn muted() -> Self {
        Self::new(Box::new(Muted))
    }

    pub fn signal(&mut self, cue: Cue) {
        if let Err(e) = self.primary.notify(cue) {
            debug!(%cue, error = %e, "sound cue failed, flashing instead");
            self.flash = Some(cue);
        }
    }

    pub fn take_flash(&mut self) -> Option<Cue> {
        self.flash.take()
    }

    pub fn pending_flash(&self) -> Option<Cue> {
        self.flash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn bell_writes_bel() {
        let mut buf = Vec::new();
        TerminalBell::new(&mut buf).notify(Cue::Pause).unwrap();
        assert_eq!(buf, b"\x07");
    }

    #[test]
    fn successful_sound_needs_no_flash() {
        let mut chain = FeedbackChain::new(Box::new(TerminalBell::new(Vec::new())));
        chain.signal(Cue::Resume);
        assert_eq!(chain.take_flash(), None);
    }

    #[test]
    fn failing_sound_falls_back_to_flash() {
        let mut chain = FeedbackChain::new(Box::new(TerminalBell::new(Broken)));
        chain.signal(Cue::Finish);
        assert_eq!(chain.pending_flash(), Some(Cue::Finish));
        assert_eq!(chain.take_flash(), Some(Cue::Finish));
        assert_eq!(chain.take_flash(), None);
    }

    #[test]
    fn muted_always_flashes() {
        let mut chain = FeedbackChain::muted();
        chain.signal(Cue::Pause);
        assert_eq!(chain.take_flash(), Some(Cue::Pause));
    }
}
