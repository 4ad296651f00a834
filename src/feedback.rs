use std::io::{self, Write};

/// Audible cue played alongside a coin drop. Best-effort: callers log and
/// drop any error.
pub trait FeedbackPlayer {
    fn play(&mut self) -> io::Result<()>;
}

/// Rings the terminal bell
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FeedbackPlayer for TerminalBell<W> {
    fn play(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl FeedbackPlayer for SilentPlayer {
    fn play(&mut self) -> io::Result<()> {
        Ok(())
    }
}
