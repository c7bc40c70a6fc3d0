//! Raw-mode terminal surface for `fadewrite write`.
//!
//! The presenter draws the buffer in a colour that slides from ink toward
//! paper as intensity rises, tinted red on each heartbeat pulse. The shared
//! [`EditorState`] is how a destruction reaches the key reader: once the
//! buffer is wiped the next keystroke starts a fresh session.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use fadewrite_core::{word_count, DecayFrame, Presenter};
use tracing::warn;

const HEARTBEAT_RED: Rgb = Rgb(239, 68, 68);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`.
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear blend toward `other`; `t` is clamped to `[0, 1]`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
    }

    fn color(self) -> Color {
        Color::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

/// Colour of the text for a given frame.
pub fn frame_color(ink: Rgb, paper: Rgb, frame: &DecayFrame) -> Rgb {
    // Stop short of the paper colour so the words stay faintly readable.
    let faded = ink.mix(paper, frame.intensity * 0.92);
    faded.mix(HEARTBEAT_RED, frame.pulse * 0.6)
}

/// What the key reader needs to know about the buffer.
#[derive(Debug, Default)]
pub struct EditorState {
    pub text: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SharedEditor(Arc<Mutex<EditorState>>);

impl SharedEditor {
    pub fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Raw mode plus alternate screen for as long as the guard lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), ResetColor, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub struct TerminalPresenter {
    out: Stdout,
    ink: Rgb,
    paper: Rgb,
    show_status: bool,
    editor: SharedEditor,
    status: String,
}

impl TerminalPresenter {
    pub fn new(ink: Rgb, paper: Rgb, show_status: bool, editor: SharedEditor) -> Self {
        Self {
            out: io::stdout(),
            ink,
            paper,
            show_status,
            editor,
            status: String::new(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn draw(&mut self, text: &str, color: Rgb, footer: &str) {
        if let Err(e) = self.try_draw(text, color, footer) {
            warn!(error = %e, "terminal draw failed");
        }
    }

    fn try_draw(&mut self, text: &str, color: Rgb, footer: &str) -> io::Result<()> {
        let (_, rows) = terminal::size().unwrap_or((80, 24));
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            SetForegroundColor(color.color()),
            // Raw mode does not translate newlines.
            Print(text.replace('\n', "\r\n")),
            ResetColor,
        )?;
        if self.show_status {
            queue!(
                self.out,
                MoveTo(0, rows.saturating_sub(1)),
                SetForegroundColor(Color::DarkGrey),
                Print(footer),
                ResetColor,
            )?;
        }
        self.out.flush()
    }

    fn footer(&self, text: &str, remaining: Option<f64>) -> String {
        let words = word_count(text);
        let mut footer = match remaining {
            Some(secs) => format!("{secs:>4.1}s left | {words} words"),
            None => format!("{words} words"),
        };
        footer.push_str(" | esc reset  ^S save  ^Q quit");
        if !self.status.is_empty() {
            footer.push_str(" | ");
            footer.push_str(&self.status);
        }
        footer
    }
}

impl Presenter for TerminalPresenter {
    fn on_frame(&mut self, text: &str, frame: &DecayFrame) {
        let color = frame_color(self.ink, self.paper, frame);
        let footer = self.footer(text, Some(frame.remaining_seconds));
        self.draw(text, color, &footer);
    }

    fn on_destroyed(&mut self, _final_text: &str, word_count: usize) {
        {
            let mut editor = self.editor.lock();
            editor.text.clear();
            editor.active = false;
        }
        self.status = format!("{word_count} words gone, start typing again");
        let footer = self.footer("", None);
        self.draw("", self.ink, &footer);
    }

    fn on_restore(&mut self, text: &str) {
        let footer = self.footer(text, None);
        self.draw(text, self.ink, &footer);
    }

    fn on_status(&mut self, message: &str) {
        self.status = message.to_string();
    }
}
