//! Console output
//!
//! Line-oriented, optionally colored output for the interactive menus.

use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::fmt::Display;
use std::io::{self, Write};

/// Width of section banners
pub const BANNER_WIDTH: usize = 80;

/// Width of menu banners
pub const MENU_WIDTH: usize = 60;

/// Writes human-readable lines to any `Write`.
///
/// Writes never fail at the call site; the first I/O error is kept and
/// surfaced by [`Console::check`], which the menu loop calls once per
/// iteration.
pub struct Console<W: Write> {
    out: W,
    styled: bool,
    error: Option<io::Error>,
}

impl Console<io::Stdout> {
    /// Console on standard output, colored when attached to a terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let styled = out.is_tty();
        Self {
            out,
            styled,
            error: None,
        }
    }
}

impl<W: Write> Console<W> {
    /// Console without any styling
    pub fn plain(out: W) -> Self {
        Self {
            out,
            styled: false,
            error: None,
        }
    }

    pub fn line(&mut self, text: impl Display) {
        let text = text.to_string();
        self.write(format_args!("{}\n", text));
    }

    /// Success line prefixed with a check mark
    pub fn success(&mut self, text: impl Display) {
        let text = format!("✅ {}", text);
        if self.styled {
            self.write(format_args!("\n{}\n", text.green()));
        } else {
            self.write(format_args!("\n{}\n", text));
        }
    }

    /// Failure line prefixed with a cross
    pub fn failure(&mut self, text: impl Display) {
        let text = format!("❌ {}", text);
        if self.styled {
            self.write(format_args!("\n{}\n", text.red()));
        } else {
            self.write(format_args!("\n{}\n", text));
        }
    }

    /// Informational line preceded by a blank line
    pub fn notice(&mut self, text: impl Display) {
        let text = text.to_string();
        self.write(format_args!("\n{}\n", text));
    }

    /// Title between two `=` rules
    pub fn banner(&mut self, title: impl Display, width: usize) {
        let title = title.to_string();
        let rule = "=".repeat(width);
        if self.styled {
            self.write(format_args!("\n{}\n{}\n{}\n", rule, title.bold(), rule));
        } else {
            self.write(format_args!("\n{}\n{}\n{}\n", rule, title, rule));
        }
    }

    /// A full-width rule made of `ch`
    pub fn rule(&mut self, ch: char, width: usize) {
        let rule: String = std::iter::repeat(ch).take(width).collect();
        self.write(format_args!("{}\n", rule));
    }

    /// Prompt without a trailing newline
    pub fn prompt(&mut self, text: impl Display) {
        let text = text.to_string();
        self.write(format_args!("{}", text));
        if let Err(e) = self.out.flush() {
            self.error.get_or_insert(e);
        }
    }

    /// Surface the first write error, if any
    pub fn check(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_fmt(args) {
            self.error = Some(e);
        }
    }
}

/// Captured console for tests
#[cfg(test)]
pub fn captured() -> Console<Vec<u8>> {
    Console::plain(Vec::new())
}

/// Text written to a captured console
#[cfg(test)]
pub fn output(console: Console<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).unwrap()
}
