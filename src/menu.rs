//! Interactive menus
//!
//! A menu is a static dispatch table: each entry names the fields it needs
//! and how to build a command from the answers. [`run`] shows the table,
//! reads one choice per iteration, validates required fields and hands the
//! command to a [`Dispatch`] implementation. Input and output are generic, so
//! menus are driven from in-memory buffers in tests.

use crate::ui::console::MENU_WIDTH;
use crate::ui::Console;
use async_trait::async_trait;
use std::io::{self, BufRead, Write};

/// One value the user is prompted for
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub prompt: &'static str,
    pub required: bool,
}

impl Field {
    pub const fn required(prompt: &'static str) -> Self {
        Self {
            prompt,
            required: true,
        }
    }

    pub const fn optional(prompt: &'static str) -> Self {
        Self {
            prompt,
            required: false,
        }
    }
}

/// Trimmed answers, in field order
#[derive(Debug)]
pub struct Answers {
    values: std::vec::IntoIter<String>,
}

impl Answers {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Next answer; required fields are never empty here
    pub fn text(&mut self) -> String {
        self.values.next().unwrap_or_default()
    }

    /// Next answer, `None` when left empty
    pub fn optional(&mut self) -> Option<String> {
        self.values.next().filter(|v| !v.is_empty())
    }
}

/// A numbered menu entry. Keys are positional: the first entry is `1`.
pub struct MenuEntry<C> {
    pub label: &'static str,
    /// Printed once the entry is chosen, before any prompt
    pub announce: Option<&'static str>,
    pub fields: &'static [Field],
    /// Shown when a required field is left empty
    pub rejection: &'static str,
    pub build: fn(Answers) -> C,
}

/// A titled table of entries followed by an exit entry
pub struct Menu<C: 'static> {
    pub title: &'static str,
    pub entries: &'static [MenuEntry<C>],
}

/// Result of reading one choice
#[derive(Debug, PartialEq, Eq)]
pub enum Selection<C> {
    Command(C),
    Exit,
    /// A required field was empty; nothing to run
    Rejected,
    Invalid,
}

/// Executes commands built by a menu
#[async_trait(?Send)]
pub trait Dispatch<C> {
    async fn dispatch<W: Write>(&self, command: C, console: &mut Console<W>);
}

impl<C: 'static> Menu<C> {
    /// Key of the exit entry
    pub fn exit_key(&self) -> String {
        (self.entries.len() + 1).to_string()
    }

    pub fn render<W: Write>(&self, console: &mut Console<W>) {
        console.banner(self.title, MENU_WIDTH);
        for (index, entry) in self.entries.iter().enumerate() {
            console.line(format!("{}. {}", index + 1, entry.label));
        }
        console.line(format!("{}. Exit", self.exit_key()));
        console.rule('=', MENU_WIDTH);
    }

    /// Read a choice and the fields it needs
    pub fn select<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        console: &mut Console<W>,
    ) -> io::Result<Selection<C>> {
        let exit_key = self.exit_key();
        console.prompt(format!("\nEnter your choice (1-{}): ", exit_key));

        let Some(choice) = read_trimmed(input)? else {
            return Ok(Selection::Exit);
        };

        if choice == exit_key {
            return Ok(Selection::Exit);
        }

        let Some(entry) = self.entry(&choice) else {
            console.failure(format!(
                "Invalid choice! Please enter a number between 1 and {}.",
                exit_key
            ));
            return Ok(Selection::Invalid);
        };

        if let Some(announce) = entry.announce {
            console.notice(announce);
        }

        let mut values = Vec::with_capacity(entry.fields.len());
        for field in entry.fields {
            console.prompt(format!("\nEnter {}: ", field.prompt));
            values.push(read_trimmed(input)?.unwrap_or_default());
        }

        let missing = entry
            .fields
            .iter()
            .zip(&values)
            .any(|(field, value)| field.required && value.is_empty());
        if missing {
            console.failure(entry.rejection);
            return Ok(Selection::Rejected);
        }

        Ok(Selection::Command((entry.build)(Answers::new(values))))
    }

    fn entry(&self, choice: &str) -> Option<&MenuEntry<C>> {
        let index: usize = choice.parse().ok()?;
        self.entries.get(index.checked_sub(1)?)
    }
}

/// Run a menu until the user exits or input ends
pub async fn run<C, D, R, W>(
    menu: &Menu<C>,
    handler: &D,
    input: &mut R,
    console: &mut Console<W>,
) -> io::Result<()>
where
    D: Dispatch<C> + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        menu.render(console);
        match menu.select(input, console)? {
            Selection::Command(command) => handler.dispatch(command, console).await,
            Selection::Exit => {
                console.notice("👋 Exiting...");
                return console.check();
            }
            Selection::Rejected | Selection::Invalid => {}
        }
        console.check()?;
    }
}

/// One trimmed line, `None` at end of input
fn read_trimmed<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
