//! Command table and parser
//!
//! Turns text such as `display-message "hello world" ; stop-queue` into a
//! [`CommandList`]. Words are split on whitespace, `;` separates commands,
//! single quotes are literal, double quotes allow `\` escapes.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::models::{Command, CommandEntry, CommandFlags, CommandList};

/// Registered commands, looked up by name, alias or unique prefix
#[derive(Debug, Default)]
pub struct CommandTable {
    entries: Vec<Rc<CommandEntry>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, replacing any existing entry with the same name
    pub fn register(&mut self, entry: CommandEntry) -> Rc<CommandEntry> {
        let entry = Rc::new(entry);
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(Rc::clone(&entry));
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Rc<CommandEntry>> {
        self.entries.iter()
    }

    /// Find an entry by exact name or alias, else by unique name prefix
    pub fn find(&self, name: &str) -> Result<Rc<CommandEntry>> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.name == name || e.alias.as_deref() == Some(name))
        {
            return Ok(Rc::clone(entry));
        }

        let matches: Vec<&Rc<CommandEntry>> = self
            .entries
            .iter()
            .filter(|e| e.name.starts_with(name))
            .collect();
        match matches.as_slice() {
            [entry] => Ok(Rc::clone(entry)),
            [] => Err(Error::UnknownCommand {
                name: name.to_string(),
            }),
            many => {
                let mut candidates: Vec<String> = many.iter().map(|e| e.name.clone()).collect();
                candidates.sort();
                Err(Error::AmbiguousCommand {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Parse a line of commands
    pub fn parse(&self, input: &str, file: Option<&str>, line: u32) -> Result<CommandList> {
        self.parse_with_flags(input, file, line, CommandFlags::NONE)
    }

    /// Parse a line of commands, setting `flags` on every command
    pub fn parse_with_flags(
        &self,
        input: &str,
        file: Option<&str>,
        line: u32,
        flags: CommandFlags,
    ) -> Result<CommandList> {
        let groups = split_commands(input).map_err(|reason| Error::ParseFailed {
            file: file.map(str::to_string),
            line,
            reason,
        })?;

        let mut commands = Vec::with_capacity(groups.len());
        for mut words in groups {
            let name = words.remove(0);
            let entry = self.find(&name)?;
            commands.push(
                Command::new(entry, words)
                    .with_source(file, line)
                    .with_flags(flags),
            );
        }

        if commands.is_empty() {
            return Err(Error::EmptyCommand);
        }
        Ok(CommandList::new(commands))
    }
}

/// Split input into commands, each a non-empty list of words
fn split_commands(input: &str) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut commands = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => word.push(c),
                            None => return Err("unterminated quote".to_string()),
                        },
                        Some(c) => word.push(c),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => word.push(c),
                    None => return Err("trailing backslash".to_string()),
                }
            }
            ';' => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
                if !words.is_empty() {
                    commands.push(std::mem::take(&mut words));
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    if !words.is_empty() {
        commands.push(words);
    }
    Ok(commands)
}
