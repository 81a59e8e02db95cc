//! Line-oriented edit sessions.
//!
//! A session keeps one [`TagEditor`] alive across many commands, so undo and
//! redo work across edits. Commands come from stdin or a script file, one
//! per line:
//!
//! ```text
//! insert [@N|@auto] tags     insert tags (comma-separated) into every record
//! delete tags                remove tags from every record
//! replace from => to         rename or merge tags (empty `to` deletes)
//! undo | redo                step through the history
//! tags                       list tags with record counts
//! show                       list records with their tags
//! save                       write changed sidecars
//! help                       list commands
//! quit | exit                end the session
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. History is not kept
//! once the session ends.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use tagforge_core::{parse_tags, InsertPosition, Record, TagEditor, TagOperation};

use crate::dataset::Dataset;
use crate::ui::{format, MessageType, Style};

const HELP: &str = "\
commands:
  insert [@N|@auto] tags     insert tags into every record
  delete tags                remove tags from every record
  replace from => to         rename or merge tags
  undo | redo                step through the history
  tags                       list tags with record counts
  show                       list records with their tags
  save                       write changed sidecars
  quit                       end the session";

// ============================================================================
// Commands
// ============================================================================

/// One parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Edit(TagOperation),
    Undo,
    Redo,
    Tags,
    Show,
    Save,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "insert" | "add" => parse_insert(rest)?,
            "delete" | "del" | "rm" => {
                let tags = parse_tags(rest);
                if tags.is_empty() {
                    bail!("delete needs at least one tag");
                }
                Self::Edit(TagOperation::Delete { tags })
            }
            "replace" | "mv" => parse_replace(rest)?,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "tags" => Self::Tags,
            "show" | "list" | "ls" => Self::Show,
            "save" | "write" => Self::Save,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("Unknown command '{}'. Type `help` for the command list.", other),
        };
        Ok(command)
    }
}

fn parse_insert(rest: &str) -> Result<SessionCommand> {
    let (position, rest) = match rest.strip_prefix('@') {
        Some(after_at) => {
            let (position, tags) = after_at.split_once(char::is_whitespace).unwrap_or((after_at, ""));
            (position.parse::<InsertPosition>()?, tags)
        }
        None => (InsertPosition::Auto, rest),
    };
    let tags = parse_tags(rest);
    if tags.is_empty() {
        bail!("insert needs at least one tag");
    }
    Ok(SessionCommand::Edit(TagOperation::Insert { tags, position }))
}

fn parse_replace(rest: &str) -> Result<SessionCommand> {
    let Some((from, to)) = rest.split_once("=>") else {
        bail!("replace needs `from => to`");
    };
    let from = parse_tags(from);
    if from.is_empty() {
        bail!("replace needs at least one source tag");
    }
    Ok(SessionCommand::Edit(TagOperation::Replace {
        from,
        to: parse_tags(to),
    }))
}

// ============================================================================
// Session
// ============================================================================

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Commands that changed the records.
    pub edits: usize,
    /// Lines that failed to parse or execute.
    pub errors: usize,
    /// Sidecar files written, including the final save.
    pub written: usize,
}

/// An editing session over one dataset.
pub struct Session<'a> {
    editor: TagEditor,
    dataset: &'a Dataset,
    style: &'a Style,
    /// Records as last written to disk.
    saved: Vec<Record>,
    summary: SessionSummary,
}

impl<'a> Session<'a> {
    pub fn new(dataset: &'a Dataset, records: Vec<Record>, style: &'a Style) -> Result<Self> {
        let saved = records.clone();
        let editor = TagEditor::new(records)
            .with_context(|| format!("Failed to open {}", dataset.root().display()))?;
        Ok(Self {
            editor,
            dataset,
            style,
            saved,
            summary: SessionSummary::default(),
        })
    }

    /// Check if the records differ from what is on disk.
    pub fn is_dirty(&self) -> bool {
        self.editor.records() != self.saved.as_slice()
    }

    pub fn editor(&self) -> &TagEditor {
        &self.editor
    }

    /// Run commands until `quit` or end of input.
    ///
    /// Bad lines are reported and skipped. Unsaved changes are written at
    /// the end when `save_on_exit` is set.
    pub fn run<R: BufRead, W: Write>(
        mut self,
        input: R,
        out: &mut W,
        prompt: bool,
        save_on_exit: bool,
    ) -> Result<SessionSummary> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "tagforge> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("Failed to read session input")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let outcome = trimmed
                .parse::<SessionCommand>()
                .and_then(|command| self.dispatch(command, out));
            match outcome {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.summary.errors += 1;
                    writeln!(out, "{}", self.style.message(MessageType::Err, &format!("{:#}", e)))?;
                }
            }
        }

        if save_on_exit && self.is_dirty() {
            self.save(out)?;
        } else if self.is_dirty() {
            writeln!(
                out,
                "{}",
                self.style
                    .message(MessageType::Warn, "Unsaved changes discarded (--no-save)")
            )?;
        }
        Ok(self.summary)
    }

    /// Execute one command. Returns `false` when the session should end.
    pub fn dispatch<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<bool> {
        match command {
            SessionCommand::Edit(operation) => {
                let name = operation.name();
                let changed = self.changed_by(&operation);
                if changed > 0 && self.editor.execute(&operation)?.is_some() {
                    self.summary.edits += 1;
                    writeln!(
                        out,
                        "{}",
                        self.style.message(
                            MessageType::Ok,
                            &format!("{}: {} changed", name, format::plural(changed, "record"))
                        )
                    )?;
                } else {
                    writeln!(
                        out,
                        "{}",
                        self.style
                            .message(MessageType::Skip, &format!("{}: nothing to change", name))
                    )?;
                }
            }
            SessionCommand::Undo => {
                let message = match self.editor.undo() {
                    Some(_) => self.style.message(MessageType::Ok, "Undone"),
                    None => self.style.message(MessageType::Skip, "Nothing to undo"),
                };
                writeln!(out, "{}", message)?;
            }
            SessionCommand::Redo => {
                let message = match self.editor.redo() {
                    Some(_) => self.style.message(MessageType::Ok, "Redone"),
                    None => self.style.message(MessageType::Skip, "Nothing to redo"),
                };
                writeln!(out, "{}", message)?;
            }
            SessionCommand::Tags => {
                for (tag, count) in self.editor.index().counts() {
                    writeln!(out, "  {} ({})", self.style.tag(tag), count)?;
                }
            }
            SessionCommand::Show => {
                for record in self.editor.records() {
                    writeln!(
                        out,
                        "  {} {}: {}",
                        record.key,
                        self.style.file_path(&record.name),
                        self.style.tag_list(&record.tags)
                    )?;
                }
            }
            SessionCommand::Save => self.save(out)?,
            SessionCommand::Help => writeln!(out, "{}", HELP)?,
            SessionCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Records whose tags the operation would actually change.
    fn changed_by(&self, operation: &TagOperation) -> usize {
        self.editor
            .plan(operation)
            .iter()
            .filter(|action| {
                self.editor
                    .history()
                    .record(action.key)
                    .is_some_and(|record| record.tags != action.tags)
            })
            .count()
    }

    fn save<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let written = self.dataset.save_changed(&self.saved, self.editor.records())?;
        self.saved = self.editor.snapshot();
        self.summary.written += written;
        writeln!(
            out,
            "{}",
            self.style.message(
                MessageType::Ok,
                &format!("Saved {}", format::plural(written, "sidecar file"))
            )
        )?;
        Ok(())
    }
}
