//! CLI definition and command dispatch for tagforge.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to their handlers.
//!
//! ## Configuration Precedence
//!
//! Configuration is resolved with the following precedence (highest to lowest):
//! 1. CLI flags (e.g., `--config`, `--color`)
//! 2. Environment variables (`TAGFORGE_CONFIG`, `TAGFORGE_COLOR`, `TAGFORGE_IMAGE_EXTENSIONS`, ...)
//! 3. Config file (`~/.tagforge/config.yaml` or path from `--config`/`TAGFORGE_CONFIG`)
//! 4. Built-in defaults

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tagforge_core::{
    parse_tags, FilterMode, InsertPosition, Record, TagEditor, TagIndex, TagOperation,
};

use crate::config::{AppConfig, ConfigError};
use crate::dataset::Dataset;
use crate::isolated::{delete_isolated, find_isolated};
use crate::session::Session;
use crate::ui::color::terminal_width;
use crate::ui::table::{self, ChangeRow, RecordRow, TagRow};
use crate::ui::{format, ColorMode, MessageType, Style};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Bulk tag editing for image datasets, with undo/redo
#[derive(Parser, Debug)]
#[command(name = "tagforge")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "TAGFORGE_VERBOSE")]
    pub verbose: bool,

    /// Suppress tables and informational messages
    #[arg(short, long, global = true, env = "TAGFORGE_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.tagforge/config.yaml)
    #[arg(long, global = true, env = "TAGFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode: always, never, or auto (default: from config, else auto)
    #[arg(long, global = true, env = "TAGFORGE_COLOR")]
    pub color: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tags of a dataset with record counts
    #[command(after_help = r#"EXAMPLES:
    # Tag table in first-seen order
    tagforge tags ./dataset

    # As JSON for scripting
    tagforge tags ./dataset --json | jq '.[0].tag'
"#)]
    Tags {
        /// Dataset directory
        dir: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List records, optionally filtered by tags
    #[command(after_help = r#"EXAMPLES:
    # Every record
    tagforge list ./dataset

    # Records with cat or dog
    tagforge list ./dataset --any "cat, dog"

    # Records with both, as JSON
    tagforge list ./dataset --all "cat, dog" --json

    # Records without a tag
    tagforge list ./dataset --exclude outdoor
"#)]
    List {
        /// Dataset directory
        dir: PathBuf,

        /// Keep records carrying any of these tags (comma-separated)
        #[arg(long, value_name = "TAGS", conflicts_with_all = ["all", "exclude"])]
        any: Option<String>,

        /// Keep records carrying all of these tags (comma-separated)
        #[arg(long, value_name = "TAGS", conflicts_with = "exclude")]
        all: Option<String>,

        /// Keep records carrying none of these tags (comma-separated)
        #[arg(long, value_name = "TAGS")]
        exclude: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Insert tags into every record
    #[command(after_help = r#"EXAMPLES:
    # Append (existing occurrences move to the end)
    tagforge insert ./dataset "best quality"

    # Insert at the front
    tagforge insert ./dataset masterpiece --position 0

    # Insert before the last tag
    tagforge insert ./dataset "solo, smile" --position -1

    # Preview without writing
    tagforge insert ./dataset photo --dry-run
"#)]
    Insert {
        /// Dataset directory
        dir: PathBuf,

        /// Tags to insert (comma-separated lists accepted)
        #[arg(required = true)]
        tags: Vec<String>,

        /// Insert position: `auto` or a signed offset (negative counts from the end)
        #[arg(long, short, allow_negative_numbers = true, default_value = "auto")]
        position: String,

        /// Show the planned changes without writing sidecars
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Delete tags from every record carrying them
    #[command(after_help = r#"EXAMPLES:
    # Remove two tags
    tagforge delete ./dataset "lowres, jpeg artifacts"

    # Preview as JSON
    tagforge delete ./dataset watermark --dry-run --json
"#)]
    Delete {
        /// Dataset directory
        dir: PathBuf,

        /// Tags to delete (comma-separated lists accepted)
        #[arg(required = true)]
        tags: Vec<String>,

        /// Show the planned changes without writing sidecars
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Rename or merge tags
    #[command(after_help = r#"EXAMPLES:
    # Rename
    tagforge replace ./dataset --from "1girl" --to "one girl"

    # Split one tag into two
    tagforge replace ./dataset --from "cat ears" --to "cat, ears"

    # Merge a synonym into an existing tag
    tagforge replace ./dataset --from kitten --to cat

    # An empty --to deletes
    tagforge replace ./dataset --from watermark --to ""
"#)]
    Replace {
        /// Dataset directory
        dir: PathBuf,

        /// Source tags (comma-separated)
        #[arg(long, value_name = "TAGS")]
        from: String,

        /// Replacement tags (comma-separated); surplus entries attach to the last source tag
        #[arg(long, value_name = "TAGS", default_value = "")]
        to: String,

        /// Show the planned changes without writing sidecars
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Start an edit session with undo/redo
    #[command(after_help = r#"EXAMPLES:
    # Interactive session
    tagforge session ./dataset

    # Run a script of session commands
    tagforge session ./dataset --script cleanup.tfs

    # Try edits without touching the sidecars
    tagforge session ./dataset --no-save

SESSION COMMANDS:
    insert [@N|@auto] tags, delete tags, replace from => to,
    undo, redo, tags, show, save, help, quit
"#)]
    Session {
        /// Dataset directory
        dir: PathBuf,

        /// Read commands from a file instead of stdin
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Discard unsaved changes when the session ends
        #[arg(long)]
        no_save: bool,
    },

    /// Find sidecar files whose image is gone
    #[command(after_help = r#"EXAMPLES:
    # List isolated sidecars
    tagforge isolated ./dataset

    # Delete them
    tagforge isolated ./dataset --delete
"#)]
    Isolated {
        /// Dataset directory
        dir: PathBuf,

        /// Delete the isolated sidecars
        #[arg(long)]
        delete: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    #[command(after_help = r#"EXAMPLES:
    # Show the resolved configuration
    tagforge config show

    # Validate the configuration file
    tagforge config check
"#)]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved configuration (file, environment and defaults merged)
    Show {
        /// Output in JSON format instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration file and report warnings
    Check,
}

// ============================================================================
// Entry point
// ============================================================================

/// Run the CLI.
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Always show warnings (config issues); debug output only with --verbose.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("tagforge_core={},tagforge={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let flag_color = match cli.color.as_deref() {
        Some(raw) => match ColorMode::parse(raw) {
            Some(mode) => Some(mode),
            None => {
                eprintln!(
                    "{}",
                    Style::new(ColorMode::Auto).error_with_context(
                        &format!("Invalid color mode '{}'", raw),
                        None,
                        Some("Valid options: always, never, auto"),
                    )
                );
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let loaded = load_config(config_path.as_deref());

    // `config check` reports load failures itself.
    if let Command::Config {
        action: ConfigAction::Check,
    } = cli.command
    {
        let style = Style::new(flag_color.unwrap_or_default());
        return finish(
            &style,
            handle_config_check(&style, config_path.as_deref(), loaded),
        );
    }

    let config = match loaded {
        Ok((config, warnings)) => {
            for warning in &warnings {
                tracing::warn!("Config warning: {}", warning);
            }
            config
        }
        Err(e) => {
            let hint = match &config_path {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your config at ~/.tagforge/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                Style::new(flag_color.unwrap_or_default()).error_with_context(
                    "Failed to load configuration",
                    Some(&config_error_detail(&e)),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let style = Style::new(flag_color.unwrap_or(config.ui.color)).with_palette(config.ui.palette());
    let quiet = cli.quiet;

    let result = match cli.command {
        Command::Tags { dir, json } => handle_tags(&style, &config, &dir, json),
        Command::List {
            dir,
            any,
            all,
            exclude,
            json,
        } => {
            let (tags, mode) = match (any, all, exclude) {
                (Some(tags), _, _) => (tags, FilterMode::IncludeAny),
                (_, Some(tags), _) => (tags, FilterMode::IncludeAll),
                (_, _, Some(tags)) => (tags, FilterMode::Exclude),
                _ => (String::new(), FilterMode::IncludeAny),
            };
            handle_list(&style, &config, &dir, &parse_tags(&tags), mode, json)
        }
        Command::Insert {
            dir,
            tags,
            position,
            dry_run,
            json,
        } => position
            .parse::<InsertPosition>()
            .map_err(anyhow::Error::from)
            .and_then(|position| {
                let operation = TagOperation::Insert {
                    tags: tag_args(&tags),
                    position,
                };
                handle_edit(&style, &config, &dir, operation, dry_run, json, quiet)
            }),
        Command::Delete {
            dir,
            tags,
            dry_run,
            json,
        } => {
            let operation = TagOperation::Delete {
                tags: tag_args(&tags),
            };
            handle_edit(&style, &config, &dir, operation, dry_run, json, quiet)
        }
        Command::Replace {
            dir,
            from,
            to,
            dry_run,
            json,
        } => {
            let operation = TagOperation::Replace {
                from: parse_tags(&from),
                to: parse_tags(&to),
            };
            handle_edit(&style, &config, &dir, operation, dry_run, json, quiet)
        }
        Command::Session {
            dir,
            script,
            no_save,
        } => handle_session(&style, &config, &dir, script.as_deref(), no_save, quiet),
        Command::Isolated { dir, delete, json } => {
            handle_isolated(&style, &config, &dir, delete, json)
        }
        Command::Config { action } => match action {
            ConfigAction::Show { json } => handle_config_show(&config, json),
            // Dispatched before the config was loaded.
            ConfigAction::Check => Ok(()),
        },
    };

    finish(&style, result)
}

fn finish(style: &Style, result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

/// Load the config file (if any), apply environment overrides and validate.
fn load_config(path: Option<&Path>) -> Result<(AppConfig, Vec<String>), ConfigError> {
    AppConfig::load(path, |name| std::env::var(name).ok())
}

fn config_error_detail(e: &ConfigError) -> String {
    match e {
        ConfigError::Invalid { message, hint } => format!("{} ({})", message, hint),
        other => other.to_string(),
    }
}

/// Join positional tag arguments and parse them as one comma-separated list.
fn tag_args(args: &[String]) -> Vec<String> {
    parse_tags(&args.join(","))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

fn load_dataset(config: &AppConfig, dir: &Path) -> Result<(Dataset, Vec<Record>)> {
    Dataset::load(dir, &config.dataset)
}

// ============================================================================
// Command handlers
// ============================================================================

#[derive(Serialize)]
struct TagJson<'a> {
    tag: &'a str,
    records: usize,
    color: Option<&'a str>,
}

fn handle_tags(style: &Style, config: &AppConfig, dir: &Path, json: bool) -> Result<()> {
    let (_, records) = load_dataset(config, dir)?;
    let index = TagIndex::build(&records);
    let counts = index.counts();

    if json {
        let entries: Vec<TagJson<'_>> = counts
            .iter()
            .map(|&(tag, records)| TagJson {
                tag,
                records,
                color: config.ui.palette.get(tag).map(String::as_str),
            })
            .collect();
        return print_json(&entries);
    }

    if counts.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("No tags in {} ({})", dir.display(), format::plural(records.len(), "record"))
            )
        );
        return Ok(());
    }

    let rows: Vec<TagRow> = counts
        .iter()
        .map(|&(tag, records)| TagRow {
            tag: tag.to_string(),
            records,
            color: config.ui.palette.get(tag).cloned(),
        })
        .collect();
    println!("{}", table::render_tags_table(&rows));
    println!();
    println!(
        "{}",
        style.message(
            MessageType::Info,
            &format!(
                "{} across {}",
                format::plural(index.len(), "tag"),
                format::plural(records.len(), "record")
            )
        )
    );
    Ok(())
}

fn handle_list(
    style: &Style,
    config: &AppConfig,
    dir: &Path,
    tags: &[String],
    mode: FilterMode,
    json: bool,
) -> Result<()> {
    let (_, records) = load_dataset(config, dir)?;
    let index = TagIndex::build(&records);
    let keys = index.filter(&records, tags, mode);
    let selected: Vec<&Record> = records
        .iter()
        .filter(|record| keys.contains(&record.key))
        .collect();

    if json {
        return print_json(&selected);
    }

    if selected.is_empty() {
        println!("{}", style.message(MessageType::Info, "No matching records"));
        return Ok(());
    }

    let rows: Vec<RecordRow> = selected
        .iter()
        .map(|record| RecordRow {
            key: record.key.get(),
            name: record.name.clone(),
            tags: record.tags.clone(),
        })
        .collect();
    println!("{}", table::render_records_table(&rows, terminal_width()));
    if !tags.is_empty() {
        println!();
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!(
                    "{} of {} match ({} {})",
                    selected.len(),
                    format::plural(records.len(), "record"),
                    mode,
                    style.tag_list(tags)
                )
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditReport<'a> {
    operation: &'a TagOperation,
    dry_run: bool,
    changes: Vec<ChangeJson>,
    written: usize,
}

#[derive(Serialize)]
struct ChangeJson {
    key: u64,
    name: String,
    before: Vec<String>,
    after: Vec<String>,
}

fn handle_edit(
    style: &Style,
    config: &AppConfig,
    dir: &Path,
    operation: TagOperation,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let (dataset, records) = load_dataset(config, dir)?;
    let mut editor = TagEditor::new(records.clone())
        .with_context(|| format!("Failed to open {}", dir.display()))?;

    // Insert plans an action for every record; only report real changes.
    let batch = editor.plan(&operation);
    let changes: Vec<ChangeJson> = batch
        .iter()
        .filter_map(|action| {
            let record = editor.history().record(action.key)?;
            if record.tags == action.tags {
                return None;
            }
            Some(ChangeJson {
                key: action.key.get(),
                name: record.name.clone(),
                before: record.tags.clone(),
                after: action.tags.clone(),
            })
        })
        .collect();

    let mut written = 0;
    if !dry_run && !changes.is_empty() && editor.execute(&operation)?.is_some() {
        written = dataset.save_changed(&records, editor.records())?;
    }

    if json {
        return print_json(&EditReport {
            operation: &operation,
            dry_run,
            changes,
            written,
        });
    }

    let name = operation.name();
    if changes.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Skip, &format!("{}: nothing to change", name))
        );
        return Ok(());
    }

    let changed = format::plural(changes.len(), "record");
    if !quiet {
        let rows: Vec<ChangeRow> = changes
            .into_iter()
            .map(|change| ChangeRow {
                key: change.key,
                name: change.name,
                before: change.before,
                after: change.after,
            })
            .collect();
        println!("{}", table::render_changes_table(&rows, terminal_width()));
        println!();
    }

    if dry_run {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Dry run: {} would change {}", name, changed)
            )
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Ok,
                &format!(
                    "{}: {} changed, {} written",
                    name,
                    changed,
                    format::plural(written, "sidecar file")
                )
            )
        );
    }
    Ok(())
}

fn handle_session(
    style: &Style,
    config: &AppConfig,
    dir: &Path,
    script: Option<&Path>,
    no_save: bool,
    quiet: bool,
) -> Result<()> {
    let (dataset, records) = load_dataset(config, dir)?;
    let session = Session::new(&dataset, records, style)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = match script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            session.run(BufReader::new(file), &mut out, false, !no_save)?
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            if interactive && !quiet {
                println!(
                    "{}",
                    style.message(
                        MessageType::Info,
                        &format!(
                            "Editing {} ({}). Type `help` for commands.",
                            dir.display(),
                            format::plural(session.editor().records().len(), "record")
                        )
                    )
                );
            }
            session.run(stdin.lock(), &mut out, interactive, !no_save)?
        }
    };

    if !quiet {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!(
                    "Session ended: {}, {} written",
                    format::plural(summary.edits, "edit"),
                    format::plural(summary.written, "sidecar file")
                )
            )
        );
    }
    if script.is_some() && summary.errors > 0 {
        bail!("{} failed", format::plural(summary.errors, "script command"));
    }
    Ok(())
}

#[derive(Serialize)]
struct IsolatedReport {
    isolated: Vec<PathBuf>,
    deleted: usize,
}

fn handle_isolated(
    style: &Style,
    config: &AppConfig,
    dir: &Path,
    delete: bool,
    json: bool,
) -> Result<()> {
    let isolated = find_isolated(dir, &config.dataset)?;
    let deleted = if delete {
        delete_isolated(&isolated)?
    } else {
        0
    };

    if json {
        return print_json(&IsolatedReport { isolated, deleted });
    }

    if isolated.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Ok, "No isolated sidecar files")
        );
        return Ok(());
    }

    let marker = if delete { "-" } else { "" };
    for path in &isolated {
        println!("{}", style.list_item(marker, &style.file_path(&path.display().to_string())));
    }
    println!();
    if delete {
        println!(
            "{}",
            style.message(
                MessageType::Ok,
                &format!("Deleted {}", format::plural(deleted, "isolated sidecar file"))
            )
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Warn,
                &format!("Found {}", format::plural(isolated.len(), "isolated sidecar file"))
            )
        );
        println!(
            "{}",
            style.message(MessageType::Hint, "Run again with --delete to remove them")
        );
    }
    Ok(())
}

// ============================================================================
// Config command handlers
// ============================================================================

/// Validate the configuration file and report warnings.
fn handle_config_check(
    style: &Style,
    path: Option<&Path>,
    loaded: Result<(AppConfig, Vec<String>), ConfigError>,
) -> Result<()> {
    let source = match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not found, using defaults)", path.display()),
        None => "built-in defaults".to_string(),
    };
    println!("{}", style.key_value("Config", &source));

    let warnings = match loaded {
        Ok((_, warnings)) => warnings,
        Err(ConfigError::Invalid { message, hint }) => {
            println!(
                "{}",
                style.error_with_context("Configuration has errors", Some(&message), Some(&hint))
            );
            bail!("Configuration is invalid");
        }
        Err(e) => return Err(e).context("Configuration could not be loaded"),
    };

    if warnings.is_empty() {
        println!("{}", style.message(MessageType::Ok, "Configuration is valid"));
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Warn,
                &format!("{}:", format::plural(warnings.len(), "warning"))
            )
        );
        for warning in &warnings {
            println!("  • {}", warning);
        }
        println!(
            "{}",
            style.message(MessageType::Ok, "Configuration is valid with warnings")
        );
    }
    Ok(())
}

/// Show the resolved configuration.
fn handle_config_show(config: &AppConfig, json: bool) -> Result<()> {
    if json {
        return print_json(config);
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
