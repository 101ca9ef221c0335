use checklist_core::config::ConfigOverrides;
use checklist_core::view::Filter;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: checklist add "Buy milk"
    Add { text: Option<String> },
    /// Mark a task done, or reopen a done task
    ///
    /// Example: checklist toggle 1
    Toggle { id: u64 },
    /// Edit a task's text, or open it for inline editing when no text is given
    ///
    /// Example: checklist edit 1 "Buy oat milk"
    Edit { id: u64, text: Option<String> },
    /// Save the task being edited (same as pressing Enter)
    ///
    /// Example: save "Buy oat milk"
    Save { text: String },
    /// Discard the edit in progress (same as pressing Escape)
    Cancel,
    /// Delete a task
    ///
    /// Example: checklist delete 1
    Delete { id: u64 },
    /// Delete every completed task
    ClearDone,
    /// List tasks
    ///
    /// Example: checklist list --filter active
    List {
        #[arg(long, value_name = "all|active|done")]
        filter: Option<Filter>,
    },
    /// Change the active filter
    ///
    /// Example: filter done
    Filter { filter: Filter },
    /// Show or manage the completion history
    ///
    /// Example: checklist history
    /// Example: checklist history remove 1734685200000000
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
    /// Show, set or toggle the display theme
    ///
    /// Example: checklist theme toggle
    Theme { mode: Option<ThemeMode> },
    /// Print the widget as HTML markup
    ///
    /// Example: checklist render --filter done
    Render {
        #[arg(long, value_name = "all|active|done")]
        filter: Option<Filter>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List completed-task history, newest first
    List,
    /// Remove one history entry
    Remove { id: u64 },
    /// Remove every history entry
    Clear,
    /// Collapse or expand the history panel
    Toggle,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultFilter,
    HistoryOpen,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_filter" | "filter" => ConfigOverrideTarget::DefaultFilter,
        "history_open" | "history" => ConfigOverrideTarget::HistoryOpen,
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{canonical_field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds parsed `KEY=VALUE` flags into overrides; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DefaultFilter => {
                let filter = parsed
                    .value
                    .parse::<Filter>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_filter = Some(filter);
            }
            ConfigOverrideTarget::HistoryOpen => {
                let open = parse_bool(&parsed.value)
                    .ok_or_else(|| format!("history_open expects a boolean, got '{}'", parsed.value))?;
                overrides.history_open = Some(open);
            }
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
        }
    }

    Ok(overrides)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
