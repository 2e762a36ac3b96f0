use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskly_core::config::{ConfigOverrides, canonical_key};
use taskly_core::error::AppError;
use taskly_core::manager::IdPolicy;
use taskly_core::model::TaskId;

#[derive(Parser, Debug)]
#[command(name = "taskly", author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run; without one, an interactive session reads commands from stdin
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// JSON file with the initial task list
    #[arg(long, value_name = "PATH", global = true)]
    pub seed: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Log state changes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Options that only take effect when the session starts.
    pub fn has_session_options(&self) -> bool {
        self.seed.is_some() || !self.config_override.is_empty() || self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskly add "Buy milk" -d "2 litres"
    Add {
        title: Option<String>,
        #[arg(short = 'd', long, value_name = "DESCRIPTION")]
        description: Option<String>,
    },
    /// Type into the pending title field
    ///
    /// Example: title "Buy milk"
    Title { text: String },
    /// Type into the pending description field
    ///
    /// Example: description "2 litres"
    Description { text: String },
    /// Add a task from the pending title and description
    Submit,
    /// Flip a task between open and done
    ///
    /// Example: taskly toggle 3
    Toggle { id: TaskId },
    /// Remove a task
    ///
    /// Example: taskly remove 3
    Remove { id: TaskId },
    /// List tasks, newest first
    List,
    /// Show how many tasks are done
    Progress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    IdPolicy,
    SeedPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonical_key(key_raw);
    let target = match key.as_str() {
        "" => return Err("override key cannot be empty".to_string()),
        "theme" => ConfigOverrideTarget::Theme,
        "id_policy" | "ids" => ConfigOverrideTarget::IdPolicy,
        "seed_path" | "seed" => ConfigOverrideTarget::SeedPath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::IdPolicy => {
                let policy = IdPolicy::parse(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!("unknown id policy '{}'", parsed.value))
                })?;
                overrides.id_policy = Some(policy);
            }
            ConfigOverrideTarget::SeedPath => overrides.seed_path = Some(parsed.value),
        }
    }

    Ok(overrides)
}

/// Splits an interactive line into arguments. Double quotes group words;
/// inside quotes, `\"` and `\\` are escapes and any other backslash is kept.
/// A bare `""` is an empty argument.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            ch => {
                current.push(ch);
                started = true;
            }
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if started {
        args.push(current);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ConfigOverrideTarget, collect_overrides, parse_config_override,
        split_command_line,
    };
    use clap::Parser;
    use taskly_core::manager::IdPolicy;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" ID-Policy = never_reuse ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::IdPolicy);
        assert_eq!(parsed.value, "never_reuse");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_key() {
        let err = parse_config_override(" = noir").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn collect_overrides_builds_all_fields() {
        let overrides = collect_overrides(&[
            "theme=noir".to_string(),
            "ids=monotonic".to_string(),
            "seed=/tmp/seed.json".to_string(),
        ])
        .unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.id_policy, Some(IdPolicy::NeverReuse));
        assert_eq!(overrides.seed_path.as_deref(), Some("/tmp/seed.json"));
    }

    #[test]
    fn collect_overrides_rejects_unknown_policy() {
        let err = collect_overrides(&["id_policy=sometimes".to_string()]).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(err.message().contains("sometimes"));
    }

    #[test]
    fn split_command_line_groups_quoted_words() {
        let args = split_command_line(r#"add "Buy milk" -d "2 litres""#).unwrap();
        assert_eq!(args, vec!["add", "Buy milk", "-d", "2 litres"]);
    }

    #[test]
    fn split_command_line_handles_escapes() {
        let args = split_command_line(r#"title "say \"hi\" C:\temp""#).unwrap();
        assert_eq!(args, vec!["title", r#"say "hi" C:\temp"#]);
    }

    #[test]
    fn split_command_line_keeps_empty_quoted_argument() {
        let args = split_command_line(r#"description """#).unwrap();
        assert_eq!(args, vec!["description", ""]);

        let args = split_command_line(r#"add "" -d notes"#).unwrap();
        assert_eq!(args, vec!["add", "", "-d", "notes"]);
    }

    #[test]
    fn split_command_line_skips_repeated_whitespace() {
        let args = split_command_line("  toggle    3  ").unwrap();
        assert_eq!(args, vec!["toggle", "3"]);
    }

    #[test]
    fn split_command_line_rejects_unterminated_quote() {
        let err = split_command_line(r#"add "oops"#).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn cli_parses_add_with_description() {
        let cli = Cli::try_parse_from(["taskly", "add", "Buy milk", "-d", "2 litres"]).unwrap();

        match cli.command {
            Some(Command::Add { title, description }) => {
                assert_eq!(title.as_deref(), Some("Buy milk"));
                assert_eq!(description.as_deref(), Some("2 litres"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["taskly", "toggle", "abc"]).is_err());
    }

    #[test]
    fn cli_without_command_is_interactive() {
        let cli = Cli::try_parse_from(["taskly", "--json"]).unwrap();

        assert!(cli.command.is_none());
        assert!(cli.json);
        assert!(!cli.has_session_options());
    }
}
