use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskly_cli::cli::{Cli, Command, collect_overrides, split_command_line};
use taskly_core::config::{
    Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use taskly_core::error::AppError;
use taskly_core::manager::TaskListManager;
use taskly_core::model::{Task, TaskId};
use taskly_core::progress::Progress;
use taskly_core::storage::seed;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: TaskId,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
}

struct Session {
    manager: TaskListManager,
    palette: Palette,
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "completed": task.completed,
    })
}

fn progress_json(progress: Progress) -> serde_json::Value {
    serde_json::json!({
        "completed": progress.completed,
        "remaining": progress.remaining(),
        "total": progress.total,
        "percentage": progress.percentage(),
        "rounded_percentage": progress.rounded_percentage(),
    })
}

/// Why an `add` with this title would be ignored. Only a blank title or an
/// exhausted id space can do that.
fn add_noop_reason(title: &str) -> &'static str {
    if title.trim().is_empty() {
        "No task added: title is blank"
    } else {
        "No task added: no task id left"
    }
}

fn progress_line(progress: Progress) -> String {
    format!(
        "Progress: {}/{} done ({}%)",
        progress.completed,
        progress.total,
        progress.rounded_percentage()
    )
}

impl Session {
    fn start(cli: &Cli) -> Result<Self, AppError> {
        let loaded = load_config_with_fallback();
        let overrides = collect_overrides(&cli.config_override)?;
        let config = merge_overrides(&loaded.config, &overrides);
        let seed_path = cli
            .seed
            .clone()
            .or_else(seed::seed_path_from_env)
            .or_else(|| config.seed_path());
        let manager = seed::initial_manager(seed_path.as_deref(), config.id_policy)?;
        debug!(
            tasks = manager.tasks().len(),
            seed = ?seed_path,
            theme = config.theme.as_deref().unwrap_or("default"),
            "session ready"
        );

        Ok(Self {
            manager,
            palette: palette_for_theme(config.theme.as_deref()),
        })
    }

    fn run(&mut self, command: Command, json: bool) {
        match command {
            Command::Add { title, description } => {
                let title = title.unwrap_or_default();
                let added = self.manager.add(&title, description.as_deref());
                self.report_change("Added", added, add_noop_reason(&title), json);
            }
            Command::Title { text } => {
                self.manager.set_pending_title(text);
                self.print_pending(json);
            }
            Command::Description { text } => {
                self.manager.set_pending_description(text);
                self.print_pending(json);
            }
            Command::Submit => {
                let reason = add_noop_reason(self.manager.pending_title());
                let added = self.manager.submit();
                self.report_change("Added", added, reason, json);
            }
            Command::Toggle { id } => {
                let toggled = self.manager.toggle(id);
                self.report_change("Toggled", toggled, &format!("No task with id {id}"), json);
            }
            Command::Remove { id } => {
                let removed = self.manager.remove(id);
                self.report_change("Removed", removed, &format!("No task with id {id}"), json);
            }
            Command::List => self.print_list(json),
            Command::Progress => self.print_progress(json),
        }
    }

    fn report_change(&self, verb: &str, task: Option<Task>, noop: &str, json: bool) {
        if json {
            let payload = serde_json::json!({
                "changed": task.is_some(),
                "task": task.as_ref().map(task_json),
                "tasks": self.tasks_json(),
                "progress": progress_json(self.manager.progress()),
            });
            println!("{payload}");
            return;
        }

        match task {
            Some(task) => {
                let state = if task.completed { "done" } else { "open" };
                println!("{verb} task: {} ({}) [{state}]", task.title, task.id);
            }
            None => println!("{noop}"),
        }
        self.print_list(false);
    }

    fn tasks_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.manager.tasks().iter().map(task_json).collect())
    }

    fn print_list(&self, json: bool) {
        let progress = self.manager.progress();
        if json {
            let payload = serde_json::json!({
                "tasks": self.tasks_json(),
                "progress": progress_json(progress),
            });
            println!("{payload}");
            return;
        }

        if self.manager.tasks().is_empty() {
            println!("No tasks yet");
        } else {
            let rows = self.manager.tasks().iter().map(|task| self.row(task));
            let mut table = Table::new(rows);
            table.with(Style::modern());
            println!("{table}");
        }
        println!("{}", self.palette.accentize(&progress_line(progress)));
    }

    fn row(&self, task: &Task) -> TaskRow {
        let (done, title, description) = if task.completed {
            (
                "x",
                self.palette.mutedize(&task.title),
                self.palette.mutedize(&task.description),
            )
        } else {
            ("", task.title.clone(), task.description.clone())
        };
        TaskRow {
            id: task.id,
            done,
            title,
            description,
        }
    }

    fn print_progress(&self, json: bool) {
        let progress = self.manager.progress();
        if json {
            println!("{}", progress_json(progress));
            return;
        }

        println!("Done: {}", progress.completed);
        println!("Open: {}", progress.remaining());
        println!("{}", self.palette.accentize(&progress_line(progress)));
    }

    fn print_pending(&self, json: bool) {
        if json {
            let payload = serde_json::json!({
                "pending_title": self.manager.pending_title(),
                "pending_description": self.manager.pending_description(),
            });
            println!("{payload}");
        } else {
            println!(
                "Pending: {} | {}",
                self.manager.pending_title(),
                self.manager.pending_description()
            );
        }
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_help_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_line(session: &mut Session, line: &str, json: bool) -> Result<(), AppError> {
    let args = split_command_line(line)?;
    if args.is_empty() {
        return Ok(());
    }

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("taskly".to_string());
    argv.extend(args);

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if is_help_request(&err) => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };

    if cli.has_session_options() {
        return Err(AppError::invalid_input(
            "--seed, --config-override and --verbose only apply at startup",
        ));
    }

    match cli.command {
        Some(command) => session.run(command, json || cli.json),
        None => print_help(),
    }
    Ok(())
}

fn run_interactive(session: &mut Session, json: bool) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if let Err(err) = run_line(session, line, json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_help_request(&err) => {
            print!("{err}");
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose);

    let mut session = match Session::start(&cli) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(command) => session.run(command, cli.json),
        None => {
            if let Err(err) = run_interactive(&mut session, cli.json) {
                eprintln!("ERROR: {}", err);
                std::process::exit(1);
            }
        }
    }
}
