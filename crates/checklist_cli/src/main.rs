use checklist_cli::cli::{Cli, Command, HistoryCommand, ThemeMode, collect_overrides};
use checklist_cli::output;
use checklist_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme, plain_palette,
};
use checklist_core::error::AppError;
use checklist_core::session::{Frame, Session};
use checklist_core::storage::JsonFileBackend;
use checklist_core::storage::json_store::{STORE_ENV_VAR, store_path};
use checklist_core::theme::{self, Theme};
use checklist_core::view::{EditKey, ViewState};
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

struct App {
    session: Session<JsonFileBackend>,
    config: Config,
    palette: Palette,
}

impl App {
    fn open(config: Config) -> Result<Self, AppError> {
        let path = resolve_store_path(&config)?;
        let backend = JsonFileBackend::open(&path)?;
        let view = ViewState::new(config.filter(), config.history_open());
        let session = Session::open(backend, view)?;
        info!(path = %path.display(), "opened task store");

        let mut app = Self {
            session,
            config,
            palette: plain_palette(),
        };
        app.refresh_palette()?;
        Ok(app)
    }

    fn theme(&self) -> Result<Theme, AppError> {
        match self.config.theme() {
            Some(theme) => Ok(theme),
            None => theme::load_theme(self.session.store().backend()),
        }
    }

    fn refresh_palette(&mut self) -> Result<(), AppError> {
        self.palette = if io::stdout().is_terminal() {
            palette_for_theme(self.theme()?)
        } else {
            plain_palette()
        };
        Ok(())
    }
}

fn resolve_store_path(config: &Config) -> Result<PathBuf, AppError> {
    let from_env = std::env::var(STORE_ENV_VAR)
        .ok()
        .filter(|path| !path.trim().is_empty());
    match (from_env, config.store_path.as_ref()) {
        (Some(path), _) => Ok(PathBuf::from(path)),
        (None, Some(path)) => Ok(path.clone()),
        (None, None) => store_path(),
    }
}

fn init_tracing(verbose: u8, quiet: u8) {
    let default_level = if quiet >= 2 {
        "off"
    } else if quiet == 1 {
        "error"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_frame(frame: &Frame, json: bool, message: &str) -> Result<(), AppError> {
    if json {
        print_json(frame)
    } else {
        println!("{message}");
        Ok(())
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn task_label(app: &App, id: u64) -> String {
    app.session
        .store()
        .task(id)
        .map(|task| format!("{} ({})", task.text, task.id))
        .unwrap_or_else(|| id.to_string())
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

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(app: &mut App, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Add { text } => {
            let text = text.ok_or_else(|| AppError::invalid_input("text is required"))?;
            let frame = app.session.add(&text)?;
            let message = match app.session.store().tasks().last() {
                Some(task) if frame.changed => format!("Added task: {} ({})", task.text, task.id),
                _ => "Nothing added: task text is empty".to_string(),
            };
            print_frame(&frame, json, &message)?;
        }
        Command::Toggle { id } => {
            let frame = app.session.toggle(id)?;
            let message = match app.session.store().task(id) {
                Some(task) if frame.changed && task.done => {
                    format!("Completed task: {} ({})", task.text, task.id)
                }
                Some(task) if frame.changed => format!("Reopened task: {} ({})", task.text, task.id),
                _ => format!("No task with id {id}; nothing changed"),
            };
            print_frame(&frame, json, &message)?;
        }
        Command::Edit { id, .. } if app.session.store().task(id).is_none() => {
            let frame = app.session.frame();
            print_frame(&frame, json, &format!("No task with id {id}; nothing to edit"))?;
        }
        Command::Edit { id, .. }
            if app
                .session
                .store()
                .task(id)
                .is_some_and(|task| !app.session.view().filter.matches(task)) =>
        {
            let frame = app.session.frame();
            let filter = app.session.view().filter;
            let message = format!("Task {id} is hidden by the {filter} filter; nothing to edit");
            print_frame(&frame, json, &message)?;
        }
        Command::Edit { id, text: Some(text) } => {
            app.session.begin_edit(id);
            let frame = app.session.save_edit(&text)?;
            let message = if frame.changed {
                format!("Updated task: {}", task_label(app, id))
            } else {
                format!("Task {id} left unchanged")
            };
            print_frame(&frame, json, &message)?;
        }
        Command::Edit { id, text: None } => {
            let frame = app.session.begin_edit(id);
            let message = format!(
                "Editing task: {}\nType `save <text>` (Enter) or `cancel` (Escape)",
                task_label(app, id)
            );
            print_frame(&frame, json, &message)?;
        }
        Command::Save { text } => {
            let editing = app.session.view().editing();
            let frame = app.session.edit_key(EditKey::Enter, &text)?;
            let message = match editing {
                Some(id) if frame.changed => format!("Updated task: {}", task_label(app, id)),
                Some(id) => format!("Task {id} left unchanged"),
                None => "No task is being edited".to_string(),
            };
            print_frame(&frame, json, &message)?;
        }
        Command::Cancel => {
            let editing = app.session.view().editing();
            let frame = app.session.edit_key(EditKey::Escape, "")?;
            let message = match editing {
                Some(id) => format!("Edit of task {id} discarded"),
                None => "No task is being edited".to_string(),
            };
            print_frame(&frame, json, &message)?;
        }
        Command::Delete { id } => {
            let label = task_label(app, id);
            let frame = app.session.delete(id)?;
            let message = if frame.changed {
                format!("Deleted task: {label}")
            } else {
                format!("No task with id {id}; nothing changed")
            };
            print_frame(&frame, json, &message)?;
        }
        Command::ClearDone => {
            let before = app.session.store().tasks().len();
            let frame = app.session.clear_completed()?;
            let removed = before - app.session.store().tasks().len();
            print_frame(
                &frame,
                json,
                &format!("Cleared {removed} completed {}", plural(removed, "task", "tasks")),
            )?;
        }
        Command::List { filter } => {
            let frame = match filter {
                Some(filter) => app.session.set_filter(filter),
                None => app.session.frame(),
            };
            if json {
                print_json(&frame.tasks)?;
            } else {
                println!("{}", output::tasks_text(&frame.tasks, &app.palette));
            }
        }
        Command::Filter { filter } => {
            let frame = app.session.set_filter(filter);
            if json {
                print_json(&frame.tasks)?;
            } else {
                println!("Filter: {filter}");
                println!("{}", output::tasks_text(&frame.tasks, &app.palette));
            }
        }
        Command::History { action } => run_history(app, action, json)?,
        Command::Theme { mode } => {
            let backend = app.session.store_mut().backend_mut();
            let theme = match mode {
                None => theme::load_theme(&*backend)?,
                Some(ThemeMode::Toggle) => theme::toggle_theme(backend)?,
                Some(ThemeMode::Light) => {
                    theme::save_theme(backend, Theme::Light)?;
                    Theme::Light
                }
                Some(ThemeMode::Dark) => {
                    theme::save_theme(backend, Theme::Dark)?;
                    Theme::Dark
                }
            };
            app.refresh_palette()?;
            if json {
                print_json(&serde_json::json!({ "theme": theme }))?;
            } else {
                println!("Theme: {theme}");
            }
        }
        Command::Render { filter } => {
            let frame = match filter {
                Some(filter) => app.session.set_filter(filter),
                None => app.session.frame(),
            };
            if json {
                print_json(&serde_json::json!({
                    "tasks": checklist_core::render::html::paint_tasks(&frame.tasks),
                    "history": checklist_core::render::html::paint_history(&frame.history),
                }))?;
            } else {
                print!("{}", output::markup(&frame.tasks, &frame.history));
            }
        }
    }

    Ok(())
}

fn run_history(app: &mut App, action: Option<HistoryCommand>, json: bool) -> Result<(), AppError> {
    match action.unwrap_or(HistoryCommand::List) {
        HistoryCommand::List => {
            let frame = app.session.frame();
            if json {
                print_json(&frame.history)?;
            } else {
                println!("{}", output::history_text(&frame.history, &app.palette));
            }
        }
        HistoryCommand::Remove { id } => {
            let frame = app.session.remove_history(id)?;
            let message = if frame.changed {
                format!("Removed history entry {id}")
            } else {
                format!("No history entry with id {id}; nothing changed")
            };
            print_frame(&frame, json, &message)?;
        }
        HistoryCommand::Clear => {
            let count = app.session.store().history().len();
            let frame = app.session.clear_history()?;
            let message = format!("Cleared {count} history {}", plural(count, "entry", "entries"));
            print_frame(&frame, json, &message)?;
        }
        HistoryCommand::Toggle => {
            let frame = app.session.toggle_history_panel();
            if json {
                print_json(&frame.history)?;
            } else {
                println!("{}", output::history_text(&frame.history, &app.palette));
            }
        }
    }

    Ok(())
}

fn run_interactive(app: &mut App) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

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

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("checklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(app, cli.command, cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn open_app(overrides_raw: &[String]) -> Result<App, AppError> {
    let overrides = collect_overrides(overrides_raw).map_err(AppError::invalid_input)?;
    let loaded = load_config_with_fallback();
    let config = merge_overrides(&loaded.config, &overrides);
    App::open(config)
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        init_tracing(0, 0);
        let result = open_app(&[]).and_then(|mut app| run_interactive(&mut app));
        if let Err(err) = result {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    let result = open_app(&cli.config_override)
        .and_then(|mut app| run_command(&mut app, cli.command, cli.json));
    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
