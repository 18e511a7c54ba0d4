mod api;
mod app;
mod cli;
mod config;
mod dashboard;
mod error;
mod generation;
mod input;
mod listing;
mod model;
mod namespaces;
mod search;
mod selection;
mod ui;

use anyhow::{Context, Result};
use api::HttpGateway;
use app::{App, AppCommand, ListingSnapshot};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use dashboard::{Dashboard, FetchEvent};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let settings = Settings::resolve(&args)?;
    match &settings.source {
        Some(source) => info!("loaded config from {source}"),
        None => debug!("no config file found, using flags and defaults"),
    }

    let gateway = HttpGateway::new(&settings.api_url, settings.timeout)?;
    let mut app = App::new();
    app.set_endpoint(gateway.base_url());
    info!(
        "diagnostic api at {} (timeout {}s)",
        gateway.base_url(),
        settings.timeout.as_secs()
    );

    let (fetch_tx, fetch_rx) = mpsc::unbounded_channel::<FetchEvent>();
    let mut dashboard = Dashboard::new(Arc::new(gateway), fetch_tx, &settings.preferred_namespace);

    run(&mut app, &mut dashboard, fetch_rx, settings.initial_namespace.as_deref()).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    // Stdout belongs to the terminal UI, so logs go to a file or nowhere.
    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::sink),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(writer)
        .try_init();

    Ok(())
}

async fn run(
    app: &mut App,
    dashboard: &mut Dashboard,
    fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
    initial_namespace: Option<&str>,
) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, dashboard, fetch_rx, initial_namespace).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    dashboard: &mut Dashboard,
    mut fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
    initial_namespace: Option<&str>,
) -> Result<()> {
    app.set_status("Loading namespaces…");
    if let Some(namespace) = initial_namespace {
        dashboard.select_namespace(namespace);
    }
    dashboard.load_namespaces();
    app.sync(ListingSnapshot::capture(dashboard));

    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, app, dashboard))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(app.mode(), key) {
                            debug!("action={action:?}");
                            let command = app.apply_action(action);
                            execute_app_command(app, dashboard, command);
                            app.sync(ListingSnapshot::capture(dashboard));
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                }
            }
            maybe_fetch = fetch_rx.recv() => {
                if let Some(event) = maybe_fetch {
                    if let Some(status) = fetch_status(&event) {
                        app.set_status(status);
                    }
                    dashboard.apply(event);
                    app.sync(ListingSnapshot::capture(dashboard));
                }
            }
        }
    }

    Ok(())
}

fn execute_app_command(app: &mut App, dashboard: &mut Dashboard, command: AppCommand) {
    match command {
        AppCommand::None => {}
        AppCommand::SelectNamespace(namespace) => dashboard.select_namespace(&namespace),
        AppCommand::Refresh => {
            if !dashboard.refresh() {
                app.set_status("No namespace selected");
            }
        }
        AppCommand::OpenPod { namespace, name } => dashboard.select_pod(&namespace, &name),
        AppCommand::OpenService { namespace, name } => {
            dashboard.select_service(&namespace, &name);
        }
        AppCommand::Search {
            kind,
            namespace,
            name,
        } => {
            if !dashboard.search(kind, &namespace, &name) {
                app.set_status("Search needs a namespace and a name");
            }
        }
        AppCommand::CloseDetail => dashboard.close_detail(),
    }
}

/// Footer text for completions worth announcing. Listing and detail failures
/// already render in their own panes.
fn fetch_status(event: &FetchEvent) -> Option<String> {
    match event {
        FetchEvent::Namespaces(Ok(list)) => {
            Some(format!("Loaded {} namespaces", list.namespaces.len()))
        }
        FetchEvent::Namespaces(Err(error)) => Some(format!("Failed to load namespaces: {error}")),
        FetchEvent::Detail {
            from_search: true,
            result: Err(error),
            ..
        } => Some(format!("Search failed: {error}")),
        _ => None,
    }
}
