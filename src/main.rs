mod app;
mod components;
mod config;
mod event;
mod handler;
mod logging;
mod mock;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use treeview_tui::{error, tree};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LogConfig};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::mock::MockLoader;
use crate::tree::Nodes;
use crate::tui::{install_panic_hook, Tui};

/// A terminal tree editor with lazy loading and drag-and-drop.
#[derive(Parser, Debug)]
#[command(name = "tvt", version, about)]
struct Cli {
    /// JSON forest to start from (read only; defaults to demo data)
    #[arg(long, value_name = "FILE")]
    tree: Option<PathBuf>,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Where to write the log
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Partial config carrying only what was set on the command line.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                ..Default::default()
            },
            log: LogConfig {
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Read a seed forest from a JSON file.
fn load_forest(path: &Path) -> error::Result<Nodes> {
    if !path.is_file() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    logging::init_tracing(Path::new(config.log_file()), config.log_filter())?;

    let forest = match &cli.tree {
        Some(path) => load_forest(path)?,
        None => mock::seed_forest(),
    };
    let source = cli
        .tree
        .as_ref()
        .map_or_else(|| "demo".to_string(), |p| p.display().to_string());
    tracing::info!(nodes = tree::model::count_nodes(&forest), %source, "forest loaded");

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let (load_tx, load_rx) = mpsc::unbounded_channel();
    events.forward_loads(load_rx);

    let mut app = App::new(forest, MockLoader::from_config(&config), load_tx, &config);

    loop {
        tui.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize => {}
            Event::ChildrenLoaded(outcome) => app.handle_children_loaded(outcome),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("bye");
    Ok(())
}
