mod app;
mod event;
mod state;
mod terminal;
mod ui;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use mockdeck::config::Config;
use mockdeck::dictionary::open_context;
use mockdeck::domain::RowDomain;
use mockdeck::flags::FileFlags;
use mockdeck::persist::{ChannelSink, SaveRows};
use mockdeck::rows::RowCollection;
use mockdeck::storage::{self, TomlDictionaryStore};

use crate::app::App;
use crate::event::Event;
use crate::state::editor::EditorState;
use crate::ui::rows_editor::RowsLayout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config)?;
    tracing::info!(data_dir = %config.data_dir.display(), "starting");

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let (save_tx, mut save_rx) = mpsc::unbounded_channel::<SaveRows>();
    event::spawn_input_reader(tx);

    let tables = load_tables(&config, &save_tx)?;
    let flags = FileFlags::open(config.flags_path());
    let mut app = App::new(EditorState::new(tables), Box::new(flags))
        .with_export_dir(config.export_dir());

    let mut terminal = terminal::init()?;
    let result = run_loop(&mut terminal, &mut app, &mut rx, &mut save_rx, &config.rows_dir()).await;
    terminal::restore()?;

    // Edits made just before quitting are still queued.
    while let Ok(save) = save_rx.try_recv() {
        if let Err(e) = storage::save_rows(&config.rows_dir(), save.domain, &save.rows) {
            tracing::error!(domain = save.domain.label(), error = %e, "final save failed");
        }
    }
    tracing::info!("exiting");
    result
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Row domains are saved through the event loop; the context dictionary
/// writes straight back to its own file.
fn load_tables(
    config: &Config,
    save_tx: &mpsc::UnboundedSender<SaveRows>,
) -> anyhow::Result<HashMap<RowDomain, RowCollection>> {
    let dir = config.rows_dir();
    let mut tables = HashMap::new();
    for domain in RowDomain::ALL {
        let rows = match domain {
            RowDomain::Context => open_context(
                TomlDictionaryStore::new(config.context_path()),
                &config.context_categories,
            )?,
            _ => RowCollection::from_entries(
                storage::load_rows(&dir, domain),
                Box::new(ChannelSink::new(domain, save_tx.clone())),
            ),
        };
        tracing::debug!(domain = domain.label(), rows = rows.len(), "rows loaded");
        tables.insert(domain, rows);
    }
    Ok(tables)
}

async fn run_loop(
    terminal: &mut terminal::Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Event>,
    save_rx: &mut mpsc::UnboundedReceiver<SaveRows>,
    rows_dir: &Path,
) -> anyhow::Result<()> {
    loop {
        if app.state.dirty {
            let mut layout = RowsLayout::default();
            terminal.draw(|frame| layout = ui::layout::render(frame, &app.state))?;
            app.apply_layout(layout);
            app.state.dirty = false;
        }

        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => app.handle_event(event),
                None => break,
            },
            Some(save) = save_rx.recv() => {
                if let Err(e) = storage::save_rows(rows_dir, save.domain, &save.rows) {
                    app.save_failed(&save, &e);
                }
            }
        }

        if app.state.should_quit {
            break;
        }
    }
    Ok(())
}
