use crate::config::Config;
use crate::error::AppError;
use crate::events::network::{Event as NetworkEvent, Handler as NetworkEventHandler};
use crate::events::terminal::Handler as TerminalEventHandler;
use crate::logger::{log_buffer, CustomLogger};
use crate::state::State;
use crate::store::{DocumentStore, FirestoreStore, MemoryStore};
use crate::sync::SyncConfig;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::*;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type NetworkEventSender = std::sync::mpsc::Sender<NetworkEvent>;
type NetworkEventReceiver = std::sync::mpsc::Receiver<NetworkEvent>;

/// Command line choices that shape a run.
///
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Keep every document in process memory instead of the remote store.
    pub memory: bool,
    /// Workspace to open right away.
    pub workspace: Option<String>,
    pub verbose: bool,
}

/// Oversees event processing, state management, and terminal output.
///
pub struct App {
    state: Arc<Mutex<State>>,
    config: Config,
}

impl App {
    /// Start a new application according to the given configuration. Returns
    /// the result of the application execution.
    ///
    pub async fn start(config: Config, options: Options) -> Result<()> {
        let buffer = log_buffer();
        CustomLogger::init(Arc::clone(&buffer), options.verbose)
            .map_err(|e| AppError::Logger(e.to_string()))?;

        info!("Starting application...");
        let store = build_store(&config, options.memory)?;
        let (tx, rx) = std::sync::mpsc::channel::<NetworkEvent>();
        let mut state = State::new(tx.clone(), buffer, config.activation_distance);
        if let Some(id) = options.workspace.as_ref().or(config.last_workspace.as_ref()) {
            state.prefill_workspace(id);
        }
        let mut app = App {
            state: Arc::new(Mutex::new(state)),
            config,
        };
        app.start_network(rx, store)?;
        if let Some(id) = options.workspace {
            tx.send(NetworkEvent::OpenWorkspace { id, password: None })?;
        }
        let result = app.start_ui().await;

        // Remember the workspace for the next run
        {
            let state = app.state.lock().await;
            if let Some(id) = state.workspace_id() {
                app.config.last_workspace = Some(id.to_owned());
            }
            if let Err(e) = app.config.save() {
                error!("Failed to save config on exit: {}", e);
            }
        }

        info!("Exiting application...");
        result
    }

    /// Start a separate thread for asynchronous state mutations.
    ///
    fn start_network(
        &self,
        net_receiver: NetworkEventReceiver,
        store: Arc<dyn DocumentStore>,
    ) -> Result<()> {
        debug!("Creating new thread for asynchronous networking...");
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::RuntimeCreation(e.to_string()))?;
        let cloned_state = Arc::clone(&self.state);
        let sync_config: SyncConfig = self.config.sync_config();
        std::thread::spawn(move || {
            runtime.block_on(async {
                let (sync_tx, sync_rx) = tokio::sync::mpsc::unbounded_channel();
                tokio::spawn(crate::events::sync::forward(
                    sync_rx,
                    Arc::clone(&cloned_state),
                ));
                let mut network_event_handler =
                    NetworkEventHandler::new(&cloned_state, store, sync_config, sync_tx);
                while let Ok(network_event) = net_receiver.recv() {
                    match network_event_handler.handle(network_event).await {
                        Ok(_) => (),
                        Err(e) => error!("Failed to handle network event: {}", e),
                    }
                }
            })
        });
        Ok(())
    }

    /// Begin the terminal event poll on a separate thread before starting the
    /// render loop on the main thread. Return the result following an exit
    /// request or unrecoverable error.
    ///
    async fn start_ui(&mut self) -> Result<()> {
        debug!("Starting user interface on main thread...");
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        enable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let terminal_event_handler = TerminalEventHandler::new();
        let result: Result<()> = loop {
            let mut state = self.state.lock().await;
            if let Ok(size) = terminal.backend().size() {
                state.set_terminal_size(size);
            };
            if let Err(e) = terminal.draw(|frame| crate::ui::render(frame, &mut state)) {
                break Err(e.into());
            }
            match terminal_event_handler.handle_next(&mut state) {
                Ok(true) => (),
                Ok(false) => {
                    debug!("Received application exit request.");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };

        disable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }
}

/// Pick the document store for this run.
///
fn build_store(config: &Config, memory: bool) -> Result<Arc<dyn DocumentStore>, AppError> {
    if memory {
        info!("Using in-memory document store.");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let url = config.store_url()?;
    info!("Using document store at {}", url);
    Ok(Arc::new(FirestoreStore::new(
        &url,
        config.effective_api_key(),
        config.poll_interval(),
    )))
}
