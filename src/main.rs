mod api;
mod config;
mod models;
mod storage;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::ClientApi;
use crate::storage::ClientStorage;
use crate::store::ClientStore;
use crate::ui::{
    clients::{ClientsState, ClientAction, render_clients, handle_input as handle_clients_input},
    client_wizard::{ClientWizardState, ClientWizardAction, render_client_wizard, handle_input as handle_client_wizard_input},
};

/// Terminal mini-CRM over a local JSON storage slot
#[derive(Debug, Parser)]
#[command(name = "mini-crm", version)]
struct Args {
    /// Directory holding the storage slot (overrides MINI_CRM_STORAGE_DIR)
    #[arg(long)]
    storage_dir: Option<PathBuf>,
    /// Simulated network latency in milliseconds (overrides MINI_CRM_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,
}

// Represents the current screen in the app
enum AppScreen {
    Clients,
    ClientWizard,
}

// Main application state
struct AppState {
    store: ClientStore,
    screen: AppScreen,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
}

impl AppState {
    fn new(store: ClientStore) -> Self {
        Self {
            store,
            screen: AppScreen::Clients,
            clients_state: None,
            client_wizard_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration, with CLI flags taking precedence
    let args = Args::parse();
    let mut config = config::init()?;
    if args.storage_dir.is_some() {
        config.storage_dir = args.storage_dir;
    }
    if args.delay_ms.is_some() {
        config.delay_ms = args.delay_ms;
    }

    // Wire up the storage adapter, service and store
    let storage = ClientStorage::new(&config.storage_dir());
    let api = ClientApi::with_delay(storage, config.delay());
    let store = ClientStore::new(api);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new(store);

    // Initial load of the clients screen
    load_clients_screen(&mut app_state).await;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Clients => {
                    if let Some(state) = &mut app_state.clients_state {
                        render_clients(f, &app_state.store, state);
                    }
                }
                AppScreen::ClientWizard => {
                    if let Some(state) = &mut app_state.client_wizard_state {
                        render_client_wizard(f, state);
                    }
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_clients_screen(app_state: &mut AppState) {
    // Failures land in the store's error field and show up in the footer
    app_state.store.fetch_clients().await;
    app_state.clients_state = Some(ClientsState::new(app_state.store.clients().len()));
    app_state.screen = AppScreen::Clients;
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.clients_state {
        match handle_clients_input(&app_state.store, state)? {
            Some(ClientAction::Exit) => {
                return Ok(true);
            }
            Some(ClientAction::Refresh) => {
                load_clients_screen(app_state).await;
            }
            Some(ClientAction::NewClient) => {
                app_state.client_wizard_state = Some(ClientWizardState::new());
                app_state.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::EditClient(client_id)) => {
                // The cached record carries everything the wizard needs
                let client = app_state
                    .store
                    .clients()
                    .iter()
                    .find(|c| c.id == client_id)
                    .cloned();
                if let Some(client) = client {
                    app_state.client_wizard_state = Some(ClientWizardState::from_existing(&client));
                    app_state.screen = AppScreen::ClientWizard;
                }
            }
            Some(ClientAction::DeleteClient(client_id)) => {
                // Failure is surfaced through the store's error field
                app_state.store.delete_client(client_id).await.ok();
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.client_wizard_state {
        match handle_client_wizard_input(state)? {
            Some(ClientWizardAction::Cancel) => {
                app_state.clients_state =
                    Some(ClientsState::new(app_state.store.clients().len()));
                app_state.screen = AppScreen::Clients;
            }
            Some(ClientWizardAction::Save(form)) => {
                // Failure keeps the error in the store for the footer; the
                // user lands back on the clients screen either way
                match state.client_id() {
                    Some(id) => {
                        app_state.store.update_client(id, form).await.ok();
                    }
                    None => {
                        app_state.store.create_client(form).await.ok();
                    }
                }

                app_state.clients_state =
                    Some(ClientsState::new(app_state.store.clients().len()));
                app_state.screen = AppScreen::Clients;
            }
            None => {}
        }
    }

    Ok(false)
}
