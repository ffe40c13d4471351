use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use automl_client::{AutoMlClient, ClientConfig, FileTokenStore, Session, UiStateStore};
use automl_types::{DatasetSnapshot, ResourceId, UiState};

use crate::cli::{AccountCommands, Commands, DatasetCommands};
use crate::terminal::TerminalEvents;
use crate::{account_commands, dataset_commands, model_commands, session_commands};

/// Client, session and persisted UI state for one CLI run.
pub struct App {
    pub client: AutoMlClient,
    pub ui: UiState,
    pub data_dir: PathBuf,
    ui_store: UiStateStore,
}

impl App {
    pub fn open(api_url: Option<&str>) -> Result<Self> {
        let data_dir = automl_client::data_dir().context("Failed to resolve data directory")?;
        let store = Arc::new(FileTokenStore::in_dir(&data_dir));
        let session = Arc::new(Session::hydrate(store));

        let client = AutoMlClient::new(ClientConfig::with_base_url(api_url), session)
            .context("Failed to build HTTP client")?
            .with_events(Arc::new(TerminalEvents));

        let ui_store = UiStateStore::in_dir(&data_dir);
        let ui = ui_store.load().context("Failed to load UI state")?;
        debug!("Using data directory {}", data_dir.display());

        Ok(Self { client, ui, data_dir, ui_store })
    }

    /// Persists the UI state; failures only warn.
    pub fn save(&self) {
        if let Err(e) = self.ui_store.save(&self.ui) {
            warn!("Could not save UI state: {}", e);
        }
    }

    /// Explicit dataset id, or the last one used.
    pub fn dataset(&self, explicit: Option<ResourceId>) -> Result<ResourceId> {
        explicit
            .or_else(|| self.ui.last_dataset.as_ref().map(|d| d.id.clone()))
            .context("No dataset given and none used before; pass a dataset id")
    }

    /// Explicit model id, or the last one trained or queried.
    pub fn model(&self, explicit: Option<ResourceId>) -> Result<ResourceId> {
        explicit
            .or_else(|| self.ui.last_model_id.clone())
            .context("No model given and none trained before; pass a model id")
    }

    /// Records `id` as the current dataset, keeping a known name.
    pub fn remember_dataset(&mut self, id: &ResourceId, name: Option<&str>) {
        let name = match (name, &self.ui.last_dataset) {
            (Some(name), _) => name.to_string(),
            (None, Some(last)) if &last.id == id => last.name.clone(),
            (None, _) => id.to_string(),
        };
        self.ui.last_dataset = Some(DatasetSnapshot { id: id.clone(), name });
    }
}

pub async fn handle_command(app: &mut App, command: Commands) -> Result<()> {
    if !command.is_session_command() {
        if !app.client.session().is_authenticated() {
            bail!("Not logged in. Run `automl login <username>` first.");
        }
        app.ui.last_path = Some(command.path().to_string());
    }

    match command {
        Commands::Login { username, password } => {
            session_commands::login(app, &username, password).await
        },
        Commands::Signup { email, username, password } => {
            session_commands::signup(app, &email, &username, password).await
        },
        Commands::Logout => session_commands::logout(app),
        Commands::Status => session_commands::status(app).await,
        Commands::Datasets(cmd) => handle_dataset_command(app, cmd).await,
        Commands::Algorithms { dataset, json } => {
            model_commands::list_algorithms(app, dataset, json).await
        },
        Commands::Train { dataset, target, task, features, algorithm, reuse } => {
            let options = model_commands::TrainOptions { target, task, features, algorithm, reuse };
            model_commands::train(app, dataset, options).await
        },
        Commands::Results { model, json } => model_commands::show_results(app, model, json).await,
        Commands::Schema { model, json } => model_commands::show_schema(app, model, json).await,
        Commands::Predict { model, values, input } => {
            model_commands::predict(app, model, &values, input.as_deref()).await
        },
        Commands::Automl { dataset, target, task } => {
            model_commands::run_automl(app, dataset, target, task).await
        },
        Commands::History { json } => account_commands::history(app, json).await,
        Commands::Account(cmd) => handle_account_command(app, cmd).await,
    }
}

async fn handle_dataset_command(app: &mut App, cmd: DatasetCommands) -> Result<()> {
    match cmd {
        DatasetCommands::List { json } => dataset_commands::list_datasets(app, json).await,
        DatasetCommands::Upload { path } => dataset_commands::upload_dataset(app, &path).await,
        DatasetCommands::Preview { dataset, json } => {
            dataset_commands::preview_dataset(app, dataset, json).await
        },
        DatasetCommands::Analyze { dataset, json } => {
            dataset_commands::analyze_dataset(app, dataset, json).await
        },
    }
}

async fn handle_account_command(app: &mut App, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Show { json } => account_commands::show_account(app, json).await,
        AccountCommands::Update { email, username, password } => {
            account_commands::update_account(app, email, username, password).await
        },
    }
}
