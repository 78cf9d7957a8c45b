//! Tea Selector CLI - pick a tea and manage the catalog
//!
//! Thin front end over the `tea-selector` view models.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Password};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tea_selector::application::{EntityKind, ListViewModel, Owners, TeaTypes, Teas};
use tea_selector::{
    AccountViewModel, CatalogApi, CatalogEntry, CatalogError, EntityId, FileTokenStorage,
    HomeViewModel, Notice, Owner, OwnershipViewModel, RemoteCatalogClient, SelectionEngine,
    SessionStore, Tea, TeaDraft,
};

use config::{Config, SERVER_URL_ENV};

#[derive(Parser)]
#[command(name = "tea")]
#[command(about = "Tea Selector CLI - pick a tea and manage the catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Catalog server URL (overrides config and TEA_SELECTOR_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Username (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Change your password
    Password,

    /// Pick a tea at random
    Pick {
        /// Only teas every given owner has (repeatable, name or id)
        #[arg(short, long)]
        owner: Vec<String>,
    },

    /// Manage teas
    Tea {
        #[command(subcommand)]
        action: TeaAction,
    },

    /// Manage tea types
    Type {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Manage owners
    Owner {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Manage who owns which tea
    Ownership {
        #[command(subcommand)]
        action: OwnershipAction,
    },

    /// Show every tea grouped by type
    Catalog,

    /// Show or change configuration
    Config {
        /// Save a new catalog server URL
        #[arg(long)]
        set_server_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum TeaAction {
    /// List all teas
    List {
        /// Show who owns each tea
        #[arg(long)]
        owners: bool,
    },
    /// Add a tea
    Add {
        name: String,
        /// Tea type (name or id)
        #[arg(short = 't', long = "type")]
        tea_type: String,
    },
    /// Remove a tea (name or id)
    Remove { tea: String },
}

#[derive(Subcommand)]
enum EntityAction {
    /// List all entries
    List,
    /// Add an entry
    Add { name: String },
    /// Remove an entry (name or id)
    Remove { name: String },
}

#[derive(Subcommand)]
enum OwnershipAction {
    /// List each owner's teas
    List,
    /// Give a tea to an owner
    Add { owner: String, tea: String },
    /// Take a tea away from an owner
    Remove { owner: String, tea: String },
}

/// Settings and storage shared by every command
struct App {
    config: Config,
    sessions: SessionStore<FileTokenStorage>,
    json: bool,
}

impl App {
    fn client(&self) -> Result<RemoteCatalogClient> {
        Ok(RemoteCatalogClient::new(self.config.client_config())?)
    }

    /// Client carrying the stored session, if the server still accepts it
    async fn authed(&self) -> Result<Arc<RemoteCatalogClient>> {
        let client = self.client()?;
        let session = self
            .sessions
            .restore(&client)
            .await
            .context("Not logged in or session expired. Run 'tea login' first.")?;
        Ok(Arc::new(client.with_session(Some(session))))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(std::env::var(SERVER_URL_ENV).ok(), cli.server);
    debug!(server_url = %config.server_url, "Using catalog server");

    let app = App {
        config,
        sessions: SessionStore::new(Arc::new(FileTokenStorage::new(Config::session_path()?))),
        json: cli.json,
    };

    match cli.command {
        Commands::Login { username } => cmd_login(&app, username).await,
        Commands::Logout => cmd_logout(&app).await,
        Commands::Password => cmd_password(&app).await,
        Commands::Pick { owner } => cmd_pick(&app, owner).await,
        Commands::Tea { action } => cmd_tea(&app, action).await,
        Commands::Type { action } => cmd_named::<TeaTypes>(&app, action).await,
        Commands::Owner { action } => cmd_named::<Owners>(&app, action).await,
        Commands::Ownership { action } => cmd_ownership(&app, action).await,
        Commands::Catalog => cmd_catalog(&app).await,
        Commands::Config { set_server_url } => cmd_config(&app, set_server_url).await,
    }
}

// ============================================
// Helpers
// ============================================

/// Turn a view model result into CLI output, using the notice it left behind
fn settle<T>(result: Result<T, CatalogError>, notice: Option<&Notice>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Some(n) = notice.filter(|n| !n.is_error()) {
                println!("{} {}", "✓".green(), n.message);
            }
            Ok(value)
        }
        Err(e) => {
            let message = match notice.filter(|n| n.is_error()) {
                Some(n) => format!("{}: {}", n.title, n.message),
                None => e.user_message(),
            };
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

/// Find an entry by id or, failing that, by case-insensitive name
fn resolve<'a, T: CatalogEntry>(items: &'a [T], key: &str, label: &str) -> Result<&'a T> {
    let key = key.trim();
    let by_id = key.parse::<EntityId>().ok();

    items
        .iter()
        .find(|e| Some(e.id()) == by_id)
        .or_else(|| items.iter().find(|e| e.name().eq_ignore_ascii_case(key)))
        .with_context(|| format!("No {} named '{}'", label, key))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn describe_tea(tea: &Tea) -> String {
    format!("{} {}", tea.name, format!("({})", tea.tea_type.name).dimmed())
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(app: &App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read username")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")?;

    let mut account = AccountViewModel::new(Arc::new(app.client()?), app.sessions.clone());
    let result = account.login(&username, &password).await;
    settle(result, account.notice())?;

    println!("  Session saved to {:?}", Config::session_path()?);
    Ok(())
}

async fn cmd_logout(app: &App) -> Result<()> {
    let mut account = AccountViewModel::new(Arc::new(app.client()?), app.sessions.clone());
    let result = account.logout().await;
    settle(result, account.notice())
}

async fn cmd_password(app: &App) -> Result<()> {
    let api = app.authed().await?;

    let old = Password::new()
        .with_prompt("Old password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")?;
    let new = Password::new()
        .with_prompt("New password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")?;
    let repeat = Password::new()
        .with_prompt("Repeat new password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")?;

    let mut account = AccountViewModel::new(api, app.sessions.clone());
    let result = account.change_password(&old, &new, &repeat).await;
    settle(result, account.notice())
}

async fn cmd_pick(app: &App, owners: Vec<String>) -> Result<()> {
    let mut home = HomeViewModel::new(app.authed().await?, SelectionEngine::new());
    let result = home.load().await;
    settle(result, home.snapshot().notice.as_ref())?;

    let known: Vec<Owner> = home
        .snapshot()
        .state
        .loaded()
        .map(|view| view.owners.iter().map(|(o, _)| o.clone()).collect())
        .unwrap_or_default();
    for key in &owners {
        let id = resolve(&known, key, "owner")?.id;
        home.toggle_owner(id)?;
    }

    let snapshot = home.snapshot();
    if app.json {
        return print_json(&snapshot);
    }

    let Some(view) = snapshot.state.loaded() else {
        return Ok(());
    };
    match &view.selected {
        Some(tea) => {
            println!("{} {}", "☕".bold(), describe_tea(tea).cyan().bold());
            let checked: Vec<&str> = view
                .owners
                .iter()
                .filter(|(_, checked)| *checked)
                .map(|(o, _)| o.name.as_str())
                .collect();
            let scope = if checked.is_empty() {
                "all teas".to_string()
            } else {
                format!("teas owned by {}", checked.join(" and "))
            };
            println!(
                "  {}",
                format!("picked from {} {}", view.candidate_count, scope).dimmed()
            );
        }
        None => {
            if let Some(notice) = &snapshot.notice {
                println!("{}", notice.message.yellow());
            }
        }
    }

    Ok(())
}

async fn cmd_tea(app: &App, action: TeaAction) -> Result<()> {
    match action {
        TeaAction::List { owners: true } => {
            let api = app.authed().await?;
            let mut teas = api
                .list_teas_with_owners()
                .await
                .context("Failed to load teas")?;
            teas.sort_by(|a, b| a.tea.name.cmp(&b.tea.name));

            if app.json {
                return print_json(&teas);
            }
            for entry in &teas {
                let owners: Vec<&str> = entry.owners.iter().map(|o| o.name.as_str()).collect();
                let owners = if owners.is_empty() {
                    "nobody".dimmed().to_string()
                } else {
                    owners.join(", ")
                };
                println!("  {} - {}", describe_tea(&entry.tea), owners);
            }
            Ok(())
        }
        TeaAction::List { owners: false } => list_entities::<Teas>(app, describe_tea).await,
        TeaAction::Add { name, tea_type } => {
            let api = app.authed().await?;
            let types = api.list_types().await.context("Failed to load tea types")?;
            let type_id = resolve(&types, &tea_type, "tea type")?.id;

            add_entity::<Teas>(app, TeaDraft { name, type_id }, describe_tea).await
        }
        TeaAction::Remove { tea } => remove_entity::<Teas>(app, &tea).await,
    }
}

/// Types and owners only need a name to be created
async fn cmd_named<K>(app: &App, action: EntityAction) -> Result<()>
where
    K: EntityKind<Draft = String>,
    K::Entity: Serialize,
{
    let describe = |e: &K::Entity| e.name().to_string();
    match action {
        EntityAction::List => list_entities::<K>(app, describe).await,
        EntityAction::Add { name } => add_entity::<K>(app, name, describe).await,
        EntityAction::Remove { name } => remove_entity::<K>(app, &name).await,
    }
}

async fn loaded_list<K: EntityKind>(app: &App) -> Result<ListViewModel<K, RemoteCatalogClient>> {
    let mut vm = ListViewModel::<K, _>::new(app.authed().await?);
    let result = vm.refresh().await;
    settle(result, vm.notice())?;
    Ok(vm)
}

async fn list_entities<K>(app: &App, describe: fn(&K::Entity) -> String) -> Result<()>
where
    K: EntityKind,
    K::Entity: Serialize,
{
    let label = K::MESSAGES.label;
    let vm = loaded_list::<K>(app).await?;
    let items = vm.items().unwrap_or_default();

    if app.json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("No {}s found.", label);
        return Ok(());
    }

    println!("{}", format!("{} {}(s):", items.len(), label).bold());
    for item in items {
        println!("  {} {}", item.id().to_string().dimmed(), describe(item));
    }
    Ok(())
}

async fn add_entity<K: EntityKind>(
    app: &App,
    draft: K::Draft,
    describe: fn(&K::Entity) -> String,
) -> Result<()> {
    // the duplicate-name check runs against the fetched list
    let mut vm = loaded_list::<K>(app).await?;
    let result = vm.create(draft).await;
    let created = settle(result, vm.notice())?;
    println!("  {} {}", created.id().to_string().dimmed(), describe(&created));
    Ok(())
}

async fn remove_entity<K: EntityKind>(app: &App, key: &str) -> Result<()> {
    let mut vm = loaded_list::<K>(app).await?;
    let id = resolve(vm.items().unwrap_or_default(), key, K::MESSAGES.label)?.id();
    let result = vm.delete(id).await;
    settle(result, vm.notice())
}

async fn cmd_ownership(app: &App, action: OwnershipAction) -> Result<()> {
    let api = app.authed().await?;
    let mut vm = OwnershipViewModel::new(api.clone());
    let result = vm.refresh().await;
    settle(result, vm.notice())?;

    let owners: Vec<Owner> = vm
        .sections()
        .unwrap_or_default()
        .iter()
        .map(|s| s.owner.clone())
        .collect();

    match action {
        OwnershipAction::List => {
            let sections = vm.sections().unwrap_or_default();
            if app.json {
                return print_json(sections);
            }
            for section in sections {
                println!("{}", section.owner.name.cyan().bold());
                if section.teas.is_empty() {
                    println!("  {}", "(no teas)".dimmed());
                }
                for tea in &section.teas {
                    println!("  - {}", describe_tea(tea));
                }
            }
        }
        OwnershipAction::Add { owner, tea } => {
            let owner_id = resolve(&owners, &owner, "owner")?.id;
            let teas = api.list_teas().await.context("Failed to load teas")?;
            let tea = resolve(&teas, &tea, "tea")?.clone();

            let result = vm.add(owner_id, &tea).await;
            settle(result, vm.notice())?;
        }
        OwnershipAction::Remove { owner, tea } => {
            let owner_id = resolve(&owners, &owner, "owner")?.id;
            let owned: Vec<Tea> = vm
                .sections()
                .unwrap_or_default()
                .iter()
                .find(|s| s.owner.id == owner_id)
                .map(|s| s.teas.clone())
                .unwrap_or_default();
            let tea_id = resolve(&owned, &tea, "tea owned by them")?.id;

            let result = vm.remove(owner_id, tea_id).await;
            settle(result, vm.notice())?;
        }
    }

    Ok(())
}

async fn cmd_catalog(app: &App) -> Result<()> {
    let api = app.authed().await?;
    let mut groups = api
        .list_types_with_teas()
        .await
        .context("Failed to load tea types")?;
    groups.sort_by(|a, b| a.tea_type.name.cmp(&b.tea_type.name));
    for group in &mut groups {
        group.teas.sort_by(|a, b| a.name.cmp(&b.name));
    }

    if app.json {
        return print_json(&groups);
    }
    for group in &groups {
        println!(
            "{} {}",
            group.tea_type.name.cyan().bold(),
            format!("({})", group.teas.len()).dimmed()
        );
        for tea in &group.teas {
            println!("  - {}", tea.name);
        }
    }

    Ok(())
}

async fn cmd_config(app: &App, set_server_url: Option<String>) -> Result<()> {
    if let Some(url) = set_server_url {
        // overrides are not persisted
        let mut stored = Config::load()?;
        stored.server_url = url;
        stored.save()?;
        println!("{} Server URL saved to {:?}", "✓".green(), Config::config_path()?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Server URL: {}", app.config.server_url);
    println!("  Session file: {:?}", Config::session_path()?);
    println!(
        "  Session: {}",
        if app.sessions.get().await.is_some() {
            "Stored".green()
        } else {
            "Not logged in".red()
        }
    );

    Ok(())
}
