//! Garagebook CLI - manage a workshop's service catalogue

use clap::{Args, Parser, Subcommand};
use garagebook::config::{self, GaragebookConfig, ResolvedSettings};
use garagebook::ui::{self, Icons};
use garagebook::{CategoryFields, Service, ServiceCategory, ServiceFields, ShopStore};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "garagebook")]
#[command(version)]
#[command(about = "Service catalogue store for auto-repair shops")]
#[command(long_about = r#"
Garagebook keeps a workshop's services and service categories in an
embedded SQLite database and serves them to the shop front end.

Example usage:
  garagebook init
  garagebook services list
  garagebook services add --name "Oil Change" --price 49.99 --duration 30 --category 1
  garagebook categories remove 3
  garagebook serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Schema file to apply instead of the built-in schema
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database, apply the schema and seed example rows
    Init,

    /// Show row counts for every table
    Stats,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage services
    Services {
        #[command(subcommand)]
        command: ServiceCommand,
    },

    /// Manage service categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Serve the catalogue as a JSON HTTP API
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a starter garagebook.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ServiceCommand {
    /// List active services
    List,
    /// Show one service
    Show { id: i64 },
    /// Add a service
    Add(NewService),
    /// Change a service; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        changes: ServiceChanges,
    },
    /// Soft-delete a service
    Remove { id: i64 },
    /// Reactivate a soft-deleted service
    Restore { id: i64 },
}

#[derive(Args)]
struct NewService {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: Decimal,
    /// Duration in minutes
    #[arg(long)]
    duration: u32,
    /// Category id
    #[arg(long)]
    category: i64,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct ServiceChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    duration: Option<u32>,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    /// Remove the current description
    #[arg(long)]
    clear_description: bool,
}

impl ServiceChanges {
    /// Merge into the current record, producing the full replacement
    fn apply(self, current: Service) -> ServiceFields {
        ServiceFields {
            name: self.name.unwrap_or(current.name),
            description: merge_description(self.description, self.clear_description, current.description),
            price: self.price.unwrap_or(current.price),
            duration_minutes: self.duration.unwrap_or(current.duration_minutes),
            category_id: self.category.unwrap_or(current.category.id),
        }
    }
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// List active categories
    List,
    /// Show one category
    Show { id: i64 },
    /// Add a category
    Add(NewCategory),
    /// Change a category; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        changes: CategoryChanges,
    },
    /// Soft-delete a category (refused while active services use it)
    Remove { id: i64 },
    /// Reactivate a soft-deleted category
    Restore { id: i64 },
}

#[derive(Args)]
struct NewCategory {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "#6b7280")]
    color: String,
    #[arg(long, default_value = "wrench")]
    icon: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct CategoryChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    /// Remove the current description
    #[arg(long)]
    clear_description: bool,
}

impl CategoryChanges {
    /// Merge into the current record, producing the full replacement
    fn apply(self, current: ServiceCategory) -> CategoryFields {
        CategoryFields {
            name: self.name.unwrap_or(current.name),
            color: self.color.unwrap_or(current.color),
            icon: self.icon.unwrap_or(current.icon),
            description: merge_description(self.description, self.clear_description, current.description),
        }
    }
}

/// A new description wins; `--clear-description` or an empty one removes it.
fn merge_description(new: Option<String>, clear: bool, current: Option<String>) -> Option<String> {
    if clear {
        return None;
    }
    match new {
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text),
        None => current,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?;
    let port = match &cli.command {
        Commands::Serve { port } => *port,
        _ => None,
    };
    let settings = config::resolve(
        file_config.as_ref(),
        cli.database.clone(),
        cli.schema.clone(),
        port,
    );

    match cli.command {
        Commands::Init => {
            let store = open_store(&settings)?;
            let counts = store.table_counts()?;
            if cli.json {
                print_json(&counts)?;
            } else {
                let location = store
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ":memory:".to_string());
                ui::header(Icons::DATABASE, "Store initialized");
                ui::info("Database", &location);
                ui::info("Foreign keys", if store.foreign_keys_enabled()? { "on" } else { "off" });
                println!("{}", ui::counts_table(&counts));
            }
            store.close()?;
        }

        Commands::Stats => {
            let store = open_store(&settings)?;
            let counts = store.table_counts()?;
            if cli.json {
                print_json(&counts)?;
            } else if console::Term::stdout().is_term() {
                ui::header(Icons::STATS, &format!("Garagebook Statistics ({})", settings.database.display()));
                println!("{}", ui::counts_table(&counts));
            } else {
                // Plain lines for pipes and scripts
                print!("{}", counts);
            }
            store.close()?;
        }

        Commands::Config { command: ConfigCommand::Init { force } } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            config::write_config(&path, &GaragebookConfig::starter(), force)?;
            config::ensure_gitignore(std::path::Path::new("."))?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Services { command } => {
            let store = open_store(&settings)?;
            run_services(&store, command, cli.json)?;
            store.close()?;
        }

        Commands::Categories { command } => {
            let store = open_store(&settings)?;
            run_categories(&store, command, cli.json)?;
            store.close()?;
        }

        Commands::Serve { .. } => {
            let store = open_store(&settings)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(garagebook::server::start_server(settings.port, store))?;
        }
    }

    Ok(())
}

/// Open the process-wide store; failure here is fatal.
fn open_store(settings: &ResolvedSettings) -> anyhow::Result<ShopStore> {
    tracing::debug!("Opening {:?} (schema: {:?})", settings.database, settings.schema);
    let store = ShopStore::open_with_schema(&settings.database, settings.schema.as_deref())?;
    Ok(store)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_services(store: &ShopStore, command: ServiceCommand, json: bool) -> anyhow::Result<()> {
    match command {
        ServiceCommand::List => {
            let services = store.list_active_services()?;
            if json {
                print_json(&services)?;
            } else if services.is_empty() {
                ui::empty("No active services.");
            } else {
                println!("{}", ui::services_table(&services));
            }
        }

        ServiceCommand::Show { id } => match store.get_service(id)? {
            Some(service) if json => print_json(&service)?,
            Some(service) => ui::service_detail(&service),
            None => anyhow::bail!("service {} not found", id),
        },

        ServiceCommand::Add(new) => {
            let mut fields = ServiceFields::new(new.name, new.price, new.duration, new.category);
            fields.description = new.description;
            let id = store.create_service(&fields)?;
            if json {
                print_json(&serde_json::json!({ "id": id }))?;
            } else {
                ui::success(&format!("Created service {} ({})", id, fields.name));
            }
        }

        ServiceCommand::Update { id, changes } => {
            let Some(current) = store.get_service(id)? else {
                anyhow::bail!("service {} not found", id);
            };
            let fields = changes.apply(current);
            if !store.update_service(id, &fields)? {
                anyhow::bail!("service {} not found", id);
            }
            ui::success(&format!("Updated service {}", id));
        }

        ServiceCommand::Remove { id } => {
            if !store.soft_delete_service(id)? {
                anyhow::bail!("service {} not found", id);
            }
            ui::success(&format!("Removed service {}", id));
        }

        ServiceCommand::Restore { id } => {
            if !store.reactivate_service(id)? {
                anyhow::bail!("no removed service with id {}", id);
            }
            ui::success(&format!("Restored service {}", id));
        }
    }
    Ok(())
}

fn run_categories(store: &ShopStore, command: CategoryCommand, json: bool) -> anyhow::Result<()> {
    match command {
        CategoryCommand::List => {
            let categories = store.list_active_categories()?;
            if json {
                print_json(&categories)?;
            } else if categories.is_empty() {
                ui::empty("No active categories.");
            } else {
                println!("{}", ui::categories_table(&categories));
            }
        }

        CategoryCommand::Show { id } => match store.get_category(id)? {
            Some(category) if json => print_json(&category)?,
            Some(category) => {
                let in_use = store.count_active_services_in_category(id)?;
                ui::category_detail(&category, in_use);
            }
            None => anyhow::bail!("category {} not found", id),
        },

        CategoryCommand::Add(new) => {
            let mut fields = CategoryFields::new(new.name, new.color, new.icon);
            fields.description = new.description;
            let id = store.create_category(&fields)?;
            if json {
                print_json(&serde_json::json!({ "id": id }))?;
            } else {
                ui::success(&format!("Created category {} ({})", id, fields.name));
            }
        }

        CategoryCommand::Update { id, changes } => {
            let Some(current) = store.get_category(id)? else {
                anyhow::bail!("category {} not found", id);
            };
            let fields = changes.apply(current);
            if !store.update_category(id, &fields)? {
                anyhow::bail!("category {} not found", id);
            }
            ui::success(&format!("Updated category {}", id));
        }

        CategoryCommand::Remove { id } => match store.soft_delete_category(id) {
            Ok(true) => ui::success(&format!("Removed category {}", id)),
            Ok(false) => anyhow::bail!("category {} not found", id),
            Err(err @ garagebook::Error::CategoryInUse { .. }) => {
                ui::warn("Remove or move these services first:");
                for service in store.list_active_services()?.iter().filter(|s| s.category.id == id) {
                    ui::summary_row(&format!("#{}", service.id), &service.name);
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        },

        CategoryCommand::Restore { id } => {
            if !store.reactivate_category(id)? {
                anyhow::bail!("no removed category with id {}", id);
            }
            ui::success(&format!("Restored category {}", id));
        }
    }
    Ok(())
}
