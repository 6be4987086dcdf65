mod catalog;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use omag_client::{
    DatabaseManagerClient, PlatformServicesClient, RestClient, ServerConfigurationClient,
    ServerOperationsClient,
};
use omag_core::Paging;
use omag_core::admin::{OmagServerConfig, ServiceOptions};
use omag_core::audit::AuditLogDestinationConfig;
use omag_core::instances::ExternalSource;

use catalog::CatalogDescription;

#[derive(Parser)]
#[command(
    name = "omag",
    version,
    about = "Configure, run and catalogue through an OMAG server platform"
)]
struct Cli {
    /// Root URL of the OMAG server platform
    #[arg(
        short,
        long,
        env = "OMAG_PLATFORM_URL",
        default_value = "http://localhost:9443"
    )]
    platform_url: String,

    /// User id the calls are made under
    #[arg(short, long, env = "OMAG_USER")]
    user: String,

    /// Platform API key (reads from OMAG_PLATFORM_API_KEY env var if not provided)
    #[arg(long, env = "OMAG_PLATFORM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the platform itself
    #[command(subcommand)]
    Platform(PlatformCommand),

    /// Build up a server's stored configuration document
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Start, stop and inspect servers
    #[command(subcommand)]
    Server(ServerCommand),

    /// Catalogue databases through the Data Manager access service
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Subcommand)]
enum PlatformCommand {
    /// Show the platform's health summary (no credentials needed)
    Health,
    /// Show the platform's build origin
    Origin,
    /// List the servers the platform knows about
    Servers {
        /// Only list running servers
        #[arg(long, default_value_t = false)]
        active: bool,
    },
    /// List the services this platform can run
    Services {
        #[arg(value_enum, default_value_t = ServiceKindArg::Access)]
        kind: ServiceKindArg,
    },
    /// Stop every running server
    ShutdownAll,
}

#[derive(Clone, Copy, ValueEnum)]
enum ServiceKindArg {
    Access,
    View,
    Engine,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// List servers with a stored configuration
    List,
    /// Print a server's stored configuration document
    Show { server: String },
    /// Replace a server's configuration document with the contents of a JSON file
    Load { server: String, file: PathBuf },
    /// Reset a server's configuration document to its defaults
    Clear { server: String },
    /// Set the organization that owns the server
    Organization { server: String, name: String },
    /// Set the URL root other servers use to call this server
    UrlRoot { server: String, url: String },
    /// Set the maximum page size for queries
    MaxPageSize { server: String, size: usize },
    /// Set the default event bus (properties given as KEY=VALUE)
    EventBus {
        server: String,
        #[arg(long = "property", value_parser = parse_option)]
        properties: Vec<(String, serde_json::Value)>,
    },
    /// Configure the local repository
    Repository {
        server: String,
        #[arg(value_enum)]
        mode: RepositoryArg,
        /// Connection URL for the postgres repository
        #[arg(long, env = "DATABASE_URL")]
        connection_url: Option<String>,
    },
    /// Audit log destinations
    AuditLog {
        server: String,
        /// JSON file holding a destination; without it the default console destination is set
        #[arg(long)]
        destination: Option<PathBuf>,
        /// Remove every destination instead
        #[arg(long, default_value_t = false, conflicts_with = "destination")]
        clear: bool,
    },
    /// Enable an access service, or every registered one with "all"
    EnableAccess {
        server: String,
        service: String,
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<(String, serde_json::Value)>,
    },
    /// Disable an access service, or every configured one with "all"
    DisableAccess { server: String, service: String },
    /// Register a server with a cohort
    Cohort { server: String, cohort: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepositoryArg {
    InMemory,
    Postgres,
    None,
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Start a server from its stored configuration, or from a supplied file
    Start {
        server: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Stop a server, keeping its configuration
    Stop { server: String },
    /// Stop a server and delete its configuration
    Delete { server: String },
    /// Show a server's status
    Status { server: String },
    /// List the services running in a server
    Services { server: String },
    /// Print the configuration a running server was started with
    ActiveConfig { server: String },
    /// Print a running server's in-memory audit log records
    AuditLog { server: String },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Import a JSON database description
    Import { server: String, file: PathBuf },
    /// Search for databases, schemas, tables or columns with a regular expression
    Find {
        server: String,
        #[arg(value_enum)]
        kind: ElementKindArg,
        search: String,
        #[arg(long, default_value_t = 0)]
        start_from: usize,
        #[arg(long, default_value_t = 0)]
        page_size: usize,
    },
    /// Print a database and the schemas it holds
    Show { server: String, database: Uuid },
    /// Remove a database and everything catalogued inside it
    Remove {
        server: String,
        database: Uuid,
        /// Qualified name of the database manager that owns the database
        #[arg(long)]
        manager: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ElementKindArg {
    Databases,
    Schemas,
    Tables,
    Views,
    Columns,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("omag=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rest = connect(&cli.platform_url, cli.api_key.as_deref())?;

    match cli.command {
        Commands::Platform(command) => cmd_platform(command, rest, &cli.user).await?,
        Commands::Config(command) => cmd_config(command, rest, &cli.user).await?,
        Commands::Server(command) => cmd_server(command, rest, &cli.user).await?,
        Commands::Catalog(command) => cmd_catalog(command, rest, &cli.user).await?,
    }

    Ok(())
}

fn connect(platform_url: &str, api_key: Option<&str>) -> Result<RestClient> {
    let rest = RestClient::new(platform_url)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to create platform client")?;
    Ok(match api_key {
        Some(key) => rest.with_api_key(key),
        None => rest,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Parse `KEY=VALUE`; the value is taken as JSON when it parses, otherwise as a string.
fn parse_option(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

fn to_options(pairs: Vec<(String, serde_json::Value)>) -> ServiceOptions {
    pairs.into_iter().collect()
}

async fn cmd_platform(command: PlatformCommand, rest: RestClient, user: &str) -> Result<()> {
    let platform = PlatformServicesClient::new(rest, user);
    let result = match command {
        PlatformCommand::Health => serde_json::to_value(platform.health().await?)?,
        PlatformCommand::Origin => serde_json::to_value(platform.get_platform_origin().await?)?,
        PlatformCommand::Servers { active } => {
            let servers = if active {
                platform.list_active_servers().await?
            } else {
                platform.list_known_servers().await?
            };
            serde_json::to_value(servers)?
        }
        PlatformCommand::Services { kind } => {
            let services = match kind {
                ServiceKindArg::Access => platform.list_registered_access_services().await?,
                ServiceKindArg::View => platform.list_registered_view_services().await?,
                ServiceKindArg::Engine => platform.list_registered_engine_services().await?,
            };
            serde_json::to_value(services)?
        }
        PlatformCommand::ShutdownAll => {
            platform.shutdown_all_servers().await?;
            tracing::info!("All servers stopped");
            return Ok(());
        }
    };
    print_json(&result)
}

async fn cmd_config(command: ConfigCommand, rest: RestClient, user: &str) -> Result<()> {
    let config = ServerConfigurationClient::new(rest, user);
    match command {
        ConfigCommand::List => print_json(&config.list_stored_configurations().await?)?,
        ConfigCommand::Show { server } => {
            print_json(&config.get_stored_configuration(&server).await?)?
        }
        ConfigCommand::Load { server, file } => {
            let document: OmagServerConfig = read_json(&file)?;
            config.set_omag_server_config(&server, &document).await?;
            tracing::info!("Stored configuration for {} from {}", server, file.display());
        }
        ConfigCommand::Clear { server } => config.clear_omag_server_config(&server).await?,
        ConfigCommand::Organization { server, name } => {
            config.set_organization_name(&server, &name).await?
        }
        ConfigCommand::UrlRoot { server, url } => config.set_server_url_root(&server, &url).await?,
        ConfigCommand::MaxPageSize { server, size } => {
            config.set_max_page_size(&server, size).await?
        }
        ConfigCommand::EventBus { server, properties } => {
            let event_bus = omag_core::admin::EventBusConfig {
                configuration_properties: to_options(properties),
                ..Default::default()
            };
            config.set_event_bus(&server, Some(&event_bus)).await?
        }
        ConfigCommand::Repository {
            server,
            mode,
            connection_url,
        } => match mode {
            RepositoryArg::InMemory => config.set_in_memory_local_repository(&server).await?,
            RepositoryArg::Postgres => {
                let url = connection_url
                    .context("--connection-url (or DATABASE_URL) is required for postgres")?;
                config.set_postgres_local_repository(&server, &url).await?
            }
            RepositoryArg::None => config.set_no_repository_mode(&server).await?,
        },
        ConfigCommand::AuditLog {
            server,
            destination,
            clear,
        } => {
            if clear {
                config.clear_audit_log_destinations(&server).await?
            } else if let Some(path) = destination {
                let destination: AuditLogDestinationConfig = read_json(&path)?;
                config.add_audit_log_destination(&server, &destination).await?
            } else {
                config.set_default_audit_log(&server).await?
            }
        }
        ConfigCommand::EnableAccess {
            server,
            service,
            options,
        } => {
            let options = to_options(options);
            if service == "all" {
                config.enable_all_access_services(&server, &options).await?
            } else {
                config.enable_access_service(&server, &service, &options).await?
            }
        }
        ConfigCommand::DisableAccess { server, service } => {
            if service == "all" {
                config.disable_access_services(&server).await?
            } else {
                config.disable_access_service(&server, &service).await?
            }
        }
        ConfigCommand::Cohort { server, cohort } => {
            config.add_cohort_registration(&server, &cohort, None).await?
        }
    }
    Ok(())
}

async fn cmd_server(command: ServerCommand, rest: RestClient, user: &str) -> Result<()> {
    let operations = ServerOperationsClient::new(rest, user);
    match command {
        ServerCommand::Start { server, config } => {
            let message = match config {
                Some(path) => {
                    let document: OmagServerConfig = read_json(&path)?;
                    operations.activate_with_supplied_config(&server, &document).await?
                }
                None => operations.activate_with_stored_config(&server).await?,
            };
            println!("{message}");
        }
        ServerCommand::Stop { server } => {
            operations.deactivate_temporarily(&server).await?;
            tracing::info!("Stopped {}", server);
        }
        ServerCommand::Delete { server } => {
            operations.deactivate_permanently(&server).await?;
            tracing::info!("Stopped {} and deleted its configuration", server);
        }
        ServerCommand::Status { server } => {
            print_json(&operations.get_server_status(&server).await?)?
        }
        ServerCommand::Services { server } => {
            print_json(&operations.get_active_services(&server).await?)?
        }
        ServerCommand::ActiveConfig { server } => {
            print_json(&operations.get_active_configuration(&server).await?)?
        }
        ServerCommand::AuditLog { server } => {
            print_json(&operations.get_audit_log_records(&server).await?)?
        }
    }
    Ok(())
}

async fn cmd_catalog(command: CatalogCommand, rest: RestClient, user: &str) -> Result<()> {
    match command {
        CatalogCommand::Import { server, file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let description = CatalogDescription::from_json(&text)?;
            let mut client = DatabaseManagerClient::new(rest, server, user);
            let summary = catalog::import(&mut client, &description).await?;
            tracing::info!(
                "Catalogued {} databases, {} tables, {} columns",
                summary.databases,
                summary.tables,
                summary.columns
            );
            print_json(&summary)?;
        }
        CatalogCommand::Find {
            server,
            kind,
            search,
            start_from,
            page_size,
        } => {
            let client = DatabaseManagerClient::new(rest, server, user);
            let paging = Paging::new(start_from, page_size);
            let found = match kind {
                ElementKindArg::Databases => {
                    serde_json::to_value(client.find_databases(&search, paging).await?)?
                }
                ElementKindArg::Schemas => {
                    serde_json::to_value(client.find_database_schemas(&search, paging).await?)?
                }
                ElementKindArg::Tables => {
                    serde_json::to_value(client.find_database_tables(&search, paging).await?)?
                }
                ElementKindArg::Views => {
                    serde_json::to_value(client.find_database_views(&search, paging).await?)?
                }
                ElementKindArg::Columns => {
                    serde_json::to_value(client.find_database_columns(&search, paging).await?)?
                }
            };
            print_json(&found)?;
        }
        CatalogCommand::Show { server, database } => {
            let client = DatabaseManagerClient::new(rest, server, user);
            let element = client.get_database_by_guid(database).await?;
            let schemas = client
                .get_schemas_for_database(database, Paging::default())
                .await?;
            print_json(&serde_json::json!({
                "database": element,
                "schemas": schemas,
            }))?;
        }
        CatalogCommand::Remove {
            server,
            database,
            manager,
        } => {
            let mut client = DatabaseManagerClient::new(rest, server, user);
            let manager_guid = client.get_metadata_source_guid(&manager).await?;
            client = client.with_external_source(ExternalSource {
                guid: manager_guid,
                name: manager,
            });
            client.remove_database(database).await?;
            tracing::info!("Removed database {}", database);
        }
    }
    Ok(())
}
