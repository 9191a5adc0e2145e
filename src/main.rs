use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use certdesk::auth::PasswordHasher;
use certdesk::config::ServerConfig;
use certdesk::notify::LogNotifier;
use certdesk::server::validation::{validate_password, validate_username};
use certdesk::server::{AppState, create_router};
use certdesk::store::{SqliteStore, Store};
use certdesk::types::{Specification, User};

#[derive(Parser)]
#[command(name = "certdesk")]
#[command(about = "A client-certification registry server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for database and exports
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and first staff user)
    Init {
        /// Data directory for database and exports
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Username for the first staff user (required with --non-interactive)
        #[arg(long)]
        username: Option<String>,

        /// Password for the first staff user (required with --non-interactive)
        #[arg(long)]
        password: Option<String>,
    },

    /// Staff user commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Specification commands
    Spec {
        #[command(subcommand)]
        command: SpecCommands,
    },

    /// Show registry contents
    Info {
        /// Data directory for database and exports
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a staff user
    Add {
        /// Data directory for database and exports
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username for the new user
        #[arg(long)]
        username: String,

        /// Password for the new user (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SpecCommands {
    /// Add a certification specification
    Add {
        /// Data directory for database and exports
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Specification name
        #[arg(long)]
        name: String,

        /// Initial certificate-number counter
        #[arg(long, default_value = "0")]
        start: i64,
    },
}

fn open_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;
    let store = SqliteStore::new(data_path.join("certdesk.db"))?;
    Ok(store)
}

fn create_user(store: &SqliteStore, username: &str, password: &str) -> anyhow::Result<User> {
    if let Err(e) = validate_username(username) {
        bail!("{e}");
    }
    if let Err(e) = validate_password(password) {
        bail!("{e}");
    }

    let hasher = PasswordHasher::new();
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hasher.hash(password)?,
        created_at: now,
        updated_at: now,
    };

    store.create_user(&user)?;
    Ok(user)
}

fn prompt_user_details() -> anyhow::Result<(String, String)> {
    let username = inquire::Text::new("Username:")
        .with_validator(|input: &str| match validate_username(input) {
            Ok(()) => Ok(inquire::validator::Validation::Valid),
            Err(e) => Err(e.into()),
        })
        .prompt()?;

    let password = inquire::Password::new("Password:")
        .with_validator(|input: &str| match validate_password(input) {
            Ok(()) => Ok(inquire::validator::Validation::Valid),
            Err(e) => Err(e.into()),
        })
        .prompt()?;

    Ok((username, password))
}

fn run_init(
    data_dir: String,
    non_interactive: bool,
    username: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let store = open_store(&data_dir)?;
    store.initialize()?;

    if store.count_users()? > 0 {
        bail!("Server already initialized. Database at: {data_dir}/certdesk.db");
    }

    let (username, password) = if non_interactive {
        match (username, password) {
            (Some(u), Some(p)) => (u, p),
            _ => bail!("--non-interactive requires --username and --password"),
        }
    } else {
        prompt_user_details()?
    };

    let user = create_user(&store, &username, &password)?;

    println!();
    println!("========================================");
    println!("Initialized registry with staff user '{}'.", user.username);
    println!();
    println!("Sign in at /login once the server is running.");
    println!("========================================");
    println!();

    Ok(())
}

fn run_user_add(data_dir: String, username: String, password: Option<String>) -> anyhow::Result<()> {
    let store = open_store(&data_dir)?;
    store.initialize()?;

    let password = match password {
        Some(p) => p,
        None => inquire::Password::new("Password:").prompt()?,
    };

    let user = create_user(&store, &username, &password)?;
    println!("Created user '{}'", user.username);

    Ok(())
}

fn run_spec_add(data_dir: String, name: String, start: i64) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bail!("Specification name cannot be empty");
    }
    if start < 0 {
        bail!("--start cannot be negative");
    }

    let store = open_store(&data_dir)?;
    store.initialize()?;

    let spec = Specification {
        id: Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        last_certificate_number: start,
        created_at: Utc::now(),
    };

    store.create_specification(&spec)?;
    println!(
        "Created specification '{}' (next certificate number: {})",
        spec.name,
        spec.last_certificate_number + 1
    );

    Ok(())
}

fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = open_store(&data_dir)?;
    store.initialize()?;

    let users = store.list_users()?;
    let specifications = store.list_specifications()?;
    let clients = store.list_clients()?;

    if json {
        let out = serde_json::json!({
            "users": users,
            "specifications": specifications,
            "clients": clients,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Users ({}):", users.len());
    for user in &users {
        println!("  {}", user.username);
    }
    println!("Specifications ({}):", specifications.len());
    for spec in &specifications {
        println!(
            "  {} (last certificate number: {})",
            spec.name, spec.last_certificate_number
        );
    }
    println!("Clients ({}):", clients.len());
    for client in &clients {
        println!(
            "  {} <{}> certificate {}",
            client.company_name, client.email, client.certificate_number
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("certdesk=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
                username,
                password,
            } => {
                run_init(data_dir, non_interactive, username, password)?;
            }
            AdminCommands::User { command } => match command {
                UserCommands::Add {
                    data_dir,
                    username,
                    password,
                } => {
                    run_user_add(data_dir, username, password)?;
                }
            },
            AdminCommands::Spec { command } => match command {
                SpecCommands::Add {
                    data_dir,
                    name,
                    start,
                } => {
                    run_spec_add(data_dir, name, start)?;
                }
            },
            AdminCommands::Info { data_dir, json } => {
                run_info(data_dir, json)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let mut config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                mail: None,
            };
            config.load_config_file()?;

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'certdesk admin init' first to create the database and first staff user."
                );
            }

            let store = SqliteStore::new(&db_path)?;
            if store.count_users()? == 0 {
                bail!(
                    "Server not initialized. Run 'certdesk admin init' first to create the database and first staff user."
                );
            }

            let notifier = Arc::new(LogNotifier::new(config.mail.clone()));

            let state = Arc::new(AppState::new(
                Arc::new(store),
                config.export_dir(),
                notifier,
            ));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
