/// Vibesia Server - music catalog and playlist API
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibesia_core::{AuditContext, CatalogStorage};
use vibesia_server::{api, config::ServerConfig, services::AuthService, state::AppState};
use vibesia_storage::{users::NewUser, SqliteCatalog};

#[derive(Parser)]
#[command(name = "vibesia-server")]
#[command(about = "Vibesia music catalog server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "VIBESIA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address (login and token subject)
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vibesia_server=info,vibesia_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            email,
            password,
        } => add_user(config, username, email, &password).await?,
        Commands::ListUsers => list_users(config).await?,
    }

    Ok(())
}

async fn open_catalog(config: &ServerConfig) -> anyhow::Result<SqliteCatalog> {
    let pool = vibesia_storage::create_pool(
        &config.storage.database_url,
        &config.storage.pool_settings(),
    )
    .await?;
    vibesia_storage::run_migrations(&pool).await?;

    Ok(SqliteCatalog::new(pool).with_reorder(config.playlists.allow_reorder))
}

fn auth_service(config: &ServerConfig) -> AuthService {
    AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
    )
    .with_bcrypt_cost(config.auth.bcrypt_cost)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Vibesia Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let db = Arc::new(open_catalog(&config).await?);
    tracing::info!("Database connected");

    let auth_service = Arc::new(auth_service(&config));
    let admin_policy = Arc::new(config.admin.policy());

    let app_state = AppState::new(db, auth_service, admin_policy, config.playlists.clone());
    let app = api::router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(
    config: ServerConfig,
    username: String,
    email: String,
    password: &str,
) -> anyhow::Result<()> {
    let catalog = open_catalog(&config).await?;
    let password_hash = auth_service(&config).hash_password(password)?;

    let user = catalog
        .create_user(
            &AuditContext::system("cli:add-user"),
            NewUser {
                username,
                email,
                password_hash,
            },
        )
        .await?;

    tracing::info!(user_id = %user.id, "User created");
    println!("Created user {} ({}) with id {}", user.username, user.email, user.id);

    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let catalog = open_catalog(&config).await?;
    let users = catalog.list_users().await?;

    println!("Users:");
    for user in users {
        let status = if user.is_active { "active" } else { "inactive" };
        println!("  {} - {} <{}> ({})", user.id, user.username, user.email, status);
    }

    Ok(())
}
