use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shiptornado::config::{ClientConfig, ConfigError};
use shiptornado::net::types::{LoginRequest, RegisterRequest};
use shiptornado::net::{ApiError, Gateway, api};
use shiptornado::router::{self, Access, Route};
use shiptornado::session::SessionStore;
use shiptornado::shipping::{BackendRates, MockRates, RateProvider, ShipmentRequest, ValidationError};
use shiptornado::storage::{FileTokenStorage, TokenStorage};
use shiptornado::views;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not read {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("invalid shipment request JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("could not read password: {0}")]
    Prompt(io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "shiptornado", about = "Ship Tornado logistics client")]
struct Cli {
    /// Backend origin; overrides SHIPTORNADO_API_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Credential file; overrides SHIPTORNADO_TOKEN_PATH.
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session credential.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "SHIPTORNADO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHIPTORNADO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        company_id: Option<String>,
        #[arg(long)]
        role_id: Option<String>,
    },
    /// Sign out and remove the persisted credential.
    Logout,
    /// Show the signed-in profile.
    Whoami,
    /// Navigate to an application path, e.g. `/admin/users`.
    Open { path: String },
    Orders {
        #[arg(long)]
        search: Option<String>,
    },
    Shipments {
        #[arg(long)]
        search: Option<String>,
    },
    /// List users (administrators only).
    Users,
    /// List assignable roles (administrators only).
    Roles,
    /// Quote carrier rates for a shipment request file.
    Rates {
        /// JSON file with `from_address`, `to_address`, and `parcel`.
        #[arg(long)]
        request: PathBuf,
        /// Use the local price table instead of the backend.
        #[arg(long, default_value_t = false)]
        mock: bool,
    },
}

struct App {
    gateway: Arc<Gateway>,
    store: SessionStore,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    if let Err(e) = env_file {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = cli.token_path {
        config = config.with_token_path(path);
    }
    let app = App::new(&config)?;

    match cli.command {
        Command::Login { email, password } => {
            let password = read_password(password)?;
            Ok(app.login(&LoginRequest { email, password }).await)
        }
        Command::Register { email, password, first_name, last_name, company_id, role_id } => {
            let password = read_password(password)?;
            let request = RegisterRequest { email, password, first_name, last_name, company_id, role_id };
            Ok(app.register(&request).await)
        }
        Command::Logout => {
            app.store.logout();
            println!("{}", views::signed_out());
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => app.show(Route::Profile, None).await,
        Command::Open { path } => app.open(&path).await,
        Command::Orders { search } => app.show(Route::Orders, search.as_deref()).await,
        Command::Shipments { search } => app.show(Route::Shipments, search.as_deref()).await,
        Command::Users => app.show(Route::AdminUsers, None).await,
        Command::Roles => app.show(Route::AdminCreateUser, None).await,
        Command::Rates { request, mock } => app.rates(request, mock).await,
    }
}

fn read_password(flag: Option<String>) -> Result<String, CliError> {
    if let Some(password) = flag {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush().map_err(CliError::Prompt)?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).map_err(CliError::Prompt)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

impl App {
    fn new(config: &ClientConfig) -> Result<Self, CliError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(&config.token_path));
        let gateway = Arc::new(Gateway::new(config, storage.clone())?);
        let store = SessionStore::new(storage, gateway.clone(), config.timeouts.verify());
        Ok(Self { gateway, store })
    }

    async fn login(&self, request: &LoginRequest) -> ExitCode {
        match self.store.login(request).await {
            Ok(session) => {
                let name = session.identity.map_or_else(|| request.email.clone(), |i| i.display_name());
                println!("Signed in as {name}.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Login failed: {e}");
                ExitCode::FAILURE
            }
        }
    }

    async fn register(&self, request: &RegisterRequest) -> ExitCode {
        match self.store.register(request).await {
            Ok(session) => {
                let name = session.identity.map_or_else(|| request.email.clone(), |i| i.display_name());
                println!("Registered and signed in as {name}.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Registration failed: {e}");
                ExitCode::FAILURE
            }
        }
    }

    /// Resolve the session and ask the guard about `route`. Prints the
    /// redirect view and returns an exit code when the route may not render.
    async fn enter(&self, route: Route) -> Option<ExitCode> {
        self.store.bootstrap().await;
        self.store.revalidate();
        match router::guard(&self.store.snapshot(), route) {
            Access::Render(_) => None,
            Access::Placeholder => {
                println!("{}", views::placeholder());
                Some(ExitCode::FAILURE)
            }
            Access::Redirect(Route::Unauthorized) => {
                eprintln!("{}", views::unauthorized());
                Some(ExitCode::FAILURE)
            }
            Access::Redirect(_) => {
                eprintln!("{}", views::login_prompt(route));
                Some(ExitCode::FAILURE)
            }
        }
    }

    async fn open(&self, path: &str) -> Result<ExitCode, CliError> {
        let route = Route::from_path(path);
        if route == Route::NotFound {
            if let Some(code) = self.enter(route).await {
                return Ok(code);
            }
            println!("{}", views::not_found(path));
            return Ok(ExitCode::FAILURE);
        }
        self.show(route, None).await
    }

    /// Render `route` if the guard allows it.
    async fn show(&self, route: Route, search: Option<&str>) -> Result<ExitCode, CliError> {
        if let Some(code) = self.enter(route).await {
            return Ok(code);
        }
        let session = self.store.snapshot();
        let (what, rendered) = match route {
            Route::Orders => ("orders", api::fetch_orders(&self.gateway).await.map(|o| views::orders(&o, search))),
            Route::Shipments => {
                ("shipments", api::fetch_shipments(&self.gateway).await.map(|s| views::shipments(&s, search)))
            }
            Route::AdminUsers => ("users", api::fetch_admin_users(&self.gateway).await.map(|u| views::users(&u))),
            Route::AdminCreateUser => ("roles", api::fetch_roles(&self.gateway).await.map(|r| views::roles(&r))),
            Route::Unauthorized => ("page", Ok(views::unauthorized())),
            Route::Landing | Route::Login | Route::Register if !session.is_authenticated() => {
                ("page", Ok(views::login_prompt(Route::Dashboard)))
            }
            _ => match &session.identity {
                Some(identity) => ("page", Ok(views::page(route, identity, session.company.as_ref()))),
                None => ("page", Ok(views::login_prompt(route))),
            },
        };

        match rendered {
            Ok(text) => {
                println!("{text}");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(self.report_load_error(what, &e)),
        }
    }

    async fn rates(&self, path: PathBuf, mock: bool) -> Result<ExitCode, CliError> {
        if let Some(code) = self.enter(Route::CreateShipment).await {
            return Ok(code);
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| CliError::ReadFile { path, source })?;
        let request: ShipmentRequest = serde_json::from_str(&raw)?;
        request.validate()?;

        let provider: Box<dyn RateProvider> =
            if mock { Box::new(MockRates::new()) } else { Box::new(BackendRates::new(self.gateway.clone())) };
        match provider.quote(&request).await {
            Ok(response) => {
                println!("{}", views::quote(&response));
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(self.report_load_error("shipment rates", &e)),
        }
    }

    fn report_load_error(&self, what: &str, err: &ApiError) -> ExitCode {
        if self.store.handle_api_error(err) {
            eprintln!("{}", views::session_ended());
        }
        eprintln!("{}", views::load_error(what, &err.to_string()));
        ExitCode::FAILURE
    }
}
