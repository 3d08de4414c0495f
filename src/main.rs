use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use contactbook::config::ConfigError;
use contactbook::net::types::{ChangePasswordData, ContactInput, LoginCredentials, RegisterData};
use contactbook::routes::{self, Route, RouteDecision};
use contactbook::{ClientConfig, ClientError, ContactService, ErrorCode, FileStorage, SessionManager, validation};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("not logged in; run `contactbook login` first")]
    NotLoggedIn,
    #[error("already logged in as {0}; run `contactbook logout` first")]
    AlreadyLoggedIn(String),
    #[error("{0} is not available right now")]
    Unavailable(&'static str),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "contactbook", about = "Contact book client")]
struct Cli {
    /// Backend base URL; overrides `CONTACTBOOK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email_or_phone: String,
        #[arg(long, env = "CONTACTBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    Whoami,
    ChangePassword {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Contacts(ContactsCommand),
}

#[derive(Args, Debug)]
struct ContactsCommand {
    #[command(subcommand)]
    command: ContactsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContactsSubcommand {
    List,
    Search {
        query: String,
    },
    Create(ContactFields),
    Update {
        contact_id: i64,
        #[command(flatten)]
        fields: ContactFields,
    },
    Delete {
        contact_id: i64,
    },
}

#[derive(Args, Debug)]
struct ContactFields {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone_number: Option<String>,
}

impl ContactFields {
    fn to_input(&self) -> ContactInput {
        ContactInput::new(
            &self.first_name,
            self.last_name.as_deref(),
            &self.email,
            self.phone_number.as_deref(),
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Client(e)) => {
            eprintln!("error [{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }

    let storage = Arc::new(FileStorage::new(&config.state_dir));
    let session = SessionManager::from_config(&config, storage)?;
    session.bootstrap();

    match cli.command {
        Command::Login { email_or_phone, password } => {
            enter(&session, Route::Login)?;
            let user = session
                .login(&LoginCredentials { email_or_phone, password })
                .await?;
            print_json(&json!({ "loggedIn": true, "user": user }))
        }
        Command::Register { name, email, phone_number, password, confirm_password } => {
            enter(&session, Route::Register)?;
            validation::validate_new_account_password(&password, &confirm_password)?;
            let user = session
                .register(&RegisterData { name, email, phone_number, password })
                .await?;
            print_json(&json!({ "loggedIn": true, "user": user }))
        }
        Command::Logout => {
            session.logout();
            print_json(&json!({ "loggedIn": false }))
        }
        Command::Whoami => {
            let state = session.state();
            print_json(&json!({ "loggedIn": state.is_authenticated(), "user": state.user() }))
        }
        Command::ChangePassword { current_password, new_password, confirm_password } => {
            enter(&session, Route::ChangePassword)?;
            validation::validate_password_change(&new_password, &confirm_password)?;
            session
                .change_password(&ChangePasswordData { current_password, new_password })
                .await?;
            print_json(&json!({ "passwordChanged": true }))
        }
        Command::Contacts(contacts) => {
            enter(&session, Route::Contacts)?;
            run_contacts(&ContactService::new(session.api()), contacts).await
        }
    }
}

async fn run_contacts(service: &ContactService, contacts: ContactsCommand) -> Result<(), CliError> {
    match contacts.command {
        ContactsSubcommand::List => print_json(&serde_json::to_value(service.list().await?)?),
        ContactsSubcommand::Search { query } => print_json(&serde_json::to_value(service.search(&query).await?)?),
        ContactsSubcommand::Create(fields) => {
            let input = fields.to_input();
            validation::validate_contact(&input)?;
            print_json(&serde_json::to_value(service.create(&input).await?)?)
        }
        ContactsSubcommand::Update { contact_id, fields } => {
            let input = fields.to_input();
            validation::validate_contact(&input)?;
            print_json(&serde_json::to_value(service.update(contact_id, &input).await?)?)
        }
        ContactsSubcommand::Delete { contact_id } => {
            service.delete(contact_id).await?;
            print_json(&json!({ "deleted": contact_id }))
        }
    }
}

/// Apply the route guard for the view a command stands in for.
fn enter(session: &SessionManager, route: Route) -> Result<(), CliError> {
    let state = session.state();
    match routes::guard(&state, route) {
        RouteDecision::Allow => Ok(()),
        RouteDecision::Redirect(Route::Login) => Err(CliError::NotLoggedIn),
        RouteDecision::Redirect(_) => Err(CliError::AlreadyLoggedIn(
            state.user().map(|u| u.email.clone()).unwrap_or_default(),
        )),
        RouteDecision::Wait | RouteDecision::NotFound => Err(CliError::Unavailable(route.path())),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
