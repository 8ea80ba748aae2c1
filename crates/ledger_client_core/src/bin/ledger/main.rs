//! `ledger` - terminal front end for the accounting API.
//!
//! Renders the dashboard, chart of accounts, transaction ledger and report
//! menu as text. Credentials persist in a local SQLite file between runs.

mod render;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use ledger_client_core::{
    metrics, search, AccountQuery, AccountType, ApiClient, ClientConfig, CredentialStore, SqliteCredentialStore,
    TransactionQuery, TransactionStatus, Transport, View, ViewAction, ViewState,
};

#[derive(Parser)]
#[command(name = "ledger", version, about = "Bookkeeping dashboard for the terminal")]
struct Cli {
    /// API base URL (defaults to LEDGER_API_BASE_URL or the local dev server)
    #[arg(long)]
    base_url: Option<String>,

    /// Credential database path
    #[arg(long, env = "LEDGER_CREDENTIALS")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the token pair
    Login {
        username: String,
        #[arg(long, env = "LEDGER_PASSWORD")]
        password: String,
    },
    /// Forget stored tokens
    Logout,
    /// Totals by category, net income and recent activity
    Dashboard {
        /// Aggregate the account list locally instead of asking the server
        #[arg(long)]
        local: bool,
    },
    /// Chart of accounts
    Accounts {
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long = "type")]
        account_type: Option<AccountType>,
    },
    Account {
        id: String,
    },
    AccountsByType,
    ChartSummary,
    /// Transaction ledger
    Transactions {
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long)]
        status: Option<TransactionStatus>,
    },
    Transaction {
        id: String,
    },
    /// Post a pending transaction
    Post {
        id: String,
    },
    Cancel {
        id: String,
    },
    DeleteTransaction {
        id: String,
    },
    DeleteAccount {
        id: String,
    },
    /// Available financial reports
    Reports,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledger")
        .join("credentials.db")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_client_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.base_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    let store = SqliteCredentialStore::open(cli.store.unwrap_or_else(default_store_path))?;
    let client = ApiClient::with_reqwest(config, store)?
        .on_session_expired(|| eprintln!("Session expired. Run `ledger login` to sign in again."));

    run(&client, cli.command).await
}

async fn run<T: Transport, S: CredentialStore>(client: &ApiClient<T, S>, command: Command) -> anyhow::Result<()> {
    let state = ViewState::new();
    match command {
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Command::Dashboard { local } => {
            let state = state.apply(ViewAction::Navigate(View::Dashboard));
            let accounts = client.list_accounts(&AccountQuery::default()).await?;
            let transactions = client.list_transactions(&TransactionQuery::default()).await?;
            let dashboard = if local {
                let mut m = metrics::summarize(&accounts);
                m.recent_transactions = metrics::count_recent_posted(&transactions, Utc::now().date_naive());
                m
            } else {
                client.dashboard_metrics().await?
            };
            print!("{}", render::header(&state));
            print!(
                "{}",
                render::dashboard(
                    &dashboard,
                    &metrics::balances_by_type(&accounts),
                    &metrics::recent_transactions(&transactions, 5),
                )
            );
        }
        Command::Accounts { search: term, account_type } => {
            let state = state
                .apply(ViewAction::Navigate(View::Accounts))
                .apply(ViewAction::Search(term.unwrap_or_default()));
            let query = AccountQuery {
                account_type,
                ..Default::default()
            };
            let accounts = client.list_accounts(&query).await?;
            print!("{}", render::header(&state));
            print!("{}", render::accounts(&search::filter_accounts(&accounts, &state.search)));
        }
        Command::Account { id } => {
            let account = client.get_account(&id).await?;
            print!("{}", render::account_detail(&account));
        }
        Command::AccountsByType => {
            let grouped = client.accounts_by_type().await?;
            print!("{}", render::accounts_by_type(&grouped));
        }
        Command::ChartSummary => {
            let summary = client.chart_summary().await?;
            print!("{}", render::chart_summary(&summary));
        }
        Command::Transactions { search: term, status } => {
            let state = state
                .apply(ViewAction::Navigate(View::Transactions))
                .apply(ViewAction::Search(term.unwrap_or_default()));
            let query = TransactionQuery {
                status,
                ..Default::default()
            };
            let transactions = client.list_transactions(&query).await?;
            print!("{}", render::header(&state));
            print!(
                "{}",
                render::transactions(&search::filter_transactions(&transactions, &state.search))
            );
        }
        Command::Transaction { id } => {
            let transaction = client.get_transaction(&id).await?;
            print!("{}", render::transaction_detail(&transaction));
        }
        Command::Post { id } => {
            client.post_transaction(&id).await?;
            println!("Transaction posted successfully");
        }
        Command::Cancel { id } => {
            client.cancel_transaction(&id).await?;
            println!("Transaction cancelled successfully");
        }
        Command::DeleteTransaction { id } => {
            client.delete_transaction(&id).await?;
            println!("Transaction deleted");
        }
        Command::DeleteAccount { id } => {
            client.delete_account(&id).await?;
            println!("Account deleted");
        }
        Command::Reports => {
            let state = state.apply(ViewAction::Navigate(View::Reports));
            print!("{}", render::header(&state));
            print!("{}", render::reports());
        }
    }
    Ok(())
}
