use clap::{Parser, Subcommand};
use fitlog_core::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Exercise log tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    NewUser {
        /// Unique username
        username: String,
    },

    /// List all users with their logs
    Users,

    /// Append an exercise to a user's log
    Add {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        description: String,

        /// Duration in minutes
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Date of the exercise (defaults to now), e.g. 2023-01-05
        #[arg(long)]
        date: Option<String>,
    },

    /// Show a user's log
    Log {
        #[arg(long)]
        user_id: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Export a user's log as CSV
    Export {
        #[arg(long)]
        user_id: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Date range and limit, passed through unparsed
#[derive(clap::Args)]
struct FilterArgs {
    /// Earliest date to include
    #[arg(long)]
    from: Option<String>,

    /// Latest date to include
    #[arg(long)]
    to: Option<String>,

    /// Maximum number of entries
    #[arg(long, allow_hyphen_values = true)]
    limit: Option<String>,
}

impl From<FilterArgs> for LogQuery {
    fn from(args: FilterArgs) -> Self {
        LogQuery {
            from: args.from,
            to: args.to,
            limit: args.limit,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init();
            return report(&e);
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init_with_level(level);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Print the error as JSON and map it to an exit code
fn report(error: &Error) -> ExitCode {
    if error.is_caller_error() {
        tracing::warn!("{}", error);
    } else {
        tracing::error!("{}", error);
    }

    let body = ErrorBody {
        error: error.to_string(),
    };
    if let Err(e) = print_json(&body) {
        eprintln!("{}", e);
    }

    ExitCode::from(error.exit_code() as u8)
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = JsonFileStore::open(&data_dir, config.store.lock_timeout())?;

    let result = match cli.command {
        Commands::NewUser { username } => cmd_new_user(&store, &username),
        Commands::Users => cmd_users(&store),
        Commands::Add {
            user_id,
            description,
            duration,
            date,
        } => cmd_add(&store, &user_id, &description, &duration, date.as_deref()),
        Commands::Log { user_id, filter } => cmd_log(&store, &user_id, &filter.into()),
        Commands::Export {
            user_id,
            filter,
            output,
        } => cmd_export(&store, &user_id, &filter.into(), output),
    };

    store.close();
    result
}

fn cmd_new_user(store: &JsonFileStore, username: &str) -> Result<()> {
    let user = UserRegistry::new(store).create_user(username)?;
    print_json(&user)
}

fn cmd_users(store: &JsonFileStore) -> Result<()> {
    let users = UserRegistry::new(store).list_users()?;
    print_json(&users)
}

fn cmd_add(
    store: &JsonFileStore,
    user_id: &str,
    description: &str,
    duration: &str,
    date: Option<&str>,
) -> Result<()> {
    let result = ExerciseLog::new(store).append_entry(user_id, description, duration, date)?;
    print_json(&result)
}

fn cmd_log(store: &JsonFileStore, user_id: &str, query: &LogQuery) -> Result<()> {
    let result = LogQueryEngine::new(store).query_log(user_id, query)?;
    print_json(&result)
}

fn cmd_export(
    store: &JsonFileStore,
    user_id: &str,
    query: &LogQuery,
    output: Option<PathBuf>,
) -> Result<()> {
    match output {
        Some(path) => {
            let count = export_log_csv_to_path(store, user_id, query, &path)?;
            println!("✓ Exported {} entries to {}", count, path.display());
        }
        None => {
            let stdout = std::io::stdout();
            export_log_csv(store, user_id, query, stdout.lock())?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
