mod commands;

use clap::{Parser, Subcommand};
use objlock_core::service::LockService;

#[derive(Parser)]
#[command(
    name = "objlock",
    about = "Objlock — inspect and maintain a lease-based object lock table",
    version
)]
struct Cli {
    /// Path to the SQLite lock database
    #[arg(long, default_value = "objlock.db", env = "OBJLOCK_DB", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all active locks
    List,

    /// List expired lock rows awaiting reclamation
    Expired,

    /// Physically remove expired lock rows
    Sweep,

    /// Show the lock on an object, optionally checking a specific owner
    Check {
        /// Object id to inspect
        id: String,

        /// Session to match against the lock owner
        #[arg(long, requires = "locker")]
        session: Option<String>,

        /// User to match against the lock owner
        #[arg(long, requires = "session")]
        locker: Option<String>,
    },

    /// Print the stored object version of an active lock
    VersionOf {
        /// Object id to inspect
        id: String,
    },

    /// Release a lock held by the given owner
    Release {
        /// Object id to release
        id: String,

        #[arg(long)]
        session: String,

        #[arg(long)]
        locker: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let service = match LockService::with_sqlite(&cli.db) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Failed to open lock database '{}': {}", cli.db, e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::List => commands::list(&service),
        Commands::Expired => commands::expired(&service),
        Commands::Sweep => commands::sweep(&service),
        Commands::Check {
            id,
            session,
            locker,
        } => commands::check(&service, &id, session.as_deref(), locker.as_deref()),
        Commands::VersionOf { id } => commands::version_of(&service, &id),
        Commands::Release {
            id,
            session,
            locker,
        } => commands::release(&service, &id, &session, &locker),
    }
}
