use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod bootstrap;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "sentilytics")]
#[command(about = "Sentilytics CLI - sentiment analysis and model metrics for tabular text", long_about = None)]
struct Cli {
    /// Directory holding config, secrets, session and data (defaults to platform dirs)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Upload a CSV file as a new dataset
    Upload { path: PathBuf },
    /// List uploaded datasets
    Datasets,
    /// Show one dataset with its preview
    Show { id: String },
    /// Run sentiment analysis and model metrics on a dataset
    Analyze { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app = bootstrap::App::start(cli.home.as_deref()).await?;
    let output = commands::Output::new(cli.json);

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&app, &output, &name, &email, &password).await?,
        Commands::Login { email, password } => {
            commands::account::login(&app, &output, &email, &password).await?
        }
        Commands::Logout => commands::account::logout(&app, &output).await?,
        Commands::Whoami => commands::account::whoami(&app, &output)?,
        Commands::Upload { path } => commands::datasets::upload(&app, &output, &path).await?,
        Commands::Datasets => commands::datasets::list(&app, &output).await?,
        Commands::Show { id } => commands::datasets::show(&app, &output, &id).await?,
        Commands::Analyze { id } => commands::analyze::run(&app, &output, &id).await?,
    }

    Ok(())
}
