use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fadewrite", version, about = "Write or lose it: text fades once you stop typing")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). FADEWRITE_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive writing session
    Write(commands::write::WriteArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Saved draft
    Draft {
        #[command(subcommand)]
        action: commands::draft::DraftAction,
    },
    /// Archive of destroyed text
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Replay a typing pattern on virtual time and print the events
    Simulate(commands::simulate::SimulateArgs),
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("FADEWRITE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Write(args) => commands::write::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Draft { action } => commands::draft::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "fadewrite", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
