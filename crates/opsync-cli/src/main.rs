//! opsync CLI entry point.

mod report;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rhizome_opsync_core::{SyncConfig, WriteMode, pipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opsync")]
#[command(about = "Keep opcode enumerations, generated code, and debug tables in sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Project root that relative paths are resolved against
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/opsync.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Header declaring the opcode enumeration
    #[arg(long)]
    enum_source: Option<PathBuf>,

    /// Generated implementation file to rewrite
    #[arg(long)]
    generated: Option<PathBuf>,

    /// File holding the debug name table
    #[arg(long)]
    debug_table: Option<PathBuf>,
}

impl PathArgs {
    fn load(&self) -> Result<SyncConfig, Box<dyn Error>> {
        let mut config = SyncConfig::discover(&self.root, self.config.as_deref())?;
        if let Some(path) = &self.enum_source {
            config.enum_source = path.clone();
        }
        if let Some(path) = &self.generated {
            config.generated = path.clone();
        }
        if let Some(path) = &self.debug_table {
            config.debug_table = path.clone();
        }
        Ok(config.resolve(&self.root))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite placeholders and regenerate the debug table
    Sync {
        #[command(flatten)]
        paths: PathArgs,

        /// Report what would change without writing; fail if anything would
        #[arg(long)]
        check: bool,
    },

    /// Print the index to name table
    Table {
        #[command(flatten)]
        paths: PathArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve an opcode name to its index, or an index to its name
    Lookup {
        #[command(flatten)]
        paths: PathArgs,

        /// Opcode name or index
        key: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rhizome_opsync_core=info")),
        )
        .init();

    let cli = Cli::parse();

    match execute(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", report::error_chain(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<ExitCode, Box<dyn Error>> {
    match command {
        Commands::Sync { paths, check } => {
            let config = paths.load()?;
            let mode = if check { WriteMode::Check } else { WriteMode::Write };
            let run = pipeline::run(&config, mode)?;

            print!("{}", report::render(&run, mode));

            let failed = !run.is_success() || (check && run.has_drift());
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Commands::Table { paths, json } => {
            let table = pipeline::load_table(&paths.load()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for entry in table.iter() {
                    println!("{:>4}  {}", entry.index, entry.name);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Lookup { paths, key } => {
            let table = pipeline::load_table(&paths.load()?)?;
            match report::lookup(&table, &key) {
                Some(line) => {
                    println!("{}", line);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("unknown opcode: {}", key);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
