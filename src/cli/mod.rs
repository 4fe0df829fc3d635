//! CLI module for shelfmove.
//!
//! Subcommands:
//! - `init`: Create the new store's tables
//! - `migrate`: Run the one-shot migration

mod init;
mod migrate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// shelfmove - legacy library migration
#[derive(Parser)]
#[command(name = "shelfmove")]
#[command(about = "Migrate a legacy content library into the new record store")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the new store's tables
    Init,

    /// Migrate the legacy store into the new store, then drop it
    Migrate {
        /// Preferred directory for the migration log (overrides `output.dir`)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the final summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init => self.run_init().await,
            Command::Migrate {
                ref output_dir,
                json,
            } => self.run_migrate(output_dir.clone(), json).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migrate_arguments() {
        let app = App::try_parse_from([
            "shelfmove",
            "-v",
            "migrate",
            "--output-dir",
            "/tmp/logs",
            "--json",
        ])
        .unwrap();

        assert!(app.verbose);
        match app.command {
            Command::Migrate { output_dir, json } => {
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/logs")));
                assert!(json);
            }
            Command::Init => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_parse_init() {
        let app = App::try_parse_from(["shelfmove", "init"]).unwrap();
        assert!(!app.verbose);
        assert!(matches!(app.command, Command::Init));
    }
}
