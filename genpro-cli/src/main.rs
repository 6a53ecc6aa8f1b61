//! genpro CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{GenerateCommand, KindsCommand, ScaffoldCommand};
use genpro::observability::{self, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "genpro")]
#[command(version)]
#[command(about = "Generate models, controllers, routers, migrations and views from a schema", long_about = None)]
struct Cli {
    /// Log pipeline details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every enabled kind for every model in the configuration file
    Generate {
        /// Configuration file (defaults to genpro.json or genpro.toml in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Back up and replace files that already exist
        #[arg(long)]
        overwrite: bool,
        /// Template bundle directory, overriding the configured one
        #[arg(long)]
        templates: Option<PathBuf>,
    },
    /// Generate artifacts for a single model described on the command line
    Scaffold {
        /// Model name (e.g., `post`, `BlogPost`)
        name: String,
        /// Field list (e.g., `title:string:64,body:text,publishedAt:datetime`)
        fields: String,
        /// Project root receiving the generated files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Output style
        #[arg(short, long, default_value = "default")]
        style: String,
        /// Comma-separated artifact kinds (all bound kinds when omitted)
        #[arg(short, long, default_value = "")]
        kinds: String,
        /// Template bundle directory
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Back up and replace files that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// List output styles and the artifact kinds they bind
    Kinds,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init(&LoggingConfig::default().verbose(cli.verbose))?;

    match cli.command {
        Commands::Generate {
            config,
            overwrite,
            templates,
        } => {
            GenerateCommand::new(config, overwrite, templates).execute()?;
        }
        Commands::Scaffold {
            name,
            fields,
            output,
            style,
            kinds,
            templates,
            overwrite,
        } => {
            let cmd = ScaffoldCommand {
                name,
                fields,
                output,
                style,
                kinds,
                templates,
                overwrite,
            };
            cmd.execute()?;
        }
        Commands::Kinds => KindsCommand::execute(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scaffold() {
        let cli = Cli::parse_from([
            "genpro",
            "scaffold",
            "post",
            "title:string:64,body:text",
            "--kinds",
            "model,controller",
            "-v",
        ]);
        assert!(cli.verbose);
        let Commands::Scaffold { name, kinds, style, .. } = cli.command else {
            panic!("expected scaffold");
        };
        assert_eq!(name, "post");
        assert_eq!(kinds, "model,controller");
        assert_eq!(style, "default");
    }
}
