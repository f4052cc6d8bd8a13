//! dynabean command-line tool
//!
//! Loads JSON documents into beans, either against a TOML schema or with
//! an inferred class, and prints what the bean sees.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "dynabean")]
#[command(about = "Load and inspect JSON documents as dynamic beans", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a document and print the bean
    Inspect {
        /// JSON document
        file: PathBuf,
        #[command(flatten)]
        schema: commands::SchemaArgs,
        /// Print as JSON instead of the property listing
        #[arg(long)]
        json: bool,
    },

    /// Print one property of a document
    Get {
        /// JSON document
        file: PathBuf,
        /// Property name
        property: String,
        /// Element index for array and list properties
        #[arg(long, conflicts_with = "key")]
        index: Option<usize>,
        /// Entry key for map properties
        #[arg(long)]
        key: Option<String>,
        #[command(flatten)]
        schema: commands::SchemaArgs,
    },

    /// Print a TOML schema inferred from a document
    Infer {
        /// JSON document
        file: PathBuf,
        /// Name of the root class
        #[arg(long, default_value = dynabean::json::ROOT_CLASS_NAME)]
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;

    let output = match cli.command {
        Commands::Inspect { file, schema, json } => {
            commands::inspect::execute(&file, &schema, json)?
        }
        Commands::Get {
            file,
            property,
            index,
            key,
            schema,
        } => {
            let selector = match (index, key) {
                (Some(index), _) => commands::get::Selector::Index(index),
                (None, Some(key)) => commands::get::Selector::Key(key),
                (None, None) => commands::get::Selector::Whole,
            };
            commands::get::execute(&file, &property, selector, &schema)?
        }
        Commands::Infer { file, name } => commands::infer::execute(&file, &name)?,
    };

    println!("{}", output);
    Ok(())
}
