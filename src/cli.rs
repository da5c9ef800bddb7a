use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "textflow")]
#[command(author, version, about = "Run text-processing steps chosen from a plain-language request")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process text according to a request
    Run {
        /// What to do with the text, e.g. "clean and summarize this"
        #[arg(short, long)]
        request: String,

        /// Read the input text from a file
        #[arg(
            short = 'f',
            long,
            conflicts_with = "input_text",
            required_unless_present = "input_text"
        )]
        input_file: Option<PathBuf>,

        /// Use the given input text
        #[arg(short = 't', long)]
        input_text: Option<String>,

        /// Write the final output to a file
        #[arg(short, long)]
        output_file: Option<PathBuf>,

        /// Run identical steps concurrently
        #[arg(short, long)]
        parallel: bool,

        /// Explicit comma-separated step list, bypassing selection
        #[arg(long, value_delimiter = ',')]
        plan: Option<Vec<String>>,

        /// Print the run as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered steps and where each one resolves
    Steps,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
