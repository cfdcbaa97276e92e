//! CLI module for callfacts
//!
//! Provides command-line interface parsing and handling for the callfacts-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// callfacts - decisions from meeting call logs
///
/// Answers a question from a series of call-log transcripts using an LLM,
/// with later calls overriding earlier ones.
#[derive(Parser, Debug)]
#[command(
    name = "callfacts-server",
    version,
    about = "callfacts - decisions from meeting call logs",
    long_about = "Answers a question from a series of call-log transcripts using an LLM.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  callfacts-server init                  # Scaffold callfacts.toml\n    \
                  callfacts-server                       # Start the server (requires callfacts.toml)\n    \
                  callfacts-server --config my.toml      # Use a custom config file\n    \
                  callfacts-server ask -q \"What was decided?\" https://host/call_log_20240101.txt"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "callfacts.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new callfacts project
    ///
    /// Creates callfacts.toml and .env.example in the target directory.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure (openai or ollama)
        #[arg(long, default_value = "openai")]
        provider: String,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,
    },

    /// Answer a question once, without starting the server
    Ask {
        /// The question to answer from the call logs
        #[arg(short, long)]
        question: String,

        /// Call-log URLs, in any order
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_starts_server() {
        let cli = Cli::try_parse_from(["callfacts-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("callfacts.toml"));
        assert!(!cli.verbose);
        assert!(!cli.no_color);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["callfacts-server", "config", "--config", "other.toml", "-v"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Config { full: false })));
    }

    #[test]
    fn test_init_defaults() {
        let cli = Cli::try_parse_from(["callfacts-server", "init"]).unwrap();
        match cli.command {
            Some(Commands::Init {
                path,
                force,
                provider,
                host,
                port,
            }) => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!force);
                assert_eq!(provider, "openai");
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            other => panic!("Expected init, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_collects_urls() {
        let cli = Cli::try_parse_from([
            "callfacts-server",
            "ask",
            "--question",
            "What was decided?",
            "http://a/log_20240102.txt",
            "http://a/log_20240101.txt",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ask { question, urls }) => {
                assert_eq!(question, "What was decided?");
                assert_eq!(urls.len(), 2);
            }
            other => panic!("Expected ask, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_urls() {
        assert!(Cli::try_parse_from(["callfacts-server", "ask", "-q", "Anything?"]).is_err());
    }
}
