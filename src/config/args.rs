//! Command-line argument parsing

use clap::{Parser, Subcommand};

use super::DEFAULT_CONFIG_PATH;

/// Self-destructing secret links
#[derive(Debug, Parser)]
#[command(name = "secretlinks", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server and the usage aggregator (default)
    Serve,
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print a sample configuration, or write it to PATH
    Generate { path: Option<String> },
}

impl Cli {
    /// Subcommand to run, defaulting to `serve`
    pub fn selected(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_means_serve() {
        let cli = Cli::parse_from(["secretlinks"]);
        assert_eq!(cli.selected(), &Command::Serve);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_config_flag_before_and_after_subcommand() {
        let cli = Cli::parse_from(["secretlinks", "-c", "custom.toml", "serve"]);
        assert_eq!(cli.config, "custom.toml");

        let cli = Cli::parse_from(["secretlinks", "serve", "--config=other.toml"]);
        assert_eq!(cli.config, "other.toml");
    }

    #[test]
    fn test_config_generate_with_path() {
        let cli = Cli::parse_from(["secretlinks", "config", "generate", "out.toml"]);
        assert_eq!(
            cli.selected(),
            &Command::Config {
                action: ConfigAction::Generate {
                    path: Some("out.toml".to_string())
                }
            }
        );
    }
}
