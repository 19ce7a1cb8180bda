use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bili2vrc")]
#[command(about = "Resolve bilibili video pages to playable media URLs", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $BILI2VRC_CONFIG or config/bili2vrc.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep all state in memory instead of the fjall store
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a video page URL and copy the media URL to the clipboard
    Parse(ParseArgs),
    /// Inspect and manage parsing history
    #[command(subcommand)]
    History(HistoryCommand),
    /// Show or change options
    #[command(subcommand)]
    Options(OptionsCommand),
    /// Run startup housekeeping (reset parsing status, purge history, version check)
    Startup,
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    /// bilibili video page URL
    pub url: String,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List history, most recently used first
    List {
        /// Group entries by Today / Yesterday / Last 7 days / ...
        #[arg(long)]
        grouped: bool,
    },
    /// Delete one history entry
    Delete { id: i64 },
    /// Parse the page behind a history entry again
    Reparse { id: i64 },
    /// Drop entries older than the retention period
    Purge,
}

#[derive(Subcommand, Debug)]
pub enum OptionsCommand {
    Show,
    /// Set history retention in hours (0 or less disables history)
    SetRetention {
        #[arg(allow_negative_numbers = true)]
        hours: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        let cli = Cli::try_parse_from([
            "bili2vrc",
            "--ephemeral",
            "parse",
            "https://www.bilibili.com/video/BV1xx411c7mD",
        ])
        .unwrap();
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Commands::Parse(ParseArgs { ref url }) if url.contains("BV1xx411c7mD")));
    }

    #[test]
    fn test_history_commands() {
        let cli = Cli::try_parse_from(["bili2vrc", "history", "list", "--grouped"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History(HistoryCommand::List { grouped: true })
        ));

        let cli = Cli::try_parse_from(["bili2vrc", "history", "reparse", "1700000000000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History(HistoryCommand::Reparse { id: 1_700_000_000_000 })
        ));
    }

    #[test]
    fn test_negative_retention() {
        let cli = Cli::try_parse_from(["bili2vrc", "options", "set-retention", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Options(OptionsCommand::SetRetention { hours }) if hours == -1.0
        ));

        let cli = Cli::try_parse_from(["bili2vrc", "options", "set-retention", "1.5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Options(OptionsCommand::SetRetention { hours }) if hours == 1.5
        ));
    }
}
