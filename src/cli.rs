//! Command-line interface definitions.
//!
//! Paths can be given as flags or environment variables and override the
//! values from the YAML config file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Track free LEGO events and export them to your calendar.
///
/// # Examples
///
/// ```sh
/// # Scrape once and announce anything new
/// free_lego_events scrape
///
/// # Export one event and the whole catalog
/// free_lego_events export auto_3 -o lego_event_auto_3.ics
/// free_lego_events export-all -o all_lego_events.ics
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "FREE_LEGO_EVENTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Event catalog JSON file
    #[arg(long, env = "EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Subscriber JSON file
    #[arg(long, env = "USERS_FILE")]
    pub users_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape the source once, store new events and announce them
    Scrape,
    /// List known events ordered by date
    List {
        /// Maximum number of events to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Export one event as an .ics file
    Export {
        /// Catalog id, e.g. auto_3
        id: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export every dated event as one .ics file
    ExportAll {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Subscribe a recipient to announcements for some locations
    Subscribe {
        /// Recipient identifier
        recipient: String,
        /// Location tags such as `london`, or `all`
        #[arg(required = true)]
        locations: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_scrape_with_paths() {
        let cli = Cli::parse_from([
            "free_lego_events",
            "--events-file",
            "/tmp/events.json",
            "--users-file",
            "/tmp/users.json",
            "scrape",
        ]);

        assert_eq!(cli.events_file, Some(PathBuf::from("/tmp/events.json")));
        assert_eq!(cli.users_file, Some(PathBuf::from("/tmp/users.json")));
        assert_eq!(cli.command, Command::Scrape);
    }

    #[test]
    fn test_cli_export_short_flags() {
        let cli = Cli::parse_from(["free_lego_events", "-c", "cfg.yaml", "export", "auto_3", "-o", "out.ics"]);

        assert_eq!(cli.config, Some(PathBuf::from("cfg.yaml")));
        assert_eq!(
            cli.command,
            Command::Export {
                id: "auto_3".to_string(),
                output: Some(PathBuf::from("out.ics")),
            }
        );
    }

    #[test]
    fn test_cli_list_default_limit() {
        let cli = Cli::parse_from(["free_lego_events", "list"]);
        assert_eq!(cli.command, Command::List { limit: 10 });
    }

    #[test]
    fn test_cli_subscribe_requires_locations() {
        assert!(Cli::try_parse_from(["free_lego_events", "subscribe", "42"]).is_err());
        let cli = Cli::parse_from(["free_lego_events", "subscribe", "42", "london", "leeds"]);
        assert_eq!(
            cli.command,
            Command::Subscribe {
                recipient: "42".to_string(),
                locations: vec!["london".to_string(), "leeds".to_string()],
            }
        );
    }
}
