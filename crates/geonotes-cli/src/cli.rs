// ABOUTME: Command-line arguments for the geonotes binary
// ABOUTME: Global connection flags plus one subcommand per note operation

use clap::{Args, Parser, Subcommand};
use geonotes_client::{
    ClientConfig, Location, NoteDraft, Result, API_URL_ENV, TIMEOUT_ENV,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "geonotes", version, about = "Manage geotagged notes on a geonotes server")]
pub struct Cli {
    /// Base address of the notes API (e.g., http://localhost:3000)
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Per-request deadline in milliseconds
    #[arg(long, global = true, env = TIMEOUT_ENV)]
    pub timeout_ms: Option<u64>,

    /// Config file (defaults to ~/.config/geonotes/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List notes, most recent first
    List,
    /// Show one note in full
    Show { id: String },
    /// Create a note
    Add(AddArgs),
    /// Change fields of an existing note
    Edit(EditArgs),
    /// Delete a note
    Delete { id: String },
    /// Print the collection whenever it changes
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Photo URI to attach
    #[arg(long)]
    pub photo: Option<String>,

    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, conflicts_with = "clear_photo")]
    pub photo: Option<String>,

    /// Remove the attached photo
    #[arg(long)]
    pub clear_photo: bool,

    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Remove the attached location
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub clear_location: bool,
}

impl Cli {
    /// Layer file and environment settings under the command-line flags.
    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::load(self.config.as_deref())?
            .apply_overrides(self.api_url.clone(), self.timeout_ms.map(|t| t.to_string()))
    }
}

impl AddArgs {
    pub fn to_draft(&self) -> NoteDraft {
        let mut draft = NoteDraft::new(self.title.clone());
        if let Some(description) = &self.description {
            draft = draft.with_description(description.clone());
        }
        if let Some(photo) = &self.photo {
            draft = draft.with_photo(photo.clone());
        }
        if let Some(location) = location(self.lat, self.lng) {
            draft = draft.with_location(location);
        }
        draft
    }
}

impl EditArgs {
    /// Overlay the flags onto a draft seeded from the stored note.
    pub fn apply(&self, mut draft: NoteDraft) -> NoteDraft {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if self.clear_photo {
            draft.photo_uri = None;
        } else if let Some(photo) = &self.photo {
            draft.photo_uri = Some(photo.clone());
        }
        if self.clear_location {
            draft.location = None;
        } else if let Some(location) = location(self.lat, self.lng) {
            draft.location = Some(location);
        }
        draft
    }
}

fn location(lat: Option<f64>, lng: Option<f64>) -> Option<Location> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Location::new(lat, lng)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["geonotes"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_add_builds_draft() {
        let cli = parse(&[
            "add", "--title", "Trip", "--description", "day one", "--lat", "-33.9", "--lng", "18.4",
        ]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };

        let draft = args.to_draft();
        assert_eq!(draft.title, "Trip");
        assert_eq!(draft.description, "day one");
        assert_eq!(draft.photo_uri, None);
        assert_eq!(draft.location, Some(Location::new(-33.9, 18.4)));
    }

    #[test]
    fn test_lat_requires_lng() {
        let result = Cli::try_parse_from(["geonotes", "add", "--title", "X", "--lat", "1.0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_overlays_only_given_flags() {
        let cli = parse(&["edit", "7", "--clear-photo", "--description", "new"]);
        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        let seeded = NoteDraft::new("Keep")
            .with_photo("file:///a.jpg")
            .with_location(Location::new(1.0, 2.0));

        let draft = args.apply(seeded);
        assert_eq!(args.id, "7");
        assert_eq!(draft.title, "Keep");
        assert_eq!(draft.description, "new");
        assert_eq!(draft.photo_uri, None);
        assert_eq!(draft.location, Some(Location::new(1.0, 2.0)));
    }

    #[test]
    fn test_clear_location_conflicts_with_coordinates() {
        let result = Cli::try_parse_from([
            "geonotes", "edit", "7", "--clear-location", "--lat", "1", "--lng", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["list", "--api-url", "http://example.test:8080", "--timeout-ms", "250"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test:8080"));
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"http://from-file:1\"\ntimeout_ms = 900\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let cli = parse(&[
            "--config", &path_arg, "--api-url", "http://from-flag:2", "--timeout-ms", "1200", "list",
        ]);
        let config = cli.client_config().unwrap();
        assert_eq!(config.api_url, "http://from-flag:2");
        assert_eq!(config.timeout_ms, 1200);
    }

    #[test]
    fn test_watch_interval_must_be_positive() {
        let result = Cli::try_parse_from(["geonotes", "watch", "--interval-secs", "0"]);
        assert!(result.is_err());
    }
}
