use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use semver_release::config;
use semver_release::git::Git2Repository;
use semver_release::release::{self, ReleaseObserver, ReleaseOptions, ReleaseOutcome};
use semver_release::ui;
use semver_release::version::ReleaseType;

#[derive(Parser)]
#[command(
    name = "semver-release",
    about = "Determine and advance a repository's semantic version from its tag history"
)]
struct Cli {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest semantic-version tag (0.0.0 if none)
    Latest {
        #[arg(default_value = ".")]
        repo_path: PathBuf,

        #[arg(
            short = 'n',
            long,
            env = "SKIP_NEWLINE",
            help = "Do not print a trailing newline"
        )]
        skip_newline: bool,
    },

    /// Print whether HEAD has changes the latest release tag lacks
    ReleaseNeeded {
        #[arg(default_value = ".")]
        repo_path: PathBuf,
    },

    /// Create the next release tag, committing pending changes first
    Release {
        #[arg(default_value = ".")]
        repo_path: PathBuf,

        #[arg(
            long = "type",
            value_enum,
            env = "RELEASE_TYPE",
            default_value = "patch",
            help = "Which version component to advance"
        )]
        release_type: ReleaseType,

        #[arg(long, help = "Push tags to the configured remote after tagging")]
        push: bool,
    },
}

/// Observer that renders progress through the ui helpers.
struct ConsoleObserver;

impl ReleaseObserver for ConsoleObserver {
    fn tag_skipped(&self, tag: &str, error: &semver::Error) {
        ui::display_skip_notice(tag, &error.to_string());
    }

    fn progress(&self, message: &str) {
        ui::display_status(message);
    }
}

fn main() {
    if let Err(err) = run() {
        ui::display_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Latest {
            repo_path,
            skip_newline,
        } => {
            let repo = Git2Repository::open(&repo_path)?;
            let latest = release::latest_version(&repo, &ConsoleObserver)?;

            if skip_newline {
                print!("{}", latest);
                std::io::stdout().flush()?;
            } else {
                println!("{}", latest);
            }
        }

        Commands::ReleaseNeeded { repo_path } => {
            let repo = Git2Repository::open(&repo_path)?;
            let needed = release::check_release_needed(&repo, &ConsoleObserver)?;
            println!("{}", needed);
        }

        Commands::Release {
            repo_path,
            release_type,
            push,
        } => {
            let repo = Git2Repository::open(&repo_path)?;
            let options = ReleaseOptions { release_type, push };

            let outcome = release::run_release(&repo, &config, &options, &ConsoleObserver)?;
            if let ReleaseOutcome::Tagged { tag, .. } = outcome {
                ui::display_success(&format!("Released {}", tag));
            }
        }
    }

    Ok(())
}
