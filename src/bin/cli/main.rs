mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vocab_swipe_lib::SelectionPolicy;

#[derive(Parser)]
#[command(name = "vocab-swipe", about = "Vocabulary flashcards CLI and API server", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Word selection policy: random, sequential or skipped-last
    #[arg(long, global = true)]
    policy: Option<SelectionPolicy>,

    /// Use a remote API server instead of local files
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Listen address (default from config, 127.0.0.1:3000)
        #[arg(long)]
        addr: Option<String>,
    },

    /// List all sources
    Sources,

    /// Show the words of a source
    Show {
        /// Source name (case-insensitive prefix match)
        name: String,
    },

    /// Create or overwrite a source from a JSON or .data file
    Import {
        /// Name for the new source
        name: String,
        /// File holding a JSON array of words (use "-" to read from stdin)
        file: PathBuf,
        /// Where the words came from
        #[arg(long)]
        link: Option<String>,
    },

    /// Add one word to a source
    AddWord {
        /// Source name
        name: String,
        /// The word
        term: String,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        translation: Option<String>,
        /// Part of speech
        #[arg(long)]
        pos: Option<String>,
        /// Comma-separated synonyms
        #[arg(long)]
        synonyms: Option<String>,
    },

    /// Remove one word from a source
    RemoveWord {
        /// Source name
        name: String,
        /// The word
        term: String,
    },

    /// Delete a source and its progress
    Delete {
        /// Source name (exact)
        name: String,
    },

    /// Show learning progress for a source
    Progress {
        /// Source name (case-insensitive prefix match)
        name: String,
    },

    /// Forget all progress for a source
    Reset {
        /// Source name (case-insensitive prefix match)
        name: String,
    },

    /// Study a source interactively
    Study {
        /// Source name (case-insensitive prefix match)
        name: String,
    },
}

/// Global options that shape how the app is opened
pub struct Options {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub policy: Option<SelectionPolicy>,
    pub remote: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let options = Options {
        config: cli.config,
        data_dir: cli.data_dir,
        policy: cli.policy,
        remote: cli.remote,
    };
    let app = app::App::new(&options)?;

    match cli.command {
        Command::Serve { addr } => {
            commands::serve::run(&app, addr.as_deref())?;
        }
        Command::Sources => {
            commands::sources::run_list(&app, &cli.format)?;
        }
        Command::Show { name } => {
            commands::sources::run_show(&app, &name, &cli.format, use_color)?;
        }
        Command::Import { name, file, link } => {
            commands::sources::run_import(&app, &name, &file, link, &cli.format)?;
        }
        Command::AddWord { name, term, meaning, translation, pos, synonyms } => {
            let mut entry = vocab_swipe_lib::WordEntry::new(term);
            entry.meaning = meaning;
            entry.translation = translation;
            entry.part_of_speech = pos;
            entry.synonyms = synonyms
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            commands::sources::run_add_word(&app, &name, entry, &cli.format)?;
        }
        Command::RemoveWord { name, term } => {
            commands::sources::run_remove_word(&app, &name, &term, &cli.format)?;
        }
        Command::Delete { name } => {
            commands::sources::run_delete(&app, &name, &cli.format)?;
        }
        Command::Progress { name } => {
            commands::progress::run_show(&app, &name, &cli.format)?;
        }
        Command::Reset { name } => {
            commands::progress::run_reset(&app, &name, &cli.format)?;
        }
        Command::Study { name } => {
            commands::study::run(&app, &name, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
