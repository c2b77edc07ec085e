use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use vocab_swipe_lib::progress::JsonFileStore;
use vocab_swipe_lib::selector::RngIndexSource;
use vocab_swipe_lib::{
    AppConfig, FileSourceStore, HttpSourceStore, ProgressTracker, Source, SourceStore,
    StudySession, WordSelector,
};

use crate::Options;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub store: Arc<dyn SourceStore>,
    progress_dir: PathBuf,
}

impl App {
    /// Load the config and open the configured source store
    pub fn new(options: &Options) -> Result<Self> {
        let config_path = options.config.clone().or_else(AppConfig::default_path);
        let mut config = match &config_path {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(dir) = &options.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(policy) = options.policy {
            config.policy = policy;
        }
        if let Some(url) = &options.remote {
            config.remote_url = Some(url.clone());
        }

        let store: Arc<dyn SourceStore> = match &config.remote_url {
            Some(url) => {
                log::info!("Using remote sources at {}", url);
                Arc::new(HttpSourceStore::new(url).context("Failed to open remote store")?)
            }
            None => {
                let sources_dir = config.sources_dir().context("Failed to get data directory")?;
                let store = FileSourceStore::new(sources_dir);
                store.init().context("Failed to initialize source storage")?;
                Arc::new(store)
            }
        };

        let progress_dir = config.progress_dir().context("Failed to get data directory")?;

        Ok(Self {
            config,
            store,
            progress_dir,
        })
    }

    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::new(Box::new(JsonFileStore::new(self.progress_dir.clone())))
    }

    /// A fresh study session over the configured store and progress
    pub fn session(&self) -> StudySession {
        let selector = WordSelector::new(
            self.config.policy,
            Box::new(RngIndexSource::from_entropy()),
        );
        StudySession::new(Arc::clone(&self.store), self.tracker(), selector)
    }

    /// Find a source by name (case-insensitive prefix match)
    pub fn find_source(&self, name: &str) -> Result<Source> {
        let sources = self.store.list_sources()
            .context("Failed to list sources")?;

        if let Some(source) = sources.iter().find(|s| s.name == name) {
            return Ok(source.clone());
        }

        let name_lower = name.to_lowercase();

        if let Some(source) = sources.iter().find(|s| s.name.to_lowercase() == name_lower) {
            return Ok(source.clone());
        }

        let matches: Vec<&Source> = sources.iter()
            .filter(|s| s.name.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!("No source matching '{}'. Available sources:\n{}", name,
                sources.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n")),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous source name '{}'. Matches:\n{}", name,
                matches.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n")),
        }
    }
}
