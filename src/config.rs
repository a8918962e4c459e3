use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::difficulty::{Difficulty, GenerationPolicy, Normalization};
use crate::source::SourceConfig;

/// Learner preferences. Scores are never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub questions_per_test: usize,
    pub normalization: Normalization,
    pub seed: Option<u64>,
    pub asset_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            questions_per_test: 10,
            normalization: Normalization::Exact,
            seed: None,
            asset_dir: None,
        }
    }
}

impl Config {
    /// Source settings for one module; the question count is capped by
    /// what the policy can produce.
    pub fn source_config(&self, policy: GenerationPolicy, name: &str) -> SourceConfig {
        let policy = policy.with_normalization(self.normalization);
        let limit = self.questions_per_test.clamp(1, policy.capacity().max(1));
        let mut config = SourceConfig::new(self.difficulty)
            .named(name)
            .with_policy(policy)
            .with_limit(limit);
        config.seed = self.seed;
        config
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_file(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("ignoring unreadable config {}: {err}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
