use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".calcell"))
            .unwrap_or_else(|| PathBuf::from(".calcell"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.resolve(Path::new(&config.history.data_directory))
    }

    pub fn history_file(&self, config: &Config) -> PathBuf {
        self.data_dir(config).join(&config.history.csv_file)
    }

    /// Resolve a user-supplied history file: absolute paths are kept,
    /// relative ones land in the data directory.
    pub fn data_file(&self, config: &Config, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir(config).join(path)
        }
    }

    pub fn log_file(&self, config: &Config) -> PathBuf {
        self.resolve(Path::new(&config.logging.file))
    }

    pub fn ensure_dirs(&self, config: &Config) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::create_dir_all(self.data_dir(config))?;
        if let Some(parent) = self.log_file(config).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
