// ABOUTME: Export settings loaded from a YAML file and overridden by CLI flags
// ABOUTME: Locates the default config file in the platform config directory

use crate::api::DEFAULT_API_BASE;
use crate::cli::Cli;
use crate::images::ImageOptions;
use crate::{Error, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub email: Option<String>,
    pub password: Option<String>,
    pub api_base: String,
    /// Hexo `source/_posts` directory
    pub output_path: PathBuf,
    pub only_blog: bool,
    pub localize_images: bool,
    pub image_path: PathBuf,
    pub image_link_path: String,
    /// Rewrite posts and re-download images even when already present
    pub force: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            email: None,
            password: None,
            api_base: DEFAULT_API_BASE.into(),
            output_path: PathBuf::from("source/_posts"),
            only_blog: true,
            localize_images: true,
            image_path: PathBuf::from("source/images"),
            image_link_path: "/images".into(),
            force: false,
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hexport").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// An explicit `--config` must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(email) = &cli.email {
            self.email = Some(email.clone());
        }
        if let Some(password) = &cli.password {
            self.password = Some(password.clone());
        }
        if let Some(api_base) = &cli.api_base {
            self.api_base = api_base.clone();
        }
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
        if let Some(image_dir) = &cli.image_dir {
            self.image_path = image_dir.clone();
        }
        if let Some(image_link) = &cli.image_link {
            self.image_link_path = image_link.clone();
        }
        if cli.all_notes {
            self.only_blog = false;
        }
        if cli.no_images {
            self.localize_images = false;
        }
        if cli.force {
            self.force = true;
        }
        self
    }

    pub fn image_options(&self) -> Option<ImageOptions> {
        self.localize_images.then(|| ImageOptions {
            image_dir: self.image_path.clone(),
            link_prefix: self.image_link_path.clone(),
            force: self.force,
        })
    }
}
