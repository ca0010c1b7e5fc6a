use std::fs::{create_dir_all, read_to_string, write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::unsplash::error::Error;

/// Name of the configuration file.
pub(crate) const CONFIG_NAME: &str = "config.toml";

/// Config holding the API credentials under an `[unsplash]` section.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub(crate) struct Config {
    unsplash: Credentials,
}

/// Access key / secret key pair for the Unsplash API.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub(crate) struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Config {
    /// Creates the config file with the given keys if none exists and reports
    /// whether the access key still needs to be filled in. Never overwrites an
    /// existing file.
    pub(crate) fn ensure(access_key: &str, secret_key: &str) -> Result<()> {
        Self::ensure_at(Path::new(CONFIG_NAME), access_key, secret_key)
    }

    fn ensure_at(path: &Path, access_key: &str, secret_key: &str) -> Result<()> {
        if !path.exists() {
            let config = Config {
                unsplash: Credentials {
                    access_key: access_key.to_string(),
                    secret_key: secret_key.to_string(),
                },
            };
            write(path, toml::to_string_pretty(&config)?)
                .with_context(|| format!("Failed to create config file: {}", path.display()))?;
            info!(
                "A new file with name `{}` created. Please fill your access_key.",
                path.display()
            );
        } else if Self::load_at(path)?.unsplash.access_key.is_empty() {
            info!("No key is provided. Please fill your key.");
        } else {
            info!("Config file setup properly.");
        }

        Ok(())
    }

    /// Returns the stored access key, failing with a descriptive error before
    /// any network call when the file or the key is missing.
    pub(crate) fn access_key() -> Result<String> {
        Self::access_key_at(Path::new(CONFIG_NAME))
    }

    fn access_key_at(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::ConfigMissing.into());
        }

        let config = Self::load_at(path)?;
        if config.unsplash.access_key.is_empty() {
            return Err(Error::AccessKeyMissing.into());
        }

        Ok(config.unsplash.access_key)
    }

    fn load_at(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Fixed on-disk layout for metadata batches and image binaries.
#[derive(Debug, Clone)]
pub(crate) struct Directories {
    metadata_dir: PathBuf,
    images_dir: PathBuf,
}

impl Directories {
    pub(crate) fn new() -> Self {
        Self::at(Path::new("data"))
    }

    pub(crate) fn at(root: &Path) -> Self {
        Directories {
            metadata_dir: root.join("json"),
            images_dir: root.join("images"),
        }
    }

    pub(crate) fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub(crate) fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Creates both directories if they are not present yet.
    pub(crate) fn ensure_created(&self) -> Result<()> {
        create_dir_all(&self.metadata_dir).with_context(|| {
            format!(
                "Failed to create metadata directory: {}",
                self.metadata_dir.display()
            )
        })?;
        create_dir_all(&self.images_dir).with_context(|| {
            format!(
                "Failed to create images directory: {}",
                self.images_dir.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_creates_file_with_given_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_NAME);

        Config::ensure_at(&path, "my-access", "my-secret").unwrap();

        let config = Config::load_at(&path).unwrap();
        assert_eq!(config.unsplash.access_key, "my-access");
        assert_eq!(config.unsplash.secret_key, "my-secret");
    }

    #[test]
    fn ensure_never_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_NAME);

        Config::ensure_at(&path, "original", "").unwrap();
        Config::ensure_at(&path, "replacement", "other").unwrap();

        let config = Config::load_at(&path).unwrap();
        assert_eq!(config.unsplash.access_key, "original");
        assert_eq!(config.unsplash.secret_key, "");
    }

    #[test]
    fn access_key_fails_without_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_NAME);

        let err = Config::access_key_at(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ConfigMissing)
        ));
    }

    #[test]
    fn access_key_fails_on_empty_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_NAME);

        Config::ensure_at(&path, "", "").unwrap();
        let err = Config::access_key_at(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::AccessKeyMissing)
        ));
    }

    #[test]
    fn access_key_returns_stored_value() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_NAME);

        Config::ensure_at(&path, "abc123", "").unwrap();
        assert_eq!(Config::access_key_at(&path).unwrap(), "abc123");
    }

    #[test]
    fn directories_layout_and_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let directories = Directories::at(tmp.path());

        assert_eq!(directories.metadata_dir(), tmp.path().join("json"));
        assert_eq!(directories.images_dir(), tmp.path().join("images"));

        directories.ensure_created().unwrap();
        assert!(directories.metadata_dir().is_dir());
        assert!(directories.images_dir().is_dir());
    }
}
