use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use servstack::{ItemSpec, StackConfig};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub services: Vec<ItemSpec>,
}

impl Config {
    /// Keeps the stack usable when a config file lists no services.
    fn with_default_services(mut self) -> Self {
        if self.services.is_empty() {
            log::warn!("No services configured, using the built-in catalogue");
            self.services = default_config().services;
        }
        self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "cavebeat", "servstack").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn parse_default() -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ))
        .build()?;
    Ok(s.try_deserialize()?)
}

pub fn default_config() -> Config {
    parse_default().unwrap_or_else(|e| {
        log::error!("Built-in config is invalid: {}", e);
        Config::default()
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("SERVSTACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize::<Config>()?.with_default_services())
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            default_config()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

/// Sends `ConfigReload` whenever the config file is written, created or removed.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(&tx).await {
        log::error!("Config watcher stopped: {}", e);
    }
}

async fn watch_config(tx: &Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let watch_dir = config_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .ok_or(ConfigError::ConfigDirNotFound)?;
    if let Err(e) = fs_err::create_dir_all(&watch_dir) {
        log::warn!("Cannot create {}: {}", watch_dir.display(), e);
    }

    let (events_tx, events_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = events_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {}", watch_dir.display());

    while let Ok(res) = events_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Watch error: {}", e);
                continue;
            }
        };
        let touches_config = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event.paths.contains(&config_path);

        if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = parse_default().unwrap();
        assert_eq!(config.stack.cycles, 3);
        assert_eq!(config.services.len(), 5);
        assert_eq!(config.services[0].label, "Web Development");
        assert_eq!(config.services[2].usps.len(), 4);
    }

    #[test]
    fn test_config_deserialization() {
        let config: Config = serde_json::from_str(
            r#"{ "stack": { "thumb_min_ratio": 0.2 }, "services": [{ "label": "SEO", "usps": "Audits | Links" }] }"#,
        )
        .unwrap();
        assert_eq!(config.stack.thumb_min_ratio, 0.2);
        assert_eq!(config.stack.usp_stagger_ms, 70);
        assert_eq!(*config.services[0].usps, vec!["Audits", "Links"]);
    }

    #[test]
    fn test_empty_services_fall_back_to_builtin() {
        let config = Config::default().with_default_services();
        assert_eq!(config.services.len(), 5);
    }
}
