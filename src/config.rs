use crate::paste::{ContentSource, DisplayMode, Draft};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    pub request_timeout_secs: u64,

    pub autosave_interval_secs: u64,
    pub userlist_refresh_secs: u64,
    pub banner_millis: u64,

    // The draft this session edits
    pub draft_path: Option<String>,
    pub post_id: Option<String>,
    pub title: String,
    pub display_mode: String,
    pub irc_channel: Option<String>,
    pub receiver: Option<String>,
    pub sender: Option<String>,
    pub privmsg: bool,

    pub save_on_exit: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server_url", "http://127.0.0.1:2024/")?
        .set_default("request_timeout_secs", 30)?
        .set_default("autosave_interval_secs", 60)?
        .set_default("userlist_refresh_secs", 60)?
        .set_default("banner_millis", 2000)?
        .set_default("title", "")?
        .set_default("display_mode", "Markdown")?
        .set_default("privmsg", false)?
        .set_default("save_on_exit", true)
}

impl AppConfig {
    pub fn new() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(err) => {
                error!("Error loading config: {}", err);
                std::process::exit(1);
            }
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        let mut config = defaults()?;

        // Check for the presence of a config.toml file and use it
        if std::path::Path::new("config.toml").is_file() {
            info!("Found config.toml, using it!");
            config = config.add_source(config::File::with_name("config"));
        } else {
            info!("No config.toml found, using defaults!");
        }

        // Override with environment variables
        config = config.add_source(Environment::with_prefix("APP"));

        config.build()?.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    pub fn userlist_refresh(&self) -> Duration {
        Duration::from_secs(self.userlist_refresh_secs.max(1))
    }

    pub fn banner_ttl(&self) -> Duration {
        Duration::from_millis(self.banner_millis)
    }

    pub fn draft(&self) -> Draft {
        let content = match &self.draft_path {
            Some(path) => ContentSource::External(PathBuf::from(path)),
            None => ContentSource::default(),
        };

        Draft {
            title: self.title.clone(),
            content,
            display_mode: DisplayMode::from(self.display_mode.clone()),
            irc_channel: self.irc_channel.clone(),
            receiver: self.receiver.clone(),
            sender: self.sender.clone(),
            privmsg: self.privmsg,
        }
    }
}
