//! Runtime configuration.
//!
//! Values are layered: an optional TOML file at ~/.config/assignsync/config.toml (or
//! the path given with `--config`), then environment variables, which win. A `.env`
//! file in the working directory is loaded into the environment first.
//!
//! Keys are the lowercase environment variable names:
//!
//! ```toml
//! webcal_url = "webcal://canvas.example.edu/feeds/calendars/user_abc.ics"
//! notion_token = "secret_..."
//! database_id = "0123456789abcdef0123456789abcdef"
//! # title_property = "Name"
//! # date_property = "Due Date"
//! # description_property = "Description"
//! ```

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_API_BASE: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub feed_url: String,
    pub notion: NotionConfig,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
    pub api_base: String,
    pub api_version: String,
    pub properties: PropertyNames,
}

/// Names of the database columns records are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub title: String,
    pub date: String,
    pub description: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        PropertyNames {
            title: "Name".to_string(),
            date: "Due Date".to_string(),
            description: "Description".to_string(),
        }
    }
}

/// Everything optional; `validate` decides what is required.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    webcal_url: Option<String>,
    notion_token: Option<String>,
    database_id: Option<String>,
    notion_api_base: Option<String>,
    notion_version: Option<String>,
    title_property: Option<String>,
    date_property: Option<String>,
    description_property: Option<String>,
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("assignsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load and validate configuration.
    ///
    /// An explicit `path` must exist; the default config file is optional.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        builder = match path {
            Some(p) => builder.add_source(File::from(p).required(true)),
            None => match Self::config_path() {
                Ok(p) => builder.add_source(File::from(p).required(false)),
                Err(_) => builder,
            },
        };

        let settings = builder.add_source(Environment::default()).build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> SyncResult<Self> {
        let raw: RawConfig = settings.try_deserialize()?;
        raw.validate()
    }
}

impl RawConfig {
    fn validate(self) -> SyncResult<SyncConfig> {
        let mut missing = Vec::new();

        let feed_url = required(self.webcal_url, "WEBCAL_URL", &mut missing);
        let token = required(self.notion_token, "NOTION_TOKEN", &mut missing);
        let database_id = required(self.database_id, "DATABASE_ID", &mut missing);

        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        let defaults = PropertyNames::default();

        Ok(SyncConfig {
            feed_url,
            notion: NotionConfig {
                token,
                database_id,
                api_base: optional(self.notion_api_base)
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_version: optional(self.notion_version)
                    .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
                properties: PropertyNames {
                    title: optional(self.title_property).unwrap_or(defaults.title),
                    date: optional(self.date_property).unwrap_or(defaults.date),
                    description: optional(self.description_property)
                        .unwrap_or(defaults.description),
                },
            },
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    optional(value).unwrap_or_else(|| {
        missing.push(name);
        String::new()
    })
}
