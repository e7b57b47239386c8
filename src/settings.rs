use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const SETTINGS_PATH_REL_HOME: &str = ".config/mssbot/settings.toml";
const TOKEN_ENV_VAR: &str = "BOT_TOKEN";

/// Bot bootstrap settings.  Everything the bot says and does lives in the stores these point to.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Settings {
    pub general: General,
    #[serde(default)]
    pub stores: StorePaths,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    /// May be left empty and provided through `BOT_TOKEN` instead
    #[serde(default)]
    pub discord_token: String,
    #[serde(default)]
    pub bot_owners: Vec<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct StorePaths {
    #[serde(default = "default_config_path")]
    pub config: PathBuf,
    #[serde(default = "default_language_path")]
    pub language: PathBuf,
    #[serde(default = "default_tags_path")]
    pub tags: PathBuf,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            config: default_config_path(),
            language: default_language_path(),
            tags: default_tags_path(),
        }
    }
}

fn default_command_prefix() -> String {
    ";".to_owned()
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config.yaml")
}

fn default_language_path() -> PathBuf {
    PathBuf::from("language.yaml")
}

fn default_tags_path() -> PathBuf {
    PathBuf::from("tags.yaml")
}

impl Settings {
    fn settings_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(SETTINGS_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::settings_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open settings at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read settings at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut settings = Self::parse(&contents).map_err(|e| {
            anyhow!(
                "Could not parse settings at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        settings.override_token(std::env::var(TOKEN_ENV_VAR).ok());
        if settings.general.discord_token.is_empty() {
            return Err(anyhow!(
                "No Discord token in `{}` and `{}` is not set",
                path.to_string_lossy(),
                TOKEN_ENV_VAR
            ));
        }

        Ok(settings)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(Into::into)
    }

    fn override_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.general.discord_token = token;
        }
    }
}
