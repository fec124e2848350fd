//! Job configuration: `config.json` inside the data directory.

use listsync_export::{ExportError, ExportParams, SourceTable};
use listsync_graph::{GraphConfig, OAuthCredentials};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Parameters(#[from] ExportError),

    #[error("authorization data contains no refresh token")]
    MissingRefreshToken,

    #[error("no input table configured")]
    NoInputTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub parameters: ExportParams,
    #[serde(default)]
    pub authorization: Authorization,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub image_parameters: ImageParameters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub oauth_api: OAuthApi,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthApi {
    #[serde(default)]
    pub credentials: AppCredentials,
}

/// OAuth application registered for the component.
#[derive(Clone, Default, Deserialize)]
pub struct AppCredentials {
    #[serde(rename = "appKey", default)]
    pub app_key: String,
    #[serde(rename = "#appSecret", default)]
    pub app_secret: String,
    /// JSON document holding the token response, including `refresh_token`.
    #[serde(rename = "#data", default)]
    pub data: String,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("data", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub input: InputMapping,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputMapping {
    #[serde(default)]
    pub tables: Vec<InputTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputTable {
    #[serde(default)]
    pub source: String,
    /// File name under `in/tables/`.
    pub destination: String,
}

/// Deployment-level overrides of the transport.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageParameters {
    #[serde(default)]
    pub graph_base_url: Option<String>,
    #[serde(default)]
    pub oauth_token_url: Option<String>,
    #[serde(default)]
    pub retry_insufficient_storage: bool,
}

#[derive(Deserialize)]
struct TokenData {
    #[serde(default)]
    refresh_token: Option<String>,
}

impl JobConfig {
    /// Reads `<data_dir>/config.json`.
    pub fn load(data_dir: &Path) -> ConfigResult<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Everything needed before the first remote call.
    pub fn validate(&self, data_dir: &Path) -> ConfigResult<()> {
        self.parameters.validate()?;
        self.credentials()?;
        self.input_table(data_dir)?;
        Ok(())
    }

    pub fn debug(&self) -> bool {
        self.parameters.debug
    }

    pub fn credentials(&self) -> ConfigResult<OAuthCredentials> {
        let creds = &self.authorization.oauth_api.credentials;
        if creds.data.trim().is_empty() {
            return Err(ConfigError::MissingRefreshToken);
        }
        let token: TokenData = serde_json::from_str(&creds.data)?;

        match token.refresh_token {
            Some(refresh) if !refresh.is_empty() => Ok(OAuthCredentials::new(
                &creds.app_key,
                &creds.app_secret,
                refresh,
            )),
            _ => Err(ConfigError::MissingRefreshToken),
        }
    }

    pub fn graph_config(&self) -> GraphConfig {
        let mut config = GraphConfig::default();
        if let Some(url) = &self.image_parameters.graph_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(url) = &self.image_parameters.oauth_token_url {
            config.oauth_token_url = url.clone();
        }
        if self.image_parameters.retry_insufficient_storage {
            config = config.with_insufficient_storage_retry();
        }
        config
    }

    /// The first configured input table.
    pub fn input_table(&self, data_dir: &Path) -> ConfigResult<SourceTable> {
        let table = self.storage.input.tables.first().ok_or(ConfigError::NoInputTable)?;
        Ok(SourceTable::new(input_tables_dir(data_dir).join(&table.destination)))
    }
}

pub fn input_tables_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("in").join("tables")
}

pub fn output_tables_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("out").join("tables")
}
