use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::error::MigrateError;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_CONCURRENCY: u16 = 4;
pub const DEFAULT_REGION: &str = "us-east-1";

const INVALID_SCHEME: &str = "scheme must be https:// or http:// .";
const ENDPOINT_NOT_SPECIFIED: &str = "endpoint must be specified.";
const BUCKET_NOT_SPECIFIED: &str = "options.bucket must be specified.";
const ZERO_CONCURRENCY: &str = "options.concurrency must be greater than or equal to 1.";

/// On-disk JSON configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub source: EndpointSettings,
    pub destination: EndpointSettings,
    pub options: MigrationOptions,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub endpoint: String,
    #[serde(default)]
    pub ssl: bool,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_path_style: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for EndpointSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointSettings")
            .field("endpoint", &self.endpoint)
            .field("ssl", &self.ssl)
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationOptions {
    pub bucket: String,
    #[serde(default)]
    pub directory: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: u16,
}

fn default_concurrency() -> u16 {
    DEFAULT_CONCURRENCY
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, MigrateError> {
        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| MigrateError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn sample() -> Self {
        Self {
            source: EndpointSettings {
                endpoint: "s3.amazonaws.com".to_string(),
                ssl: true,
                access_key: "AWSACCESSKEY".to_string(),
                secret_key: "AWSSECRETKEY".to_string(),
                region: None,
                force_path_style: false,
                session_token: None,
            },
            destination: EndpointSettings {
                endpoint: "minio.example.com".to_string(),
                ssl: true,
                access_key: "MINIOACCESSKEY".to_string(),
                secret_key: "MINIOSECRETKEY".to_string(),
                region: None,
                force_path_style: false,
                session_token: None,
            },
            options: MigrationOptions {
                bucket: "bucketname".to_string(),
                directory: "path/to/files".to_string(),
                concurrency: DEFAULT_CONCURRENCY,
            },
        }
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), MigrateError> {
        self.source.endpoint_url()?;
        self.destination.endpoint_url()?;

        if self.options.bucket.is_empty() {
            return Err(MigrateError::InvalidConfig(BUCKET_NOT_SPECIFIED.to_string()));
        }
        if self.options.concurrency == 0 {
            return Err(MigrateError::InvalidConfig(ZERO_CONCURRENCY.to_string()));
        }

        Ok(())
    }
}

impl EndpointSettings {
    /// Full URL of the endpoint. A bare host gets its scheme from `ssl`.
    pub fn endpoint_url(&self) -> Result<String, MigrateError> {
        if self.endpoint.is_empty() {
            return Err(MigrateError::InvalidConfig(
                ENDPOINT_NOT_SPECIFIED.to_string(),
            ));
        }

        let endpoint_url = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        };

        check_endpoint_url(&endpoint_url)
    }

    pub fn region(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

fn check_endpoint_url(endpoint_url: &str) -> Result<String, MigrateError> {
    let parsed = Url::parse(endpoint_url)
        .map_err(|e| MigrateError::InvalidConfig(format!("{endpoint_url}: {e}")))?;

    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return Err(MigrateError::InvalidConfig(INVALID_SCHEME.to_string()));
    }

    Ok(endpoint_url.to_string())
}
