//! Configuration bundle and its validated, typed form.
//!
//! The bundle is a `global` map of string values plus an optional list of
//! layer declarations:
//!
//! ```json
//! {
//!   "global": {
//!     "appNameShort": "pm",
//!     "app-name": "pm-app",
//!     "source-id-short": "PM",
//!     "email": "a@x.com",
//!     "storage-arn": "arn:aws:s3:::bucket",
//!     "common_location": "layers/common"
//!   },
//!   "layers": [{ "name": "common", "runtimes": ["python3.12"] }]
//! }
//! ```

use crate::naming;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Short application name, prefix of role and key identifiers
pub const KEY_APP_NAME_SHORT: &str = "appNameShort";
/// Application name, prefix of policy and topic identifiers
pub const KEY_APP_NAME: &str = "app-name";
/// Source identifier shown in the topic display name
pub const KEY_SOURCE_ID_SHORT: &str = "source-id-short";
/// Notification e-mail address
pub const KEY_EMAIL: &str = "email";
/// ARN of the storage resource the role may access
pub const KEY_STORAGE_ARN: &str = "storage-arn";
/// Optional role name component (defaults to [`DEFAULT_ROLE_NAME`])
pub const KEY_ROLE_NAME: &str = "role-name";
/// Optional comma-separated services allowed to assume the role
pub const KEY_ROLE_SERVICES: &str = "role-services";

/// Role name component used when the bundle does not set one
pub const DEFAULT_ROLE_NAME: &str = "mainStack";
/// Service allowed to assume the role when the bundle does not say
pub const DEFAULT_ROLE_SERVICE: &str = "lambda";

/// Required keys, in the order they are checked
pub const REQUIRED_KEYS: [&str; 5] = [
    KEY_APP_NAME_SHORT,
    KEY_APP_NAME,
    KEY_SOURCE_ID_SHORT,
    KEY_EMAIL,
    KEY_STORAGE_ARN,
];

/// Longest role name the provider accepts
const MAX_ROLE_NAME_LEN: usize = 64;
/// Longest managed policy name the provider accepts
const MAX_POLICY_NAME_LEN: usize = 128;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").expect("static name pattern compiles"));
static LAYER_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static layer pattern compiles"));
static SERVICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static service pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern compiles"));
static ARN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:[a-z0-9-]+:[a-z0-9-]+:[a-z0-9-]*:[0-9]*:.+$")
        .expect("static ARN pattern compiles")
});

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required key absent
    #[error("Missing required configuration key: {key}")]
    MissingKey {
        /// Missing key
        key: String,
    },

    /// Key present but unusable
    #[error("Malformed configuration key {key}: {reason}")]
    Malformed {
        /// Offending key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Bundle could not be read
    #[error("Cannot read configuration from {path}: {reason}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error text
        reason: String,
    },

    /// Bundle is not valid JSON of the expected shape
    #[error("Cannot parse configuration: {reason}")]
    Parse {
        /// Underlying error text
        reason: String,
    },
}

impl ConfigError {
    fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Function runtime a layer is compatible with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runtime {
    /// Python 3.9
    #[serde(rename = "python3.9")]
    Python39,
    /// Python 3.10
    #[serde(rename = "python3.10")]
    Python310,
    /// Python 3.11
    #[serde(rename = "python3.11")]
    Python311,
    /// Python 3.12
    #[serde(rename = "python3.12")]
    Python312,
    /// Node.js 18
    #[serde(rename = "nodejs18.x")]
    Nodejs18,
    /// Node.js 20
    #[serde(rename = "nodejs20.x")]
    Nodejs20,
    /// Java 21
    #[serde(rename = "java21")]
    Java21,
    /// Custom runtime on Amazon Linux 2023
    #[serde(rename = "provided.al2023")]
    ProvidedAl2023,
}

impl Runtime {
    /// Provider identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Python39 => "python3.9",
            Self::Python310 => "python3.10",
            Self::Python311 => "python3.11",
            Self::Python312 => "python3.12",
            Self::Nodejs18 => "nodejs18.x",
            Self::Nodejs20 => "nodejs20.x",
            Self::Java21 => "java21",
            Self::ProvidedAl2023 => "provided.al2023",
        }
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_runtimes() -> Vec<Runtime> {
    vec![Runtime::Python312]
}

/// Declared packaging layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer name; its asset location is read from `<name>_location`
    pub name: String,
    /// Compatible runtimes
    #[serde(default = "default_runtimes")]
    pub runtimes: Vec<Runtime>,
}

impl LayerSpec {
    /// Create a layer declaration
    #[must_use]
    pub fn new(name: impl Into<String>, runtimes: Vec<Runtime>) -> Self {
        Self {
            name: name.into(),
            runtimes,
        }
    }

    /// Key holding this layer's asset location
    #[must_use]
    pub fn location_key(&self) -> String {
        format!("{}_location", self.name)
    }
}

/// Raw configuration bundle, immutable for an assembly run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBundle {
    /// Global string values
    #[serde(default)]
    pub global: IndexMap<String, String>,
    /// Declared layers
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

impl ConfigBundle {
    /// Create an empty bundle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.global.insert(key.into(), value.into());
        self
    }

    /// Declare a layer
    #[must_use]
    pub fn with_layer(mut self, layer: LayerSpec) -> Self {
        self.layers.push(layer);
        self
    }

    /// Parse a bundle from JSON text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a bundle
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Load a bundle from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Get a global value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.global.get(key).map(String::as_str)
    }

    /// Get a required, non-blank global value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if absent or blank
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingKey {
                key: key.to_string(),
            }),
        }
    }
}

/// Layer with its asset location resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayer {
    /// Layer name
    pub name: String,
    /// Asset location
    pub location: String,
    /// Compatible runtimes
    pub runtimes: Vec<Runtime>,
}

/// Validated configuration for one assembly run
///
/// Built before any resource is declared, so a bad bundle never produces a
/// partial resource graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Short application name
    pub app_name_short: String,
    /// Application name
    pub app_name: String,
    /// Source identifier
    pub source_id_short: String,
    /// Notification e-mail address
    pub email: String,
    /// Storage resource ARN
    pub storage_arn: String,
    /// Role name component
    pub role_name: String,
    /// Services allowed to assume the role
    pub role_services: Vec<String>,
    /// Layers, in declaration order
    pub layers: Vec<ResolvedLayer>,
}

impl AssemblyConfig {
    /// Extract and validate every value the assembly needs
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed key
    pub fn from_bundle(bundle: &ConfigBundle) -> Result<Self, ConfigError> {
        for key in REQUIRED_KEYS {
            bundle.require(key)?;
        }

        let app_name_short = bundle.require(KEY_APP_NAME_SHORT)?.trim().to_string();
        check_name(KEY_APP_NAME_SHORT, &app_name_short)?;
        let app_name = bundle.require(KEY_APP_NAME)?.trim().to_string();
        check_name(KEY_APP_NAME, &app_name)?;
        let source_id_short = bundle.require(KEY_SOURCE_ID_SHORT)?.trim().to_string();

        let email = bundle.require(KEY_EMAIL)?.trim().to_string();
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(ConfigError::malformed(KEY_EMAIL, "not an e-mail address"));
        }

        let storage_arn = bundle.require(KEY_STORAGE_ARN)?.trim().to_string();
        if !ARN_PATTERN.is_match(&storage_arn) {
            return Err(ConfigError::malformed(KEY_STORAGE_ARN, "not an ARN"));
        }

        let role_name = bundle
            .get(KEY_ROLE_NAME)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ROLE_NAME)
            .to_string();
        check_name(KEY_ROLE_NAME, &role_name)?;

        let role_services = match bundle.get(KEY_ROLE_SERVICES) {
            Some(raw) => parse_services(raw)?,
            None => vec![DEFAULT_ROLE_SERVICE.to_string()],
        };

        let layers = resolve_layers(bundle)?;

        let config = Self {
            app_name_short,
            app_name,
            source_id_short,
            email,
            storage_arn,
            role_name,
            role_services,
            layers,
        };
        config.check_derived_names()?;
        Ok(config)
    }

    /// Reject bundles whose derived names or logical IDs exceed their limits
    fn check_derived_names(&self) -> Result<(), ConfigError> {
        let role = naming::role_name(&self.app_name_short, &self.role_name);
        if role.len() > MAX_ROLE_NAME_LEN {
            return Err(ConfigError::malformed(
                KEY_APP_NAME_SHORT,
                format!("derived role name {:?} exceeds {} characters", role, MAX_ROLE_NAME_LEN),
            ));
        }
        let policy = naming::policy_name(&self.app_name, &self.role_name);
        if policy.len() > MAX_POLICY_NAME_LEN {
            return Err(ConfigError::malformed(
                KEY_APP_NAME,
                format!(
                    "derived policy name {:?} exceeds {} characters",
                    policy, MAX_POLICY_NAME_LEN
                ),
            ));
        }

        naming::key_id(&self.app_name_short)
            .and_then(|_| naming::role_id(&self.app_name_short, &self.role_name))
            .map_err(|e| ConfigError::malformed(KEY_APP_NAME_SHORT, e.to_string()))?;
        naming::topic_id(&self.app_name)
            .and_then(|_| naming::subscription_id(&self.app_name))
            .and_then(|_| naming::policy_id(&self.app_name, &self.role_name))
            .map_err(|e| ConfigError::malformed(KEY_APP_NAME, e.to_string()))?;
        for layer in &self.layers {
            naming::layer_id(&self.app_name_short, &layer.name)
                .map_err(|e| ConfigError::malformed("layers", e.to_string()))?;
        }
        Ok(())
    }
}

fn check_name(key: &str, value: &str) -> Result<(), ConfigError> {
    if NAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::malformed(
            key,
            "must be letters, digits and '-', starting with a letter or digit",
        ))
    }
}

fn parse_services(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut services: Vec<String> = Vec::new();
    for service in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !SERVICE_PATTERN.is_match(service) {
            return Err(ConfigError::malformed(
                KEY_ROLE_SERVICES,
                format!("invalid service name {:?}", service),
            ));
        }
        if !services.iter().any(|s| s == service) {
            services.push(service.to_string());
        }
    }
    if services.is_empty() {
        return Err(ConfigError::malformed(KEY_ROLE_SERVICES, "no services listed"));
    }
    Ok(services)
}

fn resolve_layers(bundle: &ConfigBundle) -> Result<Vec<ResolvedLayer>, ConfigError> {
    let mut layers: Vec<ResolvedLayer> = Vec::with_capacity(bundle.layers.len());
    for spec in &bundle.layers {
        if !LAYER_NAME_PATTERN.is_match(&spec.name) {
            return Err(ConfigError::malformed("layers", format!("invalid layer name {:?}", spec.name)));
        }
        if layers.iter().any(|l| l.name == spec.name) {
            return Err(ConfigError::malformed("layers", format!("duplicate layer {:?}", spec.name)));
        }
        if spec.runtimes.is_empty() {
            return Err(ConfigError::malformed(
                "layers",
                format!("layer {:?} lists no runtimes", spec.name),
            ));
        }
        let location = bundle.require(&spec.location_key())?.trim().to_string();
        layers.push(ResolvedLayer {
            name: spec.name.clone(),
            location,
            runtimes: spec.runtimes.clone(),
        });
    }
    Ok(layers)
}
