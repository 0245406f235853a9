// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration and endpoint derivation.
//!
//! A [`PartialConfig`] is what callers hand in: every field is optional, it
//! can be deserialized from camelCase JSON or read from `SANITY_*`
//! environment variables. [`resolve`] layers it over the built-in defaults
//! and any previous [`ClientConfig`], validates the project id, and derives
//! the versioned API base URL.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SanityError};

/// API host used when none is configured.
pub const DEFAULT_API_HOST: &str = "https://api.sanity.io";

/// API version segment appended to every base URL.
pub const API_VERSION: &str = "v1";

static PROJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-f0-9]+$").expect("project id pattern compiles"));

// ---------------------------------------------------------------------------
// PartialConfig
// ---------------------------------------------------------------------------

/// Caller-supplied configuration. Unset fields fall through to the previous
/// configuration, then to the defaults.
///
/// `dataset` and `token` can also be cleared: `Some(None)` (JSON `null`)
/// removes a value inherited from the previous configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    /// Project identifier (lowercase hex digits and dashes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Dataset the document operations target.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub dataset: Option<Option<String>>,
    /// API token, sent verbatim in the `Sanity-Token` header.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub token: Option<Option<String>>,
    /// Base host including protocol, e.g. `https://api.sanity.io`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    /// Whether the project id is spliced into the hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_project_hostname: Option<bool>,
}

impl PartialConfig {
    /// The built-in defaults: the public API host, project hostnames enabled.
    pub fn defaults() -> Self {
        Self {
            api_host: Some(DEFAULT_API_HOST.to_owned()),
            use_project_hostname: Some(true),
            ..Self::default()
        }
    }

    /// Start a configuration for `project_id`.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::default().with_project_id(project_id)
    }

    /// Set the project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the dataset.
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(Some(dataset.into()));
        self
    }

    /// Clear any previously configured dataset.
    pub fn without_dataset(mut self) -> Self {
        self.dataset = Some(None);
        self
    }

    /// Set the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Some(token.into()));
        self
    }

    /// Clear any previously configured token.
    pub fn without_token(mut self) -> Self {
        self.token = Some(None);
        self
    }

    /// Set the API host, including protocol.
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    /// Choose whether the project id is spliced into the hostname.
    pub fn with_project_hostname(mut self, enabled: bool) -> Self {
        self.use_project_hostname = Some(enabled);
        self
    }

    /// Read configuration from `SANITY_PROJECT_ID`, `SANITY_DATASET`,
    /// `SANITY_TOKEN`, `SANITY_API_HOST` and `SANITY_USE_PROJECT_HOSTNAME`.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::Config`] if `SANITY_USE_PROJECT_HOSTNAME` is not
    /// a recognizable boolean.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PartialConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let use_project_hostname = match non_empty("SANITY_USE_PROJECT_HOSTNAME") {
            None => None,
            Some(raw) => Some(parse_bool(&raw).ok_or_else(|| {
                SanityError::Config(format!(
                    "SANITY_USE_PROJECT_HOSTNAME must be a boolean, got \"{raw}\""
                ))
            })?),
        };

        Ok(Self {
            project_id: non_empty("SANITY_PROJECT_ID"),
            dataset: non_empty("SANITY_DATASET").map(Some),
            token: non_empty("SANITY_TOKEN").map(Some),
            api_host: non_empty("SANITY_API_HOST"),
            use_project_hostname,
        })
    }

    /// Overlay `other` on top of `self`: fields set in `other` win, including
    /// explicit clears.
    pub fn merge(mut self, other: &PartialConfig) -> Self {
        if other.project_id.is_some() {
            self.project_id.clone_from(&other.project_id);
        }
        if other.dataset.is_some() {
            self.dataset.clone_from(&other.dataset);
        }
        if other.token.is_some() {
            self.token.clone_from(&other.token);
        }
        if other.api_host.is_some() {
            self.api_host.clone_from(&other.api_host);
        }
        if other.use_project_hostname.is_some() {
            self.use_project_hostname = other.use_project_hostname;
        }
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// A validated configuration snapshot.
///
/// Only [`resolve`] constructs one, so [`ClientConfig::url`] always agrees
/// with the fields it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    project_id: String,
    dataset: Option<String>,
    #[serde(skip_serializing)]
    token: Option<String>,
    api_host: String,
    use_project_hostname: bool,
    url: String,
}

impl ClientConfig {
    /// Validated project id.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Dataset the document operations target, if any.
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// API token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// API host the URL was derived from.
    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Whether the project id is part of the hostname.
    pub fn use_project_hostname(&self) -> bool {
        self.use_project_hostname
    }

    /// Versioned API base URL, e.g. `https://abc123.api.sanity.io/v1`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Descriptor handed to the document transport.
    pub fn data_endpoint(&self) -> DataEndpoint {
        DataEndpoint {
            url: format!("{}/data", self.url),
            dataset: self.dataset.clone(),
        }
    }

    /// This snapshot as a fully-populated partial, for layering.
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            project_id: Some(self.project_id.clone()),
            dataset: Some(self.dataset.clone()),
            token: Some(self.token.clone()),
            api_host: Some(self.api_host.clone()),
            use_project_hostname: Some(self.use_project_hostname),
        }
    }
}

/// Where the document transport sends its traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEndpoint {
    /// Data API root, `{base url}/data`.
    pub url: String,
    /// Dataset the transport operates on.
    pub dataset: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `new` against the defaults and `previous`.
///
/// Fields are layered defaults, then `previous`, then `new`. `previous` is
/// left untouched.
///
/// # Errors
///
/// Returns [`SanityError::Config`] if the project id is missing, empty, or
/// contains anything besides lowercase hex digits and dashes, or if the API
/// host has no protocol while project hostnames are enabled.
pub fn resolve(new: &PartialConfig, previous: Option<&ClientConfig>) -> Result<ClientConfig> {
    let mut merged = PartialConfig::defaults();
    if let Some(previous) = previous {
        merged = merged.merge(&previous.to_partial());
    }
    let merged = merged.merge(new);

    let project_id = match merged.project_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(SanityError::Config(
                "Configuration must contain `projectId`".into(),
            ))
        }
    };

    if !PROJECT_ID.is_match(&project_id) {
        return Err(SanityError::Config(
            "`projectId` can only contain a-z, 0-9 and dashes".into(),
        ));
    }

    let api_host = merged
        .api_host
        .unwrap_or_else(|| DEFAULT_API_HOST.to_owned());
    let use_project_hostname = merged.use_project_hostname.unwrap_or(true);

    let url = if use_project_hostname {
        let (protocol, host) = api_host.split_once("://").ok_or_else(|| {
            SanityError::Config(format!(
                "`apiHost` must include a protocol, got \"{api_host}\""
            ))
        })?;
        format!("{protocol}://{project_id}.{host}/{API_VERSION}")
    } else {
        format!("{api_host}/{API_VERSION}")
    };

    debug!(project_id = %project_id, url = %url, "resolved client configuration");

    Ok(ClientConfig {
        project_id,
        dataset: merged.dataset.flatten(),
        token: merged.token.flatten(),
        api_host,
        use_project_hostname,
        url,
    })
}
