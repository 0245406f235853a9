// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Per-request headers derived from the current configuration.

use std::collections::BTreeMap;

use crate::config::ClientConfig;

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "Sanity-Token";

/// Header carrying the project id when the hostname does not encode it.
pub const PROJECT_HEADER: &str = "Sanity-Project-ID";

/// Headers and encoding flag attached to every outgoing call.
///
/// Built from scratch for each request; never cache one across a
/// reconfiguration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    /// Request and expect JSON bodies.
    pub json: bool,
}

impl RequestOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut headers = BTreeMap::new();

        if let Some(token) = config.token() {
            headers.insert(TOKEN_HEADER.to_owned(), token.to_owned());
        }

        if !config.use_project_hostname() {
            headers.insert(PROJECT_HEADER.to_owned(), config.project_id().to_owned());
        }

        Self {
            headers,
            json: true,
        }
    }
}
