// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Raw API requests, dataset management and project listing.

use serde_json::Value;
use tracing::debug;

use crate::client::SanityClient;
use crate::error::Result;
use crate::http::{HttpRequest, HttpRequester, Method};
use crate::options::RequestOptions;
use crate::validators;

impl<T, H: HttpRequester> SanityClient<T, H> {
    /// Send `request` to the project API.
    ///
    /// `request.uri` is taken relative to the configured base URL; a single
    /// leading slash is ignored. The client's request options fill in headers
    /// and the JSON flag the caller left unset.
    pub async fn request(&self, request: HttpRequest) -> Result<Value> {
        let request = self.prepare_request(request);
        debug!(method = %request.method, uri = %request.uri, "api request");
        self.http.request(request).await
    }

    /// Create or delete the dataset `name` with `method`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SanityError::Validation`] without sending anything if
    /// `name` is not a valid dataset name.
    pub async fn modify_dataset(&self, method: Method, name: &str) -> Result<Value> {
        validators::dataset(name)?;
        self.request(HttpRequest::new(method, format!("/datasets/{name}")))
            .await
    }

    pub async fn create_dataset(&self, name: &str) -> Result<Value> {
        self.modify_dataset(Method::PUT, name).await
    }

    pub async fn delete_dataset(&self, name: &str) -> Result<Value> {
        self.modify_dataset(Method::DELETE, name).await
    }

    /// Datasets of the configured project.
    pub async fn list_datasets(&self) -> Result<Value> {
        self.request(HttpRequest::get("/datasets")).await
    }

    /// Projects visible to the configured token.
    pub async fn get_projects(&self) -> Result<Value> {
        self.request(HttpRequest::get("/projects")).await
    }

    /// Merge request options into `request` and make its URI absolute.
    pub(crate) fn prepare_request(&self, mut request: HttpRequest) -> HttpRequest {
        let defaults = RequestOptions::from_config(&self.config);

        let mut headers = defaults.headers;
        headers.retain(|name, _| {
            !request
                .headers
                .keys()
                .any(|own| own.eq_ignore_ascii_case(name))
        });
        headers.append(&mut request.headers);
        request.headers = headers;

        request.json = Some(request.json.unwrap_or(defaults.json));

        let path = request.uri.strip_prefix('/').unwrap_or(&request.uri);
        request.uri = format!("{}/{}", self.config.url(), path);
        request
    }
}
