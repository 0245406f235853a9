// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Document operations.
//!
//! Each operation emits the `"request"` event, waits for every listener, and
//! only then hands its arguments to the transport together with freshly
//! built [`RequestOptions`]. The transport's result is returned untouched.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::SanityClient;
use crate::error::Result;
use crate::events::{EventKind, RequestEvent};
use crate::options::RequestOptions;
use crate::transport::DataTransport;

// `H: Send + Sync` keeps these futures `Send` so they can be spawned.
impl<T: DataTransport, H: Send + Sync> SanityClient<T, H> {
    /// Run `query` with bound `params` against the configured dataset.
    pub async fn fetch(&self, query: &str, params: Value) -> Result<Value> {
        self.data_request(RequestEvent::Fetch {
            query: query.to_owned(),
            params,
        })
        .await
    }

    /// Apply `patch` to the document `id`.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Value> {
        self.data_request(RequestEvent::Update {
            id: id.to_owned(),
            patch,
        })
        .await
    }

    /// Create `document`.
    pub async fn create(&self, document: Value) -> Result<Value> {
        self.data_request(RequestEvent::Create { document }).await
    }

    /// Delete the document `id`.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        self.data_request(RequestEvent::Delete { id: id.to_owned() })
            .await
    }

    async fn data_request(&self, event: RequestEvent) -> Result<Value> {
        let operation = event.operation();

        if let Err(err) = self.events.emit(EventKind::Request, event.clone()).await {
            warn!(%operation, error = %err, "request listener aborted operation");
            return Err(err);
        }

        let options = RequestOptions::from_config(&self.config);
        debug!(%operation, dataset = ?self.config.dataset(), "dispatching to transport");

        match &event {
            RequestEvent::Fetch { query, params } => {
                self.transport.fetch(query, params, options).await
            }
            RequestEvent::Update { id, patch } => self.transport.update(id, patch, options).await,
            RequestEvent::Create { document } => self.transport.create(document, options).await,
            RequestEvent::Delete { id } => self.transport.delete(id, options).await,
        }
    }
}
