// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! The Sanity client aggregate.
//!
//! [`SanityClient`] owns the resolved configuration, the document transport,
//! the HTTP requester and the event registry. Document operations live in
//! [`crate::data`], raw requests and dataset management in
//! [`crate::request`]; both are `impl SanityClient` blocks.

use tracing::debug;

use crate::config::{resolve, ClientConfig, PartialConfig};
use crate::error::Result;
use crate::events::{EventHandler, EventKind, EventRegistry, RequestEvent};
use crate::http::{HttpRequester, ReqwestRequester};
use crate::transport::DataTransport;

/// A client bound to one Sanity project.
///
/// `T` is the document transport; `H` performs raw HTTP requests and
/// defaults to [`ReqwestRequester`].
pub struct SanityClient<T, H = ReqwestRequester> {
    pub(crate) config: ClientConfig,
    pub(crate) transport: T,
    pub(crate) http: H,
    pub(crate) events: EventRegistry,
}

impl<T: DataTransport> SanityClient<T, ReqwestRequester> {
    /// Create a client using the default `reqwest` requester.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SanityError::Config`] for an invalid configuration, or
    /// whatever the transport's `connect` fails with.
    pub fn new(config: PartialConfig) -> Result<Self> {
        Self::with_requester(config, ReqwestRequester::new()?)
    }
}

impl<T: DataTransport, H: HttpRequester> SanityClient<T, H> {
    /// Create a client that sends raw requests through `http`.
    pub fn with_requester(config: PartialConfig, http: H) -> Result<Self> {
        let config = resolve(&config, None)?;
        let transport = T::connect(config.data_endpoint())?;

        Ok(Self {
            config,
            transport,
            http,
            events: EventRegistry::new(),
        })
    }
}

impl<T: DataTransport, H> SanityClient<T, H> {
    /// The current resolved configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Layer `config` over the current configuration and push the new data
    /// endpoint into the transport.
    ///
    /// Fields left unset keep their current value. If resolution or the
    /// transport's `set_config` fails, the current configuration is kept.
    pub fn configure(&mut self, config: PartialConfig) -> Result<&mut Self> {
        let next = resolve(&config, Some(&self.config))?;
        self.transport.set_config(next.data_endpoint())?;
        debug!(url = %next.url(), "client reconfigured");
        self.config = next;
        Ok(self)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn requester(&self) -> &H {
        &self.http
    }

    /// Register `handler` for `event`. Only `"request"` is emitted.
    pub fn on(&mut self, event: &str, handler: EventHandler) -> Result<&mut Self> {
        self.events.on(event, handler)?;
        Ok(self)
    }

    /// Unregister the first registration of `handler` for `event`.
    pub fn remove_listener(&mut self, event: &str, handler: &EventHandler) -> Result<&mut Self> {
        self.events.remove_listener(event, handler)?;
        Ok(self)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.events.listener_count(kind)
    }

    /// Run every listener of `event` with `payload` and wait for all of them.
    pub async fn emit(&self, event: &str, payload: RequestEvent) -> Result<()> {
        let kind = event.parse::<EventKind>()?;
        self.events.emit(kind, payload).await
    }
}

/// Create a client for `config`, or for the built-in defaults when `None`.
///
/// The defaults carry no project id, so `None` fails with
/// [`crate::SanityError::Config`]. Pass `Some(PartialConfig::from_env()?)` to
/// configure from the environment.
pub fn create_client<T: DataTransport>(config: Option<PartialConfig>) -> Result<SanityClient<T>> {
    SanityClient::new(config.unwrap_or_else(PartialConfig::defaults))
}
