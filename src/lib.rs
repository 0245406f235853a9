// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Sanity Client SDK
//!
//! A Rust client for the Sanity hosted document API. The client derives its
//! API base URL from a project id, routes document queries and mutations
//! through a pluggable [`DataTransport`], sends auxiliary requests (dataset
//! management, project listing) through an [`HttpRequester`], and emits a
//! `"request"` event before every document operation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use sanity_client::{
//!     DataEndpoint, DataTransport, EventHandler, PartialConfig, RequestOptions, SanityClient,
//! };
//! use serde_json::{json, Value};
//!
//! struct NullTransport;
//!
//! #[async_trait]
//! impl DataTransport for NullTransport {
//!     fn connect(_: DataEndpoint) -> sanity_client::Result<Self> { Ok(NullTransport) }
//!     fn set_config(&self, _: DataEndpoint) -> sanity_client::Result<()> { Ok(()) }
//!     async fn fetch(&self, _: &str, _: &Value, _: RequestOptions) -> sanity_client::Result<Value> { Ok(Value::Null) }
//!     async fn update(&self, _: &str, _: &Value, _: RequestOptions) -> sanity_client::Result<Value> { Ok(Value::Null) }
//!     async fn create(&self, _: &Value, _: RequestOptions) -> sanity_client::Result<Value> { Ok(Value::Null) }
//!     async fn delete(&self, _: &str, _: RequestOptions) -> sanity_client::Result<Value> { Ok(Value::Null) }
//! }
//!
//! #[tokio::main]
//! async fn main() -> sanity_client::Result<()> {
//!     let mut client: SanityClient<NullTransport> =
//!         SanityClient::new(PartialConfig::new("abc123").with_dataset("production"))?;
//!
//!     client.on("request", EventHandler::new(|event| async move {
//!         println!("about to {}", event.operation());
//!         Ok(())
//!     }))?;
//!
//!     client.fetch("*[_type == $type]", json!({"type": "movie"})).await?;
//!     client.create_dataset("staging").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Partial and resolved configuration, URL derivation.
//! - [`options`]: Per-request headers derived from the configuration.
//! - [`events`]: The `"request"` event registry.
//! - [`transport`]: The document transport trait.
//! - [`http`]: Raw HTTP requests and the default `reqwest` requester.
//! - [`client`]: The [`SanityClient`] aggregate and [`create_client`].
//! - [`data`]: fetch, update, create and delete.
//! - [`request`]: Raw requests, datasets and projects.
//! - [`validators`]: Client-side input checks.
//! - [`error`]: Error types and the crate-level `Result` alias.

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod http;
pub mod options;
pub mod request;
pub mod transport;
pub mod validators;

pub use client::{create_client, SanityClient};
pub use config::{resolve, ClientConfig, DataEndpoint, PartialConfig};
pub use error::{BoxError, Result, SanityError};
pub use events::{EventHandler, EventKind, Operation, RequestEvent};
pub use http::{HttpRequest, HttpRequester, Method, ReqwestRequester};
pub use options::RequestOptions;
pub use transport::DataTransport;
