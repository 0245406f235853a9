// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Request events.
//!
//! Before every document operation the client emits a `"request"` event and
//! waits for all of its listeners. Listeners run concurrently; the first one
//! to fail aborts the operation, and the transport is never called.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SanityError};

// ---------------------------------------------------------------------------
// EventKind / Operation
// ---------------------------------------------------------------------------

/// Events a client emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Fired before each fetch, update, create or delete.
    Request,
}

impl EventKind {
    pub const ALL: [EventKind; 1] = [EventKind::Request];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Request => "request",
        }
    }
}

impl FromStr for EventKind {
    type Err = SanityError;

    fn from_str(s: &str) -> Result<Self> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SanityError::UnknownEvent(s.to_owned()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document operations routed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Fetch,
    Update,
    Create,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Update => "update",
            Operation::Create => "create",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestEvent
// ---------------------------------------------------------------------------

/// Payload of the `"request"` event: the operation and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RequestEvent {
    Fetch { query: String, params: Value },
    Update { id: String, patch: Value },
    Create { document: Value },
    Delete { id: String },
}

impl RequestEvent {
    pub fn operation(&self) -> Operation {
        match self {
            RequestEvent::Fetch { .. } => Operation::Fetch,
            RequestEvent::Update { .. } => Operation::Update,
            RequestEvent::Create { .. } => Operation::Create,
            RequestEvent::Delete { .. } => Operation::Delete,
        }
    }

    /// The operation's arguments in call order.
    pub fn args(&self) -> Vec<Value> {
        match self {
            RequestEvent::Fetch { query, params } => {
                vec![Value::String(query.clone()), params.clone()]
            }
            RequestEvent::Update { id, patch } => vec![Value::String(id.clone()), patch.clone()],
            RequestEvent::Create { document } => vec![document.clone()],
            RequestEvent::Delete { id } => vec![Value::String(id.clone())],
        }
    }
}

// ---------------------------------------------------------------------------
// EventHandler
// ---------------------------------------------------------------------------

type HandlerFn = dyn Fn(RequestEvent) -> BoxFuture<'static, Result<()>> + Send + Sync;

/// A registered listener.
///
/// Clones share identity: a clone of the handler passed to `on` removes it.
/// Two handlers built from identical closures are distinct.
#[derive(Clone)]
pub struct EventHandler(Arc<HandlerFn>);

impl EventHandler {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self(Arc::new(move |event| handler(event).boxed()))
    }

    /// Whether `self` and `other` are the same registration.
    pub fn same(&self, other: &EventHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, event: RequestEvent) -> BoxFuture<'static, Result<()>> {
        (self.0)(event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventRegistry
// ---------------------------------------------------------------------------

/// Ordered listeners per event. Insertion order is invocation order and the
/// same handler may be registered more than once.
#[derive(Debug)]
pub struct EventRegistry {
    handlers: HashMap<EventKind, Vec<EventHandler>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self {
            handlers: EventKind::ALL
                .into_iter()
                .map(|kind| (kind, Vec::new()))
                .collect(),
        }
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the listeners of `event`.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::UnknownEvent`] if `event` is not emitted by the client.
    pub fn on(&mut self, event: &str, handler: EventHandler) -> Result<()> {
        let kind = event.parse::<EventKind>()?;
        self.handlers.entry(kind).or_default().push(handler);
        Ok(())
    }

    /// Remove the first registration of `handler` for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::UnknownEvent`] for an unknown event and
    /// [`SanityError::HandlerNotRegistered`] if `handler` is not listening.
    pub fn remove_listener(&mut self, event: &str, handler: &EventHandler) -> Result<()> {
        let kind = event.parse::<EventKind>()?;
        let handlers = self.handlers.entry(kind).or_default();
        let index = handlers
            .iter()
            .position(|registered| registered.same(handler))
            .ok_or(SanityError::HandlerNotRegistered)?;
        handlers.remove(index);
        Ok(())
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run every listener of `kind` concurrently with `payload`.
    ///
    /// Listeners are invoked before this returns; the returned future
    /// completes once all of them succeed, or with the first failure.
    pub fn emit(&self, kind: EventKind, payload: RequestEvent) -> BoxFuture<'static, Result<()>> {
        let handlers = self.handlers.get(&kind).map(Vec::as_slice).unwrap_or_default();
        if handlers.is_empty() {
            return futures::future::ok(()).boxed();
        }

        debug!(event = %kind, operation = %payload.operation(), listeners = handlers.len(), "emitting event");
        let pending: Vec<_> = handlers
            .iter()
            .map(|handler| handler.call(payload.clone()))
            .collect();

        async move { try_join_all(pending).await.map(|_| ()) }.boxed()
    }
}
