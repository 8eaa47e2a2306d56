// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of unix-logger.
//
// unix-logger is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// unix-logger is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with unix-logger.  If
// not, see <http://www.gnu.org/licenses/>.

//! The logging engine interface.
//!
//! The facade does no real work: every call is handed to a logging *engine*, which decides whether
//! the call is enabled, renders the message & dispatches it somewhere. This module defines what
//! the facade needs from an engine:
//!
//! - a [`Registry`] hands out one [`EngineLogger`] per name (asking for the same name twice yields
//!   the same logger) & accepts level registrations
//! - an [`EngineLogger`] answers "is this severity enabled?" & consumes [`LogCall`]s
//!
//! Registries are passed to the facade explicitly rather than living in a global, so that tests
//! (or applications wanting several independent configurations) can simply build their own.
//!
//! Two engines are provided: [`memory::MemoryEngine`], which records calls in-process, and
//! [`tracing::TracingEngine`], which forwards them to the [`tracing`] ecosystem.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html

pub mod memory;
pub mod tracing;

use crate::{
    error::Result,
    level::CustomLevel,
    marker::Marker,
    message::{MessageFactory, ParameterizedMessageFactory, Payload},
    severity::Severity,
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, RwLock},
};

/// Identifies the facade to the engine as the origin of every [`LogCall`]
pub const ORIGIN: &str = "unix_logger::Logger";

/// One log call, as handed to an engine. Borrows everything; lives only for the duration of the
/// call.
#[derive(Clone, Copy, Debug)]
pub struct LogCall<'a> {
    /// Who made the call on the caller's behalf (the facade)
    pub origin: &'static str,
    /// Where in the caller's source the call was made
    pub location: &'static Location<'static>,
    pub severity: Severity,
    pub marker: Option<&'a Marker>,
    pub payload: Payload<'a>,
    pub error: Option<&'a dyn std::error::Error>,
}

impl<'a> LogCall<'a> {
    /// The error attached to this call: the explicit one if present, else any carried by a
    /// structured payload
    pub fn error(&self) -> Option<&'a dyn std::error::Error> {
        self.error.or_else(|| {
            self.payload
                .error()
                .map(|err| err as &'a dyn std::error::Error)
        })
    }
}

/// A named logger belonging to some engine.
pub trait EngineLogger: Send + Sync {
    fn name(&self) -> &str;
    /// The message-construction strategy currently bound to this logger
    fn message_factory(&self) -> Arc<dyn MessageFactory>;
    /// Would a call at `severity` tagged with `marker` be logged? Must be cheap, and must not
    /// touch the message.
    fn is_enabled(&self, severity: Severity, marker: Option<&Marker>) -> bool;
    /// Render & dispatch `call` unconditionally. Failures are the engine's to deal with.
    fn log_message(&self, call: &LogCall<'_>);
    /// Render & dispatch `call` only if it's enabled
    fn log_if_enabled(&self, call: &LogCall<'_>) {
        if self.is_enabled(call.severity, call.marker) {
            self.log_message(call)
        }
    }
}

/// The source of [`EngineLogger`]s.
pub trait Registry: Send + Sync {
    /// Look up, or create, the logger named `name`.
    ///
    /// `factory` is only used when the logger is created; if an existing logger is bound to a
    /// different strategy the engine should warn & rebind it (last write wins). `None` leaves an
    /// existing binding alone & selects [`ParameterizedMessageFactory`] for new loggers.
    fn logger(&self, name: &str, factory: Option<Arc<dyn MessageFactory>>)
        -> Arc<dyn EngineLogger>;
    /// Register a named level at `priority`; idempotent
    fn register_level(&self, name: &str, priority: u32) -> Result<CustomLevel>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                   helpers for implementations                                  //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The [`MessageFactory`] binding of one logger.
pub struct FactorySlot(RwLock<Arc<dyn MessageFactory>>);

impl FactorySlot {
    pub fn new(factory: Option<Arc<dyn MessageFactory>>) -> FactorySlot {
        FactorySlot(RwLock::new(
            factory.unwrap_or_else(|| Arc::new(ParameterizedMessageFactory)),
        ))
    }

    pub fn get(&self) -> Arc<dyn MessageFactory> {
        self.0.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Deal with a repeat request for logger `logger` that named factory `requested`
    pub fn reconcile(&self, logger: &str, requested: Option<Arc<dyn MessageFactory>>) {
        let Some(requested) = requested else {
            return;
        };
        let current = self.get();
        if current.name() != requested.name() {
            ::tracing::warn!(
                logger,
                current = current.name(),
                requested = requested.name(),
                "logger re-requested with a different message factory; rebinding"
            );
            *self.0.write().unwrap_or_else(|p| p.into_inner()) = requested;
        }
    }
}

impl std::fmt::Debug for FactorySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FactorySlot({})", self.get().name())
    }
}

/// Name -> logger cache, guaranteeing one logger per name.
#[derive(Debug)]
pub struct LoggerCache<L> {
    loggers: RwLock<HashMap<String, Arc<L>>>,
}

impl<L> std::default::Default for LoggerCache<L> {
    fn default() -> Self {
        LoggerCache {
            loggers: RwLock::new(HashMap::new()),
        }
    }
}

impl<L> LoggerCache<L> {
    /// Return the logger named `name`, building it with `make` if it doesn't exist yet
    pub fn get_or_insert_with<F: FnOnce() -> L>(&self, name: &str, make: F) -> (Arc<L>, bool) {
        if let Some(logger) = self
            .loggers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
        {
            return (logger.clone(), false);
        }
        let mut loggers = self.loggers.write().unwrap_or_else(|p| p.into_inner());
        if let Some(logger) = loggers.get(name) {
            return (logger.clone(), false);
        }
        let logger = Arc::new(make());
        loggers.insert(name.to_string(), logger.clone());
        (logger, true)
    }

    pub fn len(&self) -> usize {
        self.loggers.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render `err` followed by its chain of sources, separated by ": "
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod engine_tests {
    use super::*;

    use crate::message::SimpleMessageFactory;

    #[derive(Debug)]
    struct Inner;
    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk full")
        }
    }
    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);
    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "write failed")
        }
    }
    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain() {
        assert_eq!(error_chain(&Outer(Inner)), "write failed: disk full");
        assert_eq!(error_chain(&Inner), "disk full");
    }

    #[test]
    fn test_factory_slot() {
        let slot = FactorySlot::new(None);
        assert_eq!(slot.get().name(), "parameterized");
        slot.reconcile("svc", None);
        assert_eq!(slot.get().name(), "parameterized");
        slot.reconcile("svc", Some(Arc::new(SimpleMessageFactory)));
        assert_eq!(slot.get().name(), "simple");
    }

    #[test]
    fn test_cache() {
        let cache: LoggerCache<String> = LoggerCache::default();
        let (a, created_a) = cache.get_or_insert_with("svc", || "first".to_string());
        let (b, created_b) = cache.get_or_insert_with("svc", || "second".to_string());
        assert!(created_a);
        assert!(!created_b);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "first");
        assert_eq!(cache.len(), 1);
    }
}
