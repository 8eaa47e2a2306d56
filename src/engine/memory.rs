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

//! An engine that keeps everything in memory.
//!
//! [`MemoryEngine`] records each enabled call as a [`Record`] & counts how often it was asked
//! whether a call was enabled & how often it rendered a message. It's meant for tests: assert on
//! what the code under test logged, or that it did no formatting work at all when a severity was
//! switched off.
//!
//! ```rust
//! use unix_logger::{engine::memory::MemoryEngine, logger::Logger, severity::Severity};
//!
//! let engine = MemoryEngine::new();
//! engine.set_threshold(Severity::NOTICE);
//! let log = Logger::named(&engine, "svc");
//! log.crit("critical message");
//! log.debug("debug message");
//!
//! let records = engine.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].severity, Severity::CRIT);
//! assert_eq!(records[0].message, "critical message");
//! ```

use crate::{
    config::Filter,
    engine::{error_chain, EngineLogger, FactorySlot, LogCall, LoggerCache, Registry},
    error::Result,
    level::{CustomLevel, LevelTable},
    marker::Marker,
    message::MessageFactory,
    severity::{Severity, Threshold},
};

use chrono::prelude::*;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, RwLock,
};

/// One recorded log call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub logger: String,
    pub severity: Severity,
    pub marker: Option<String>,
    /// The shape of the payload the facade passed along (see [`Payload::kind`])
    ///
    /// [`Payload::kind`]: crate::message::Payload::kind
    pub payload_kind: &'static str,
    pub message: String,
    pub error: Option<String>,
    pub origin: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub timestamp: DateTime<Utc>,
}

/// State shared between the engine & all of its loggers
#[derive(Debug, Default)]
struct Shared {
    filter: RwLock<Filter>,
    records: Mutex<Vec<Record>>,
    enabled_checks: AtomicUsize,
    renders: AtomicUsize,
}

#[derive(Debug)]
pub struct MemoryLogger {
    name: String,
    factory: FactorySlot,
    shared: Arc<Shared>,
}

impl EngineLogger for MemoryLogger {
    fn name(&self) -> &str {
        &self.name
    }
    fn message_factory(&self) -> Arc<dyn MessageFactory> {
        self.factory.get()
    }
    fn is_enabled(&self, severity: Severity, marker: Option<&Marker>) -> bool {
        self.shared.enabled_checks.fetch_add(1, Ordering::Relaxed);
        self.shared
            .filter
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .enabled(&self.name, severity, marker)
    }
    fn log_message(&self, call: &LogCall<'_>) {
        self.shared.renders.fetch_add(1, Ordering::Relaxed);
        let record = Record {
            logger: self.name.clone(),
            severity: call.severity,
            marker: call.marker.map(|m| m.name().to_string()),
            payload_kind: call.payload.kind(),
            message: call.payload.render(self.factory.get().as_ref()),
            error: call.error().map(error_chain),
            origin: call.origin,
            file: call.location.file(),
            line: call.location.line(),
            timestamp: Utc::now(),
        };
        self.shared
            .records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(record);
    }
}

/// An in-memory [`Registry`]. Defaults to letting everything through.
#[derive(Debug)]
pub struct MemoryEngine {
    loggers: LoggerCache<MemoryLogger>,
    levels: LevelTable,
    shared: Arc<Shared>,
}

impl std::default::Default for MemoryEngine {
    fn default() -> Self {
        MemoryEngine::with_filter(Filter::new(Threshold::ALL))
    }
}

impl MemoryEngine {
    pub fn new() -> MemoryEngine {
        MemoryEngine::default()
    }

    pub fn with_filter(filter: Filter) -> MemoryEngine {
        MemoryEngine {
            loggers: LoggerCache::default(),
            levels: LevelTable::with_severities(),
            shared: Arc::new(Shared {
                filter: RwLock::new(filter),
                ..Default::default()
            }),
        }
    }

    /// Set the default threshold for all loggers (per-logger directives are kept)
    pub fn set_threshold<T: Into<Threshold>>(&self, threshold: T) {
        self.shared
            .filter
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .set_default(threshold.into());
    }

    pub fn set_filter(&self, filter: Filter) {
        *self.shared.filter.write().unwrap_or_else(|p| p.into_inner()) = filter;
    }

    /// A copy of everything recorded so far, in call order
    pub fn records(&self) -> Vec<Record> {
        self.shared
            .records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Drain the records
    pub fn take_records(&self) -> Vec<Record> {
        std::mem::take(
            &mut *self
                .shared
                .records
                .lock()
                .unwrap_or_else(|p| p.into_inner()),
        )
    }

    /// How many times any logger was asked whether a call was enabled
    pub fn enabled_checks(&self) -> usize {
        self.shared.enabled_checks.load(Ordering::Relaxed)
    }

    /// How many messages were rendered (i.e. how many calls reached the sink)
    pub fn renders(&self) -> usize {
        self.shared.renders.load(Ordering::Relaxed)
    }

    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }
}

impl Registry for MemoryEngine {
    fn logger(
        &self,
        name: &str,
        factory: Option<Arc<dyn MessageFactory>>,
    ) -> Arc<dyn EngineLogger> {
        let mut requested = factory.clone();
        let (logger, created) = self.loggers.get_or_insert_with(name, || MemoryLogger {
            name: name.to_string(),
            factory: FactorySlot::new(requested.take()),
            shared: self.shared.clone(),
        });
        if !created {
            logger.factory.reconcile(name, factory);
        }
        logger
    }
    fn register_level(&self, name: &str, priority: u32) -> Result<CustomLevel> {
        self.levels.register(name, priority)
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    use crate::{
        engine::ORIGIN,
        message::{Payload, SimpleMessageFactory},
    };

    #[test]
    fn test_one_logger_per_name() {
        let engine = MemoryEngine::new();
        let a = engine.logger("svc", None);
        let b = engine.logger("svc", None);
        let c = engine.logger("other", None);
        assert_eq!(
            Arc::as_ptr(&a) as *const (),
            Arc::as_ptr(&b) as *const ()
        );
        assert_ne!(
            Arc::as_ptr(&a) as *const (),
            Arc::as_ptr(&c) as *const ()
        );
        assert_eq!(engine.logger_count(), 2);
    }

    #[test]
    fn test_factory_last_write_wins() {
        let engine = MemoryEngine::new();
        let first = engine.logger("svc", None);
        assert_eq!(first.message_factory().name(), "parameterized");
        let second = engine.logger("svc", Some(Arc::new(SimpleMessageFactory)));
        assert_eq!(second.message_factory().name(), "simple");
        assert_eq!(first.message_factory().name(), "simple");
        // asking again without a factory changes nothing
        let third = engine.logger("svc", None);
        assert_eq!(third.message_factory().name(), "simple");
    }

    #[test]
    fn test_register_level() {
        let engine = MemoryEngine::new();
        assert_eq!(engine.levels().len(), 8);
        engine.register_level("NOTICE", 300).unwrap();
        engine.register_level("NOTICE", 300).unwrap();
        assert_eq!(engine.levels().len(), 8);
        assert!(engine.register_level("NOTICE", 301).is_err());
        engine.register_level("TRACE", 450).unwrap();
        assert_eq!(engine.levels().len(), 9);
    }

    #[test]
    fn test_log_if_enabled() {
        let engine = MemoryEngine::new();
        engine.set_threshold(Severity::WARNING);
        let logger = engine.logger("svc", None);
        let call = |severity| LogCall {
            origin: ORIGIN,
            location: std::panic::Location::caller(),
            severity,
            marker: None,
            payload: Payload::Text("hi"),
            error: None,
        };

        logger.log_if_enabled(&call(Severity::INFO));
        assert_eq!(engine.enabled_checks(), 1);
        assert_eq!(engine.renders(), 0);

        logger.log_if_enabled(&call(Severity::ALERT));
        assert_eq!(engine.enabled_checks(), 2);
        assert_eq!(engine.renders(), 1);

        let records = engine.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::ALERT);
        assert_eq!(records[0].message, "hi");
        assert_eq!(records[0].payload_kind, "text");
        assert_eq!(records[0].origin, ORIGIN);
        assert!(engine.records().is_empty());
    }
}
