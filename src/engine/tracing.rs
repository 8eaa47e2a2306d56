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

//! An engine that forwards log calls to [`tracing`].
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//!
//! [`TracingEngine`] turns each enabled call into a single [`tracing`] [`Event`], so that whatever
//! [`Subscriber`] the application has installed (a `fmt` layer, a syslog layer, ...) takes care of
//! formatting & output. [`tracing`] only knows five levels, so the severity is mapped via
//! [`Severity::to_tracing_level`] & the exact severity is attached as fields:
//!
//! [`Event`]: https://docs.rs/tracing/latest/tracing/struct.Event.html
//! [`Subscriber`]: https://docs.rs/tracing/latest/tracing/trait.Subscriber.html
//!
//! | field          | contents                                           |
//! |----------------|----------------------------------------------------|
//! | `logger`       | logger name                                        |
//! | `severity`     | severity name, e.g. "CRIT"                         |
//! | `priority`     | severity priority                                  |
//! | `syslog`       | `<syslog.h>` severity code                         |
//! | `marker`       | marker name, if any                                |
//! | `error`        | attached error & its sources, if any               |
//! | `backtrace`    | if so configured & an error is attached            |
//! | `origin`       | the facade                                         |
//! | `caller.file`  | caller's source file                               |
//! | `caller.line`  | caller's source line                               |
//! | `message`      | the rendered message                               |
//!
//! A call is enabled when the engine's [`Filter`] lets it through *and* the current [`Subscriber`]
//! is interested in an event at the mapped level with target [`TARGET`], so nothing gets rendered
//! for a [`Subscriber`] that would discard it anyway.
//!
//! ```rust
//! use unix_logger::{engine::tracing::TracingEngine, logger::Logger, severity::Severity};
//!
//! let engine = TracingEngine::builder()
//!     .threshold(Severity::NOTICE)
//!     .directive("svc::db", Severity::DEBUG)
//!     .deny_marker("AUDIT")
//!     .build();
//! let log = Logger::named(&engine, "svc");
//! log.notice("Hello, 世界!");
//! ```

use crate::{
    config::{Directive, Filter},
    engine::{error_chain, EngineLogger, FactorySlot, LogCall, LoggerCache, Registry},
    error::Result,
    level::{CustomLevel, LevelTable},
    marker::Marker,
    message::MessageFactory,
    severity::{Severity, Threshold},
};

use backtrace::Backtrace;
use tracing::level_filters::LevelFilter;

use std::sync::{Arc, RwLock};

/// The target of every event this engine emits
pub const TARGET: &str = "unix_logger";

#[derive(Debug)]
struct Shared {
    filter: RwLock<Filter>,
    capture_backtraces: bool,
}

#[derive(Debug)]
pub struct TracingLogger {
    name: String,
    factory: FactorySlot,
    shared: Arc<Shared>,
}

// `tracing`'s macros need the level as a constant, so dispatch on it here.
macro_rules! emit {
    ($level:expr, $($fields:tt)+) => {
        let level = $level;
        if level == ::tracing::Level::ERROR {
            ::tracing::event!(target: TARGET, ::tracing::Level::ERROR, $($fields)+)
        } else if level == ::tracing::Level::WARN {
            ::tracing::event!(target: TARGET, ::tracing::Level::WARN, $($fields)+)
        } else if level == ::tracing::Level::INFO {
            ::tracing::event!(target: TARGET, ::tracing::Level::INFO, $($fields)+)
        } else if level == ::tracing::Level::DEBUG {
            ::tracing::event!(target: TARGET, ::tracing::Level::DEBUG, $($fields)+)
        } else {
            ::tracing::event!(target: TARGET, ::tracing::Level::TRACE, $($fields)+)
        }
    };
}

// Would the current subscriber take an event at `level` from us?
fn subscriber_enabled(level: ::tracing::Level) -> bool {
    if level > LevelFilter::current() {
        false
    } else if level == ::tracing::Level::ERROR {
        ::tracing::enabled!(target: TARGET, ::tracing::Level::ERROR)
    } else if level == ::tracing::Level::WARN {
        ::tracing::enabled!(target: TARGET, ::tracing::Level::WARN)
    } else if level == ::tracing::Level::INFO {
        ::tracing::enabled!(target: TARGET, ::tracing::Level::INFO)
    } else if level == ::tracing::Level::DEBUG {
        ::tracing::enabled!(target: TARGET, ::tracing::Level::DEBUG)
    } else {
        ::tracing::enabled!(target: TARGET, ::tracing::Level::TRACE)
    }
}

impl EngineLogger for TracingLogger {
    fn name(&self) -> &str {
        &self.name
    }
    fn message_factory(&self) -> Arc<dyn MessageFactory> {
        self.factory.get()
    }
    fn is_enabled(&self, severity: Severity, marker: Option<&Marker>) -> bool {
        subscriber_enabled(severity.to_tracing_level())
            && self
                .shared
                .filter
                .read()
                .unwrap_or_else(|p| p.into_inner())
                .enabled(&self.name, severity, marker)
    }
    fn log_message(&self, call: &LogCall<'_>) {
        let message = call.payload.render(self.factory.get().as_ref());
        let error = call.error().map(error_chain);
        let backtrace = match (&error, self.shared.capture_backtraces) {
            (Some(_), true) => Some(format!("{:?}", Backtrace::new())),
            _ => None,
        };
        let marker = call.marker.map(Marker::name);
        emit!(
            call.severity.to_tracing_level(),
            logger = self.name.as_str(),
            severity = call.severity.name(),
            priority = call.severity.priority(),
            syslog = call.severity.syslog_code(),
            marker,
            error = error.as_deref(),
            backtrace = backtrace.as_deref(),
            origin = call.origin,
            caller.file = call.location.file(),
            caller.line = call.location.line(),
            "{}",
            message
        );
    }
}

/// A [`Registry`] whose loggers emit [`tracing`] events.
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
#[derive(Debug)]
pub struct TracingEngine {
    loggers: LoggerCache<TracingLogger>,
    levels: LevelTable,
    shared: Arc<Shared>,
}

impl TracingEngine {
    pub fn builder() -> TracingEngineBuilder {
        TracingEngineBuilder::default()
    }

    /// Replace the default threshold; takes effect for all loggers, immediately
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

    pub fn filter(&self) -> Filter {
        self.shared
            .filter
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }
}

impl std::default::Default for TracingEngine {
    fn default() -> Self {
        TracingEngine::builder().build()
    }
}

impl Registry for TracingEngine {
    fn logger(
        &self,
        name: &str,
        factory: Option<Arc<dyn MessageFactory>>,
    ) -> Arc<dyn EngineLogger> {
        let mut requested = factory.clone();
        let (logger, created) = self.loggers.get_or_insert_with(name, || TracingLogger {
            name: name.to_string(),
            factory: FactorySlot::new(requested.take()),
            shared: self.shared.clone(),
        });
        if created {
            ::tracing::debug!(logger = name, "created logger");
        } else {
            logger.factory.reconcile(name, factory);
        }
        logger
    }
    fn register_level(&self, name: &str, priority: u32) -> Result<CustomLevel> {
        self.levels.register(name, priority)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                   struct TracingEngineBuilder                                  //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct TracingEngineBuilder {
    filter: Filter,
    capture_backtraces: bool,
}

impl TracingEngineBuilder {
    /// Set the default threshold
    pub fn threshold<T: Into<Threshold>>(mut self, threshold: T) -> Self {
        self.filter.set_default(threshold.into());
        self
    }
    /// Override the threshold for `logger` & its descendants
    pub fn directive<S: Into<String>, T: Into<Threshold>>(mut self, logger: S, threshold: T) -> Self {
        self.filter
            .add_directive(Directive::new(logger, threshold.into()));
        self
    }
    /// Disable calls tagged with `marker` (or a descendant of it)
    pub fn deny_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.filter = self.filter.deny_marker(marker);
        self
    }
    /// Replace the filter wholesale
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
    /// Replace the filter with the directives in environment variable `var`
    pub fn from_env(self, var: &str) -> Result<Self> {
        Ok(self.filter(Filter::from_env(var)?))
    }
    /// Attach a backtrace of the logging call to events that carry an error
    pub fn capture_backtraces(mut self, capture: bool) -> Self {
        self.capture_backtraces = capture;
        self
    }
    pub fn build(self) -> TracingEngine {
        TracingEngine {
            loggers: LoggerCache::default(),
            levels: LevelTable::with_severities(),
            shared: Arc::new(Shared {
                filter: RwLock::new(self.filter),
                capture_backtraces: self.capture_backtraces,
            }),
        }
    }
}
