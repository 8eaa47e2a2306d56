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

//! The facade: one method per syslog severity.
//!
//! # Creating a Logger
//!
//! A [`Logger`] is bound to a name, which is resolved by [`LoggerBuilder::build`] from the first
//! of these that was given:
//!
//! 1. an explicit name ([`LoggerBuilder::name`])
//! 2. a type ([`LoggerBuilder::for_type`]); its [`std::any::type_name`] is used
//! 3. a value ([`LoggerBuilder::for_value`]); the name of its type is used
//! 4. nothing: the source file of the code calling [`LoggerBuilder::build`]
//!
//! The [`logger!`](crate::logger!) macro covers the common case of naming the logger after the
//! calling module.
//!
//! # Logging
//!
//! Each severity method takes anything convertible to an [`Entry`]: a `&str`, a `&String`, the
//! result of [`format_args!`], any [`Payload`], or an [`Entry`] built up with a marker and/or an
//! error:
//!
//! ```rust
//! use unix_logger::{
//!     engine::memory::MemoryEngine, logger::{Entry, Logger}, marker::Marker, message::Payload,
//! };
//!
//! let engine = MemoryEngine::new();
//! let log = Logger::named(&engine, "svc");
//! let audit = Marker::new("AUDIT");
//! let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! let user = "root";
//!
//! log.notice("plain text");
//! log.info(format_args!("user {} logged in", user));
//! log.warning(Payload::format("user {} logged in", &[&user]));
//! log.alert(Entry::new("login").marker(&audit));
//! log.crit(Entry::new("write failed").error(&err));
//! log.debug(Payload::lazy(&|| format!("{:?}", std::env::args())));
//!
//! assert_eq!(engine.records().len(), 6);
//! ```
//!
//! Every call first asks the engine whether the severity is enabled for this logger (and marker);
//! if not, it returns without rendering anything. Arguments the caller evaluated before the call
//! can't be helped, of course: hand expensive ones over via [`Payload::Lazy`] or [`format_args!`].
//!
//! Logging never fails. Whatever goes wrong downstream is the engine's business.

use crate::{
    engine::{EngineLogger, LogCall, Registry, ORIGIN},
    marker::Marker,
    message::{MessageFactory, Payload},
    severity::Severity,
};

use std::{panic::Location, sync::Arc};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           struct Entry                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// What the caller hands to a severity method: a payload, plus an optional marker & error.
#[derive(Clone, Copy, Debug)]
pub struct Entry<'a> {
    marker: Option<&'a Marker>,
    payload: Payload<'a>,
    error: Option<&'a dyn std::error::Error>,
}

impl<'a> Entry<'a> {
    pub fn new<P: Into<Payload<'a>>>(payload: P) -> Entry<'a> {
        Entry {
            marker: None,
            payload: payload.into(),
            error: None,
        }
    }
    /// Tag this entry with `marker`
    pub fn marker(mut self, marker: &'a Marker) -> Entry<'a> {
        self.marker = Some(marker);
        self
    }
    /// Attach `error` to this entry
    pub fn error(mut self, error: &'a dyn std::error::Error) -> Entry<'a> {
        self.error = Some(error);
        self
    }
    pub fn payload(&self) -> Payload<'a> {
        self.payload
    }
}

impl<'a> From<Payload<'a>> for Entry<'a> {
    fn from(payload: Payload<'a>) -> Self {
        Entry::new(payload)
    }
}

impl<'a> From<&'a str> for Entry<'a> {
    fn from(text: &'a str) -> Self {
        Entry::new(text)
    }
}

impl<'a> From<&'a String> for Entry<'a> {
    fn from(text: &'a String) -> Self {
        Entry::new(text)
    }
}

impl<'a> From<std::fmt::Arguments<'a>> for Entry<'a> {
    fn from(args: std::fmt::Arguments<'a>) -> Self {
        Entry::new(args)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          struct Logger                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A named logger exposing the eight syslog severities.
///
/// Cheap to clone; clones (and other [`Logger`]s obtained from the same [`Registry`] under the same
/// name) share one engine logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<dyn EngineLogger>,
}

macro_rules! severity_methods {
    ($($(#[$doc:meta])* $method:ident => $severity:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[track_caller]
            pub fn $method<'a, E: Into<Entry<'a>>>(&self, entry: E) {
                self.dispatch(Severity::$severity, entry.into(), Location::caller())
            }
        )+
    };
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// The logger named `name`
    pub fn named(registry: &dyn Registry, name: &str) -> Logger {
        Logger::builder().name(name).build(registry)
    }

    /// The logger named after type `T`
    pub fn for_type<T: ?Sized>(registry: &dyn Registry) -> Logger {
        Logger::builder().for_type::<T>().build(registry)
    }

    /// Wrap an engine logger directly
    pub fn from_engine_logger(inner: Arc<dyn EngineLogger>) -> Logger {
        Logger { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn message_factory(&self) -> Arc<dyn MessageFactory> {
        self.inner.message_factory()
    }

    pub fn engine_logger(&self) -> &Arc<dyn EngineLogger> {
        &self.inner
    }

    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.inner.is_enabled(severity, None)
    }

    pub fn is_enabled_with_marker(&self, severity: Severity, marker: &Marker) -> bool {
        self.inner.is_enabled(severity, Some(marker))
    }

    /// Log `entry` at `severity`
    #[track_caller]
    pub fn log<'a, E: Into<Entry<'a>>>(&self, severity: Severity, entry: E) {
        self.dispatch(severity, entry.into(), Location::caller())
    }

    severity_methods! {
        /// Log at EMERG: the system is unusable
        emerg => EMERG,
        /// Log at ALERT: action must be taken immediately
        alert => ALERT,
        /// Log at CRIT: critical conditions
        crit => CRIT,
        /// Log at ERROR: error conditions
        error => ERROR,
        /// Log at WARNING: warning conditions
        warning => WARNING,
        /// Log at NOTICE: normal, but significant, conditions
        notice => NOTICE,
        /// Log at INFO: informational messages
        info => INFO,
        /// Log at DEBUG: debug-level messages
        debug => DEBUG,
    }

    fn dispatch(&self, severity: Severity, entry: Entry<'_>, location: &'static Location<'static>) {
        self.inner.log_if_enabled(&LogCall {
            origin: ORIGIN,
            location,
            severity,
            marker: entry.marker,
            payload: entry.payload,
            error: entry.error,
        })
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name())
            .field("message_factory", &self.message_factory().name())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       struct LoggerBuilder                                     //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
pub struct LoggerBuilder {
    name: Option<String>,
    type_name: Option<&'static str>,
    value_type_name: Option<&'static str>,
    factory: Option<Arc<dyn MessageFactory>>,
}

impl LoggerBuilder {
    /// Name the logger explicitly
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
    /// Name the logger after type `T`
    pub fn for_type<T: ?Sized>(mut self) -> Self {
        self.type_name = Some(std::any::type_name::<T>());
        self
    }
    /// Name the logger after the type of `value`
    pub fn for_value<T: ?Sized>(mut self, value: &T) -> Self {
        self.value_type_name = Some(std::any::type_name_of_val(value));
        self
    }
    /// Use `factory` to build messages. Only honored when the engine creates the logger; if it
    /// already exists with a different factory the engine will complain & rebind it.
    pub fn message_factory(mut self, factory: Arc<dyn MessageFactory>) -> Self {
        self.factory = Some(factory);
        self
    }
    #[track_caller]
    pub fn build(self, registry: &dyn Registry) -> Logger {
        let name = self
            .name
            .or_else(|| self.type_name.map(str::to_string))
            .or_else(|| self.value_type_name.map(str::to_string))
            .unwrap_or_else(|| name_from_location(Location::caller()));
        Logger {
            inner: registry.logger(&name, self.factory),
        }
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("value_type_name", &self.value_type_name)
            .field("factory", &self.factory.as_ref().map(|f| f.name()))
            .finish()
    }
}

fn name_from_location(location: &Location<'_>) -> String {
    name_from_path(location.file())
}

/// "src/net/server.rs" => "net::server"; anything up to & including the last `src` component, as
/// well as a drive prefix, is dropped
fn name_from_path(file: &str) -> String {
    let file = file.strip_suffix(".rs").unwrap_or(file);
    let file = match file.as_bytes() {
        [drive, b':', ..] if drive.is_ascii_alphabetic() => &file[2..],
        _ => file,
    };
    let parts: Vec<&str> = file
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let parts = match parts.iter().rposition(|part| *part == "src") {
        Some(idx) if idx + 1 < parts.len() => &parts[idx + 1..],
        _ => &parts[..],
    };
    parts.join("::")
}

/// Create a [`Logger`] named after the calling module.
///
/// ```rust
/// use unix_logger::{engine::memory::MemoryEngine, logger};
/// let engine = MemoryEngine::new();
/// let log = logger!(&engine);
/// assert_eq!(log.name(), module_path!());
/// ```
///
/// A [`MessageFactory`] may be given as a second argument.
#[macro_export]
macro_rules! logger {
    ($registry:expr) => {
        $crate::logger::Logger::builder()
            .name(::std::module_path!())
            .build($registry)
    };
    ($registry:expr, $factory:expr) => {
        $crate::logger::Logger::builder()
            .name(::std::module_path!())
            .message_factory($factory)
            .build($registry)
    };
}

#[cfg(test)]
mod logger_tests {
    use super::*;

    use crate::{
        engine::memory::MemoryEngine,
        message::{ParameterizedMessage, SimpleMessageFactory},
        severity::Threshold,
    };

    use std::cell::Cell;

    #[derive(Debug)]
    struct Boom;
    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }
    impl std::error::Error for Boom {}

    // Call the method for `severity` on `log`
    fn by_severity<'a>(log: &Logger, severity: Severity, entry: Entry<'a>) {
        match severity {
            Severity::EMERG => log.emerg(entry),
            Severity::ALERT => log.alert(entry),
            Severity::CRIT => log.crit(entry),
            Severity::ERROR => log.error(entry),
            Severity::WARNING => log.warning(entry),
            Severity::NOTICE => log.notice(entry),
            Severity::INFO => log.info(entry),
            Severity::DEBUG => log.debug(entry),
        }
    }

    #[test]
    fn test_end_to_end() {
        let engine = MemoryEngine::new();
        engine.set_threshold(Severity::DEBUG);
        let log = Logger::named(&engine, "svc");
        log.crit("critical message");
        log.notice("notice message");
        log.debug("debug message");

        let records = engine.take_records();
        assert_eq!(records.len(), 3);
        let got: Vec<_> = records
            .iter()
            .map(|r| (r.severity, r.message.as_str(), r.logger.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Severity::CRIT, "critical message", "svc"),
                (Severity::NOTICE, "notice message", "svc"),
                (Severity::DEBUG, "debug message", "svc"),
            ]
        );
        assert!(records.iter().all(|r| r.origin == ORIGIN));
        // the caller's location, not the facade's
        assert!(records.iter().all(|r| r.file == file!()));

        engine.set_threshold(Severity::NOTICE);
        log.debug("x");
        assert!(engine.records().is_empty());
    }

    #[test]
    fn test_disabled_does_no_work() {
        let engine = MemoryEngine::new();
        engine.set_threshold(Threshold::OFF);
        let log = Logger::named(&engine, "svc");

        let evaluated = Cell::new(0);
        let producer = || {
            evaluated.set(evaluated.get() + 1);
            "expensive".to_string()
        };
        let msg = ParameterizedMessage::new("{}", &[&1]);
        let n = 5;
        let args: [&dyn std::fmt::Display; 1] = [&n];
        let marker = Marker::new("AUDIT");

        for severity in Severity::ALL {
            by_severity(&log, severity, Entry::new("text"));
            by_severity(&log, severity, Payload::format("n={}", &args).into());
            by_severity(&log, severity, format_args!("n={}", n).into());
            by_severity(&log, severity, Payload::structured(&msg).into());
            by_severity(&log, severity, Payload::value(&n).into());
            by_severity(&log, severity, Payload::lazy(&producer).into());
            by_severity(
                &log,
                severity,
                Entry::new("tagged").marker(&marker).error(&Boom),
            );
        }
        assert_eq!(evaluated.get(), 0);
        assert_eq!(engine.renders(), 0);
        assert_eq!(engine.enabled_checks(), 7 * 8);
        assert!(engine.records().is_empty());
    }

    #[test]
    fn test_enabled_forwards_exactly_once() {
        let engine = MemoryEngine::new();
        let log = Logger::named(&engine, "svc");
        let marker = Marker::new("AUDIT");
        let n = 5;
        let args: [&dyn std::fmt::Display; 1] = [&n];
        let msg = ParameterizedMessage::new("{} {}", &[&"a", &"b"]);

        for severity in Severity::ALL {
            by_severity(&log, severity, Entry::new("plain"));
            by_severity(&log, severity, Payload::format("n={}", &args).into());
            by_severity(&log, severity, Payload::structured(&msg).into());
            by_severity(&log, severity, Payload::value(&n).into());
            by_severity(
                &log,
                severity,
                Entry::new("tagged").marker(&marker).error(&Boom),
            );

            let records = engine.take_records();
            assert_eq!(records.len(), 5);
            assert!(records.iter().all(|r| r.severity == severity));
            let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
            assert_eq!(messages, vec!["plain", "n=5", "a b", "5", "tagged"]);
            let kinds: Vec<_> = records.iter().map(|r| r.payload_kind).collect();
            assert_eq!(kinds, vec!["text", "format", "structured", "value", "text"]);
            assert!(records[..4]
                .iter()
                .all(|r| r.marker.is_none() && r.error.is_none()));
            assert_eq!(records[4].marker.as_deref(), Some("AUDIT"));
            assert_eq!(records[4].error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn test_lazy_evaluated_once_when_enabled() {
        let engine = MemoryEngine::new();
        let log = Logger::named(&engine, "svc");
        let evaluated = Cell::new(0);
        let producer = || {
            evaluated.set(evaluated.get() + 1);
            "expensive".to_string()
        };
        log.debug(Payload::lazy(&producer));
        assert_eq!(evaluated.get(), 1);
        assert_eq!(engine.records()[0].message, "expensive");
    }

    #[test]
    fn test_marker_filtering() {
        let engine = MemoryEngine::with_filter(
            crate::config::Filter::new(Threshold::ALL).deny_marker("AUDIT"),
        );
        let log = Logger::named(&engine, "svc");
        let audit = Marker::new("AUDIT");
        let login = Marker::with_parents("LOGIN", vec![audit.clone()]);
        assert!(!log.is_enabled_with_marker(Severity::EMERG, &login));
        assert!(log.is_enabled(Severity::EMERG));
        log.emerg(Entry::new("dropped").marker(&login));
        log.emerg(Entry::new("kept").marker(&Marker::new("OTHER")));
        let records = engine.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
    }

    #[test]
    fn test_log_and_is_enabled() {
        let engine = MemoryEngine::new();
        engine.set_threshold(Severity::WARNING);
        let log = Logger::named(&engine, "svc");
        assert!(log.is_enabled(Severity::EMERG));
        assert!(log.is_enabled(Severity::WARNING));
        assert!(!log.is_enabled(Severity::NOTICE));
        log.log(Severity::ERROR, "via log");
        log.log(Severity::INFO, "dropped");
        let records = engine.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::ERROR);
    }

    struct Widget;

    #[test]
    fn test_naming() {
        let engine = MemoryEngine::new();

        assert_eq!(Logger::named(&engine, "svc").name(), "svc");
        assert_eq!(
            Logger::for_type::<Widget>(&engine).name(),
            std::any::type_name::<Widget>()
        );
        assert_eq!(
            Logger::builder().for_value(&Widget).build(&engine).name(),
            std::any::type_name::<Widget>()
        );
        // an explicit name beats a type, which beats a value
        assert_eq!(
            Logger::builder()
                .for_value(&1u8)
                .for_type::<Widget>()
                .name("explicit")
                .build(&engine)
                .name(),
            "explicit"
        );
        assert_eq!(
            Logger::builder()
                .for_value(&1u8)
                .for_type::<Widget>()
                .build(&engine)
                .name(),
            std::any::type_name::<Widget>()
        );
        // nothing given: the caller's source file
        assert_eq!(
            Logger::builder().build(&engine).name(),
            name_from_location(Location::caller())
        );
        assert_eq!(crate::logger!(&engine).name(), module_path!());
    }

    #[test]
    fn test_name_from_location() {
        // `Location` can't be constructed by hand, so check against our own.
        let here = Location::caller();
        assert_eq!(name_from_location(here), "logger");
    }

    #[test]
    fn test_name_from_path() {
        assert_eq!(name_from_path("src/net/server.rs"), "net::server");
        assert_eq!(name_from_path("./src/lib.rs"), "lib");
        assert_eq!(
            name_from_path("/home/u/.cargo/registry/src/index-6f17/foo-1.0/src/net/server.rs"),
            "net::server"
        );
        assert_eq!(name_from_path("C:\\proj\\src\\lib.rs"), "lib");
        assert_eq!(name_from_path("C:\\proj\\build.rs"), "proj::build");
        assert_eq!(name_from_path("tests/smoke.rs"), "tests::smoke");
    }

    #[test]
    fn test_from_engine_logger() {
        let engine = MemoryEngine::new();
        let log = Logger::from_engine_logger(engine.logger("svc", None));
        assert_eq!(log.name(), "svc");
        log.warning("low disk");
        let records = engine.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].logger, "svc");
        assert_eq!(records[0].severity, Severity::WARNING);
        assert_eq!(records[0].message, "low disk");
        // the same engine logger a builder would have handed out
        assert_eq!(
            Arc::as_ptr(log.engine_logger()) as *const (),
            Arc::as_ptr(Logger::named(&engine, "svc").engine_logger()) as *const ()
        );
    }

    #[test]
    fn test_same_name_same_engine_logger() {
        let engine = MemoryEngine::new();
        let a = Logger::named(&engine, "svc");
        let b = Logger::named(&engine, "svc");
        assert_eq!(
            Arc::as_ptr(a.engine_logger()) as *const (),
            Arc::as_ptr(b.engine_logger()) as *const ()
        );
        assert_eq!(engine.logger_count(), 1);
    }

    #[test]
    fn test_factory_mismatch_is_not_fatal() {
        let engine = MemoryEngine::new();
        let a = Logger::named(&engine, "svc");
        let b = Logger::builder()
            .name("svc")
            .message_factory(Arc::new(SimpleMessageFactory))
            .build(&engine);
        assert_eq!(b.message_factory().name(), "simple");
        // last write wins, for every handle on that name
        assert_eq!(a.message_factory().name(), "simple");
        let x = 1;
        a.info(Payload::format("x={}", &[&x]));
        assert_eq!(engine.records()[0].message, "x={}");
        assert_eq!(engine.logger_count(), 1);
    }

    #[test]
    fn test_concurrent_use() {
        let engine = Arc::new(MemoryEngine::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = engine.clone();
                std::thread::spawn(move || {
                    let log = Logger::named(engine.as_ref(), "svc");
                    for j in 0..25 {
                        log.info(format_args!("{}-{}", i, j));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(engine.records().len(), 100);
        assert_eq!(engine.logger_count(), 1);
    }
}
