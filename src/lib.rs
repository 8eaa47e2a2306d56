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
//! A logging facade speaking the eight [`syslog`] severities
//!
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//!
//! # Introduction
//!
//! Most Rust logging crates offer five levels: error, warn, info, debug & trace. [`syslog`]
//! offers eight: EMERG, ALERT, CRIT, ERR, WARNING, NOTICE, INFO & DEBUG. Code written with the
//! latter in mind (daemons, mostly) tends to want to say "this is critical" rather than "this is
//! an error, and I really mean it".
//!
//! [`syslog`]: https://man7.org/linux/man-pages/man3/syslog.3.html
//!
//! This crate provides a [`Logger`] with one method per [`syslog`] severity. It does no real work
//! itself: each call is handed to a logging *engine* that decides whether the call is enabled,
//! renders the message & sends it on its way. The facade's only promise is that it asks first:
//! if the severity is disabled, nothing gets formatted.
//!
//! [`Logger`]: crate::logger::Logger
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//!
//! # Usage
//!
//! ```rust
//! use unix_logger::{engine::tracing::TracingEngine, logger::Logger, severity::Severity};
//!
//! // Events are forwarded to whatever `tracing` subscriber is installed.
//! let engine = TracingEngine::builder().threshold(Severity::NOTICE).build();
//! let log = Logger::named(&engine, "svc");
//!
//! log.crit("critical message");
//! log.notice("notice message");
//! log.debug("debug message"); // below the threshold: never rendered
//! ```
//!
//! The engine is passed explicitly rather than looked-up from a global. Tests can use
//! [`MemoryEngine`] to see exactly what was logged:
//!
//! [`MemoryEngine`]: crate::engine::memory::MemoryEngine
//!
//! ```rust
//! use unix_logger::{engine::memory::MemoryEngine, logger::Logger, severity::Severity};
//!
//! let engine = MemoryEngine::new();
//! let log = Logger::named(&engine, "svc");
//! log.crit("critical message");
//! assert_eq!(engine.records()[0].severity, Severity::CRIT);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod level;
pub mod logger;
pub mod marker;
pub mod message;
pub mod severity;
