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

//! syslog severity definitions.
//!
//! [`Severity`] replicates the eight names used in `<syslog.h>`; [`Threshold`] is the "how verbose"
//! knob engines consult when deciding whether a call is enabled.

use crate::error::{Error, Result};

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// The eight syslog severities, most urgent first.
///
/// Each carries a priority: an engine-internal token used for filtering. Priorities increase
/// strictly in declaration order (EMERG lowest, DEBUG highest), so that the derived [`Ord`] and
/// the priority ordering agree. They are *not* the `<syslog.h>` numbers; use
/// [`Severity::syslog_code`] for those.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// system is unusable
    EMERG,
    /// action must be taken immediately
    ALERT,
    /// critical conditions
    CRIT,
    /// error conditions
    ERROR,
    /// warning conditions
    WARNING,
    /// normal, but significant condition
    NOTICE,
    /// informational message
    INFO,
    /// debug-level message
    DEBUG,
}

impl Severity {
    /// All eight severities, in priority order
    pub const ALL: [Severity; 8] = [
        Severity::EMERG,
        Severity::ALERT,
        Severity::CRIT,
        Severity::ERROR,
        Severity::WARNING,
        Severity::NOTICE,
        Severity::INFO,
        Severity::DEBUG,
    ];

    /// The priority with which this severity is registered with an engine
    pub const fn priority(self) -> u32 {
        match self {
            Severity::EMERG => 50,
            Severity::ALERT => 100,
            Severity::CRIT => 150,
            Severity::ERROR => 200,
            Severity::WARNING => 250,
            Severity::NOTICE => 300,
            Severity::INFO => 350,
            Severity::DEBUG => 400,
        }
    }

    /// The corresponding `LOG_*` constant from `<syslog.h>`
    pub const fn syslog_code(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Severity::EMERG => "EMERG",
            Severity::ALERT => "ALERT",
            Severity::CRIT => "CRIT",
            Severity::ERROR => "ERROR",
            Severity::WARNING => "WARNING",
            Severity::NOTICE => "NOTICE",
            Severity::INFO => "INFO",
            Severity::DEBUG => "DEBUG",
        }
    }

    /// Map onto the (coarser) [`tracing`] levels.
    ///
    /// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
    ///
    /// [`tracing`] has no counterpart to EMERG, ALERT, CRIT or NOTICE, so several severities share
    /// a [`tracing::Level`]; engines that care about the difference must carry the [`Severity`]
    /// along as well.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Severity::EMERG | Severity::ALERT | Severity::CRIT | Severity::ERROR => {
                tracing::Level::ERROR
            }
            Severity::WARNING => tracing::Level::WARN,
            Severity::NOTICE | Severity::INFO => tracing::Level::INFO,
            Severity::DEBUG => tracing::Level::DEBUG,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;
    /// Case-insensitive; accepts the `<syslog.h>` spellings (`LOG_ERR`, `LOG_WARNING`...) as well
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("LOG_").unwrap_or(&upper);
        match bare {
            "EMERG" => Ok(Severity::EMERG),
            "ALERT" => Ok(Severity::ALERT),
            "CRIT" => Ok(Severity::CRIT),
            "ERROR" | "ERR" => Ok(Severity::ERROR),
            "WARNING" | "WARN" => Ok(Severity::WARNING),
            "NOTICE" => Ok(Severity::NOTICE),
            "INFO" => Ok(Severity::INFO),
            "DEBUG" => Ok(Severity::DEBUG),
            _ => Err(Error::BadSeverity {
                text: s.to_string(),
                back: Backtrace::new(),
            }),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        struct Threshold                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The most verbose [`Severity`] that will be let through, or nothing at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Threshold(Option<Severity>);

impl Threshold {
    /// Let nothing through
    pub const OFF: Threshold = Threshold(None);
    /// Let everything through
    pub const ALL: Threshold = Threshold(Some(Severity::DEBUG));

    /// `severity` is enabled iff its priority doesn't exceed that of the threshold
    pub fn enables(&self, severity: Severity) -> bool {
        self.0
            .map(|max| severity.priority() <= max.priority())
            .unwrap_or(false)
    }

    pub fn severity(&self) -> Option<Severity> {
        self.0
    }
}

impl std::default::Default for Threshold {
    fn default() -> Self {
        Threshold(Some(Severity::INFO))
    }
}

impl From<Severity> for Threshold {
    fn from(severity: Severity) -> Self {
        Threshold(Some(severity))
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        match self.0 {
            Some(severity) => write!(f, "{}", severity),
            None => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for Threshold {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Threshold::OFF),
            "all" => Ok(Threshold::ALL),
            _ => s.parse::<Severity>().map(Threshold::from),
        }
    }
}
