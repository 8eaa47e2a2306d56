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

//! [unix-logger](crate) errors

use backtrace::Backtrace;

/// [unix-logger](crate) error type
///
/// Note that none of the logging calls themselves return this: logging must never fail the
/// caller's primary operation. Errors only arise when configuring an engine or registering levels.
#[non_exhaustive]
pub enum Error {
    /// Text that doesn't name one of the eight severities
    BadSeverity { text: String, back: Backtrace },
    /// A filter directive that couldn't be parsed
    BadDirective { directive: String, back: Backtrace },
    /// A level name was registered a second time with a different priority
    ConflictingLevel {
        name: String,
        existing: u32,
        requested: u32,
        back: Backtrace,
    },
    /// Failed to read configuration from the environment
    Env {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadSeverity { text, .. } => {
                write!(f, "'{}' is not a syslog severity", text)
            }
            Error::BadDirective { directive, .. } => {
                write!(f, "Couldn't parse filter directive '{}'", directive)
            }
            Error::ConflictingLevel {
                name,
                existing,
                requested,
                ..
            } => write!(
                f,
                "Level {} is already registered with priority {}; can't re-register it at {}",
                name, existing, requested
            ),
            Error::Env { name, source, .. } => {
                write!(f, "While reading ${}, got {}", name, source)
            }
            _ => write!(f, "Other unix-logger error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadSeverity { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::BadDirective { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::ConflictingLevel { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Env { back, .. } => write!(f, "{}\n{:#?}", self, back),
            err => write!(f, "unix-logger error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Env { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
