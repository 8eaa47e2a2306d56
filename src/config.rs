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

//! Engine configuration: which calls are enabled.
//!
//! A [`Filter`] is a default [`Threshold`], a list of per-logger overrides & a list of denied
//! markers. It can be assembled in code, or parsed from a comma-separated list of directives:
//!
//! ```text
//! notice,svc=debug,svc::db=warning,!AUDIT
//! ```
//!
//! - a bare severity (or `off`, or `all`) sets the default threshold
//! - `name=severity` sets the threshold for logger `name` & its descendants; descendants are
//!   separated by `::` or `.`, and the longest matching name wins
//! - `!marker` disables every call tagged with that marker, or with any marker descending from it
//!
//! ```rust
//! use unix_logger::{config::Filter, severity::Severity};
//! let filter: Filter = "notice,svc=debug,!AUDIT".parse().unwrap();
//! assert!(filter.enabled("svc::db", Severity::DEBUG, None));
//! assert!(!filter.enabled("other", Severity::INFO, None));
//! ```

use crate::{
    error::{Error, Result},
    marker::Marker,
    severity::{Severity, Threshold},
};

use backtrace::Backtrace;

/// The environment variable consulted by [`Filter::from_env_default`]
pub const DEFAULT_ENV: &str = "UNIX_LOGGER";

/// A threshold for one logger & its descendants
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    logger: String,
    threshold: Threshold,
}

impl Directive {
    pub fn new<S: Into<String>>(logger: S, threshold: Threshold) -> Directive {
        Directive {
            logger: logger.into(),
            threshold,
        }
    }
    pub fn logger(&self) -> &str {
        &self.logger
    }
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }
    /// Does this directive cover logger `name`?
    fn matches(&self, name: &str) -> bool {
        match name.strip_prefix(self.logger.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
            None => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    default: Threshold,
    directives: Vec<Directive>,
    denied_markers: Vec<String>,
}

impl Filter {
    pub fn new(default: Threshold) -> Filter {
        Filter {
            default,
            directives: Vec::new(),
            denied_markers: Vec::new(),
        }
    }

    /// Override the threshold for `logger` & its descendants, replacing any earlier override for
    /// the same name
    pub fn with_directive<S: Into<String>>(mut self, logger: S, threshold: Threshold) -> Filter {
        self.add_directive(Directive::new(logger, threshold));
        self
    }

    pub fn deny_marker<S: Into<String>>(mut self, marker: S) -> Filter {
        self.denied_markers.push(marker.into());
        self
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.directives.retain(|d| d.logger != directive.logger);
        self.directives.push(directive);
    }

    pub fn set_default(&mut self, threshold: Threshold) {
        self.default = threshold;
    }

    pub fn default_threshold(&self) -> Threshold {
        self.default
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// The threshold in effect for logger `name`
    pub fn threshold_for(&self, name: &str) -> Threshold {
        self.directives
            .iter()
            .filter(|d| d.matches(name))
            .max_by_key(|d| d.logger.len())
            .map(|d| d.threshold)
            .unwrap_or(self.default)
    }

    /// Would a call at `severity`, tagged with `marker`, on logger `name` be let through?
    pub fn enabled(&self, name: &str, severity: Severity, marker: Option<&Marker>) -> bool {
        if !self.threshold_for(name).enables(severity) {
            return false;
        }
        match marker {
            Some(marker) => !self
                .denied_markers
                .iter()
                .any(|denied| marker.is_instance_of_name(denied)),
            None => true,
        }
    }

    /// Parse a comma-separated directive list (see the [module](self) docs)
    pub fn parse(text: &str) -> Result<Filter> {
        let mut filter = Filter::default();
        for directive in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let bad = || Error::BadDirective {
                directive: directive.to_string(),
                back: Backtrace::new(),
            };
            if let Some(marker) = directive.strip_prefix('!') {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(bad());
                }
                filter.denied_markers.push(marker.to_string());
            } else if let Some((logger, threshold)) = directive.split_once('=') {
                let logger = logger.trim();
                if logger.is_empty() {
                    return Err(bad());
                }
                let threshold = threshold.parse::<Threshold>().map_err(|_| bad())?;
                filter.add_directive(Directive::new(logger, threshold));
            } else {
                filter.default = directive.parse::<Threshold>().map_err(|_| bad())?;
            }
        }
        Ok(filter)
    }

    /// Read & parse the directives in environment variable `var`. If it isn't set, the default
    /// filter (INFO, no overrides) is returned.
    pub fn from_env(var: &str) -> Result<Filter> {
        match std::env::var(var) {
            Ok(text) => Filter::parse(&text),
            Err(std::env::VarError::NotPresent) => Ok(Filter::default()),
            Err(err) => Err(Error::Env {
                name: var.to_string(),
                source: Box::new(err),
                back: Backtrace::new(),
            }),
        }
    }

    /// [`Filter::from_env`] on `$UNIX_LOGGER`
    pub fn from_env_default() -> Result<Filter> {
        Filter::from_env(DEFAULT_ENV)
    }
}

impl std::str::FromStr for Filter {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_longest_match() {
        let filter = Filter::new(Threshold::from(Severity::NOTICE))
            .with_directive("svc", Threshold::from(Severity::DEBUG))
            .with_directive("svc::db", Threshold::from(Severity::WARNING));

        assert_eq!(filter.threshold_for("svc"), Threshold::from(Severity::DEBUG));
        assert_eq!(filter.threshold_for("svc::http"), Threshold::from(Severity::DEBUG));
        assert_eq!(filter.threshold_for("svc.http"), Threshold::from(Severity::DEBUG));
        assert_eq!(filter.threshold_for("svc::db::pool"), Threshold::from(Severity::WARNING));
        // a common prefix isn't a descendant
        assert_eq!(filter.threshold_for("svcx"), Threshold::from(Severity::NOTICE));

        assert!(filter.enabled("svc::http", Severity::DEBUG, None));
        assert!(!filter.enabled("svc::db", Severity::NOTICE, None));
        assert!(!filter.enabled("other", Severity::INFO, None));
    }

    #[test]
    fn test_markers() {
        let filter = Filter::new(Threshold::ALL).deny_marker("AUDIT");
        let audit = Marker::new("AUDIT");
        let login = Marker::with_parents("LOGIN", vec![audit.clone()]);
        let other = Marker::new("OTHER");
        assert!(!filter.enabled("svc", Severity::EMERG, Some(&audit)));
        assert!(!filter.enabled("svc", Severity::EMERG, Some(&login)));
        assert!(filter.enabled("svc", Severity::EMERG, Some(&other)));
        assert!(filter.enabled("svc", Severity::EMERG, None));
    }

    #[test]
    fn test_parse() {
        let filter: Filter = " notice, svc=debug ,svc=info, io::disk=off, !AUDIT ".parse().unwrap();
        assert_eq!(filter.default_threshold(), Threshold::from(Severity::NOTICE));
        // the later directive for the same logger replaces the earlier one
        assert_eq!(filter.directives().len(), 2);
        assert_eq!(filter.threshold_for("svc"), Threshold::from(Severity::INFO));
        assert_eq!(filter.threshold_for("io::disk"), Threshold::OFF);
        assert!(!filter.enabled("x", Severity::CRIT, Some(&Marker::new("AUDIT"))));

        assert_eq!(Filter::parse("").unwrap(), Filter::default());
        assert!(Filter::parse("svc=loud").is_err());
        assert!(Filter::parse("=debug").is_err());
        assert!(Filter::parse("!").is_err());
        assert!(Filter::parse("chatty").is_err());
    }

    #[test]
    fn test_from_env() {
        let var = "UNIX_LOGGER_CONFIG_TESTS_FILTER";
        std::env::remove_var(var);
        assert_eq!(Filter::from_env(var).unwrap(), Filter::default());
        std::env::set_var(var, "crit,svc=debug");
        let filter = Filter::from_env(var).unwrap();
        assert_eq!(filter.default_threshold(), Threshold::from(Severity::CRIT));
        assert_eq!(filter.threshold_for("svc"), Threshold::from(Severity::DEBUG));
        std::env::set_var(var, "svc==debug");
        assert!(Filter::from_env(var).is_err());
        std::env::remove_var(var);
    }

    #[test]
    fn test_from_env_default() {
        std::env::set_var(DEFAULT_ENV, "alert,!AUDIT");
        let filter = Filter::from_env_default().unwrap();
        assert_eq!(filter.default_threshold(), Threshold::from(Severity::ALERT));
        assert!(!filter.enabled("svc", Severity::EMERG, Some(&Marker::new("AUDIT"))));
        std::env::remove_var(DEFAULT_ENV);
        assert_eq!(Filter::from_env_default().unwrap(), Filter::default());
    }
}
