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

//! Markers: categorization tags engines may filter on independently of severity.

use std::sync::Arc;

#[derive(Debug)]
struct Inner {
    name: String,
    parents: Vec<Marker>,
}

/// A named tag, optionally refining one or more parent markers.
///
/// A marker "is an instance of" itself & of every one of its ancestors, so that an engine told to
/// drop, say, "AUDIT" also drops "AUDIT_LOGIN" if the latter was declared with "AUDIT" as a
/// parent. Markers compare by name.
#[derive(Clone, Debug)]
pub struct Marker(Arc<Inner>);

impl Marker {
    pub fn new<S: Into<String>>(name: S) -> Marker {
        Marker::with_parents(name, Vec::new())
    }

    pub fn with_parents<S: Into<String>>(name: S, parents: Vec<Marker>) -> Marker {
        Marker(Arc::new(Inner {
            name: name.into(),
            parents,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parents(&self) -> &[Marker] {
        &self.0.parents
    }

    /// True if `other` is this marker or one of its ancestors
    pub fn is_instance_of(&self, other: &Marker) -> bool {
        self.is_instance_of_name(other.name())
    }

    pub fn is_instance_of_name(&self, name: &str) -> bool {
        self.name() == name || self.parents().iter().any(|p| p.is_instance_of_name(name))
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Marker {}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
