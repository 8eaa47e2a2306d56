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

//! Named level registration.
//!
//! Engines keep a [`LevelTable`] mapping level names to priorities. The eight [`Severity`]s are
//! registered once, when the engine is built; registration is idempotent, so doing it again (or
//! from a second facade) is harmless.

use crate::{
    error::{Error, Result},
    severity::Severity,
};

use backtrace::Backtrace;

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

/// A level as an engine knows it: a name & a priority.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomLevel {
    name: Arc<str>,
    priority: u32,
}

impl CustomLevel {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn priority(&self) -> u32 {
        self.priority
    }
}

/// Name -> priority table. Read-mostly: lookups take a shared lock, only registration of a
/// previously-unseen name takes the exclusive one.
#[derive(Debug, Default)]
pub struct LevelTable {
    levels: RwLock<BTreeMap<String, CustomLevel>>,
}

impl LevelTable {
    /// An empty table
    pub fn new() -> LevelTable {
        LevelTable::default()
    }

    /// A table pre-populated with the eight syslog severities
    pub fn with_severities() -> LevelTable {
        let table = LevelTable::new();
        // Can't conflict in an empty table.
        for severity in Severity::ALL {
            let _ = table.register(severity.name(), severity.priority());
        }
        table
    }

    /// Register `name` at `priority`.
    ///
    /// Re-registering an existing name at the same priority returns the existing level. A
    /// different priority is refused & the table is left as it was.
    pub fn register(&self, name: &str, priority: u32) -> Result<CustomLevel> {
        let key = name.trim().to_ascii_uppercase();
        if let Some(level) = self.lookup(&key) {
            return Self::check(level, priority);
        }
        let mut levels = self.levels.write().unwrap_or_else(|p| p.into_inner());
        // Someone may have beaten us to it between the read & the write lock.
        if let Some(level) = levels.get(&key) {
            return Self::check(level.clone(), priority);
        }
        let level = CustomLevel {
            name: Arc::from(key.as_str()),
            priority,
        };
        levels.insert(key, level.clone());
        Ok(level)
    }

    /// Look a level up by (case-insensitive) name
    pub fn get(&self, name: &str) -> Option<CustomLevel> {
        self.lookup(&name.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.levels.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<CustomLevel> {
        self.levels
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    fn check(level: CustomLevel, priority: u32) -> Result<CustomLevel> {
        if level.priority == priority {
            Ok(level)
        } else {
            Err(Error::ConflictingLevel {
                name: level.name.to_string(),
                existing: level.priority,
                requested: priority,
                back: Backtrace::new(),
            })
        }
    }
}
