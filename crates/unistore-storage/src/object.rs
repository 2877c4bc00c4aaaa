// Unistore - Unified Object Storage
// Copyright (C) 2025 Unistore Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Listing results and their ordering

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One entry of a listing
///
/// `is_dir` is derived from the other fields: an entry is a directory exactly when it
/// has size zero and its name ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    is_dir: bool,
    name: String,
    size: i64,
    last_modified: DateTime<Utc>,
}

impl ObjectInfo {
    /// Build an entry, deriving whether it is a directory
    pub fn new(name: impl Into<String>, size: i64, last_modified: DateTime<Utc>) -> Self {
        let name = name.into();
        ObjectInfo {
            is_dir: size == 0 && name.ends_with('/'),
            name,
            size,
            last_modified,
        }
    }

    /// Whether the entry is a directory marker or common prefix
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Full object key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Last modification time
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Whether the entry belongs in a listing of `prefix`
    ///
    /// The prefix's own marker never lists. Directories list only when asked for.
    pub fn is_listable(&self, prefix: &str, include_dirs: bool) -> bool {
        if self.name == prefix {
            return false;
        }
        if self.is_dir {
            return include_dirs;
        }
        true
    }
}

/// Sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Byte-wise key order
    #[default]
    Name,
    /// Size
    Size,
    /// Modification time
    LastModified,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "size" => Ok(SortBy::Size),
            "last_modified" | "modified" | "time" => Ok(SortBy::LastModified),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Name => "name",
            SortBy::Size => "size",
            SortBy::LastModified => "last_modified",
        })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Resolve textual sort settings
///
/// An unrecognized key falls back to ascending name order whatever the requested
/// order; an unrecognized order is treated as ascending.
pub fn resolve_sort(by: &str, order: &str) -> (SortBy, SortOrder) {
    match by.parse::<SortBy>() {
        Ok(by) => (by, order.parse().unwrap_or_default()),
        Err(_) => (SortBy::Name, SortOrder::Ascending),
    }
}

/// Sort `objects` in place
///
/// The sort is stable, so entries with equal keys keep their relative order.
pub fn sort_objects(objects: &mut [ObjectInfo], by: SortBy, order: SortOrder) {
    let key: fn(&ObjectInfo, &ObjectInfo) -> Ordering = match by {
        SortBy::Name => by_name,
        SortBy::Size => by_size,
        SortBy::LastModified => by_last_modified,
    };

    match order {
        SortOrder::Ascending => objects.sort_by(key),
        SortOrder::Descending => objects.sort_by(|a, b| key(b, a)),
    }
}

fn by_name(a: &ObjectInfo, b: &ObjectInfo) -> Ordering {
    a.name.as_bytes().cmp(b.name.as_bytes())
}

fn by_size(a: &ObjectInfo, b: &ObjectInfo) -> Ordering {
    a.size.cmp(&b.size)
}

fn by_last_modified(a: &ObjectInfo, b: &ObjectInfo) -> Ordering {
    a.last_modified.cmp(&b.last_modified)
}

/// Drop every directory entry
pub fn remove_dir_objects(mut objects: Vec<ObjectInfo>) -> Vec<ObjectInfo> {
    objects.retain(|o| !o.is_dir);
    objects
}
