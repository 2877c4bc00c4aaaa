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

//! Operation options
//!
//! Defaults are resolved once when an option set is built, so accessors return
//! final values.

use crate::object::{SortBy, SortOrder};

/// Page size used when none is given
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Worker count used when none is given
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Options for [`StorageBackend::list_objects`](crate::StorageBackend::list_objects)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    prefix: String,
    effective_prefix: String,
    recursive: bool,
    include_directories: bool,
    concurrency: usize,
    page_size: usize,
    sort_by: SortBy,
    sort_order: SortOrder,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions::new("")
    }
}

impl ListOptions {
    /// List one level below `prefix`; an empty prefix lists the bucket root
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let effective_prefix = if prefix.is_empty() || prefix.ends_with('/') {
            prefix.clone()
        } else {
            format!("{}/", prefix)
        };

        ListOptions {
            prefix,
            effective_prefix,
            recursive: false,
            include_directories: false,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
        }
    }

    /// Descend into every level below the prefix
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Keep directory entries in the result
    pub fn with_directories(mut self, include: bool) -> Self {
        self.include_directories = include;
        self
    }

    /// Number of listing workers; zero means one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Keys requested per provider page; zero means the default
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    /// Result ordering
    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Prefix as given
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix with a trailing `/`, or empty for the bucket root
    pub fn effective_prefix(&self) -> &str {
        &self.effective_prefix
    }

    /// `""` when recursive, `"/"` otherwise
    pub fn delimiter(&self) -> &'static str {
        if self.recursive {
            ""
        } else {
            "/"
        }
    }

    /// Whether the listing is recursive
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Whether directory entries are kept
    pub fn include_directories(&self) -> bool {
        self.include_directories
    }

    /// Number of listing workers
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Keys per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Sort key
    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    /// Sort direction
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Provider request parameters for this listing
    pub fn request(&self) -> ListRequest {
        ListRequest {
            prefix: self.effective_prefix.clone(),
            delimiter: self.delimiter(),
            page_size: self.page_size,
        }
    }
}

/// What a provider is asked to enumerate
///
/// These only shape requests; filtering and ordering happen in the lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Key prefix, empty for the bucket root
    pub prefix: String,
    /// `"/"` rolls deeper keys up into common prefixes; `""` lists everything
    pub delimiter: &'static str,
    /// Maximum keys per page
    pub page_size: usize,
}

impl ListRequest {
    /// Whether deeper levels are enumerated
    pub fn recursive(&self) -> bool {
        self.delimiter.is_empty()
    }
}

/// Options for [`StorageBackend::copy_object`](crate::StorageBackend::copy_object)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Replace an existing destination instead of failing
    pub overwrite: bool,
}

/// Options for [`StorageBackend::move_object`](crate::StorageBackend::move_object)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Keep the source after copying
    pub preserve_source: bool,
}
