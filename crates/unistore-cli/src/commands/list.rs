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

use super::Context;
use crate::output;
use anyhow::Result;
use clap::Parser;
use tracing::warn;
use unistore_storage::object::resolve_sort;
use unistore_storage::{ListOptions, SortBy};

/// List objects under a prefix
#[derive(Parser, Debug)]
pub struct LsCmd {
    /// Prefix to list; the bucket root when omitted
    #[arg(value_name = "PREFIX", default_value = "")]
    pub prefix: String,

    /// Descend into every level below the prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Include directory entries
    #[arg(short, long)]
    pub dirs: bool,

    /// Listing workers (defaults to the configured value)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Keys requested per page (defaults to the configured value)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Sort key: name, size or modified; anything else sorts by name
    #[arg(long, value_name = "KEY", default_value = "name")]
    pub sort: String,

    /// Sort in descending order
    #[arg(long)]
    pub desc: bool,

    /// Human-readable sizes
    #[arg(short = 'H', long)]
    pub human: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

impl LsCmd {
    /// Listing options after applying configured defaults
    pub fn options(&self, ctx: &Context) -> ListOptions {
        let defaults = &ctx.config.listing;
        if self.sort.parse::<SortBy>().is_err() {
            warn!(key = %self.sort, "Unknown sort key, sorting by name");
        }
        let (by, order) = resolve_sort(&self.sort, if self.desc { "desc" } else { "asc" });

        ListOptions::new(self.prefix.as_str())
            .with_recursive(self.recursive)
            .with_directories(self.dirs)
            .with_concurrency(self.concurrency.unwrap_or(defaults.concurrency))
            .with_page_size(self.page_size.unwrap_or(defaults.page_size))
            .with_sort(by, order)
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let objects = ctx.storage.list_objects(&self.options(ctx)).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&objects)?);
            return Ok(());
        }

        for object in &objects {
            println!("{}", output::object_line(object, self.human));
        }
        Ok(())
    }
}
