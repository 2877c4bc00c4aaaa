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

/// Create a bucket
#[derive(Parser, Debug)]
pub struct MbCmd {
    /// Bucket name
    pub bucket: String,
}

impl MbCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        ctx.storage.create_bucket(&self.bucket).await?;
        output::success(&format!("Created bucket {}", self.bucket));
        output::detail("Provider", ctx.storage.provider().as_str());
        Ok(())
    }
}

/// Create a bucket unless it already exists
#[derive(Parser, Debug)]
pub struct EnsureBucketCmd {
    /// Bucket name
    pub bucket: String,
}

impl EnsureBucketCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        ctx.storage.ensure_bucket(&self.bucket).await?;
        output::success(&format!("Bucket {} is ready", self.bucket));
        Ok(())
    }
}
