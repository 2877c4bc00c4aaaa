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
use unistore_storage::{CopyOptions, MoveOptions};

/// Copy an object inside the bucket
#[derive(Parser, Debug)]
pub struct CpCmd {
    /// Source key
    pub src: String,

    /// Destination key
    pub dst: String,

    /// Replace the destination if it exists
    #[arg(long)]
    pub overwrite: bool,
}

impl CpCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let options = CopyOptions {
            overwrite: self.overwrite,
        };
        ctx.storage.copy_object(&self.src, &self.dst, options).await?;
        output::success(&format!("Copied {} to {}", self.src, self.dst));
        Ok(())
    }
}

/// Move an object inside the bucket
///
/// The destination is always overwritten.
#[derive(Parser, Debug)]
pub struct MvCmd {
    /// Source key
    pub src: String,

    /// Destination key
    pub dst: String,

    /// Keep the source after copying
    #[arg(long)]
    pub keep_source: bool,
}

impl MvCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let options = MoveOptions {
            preserve_source: self.keep_source,
        };
        ctx.storage.move_object(&self.src, &self.dst, options).await?;
        output::success(&format!("Moved {} to {}", self.src, self.dst));
        Ok(())
    }
}
