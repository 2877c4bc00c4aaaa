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
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Write an object to stdout
#[derive(Parser, Debug)]
pub struct CatCmd {
    /// Object key
    pub key: String,
}

impl CatCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let mut reader = ctx.storage.get_object(&self.key).await?.into_reader();
        let mut stdout = tokio::io::stdout();
        tokio::io::copy(&mut reader, &mut stdout).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Download an object to a local file
#[derive(Parser, Debug)]
pub struct GetCmd {
    /// Object key
    pub key: String,

    /// Local destination; parent directories are created
    pub path: PathBuf,
}

impl GetCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        ctx.storage.fget_object(&self.key, &self.path).await?;
        output::success(&format!("Downloaded {} to {}", self.key, self.path.display()));
        Ok(())
    }
}

/// Upload a local file as an object
#[derive(Parser, Debug)]
pub struct PutCmd {
    /// Local source file
    pub path: PathBuf,

    /// Object key; defaults to the file name
    pub key: Option<String>,
}

impl PutCmd {
    /// Key the file is stored under
    pub fn key(&self) -> Option<String> {
        self.key.clone().or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let Some(key) = self.key() else {
            anyhow::bail!("cannot derive an object key from {}", self.path.display());
        };

        ctx.storage.fput_object(&self.path, &key).await?;
        output::success(&format!("Uploaded {} as {}", self.path.display(), key));
        Ok(())
    }
}

/// Delete an object
#[derive(Parser, Debug)]
pub struct RmCmd {
    /// Object key
    pub key: String,
}

impl RmCmd {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        ctx.storage.delete_object(&self.key).await?;
        output::success(&format!("Removed {}", self.key));
        Ok(())
    }
}

/// Report whether an object exists
#[derive(Parser, Debug)]
pub struct ExistsCmd {
    /// Object key
    pub key: String,
}

impl ExistsCmd {
    /// Prints `true` or `false`; returns whether the object exists
    pub async fn execute(&self, ctx: &Context) -> Result<bool> {
        let exists = ctx.storage.object_exists(&self.key).await?;
        println!("{}", exists);
        Ok(exists)
    }
}
