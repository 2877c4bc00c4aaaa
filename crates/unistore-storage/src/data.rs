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

//! Object content handle

use bytes::Bytes;
use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Readable body of an object returned by `get_object`
pub struct ObjectData {
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl ObjectData {
    /// Wrap a byte stream
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        ObjectData {
            reader: Box::pin(reader),
        }
    }

    /// Serve an in-memory buffer
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(Cursor::new(data.into()))
    }

    /// Take the underlying reader
    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send>> {
        self.reader
    }

    /// Read the whole body into memory
    pub async fn bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectData").finish_non_exhaustive()
    }
}
