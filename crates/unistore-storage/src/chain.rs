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

//! Error classification chain
//!
//! Provider clients hand back native errors as [`anyhow::Error`]. A
//! [`ProcessorChain`] tries its [`ErrorProcessor`]s in order; the first whose
//! predicate matches turns the error into a [`StorageError`]. An error nothing
//! matches becomes [`ErrorCode::Unknown`] with the native error kept as its source.
//!
//! Chains are plain data built per call, so classification is safe from any number
//! of listing workers at once.

use crate::error::{ErrorCode, Provider, StorageError};
use thiserror::Error;
use tracing::warn;

/// Provider code lookup table
pub type CodeTable = &'static [(&'static str, ErrorCode)];

/// Structured error reported by a provider's API
///
/// Built by the provider clients from SDK error metadata so processors can match on
/// the provider's own code without knowing the SDK types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Provider code, e.g. `NoSuchKey` or `502 Bad Gateway`
    pub code: String,
    /// Provider message
    pub message: String,
    /// HTTP status, when known
    pub status: Option<u16>,
    /// Provider request id, when known
    pub request_id: Option<String>,
}

impl ServiceError {
    /// Create a service error from a code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError {
            code: code.into(),
            message: message.into(),
            status: None,
            request_id: None,
        }
    }

    /// Attach an HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a request id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// One link of a [`ProcessorChain`]
#[derive(Debug, Clone, Copy)]
pub enum ErrorProcessor {
    /// A [`ServiceError`] anywhere in the cause chain, its code looked up in `table`.
    /// Codes missing from the table classify as `Unknown`.
    ServiceCode {
        /// Provider code to normalized code
        table: CodeTable,
    },

    /// A transport failure whose text contains one of `needles` (case-insensitive)
    Transport {
        /// Substrings identifying the failure
        needles: &'static [&'static str],
        /// Code to report
        code: ErrorCode,
    },

    /// An error whose text equals `literal` (case-insensitive)
    Message {
        /// Exact text to match
        literal: &'static str,
        /// Code to report
        code: ErrorCode,
    },
}

/// Text a DNS failure is reported with by the HTTP stacks we run on
pub const NO_SUCH_HOST: &[&str] = &["no such host", "failed to lookup address", "dns error"];

impl ErrorProcessor {
    /// Whether this processor recognizes `err`
    pub fn matches(&self, err: &anyhow::Error) -> bool {
        match self {
            ErrorProcessor::ServiceCode { .. } => service_error(err).is_some(),
            ErrorProcessor::Transport { needles, .. } => err.chain().any(|cause| {
                let text = cause.to_string().to_lowercase();
                needles.iter().any(|needle| text.contains(needle))
            }),
            ErrorProcessor::Message { literal, .. } => err
                .chain()
                .any(|cause| cause.to_string().eq_ignore_ascii_case(literal)),
        }
    }

    /// Classify `err`, or hand it back untouched when it does not match
    pub fn process(
        &self,
        provider: Provider,
        err: anyhow::Error,
    ) -> Result<StorageError, anyhow::Error> {
        if !self.matches(&err) {
            return Err(err);
        }

        let (code, message) = match self {
            ErrorProcessor::ServiceCode { table } => match service_error(&err) {
                Some(service) => (lookup(table, &service.code), service.message.clone()),
                None => return Err(err),
            },
            ErrorProcessor::Transport { code, .. } | ErrorProcessor::Message { code, .. } => {
                (*code, format!("{:#}", err))
            }
        };

        Ok(StorageError::with_native(provider, code, message, err))
    }
}

fn service_error(err: &anyhow::Error) -> Option<&ServiceError> {
    // a context layer is only reachable through the top-level downcast
    err.downcast_ref::<ServiceError>()
        .or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<ServiceError>()))
}

fn lookup(table: CodeTable, code: &str) -> ErrorCode {
    table
        .iter()
        .find(|(native, _)| *native == code)
        .map(|(_, normalized)| *normalized)
        .unwrap_or(ErrorCode::Unknown)
}

/// Ordered list of processors for one provider
#[derive(Debug, Clone)]
pub struct ProcessorChain {
    provider: Provider,
    processors: Vec<ErrorProcessor>,
}

impl ProcessorChain {
    /// Create an empty chain; an empty chain classifies everything as `Unknown`
    pub fn new(provider: Provider) -> Self {
        ProcessorChain {
            provider,
            processors: Vec::new(),
        }
    }

    /// Builder form of [`ProcessorChain::set_next`]
    pub fn then(mut self, processor: ErrorProcessor) -> Self {
        self.set_next(processor);
        self
    }

    /// Append a processor after the current last one
    pub fn set_next(&mut self, processor: ErrorProcessor) {
        self.processors.push(processor);
    }

    /// Number of processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the chain has no processors
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Classify a native error; always yields exactly one [`StorageError`]
    pub fn process(&self, err: anyhow::Error) -> StorageError {
        let mut err = err;
        for processor in &self.processors {
            match processor.process(self.provider, err) {
                Ok(classified) => return classified,
                Err(unmatched) => err = unmatched,
            }
        }

        let message = format!("{:#}", err);
        warn!(provider = %self.provider, error = %message, "Unclassified storage error");
        StorageError::with_native(self.provider, ErrorCode::Unknown, message, err)
    }
}

/// Entry point used by the facade to normalize provider errors
///
/// Errors that are already a [`StorageError`] pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ErrorConverter {
    provider: Provider,
    build: fn() -> ProcessorChain,
}

impl ErrorConverter {
    /// Create a converter that builds a fresh chain with `build` for every error
    pub const fn new(provider: Provider, build: fn() -> ProcessorChain) -> Self {
        ErrorConverter { provider, build }
    }

    /// Provider the converter classifies for
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Normalize `err`
    pub fn convert(&self, err: anyhow::Error) -> StorageError {
        match err.downcast::<StorageError>() {
            Ok(classified) => classified,
            Err(native) => (self.build)().process(native),
        }
    }
}
