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

//! Shared output formatting for CLI commands.
//!
//! Human-readable messages go through these helpers so every command prints the
//! same markers. Machine-readable output (`ls --json`, `cat`) bypasses them.

use chrono::{DateTime, Utc};
use console::style;
use unistore_storage::{ObjectInfo, StorageError};

/// Print a success message with a green checkmark.
pub fn success(msg: &str) {
    println!("{} {}", style("✅").green().bold(), msg);
}

/// Print an error message to stderr with a red X.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("❌").red().bold(), msg);
}

/// Print a detail line with key-value formatting.
///
/// ```text
///   Provider: minio
///   Bucket: media
/// ```
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Render a classified storage error as `Code: message`
pub fn storage_error(err: &StorageError) -> String {
    format!("{}: {}", style(err.code()).red().bold(), err.message())
}

/// Format bytes into human-readable units
pub fn format_bytes(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One `ls` line: time, size, name. Directories show `DIR` instead of a size.
pub fn object_line(object: &ObjectInfo, human: bool) -> String {
    if object.is_dir() {
        return format!(
            "{:<19} {:>12} {}",
            "",
            style("DIR").blue(),
            style(object.name()).blue().bold()
        );
    }

    let size = if human {
        format_bytes(object.size())
    } else {
        object.size().to_string()
    };
    format!(
        "{:<19} {:>12} {}",
        format_time(object.last_modified()),
        size,
        object.name()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_object_line_for_file() {
        console::set_colors_enabled(false);
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        let line = object_line(&ObjectInfo::new("a/x.txt", 2048, at), true);
        assert!(line.starts_with("2024-03-09 08:30:00"));
        assert!(line.contains("2.00 KB"));
        assert!(line.ends_with("a/x.txt"));
    }

    #[test]
    fn test_object_line_for_directory() {
        console::set_colors_enabled(false);
        let line = object_line(&ObjectInfo::new("a/sub/", 0, Utc::now()), false);
        assert!(line.contains("DIR"));
        assert!(line.ends_with("a/sub/"));
    }
}
