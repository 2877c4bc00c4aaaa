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

//! Object key validation

/// Non-strict key check applied before copy and move
///
/// Rejects empty keys, a leading `/` or `\`, an embedded `//` or `\`, and a
/// trailing `/`.
pub fn is_valid_object_name(key: &str) -> bool {
    !(key.is_empty()
        || key.starts_with('/')
        || key.starts_with('\\')
        || key.contains("//")
        || key.contains('\\')
        || key.ends_with('/'))
}

/// First key in `keys` that fails [`is_valid_object_name`]
pub fn first_invalid_object_name<'a>(keys: &[&'a str]) -> Option<&'a str> {
    keys.iter().copied().find(|key| !is_valid_object_name(key))
}
