//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for the known hosts store

use thiserror::Error;

/// Result type for known hosts operations
pub type KnownHostsResult<T> = std::result::Result<T, KnownHostsError>;

/// Known hosts error types
#[derive(Debug, Error)]
pub enum KnownHostsError {
    /// The known hosts file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the known hosts file has no host name field
    #[error("known_hosts is corrupted: host name field is not found on line {line}")]
    Corrupted {
        /// One-based line number
        line: usize,
    },

    /// The store was asked to write before its contents were loaded
    #[error("known_hosts has not been loaded")]
    NotLoaded,
}
