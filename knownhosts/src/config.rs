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

//! Known hosts configuration

use std::path::PathBuf;

/// Default file name inside the profile directory.
pub const DEFAULT_FILE_NAME: &str = "ssh_known_hosts";

/// Port that is left out of stored host names.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Known hosts store configuration
#[derive(Debug, Clone)]
pub struct KnownHostsConfig {
    /// Location of the known hosts file
    pub path: PathBuf,

    /// Port omitted from stored host names
    pub default_port: u16,
}

impl Default for KnownHostsConfig {
    fn default() -> Self {
        let profile = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termlink");
        Self {
            path: profile.join(DEFAULT_FILE_NAME),
            default_port: DEFAULT_SSH_PORT,
        }
    }
}

impl KnownHostsConfig {
    /// Create a configuration storing entries at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the port omitted from stored host names
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }
}
