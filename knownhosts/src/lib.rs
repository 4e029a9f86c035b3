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

//! # Termlink Known Hosts
//!
//! Trust-on-first-use store for SSH host keys.
//!
//! The store is a plain text file with one `<host>[:<port>] <identity>` line per
//! accepted key. The port is omitted when it is the SSH default. Identities starting
//! with `ssh1` belong to the SSH1 namespace, everything else to SSH2, so the same host
//! may be remembered once per protocol generation.
//!
//! ## Verification Outcomes
//!
//! | Situation                          | Result                                          |
//! |------------------------------------|-------------------------------------------------|
//! | Host unknown                       | accepted, entry written to disk                 |
//! | Host known, same identity          | accepted silently                               |
//! | Host known, different identity     | user asked; accepted and written only on "yes"  |
//! | File unreadable or corrupt         | rejected                                        |
//! | Accepted entry cannot be written   | rejected, memory rolled back                    |
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use termlink_knownhosts::{HostKeyInfo, KnownHosts, KnownHostsConfig, RejectChangedKeys, SshProtocol};
//!
//! # async fn example() {
//! let store = Arc::new(KnownHosts::new(
//!     KnownHostsConfig::new("/home/user/.config/termlink/ssh_known_hosts"),
//!     Arc::new(RejectChangedKeys),
//! ));
//! let info = HostKeyInfo::new("example.com", 22, SshProtocol::Ssh2, "ssh-ed25519 AAAA", [0x12, 0x34]);
//! if !store.verify(&info).await {
//!     // abort the connection
//! }
//! # }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod config;
mod error;
mod info;
mod prompt;
mod store;

pub use self::config::{DEFAULT_FILE_NAME, DEFAULT_SSH_PORT, KnownHostsConfig};
pub use self::error::{KnownHostsError, KnownHostsResult};
pub use self::info::{HostKeyInfo, SshProtocol, format_fingerprint};
pub use self::prompt::{HostKeyPrompt, HostKeyVerifier, PromptAnswer, RejectChangedKeys};
pub use self::store::{CHANGED_KEY_MESSAGE, KnownHosts};
