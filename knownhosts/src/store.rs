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

//! Persisted trust-on-first-use host key store

use crate::{
    HostKeyInfo, HostKeyPrompt, HostKeyVerifier, KnownHostsConfig, KnownHostsError,
    KnownHostsResult, PromptAnswer, SshProtocol,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Question shown below the fingerprint when a known host presents a different key.
pub const CHANGED_KEY_MESSAGE: &str = "The host key differs from the one accepted before. \
     The host may have been reinstalled, or someone may be intercepting the connection. \
     Do you want to accept the new key?";

/// Entry key: protocol family plus `host` or `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct HostKey {
    family: SshProtocol,
    host: String,
}

#[derive(Debug, Default)]
struct KnownHostsInner {
    entries: BTreeMap<HostKey, String>,
    loaded: bool,
    modified: bool,
}

/// Trust-on-first-use store of accepted SSH host keys.
///
/// The store is loaded from disk on first use. A host seen for the first time
/// is trusted and remembered; a host presenting the same key again is trusted
/// silently; a host presenting a different key is only trusted if the user
/// confirms it through the [`HostKeyPrompt`]. Every accepted change rewrites
/// the whole file before the verification returns.
///
/// One store is shared by all connection attempts. The complete
/// load-lookup-prompt-persist sequence of a verification runs under a single
/// lock, so concurrent attempts never interleave their read-modify-write
/// cycles.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use termlink_knownhosts::{HostKeyInfo, KnownHosts, KnownHostsConfig, RejectChangedKeys, SshProtocol};
///
/// # async fn example() {
/// let store = KnownHosts::new(KnownHostsConfig::default(), Arc::new(RejectChangedKeys));
/// let info = HostKeyInfo::new("example.com", 22, SshProtocol::Ssh2, "ssh-ed25519 AAAA", vec![0x01]);
/// assert!(store.verify(&info).await);
/// # }
/// ```
pub struct KnownHosts {
    config: KnownHostsConfig,
    prompt: Arc<dyn HostKeyPrompt>,
    inner: Mutex<KnownHostsInner>,
}

impl KnownHosts {
    /// Creates an unloaded store.
    pub fn new(config: KnownHostsConfig, prompt: Arc<dyn HostKeyPrompt>) -> Self {
        Self {
            config,
            prompt,
            inner: Mutex::new(KnownHostsInner::default()),
        }
    }

    /// The store configuration.
    pub fn config(&self) -> &KnownHostsConfig {
        &self.config
    }

    /// Whether the file has been read.
    pub async fn is_loaded(&self) -> bool {
        self.inner.lock().await.loaded
    }

    /// Whether memory holds changes not yet written.
    pub async fn is_modified(&self) -> bool {
        self.inner.lock().await.modified
    }

    /// Number of entries in memory.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether memory holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// The stored identity for a host, if any.
    pub async fn identity(&self, protocol: SshProtocol, hostname: &str, port: u16) -> Option<String> {
        let key = self.host_key(protocol, hostname, port);
        self.inner.lock().await.entries.get(&key).cloned()
    }

    /// Reads the file, replacing whatever is in memory.
    ///
    /// A missing file is an empty store. On error the store stays unloaded.
    pub async fn load(&self) -> KnownHostsResult<()> {
        let mut inner = self.inner.lock().await;
        self.load_locked(&mut inner).await
    }

    /// Decides whether `info` is trusted, prompting the user if the host's key changed.
    ///
    /// Fails closed: if the file cannot be loaded, or an accepted key cannot be
    /// persisted, the key is rejected.
    pub async fn verify(&self, info: &HostKeyInfo) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.loaded {
            if let Err(e) = self.load_locked(&mut inner).await {
                error!(
                    path = %self.config.path.display(),
                    error = %e,
                    "Failed to load known hosts, rejecting host key"
                );
                return false;
            }
        }

        let key = self.host_key(info.protocol, &info.hostname, info.port);
        let presented = &info.known_hosts_string;
        let stored = inner.entries.get(&key).cloned();
        match stored {
            None => {
                info!(host = %key.host, protocol = %key.family, "Accepting host key on first use");
                self.update_locked(&mut inner, key, presented.clone()).await
            }
            Some(stored) if &stored == presented => {
                debug!(host = %key.host, "Host key matches known hosts");
                true
            }
            Some(_) => {
                warn!(host = %key.host, "Host key has changed, asking user");
                let message = format!(
                    "ssh hostkey fingerprint {}\n\n{}",
                    info.fingerprint_hex(),
                    CHANGED_KEY_MESSAGE
                );
                match self.prompt.ask_yes_no(&message).await {
                    PromptAnswer::Yes => {
                        info!(host = %key.host, "User accepted changed host key");
                        self.update_locked(&mut inner, key, presented.clone()).await
                    }
                    answer => {
                        warn!(host = %key.host, ?answer, "User rejected changed host key");
                        false
                    }
                }
            }
        }
    }

    /// Rewrites the file from memory.
    pub async fn flush(&self) -> KnownHostsResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.loaded {
            return Err(KnownHostsError::NotLoaded);
        }
        self.write(&inner.entries).await?;
        inner.modified = false;
        Ok(())
    }

    /// Forgets every entry held in memory. The file is untouched until the next flush.
    pub async fn clear(&self) {
        self.inner.lock().await.entries.clear();
    }

    fn host_key(&self, family: SshProtocol, hostname: &str, port: u16) -> HostKey {
        let host = if port == self.config.default_port {
            hostname.to_string()
        } else {
            format!("{hostname}:{port}")
        };
        HostKey { family, host }
    }

    async fn load_locked(&self, inner: &mut KnownHostsInner) -> KnownHostsResult<()> {
        let entries = match tokio::fs::read_to_string(&self.config.path).await {
            Ok(content) => parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.config.path.display(), "No known hosts file yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(entries = entries.len(), "Loaded known hosts");
        inner.entries = entries;
        inner.loaded = true;
        inner.modified = false;
        Ok(())
    }

    /// Records `identity` for `key` and persists. Memory is rolled back if the
    /// write fails.
    async fn update_locked(
        &self,
        inner: &mut KnownHostsInner,
        key: HostKey,
        identity: String,
    ) -> bool {
        let was_modified = inner.modified;
        let previous = inner.entries.insert(key.clone(), identity);
        inner.modified = true;

        match self.write(&inner.entries).await {
            Ok(()) => {
                inner.modified = false;
                true
            }
            Err(e) => {
                error!(
                    path = %self.config.path.display(),
                    error = %e,
                    "Failed to persist known hosts, rejecting host key"
                );
                match previous {
                    Some(previous) => inner.entries.insert(key, previous),
                    None => inner.entries.remove(&key),
                };
                inner.modified = was_modified;
                false
            }
        }
    }

    /// Replaces the file with `entries`. The new content goes to a sibling
    /// temporary file first and is renamed over the old one, so a crash leaves
    /// either the old file or the new one, never a truncated mix.
    async fn write(&self, entries: &BTreeMap<HostKey, String>) -> KnownHostsResult<()> {
        let path = &self.config.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let staging = staging_path(path);
        let result = async {
            let mut file = tokio::fs::File::create(&staging).await?;
            file.write_all(serialize(entries).as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&staging, path).await
        }
        .await;
        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "Could not remove staging file");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl HostKeyVerifier for KnownHosts {
    async fn verify(&self, info: &HostKeyInfo) -> bool {
        KnownHosts::verify(self, info).await
    }
}

impl std::fmt::Debug for KnownHosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownHosts")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Parses `<host>[:<port>] <identity>` lines. Empty lines are skipped.
fn parse(content: &str) -> KnownHostsResult<BTreeMap<HostKey, String>> {
    let mut entries = BTreeMap::new();
    for (index, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (host, identity) = line
            .split_once(' ')
            .ok_or(KnownHostsError::Corrupted { line: index + 1 })?;
        let key = HostKey {
            family: SshProtocol::from_identity(identity),
            host: host.to_string(),
        };
        entries.insert(key, identity.to_string());
    }
    Ok(entries)
}

/// One line per entry, SSH1 entries first, each family sorted by host.
fn serialize(entries: &BTreeMap<HostKey, String>) -> String {
    let mut content = String::new();
    for (key, identity) in entries {
        // Writing into a String cannot fail.
        let _ = writeln!(content, "{} {}", key.host, identity);
    }
    content
}

/// `<path>.tmp`, next to the file it replaces.
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_os_string();
    staging.push(".tmp");
    PathBuf::from(staging)
}
