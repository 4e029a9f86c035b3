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

//! Host identity as presented by the SSH engine

use std::fmt;

/// SSH protocol generation. Host key formats differ between them, so each
/// has its own namespace in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SshProtocol {
    /// SSH protocol version 1
    Ssh1,
    /// SSH protocol version 2
    Ssh2,
}

impl SshProtocol {
    /// Family of a stored identity string, told apart by its leading tag.
    pub fn from_identity(identity: &str) -> Self {
        if identity.starts_with("ssh1") {
            SshProtocol::Ssh1
        } else {
            SshProtocol::Ssh2
        }
    }
}

impl fmt::Display for SshProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshProtocol::Ssh1 => write!(f, "SSH1"),
            SshProtocol::Ssh2 => write!(f, "SSH2"),
        }
    }
}

/// The host key a server presented during key exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostKeyInfo {
    /// Host name as the user entered it
    pub hostname: String,
    /// TCP port
    pub port: u16,
    /// Protocol generation the key belongs to
    pub protocol: SshProtocol,
    /// Identity string as stored in known hosts, e.g. `ssh-ed25519 AAAA...`
    pub known_hosts_string: String,
    /// Hash of the public key, shown to the user for manual verification
    pub fingerprint: Vec<u8>,
}

impl HostKeyInfo {
    /// Creates a new host key description.
    pub fn new(
        hostname: impl Into<String>,
        port: u16,
        protocol: SshProtocol,
        known_hosts_string: impl Into<String>,
        fingerprint: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            protocol,
            known_hosts_string: known_hosts_string.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Fingerprint as colon separated lowercase hex, e.g. `0a:1b:2c`.
    pub fn fingerprint_hex(&self) -> String {
        format_fingerprint(&self.fingerprint)
    }
}

/// Formats raw fingerprint bytes as colon separated lowercase hex.
pub fn format_fingerprint(fingerprint: &[u8]) -> String {
    fingerprint
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_colon_separated_hex() {
        assert_eq!(format_fingerprint(&[0x0a, 0xff, 0x00]), "0a:ff:00");
        assert_eq!(format_fingerprint(&[]), "");
    }

    #[test]
    fn protocol_from_identity_tag() {
        assert_eq!(SshProtocol::from_identity("ssh1 1024 35 1234"), SshProtocol::Ssh1);
        assert_eq!(SshProtocol::from_identity("ssh-rsa AAAAB3"), SshProtocol::Ssh2);
        assert_eq!(SshProtocol::from_identity("ecdsa-sha2-nistp256 AAAA"), SshProtocol::Ssh2);
    }
}
