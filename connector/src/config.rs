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

//! Connection parameters

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use termlink_knownhosts::SshProtocol;
use termlink_telnet::WindowSize;

/// Default Telnet port
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Service name credentials are saved under
pub const SSH_SERVICE_NAME: &str = "ssh";

/// Ciphers offered when the preference list leaves them out, strongest first.
pub const SUPPORTED_CIPHER_ALGORITHMS: &[&str] = &[
    "aes256-gcm@openssh.com",
    "aes128-gcm@openssh.com",
    "aes256-ctr",
    "aes192-ctr",
    "aes128-ctr",
];

/// Host key algorithms in default preference order.
pub const SUPPORTED_HOST_KEY_ALGORITHMS: &[&str] = &[
    "ssh-ed25519",
    "ecdsa-sha2-nistp521",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp256",
    "rsa-sha2-512",
    "rsa-sha2-256",
    "ssh-rsa",
];

/// Telnet connection parameters
#[derive(Debug, Clone)]
pub struct TelnetParameters {
    /// Server hostname or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Terminal type to report (e.g., "xterm")
    pub terminal_type: String,

    /// Terminal width in columns
    pub terminal_width: u16,

    /// Terminal height in rows
    pub terminal_height: u16,

    /// Fail the attempt if negotiation produced warnings
    pub fail_on_warnings: bool,

    /// Buffer size for incoming data
    pub buffer_size: usize,
}

impl Default for TelnetParameters {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_TELNET_PORT,
            terminal_type: "xterm".to_string(),
            terminal_width: 80,
            terminal_height: 24,
            fail_on_warnings: false,
            buffer_size: 8192,
        }
    }
}

impl TelnetParameters {
    /// Create parameters for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the terminal type
    pub fn with_terminal_type(mut self, terminal_type: impl Into<String>) -> Self {
        self.terminal_type = terminal_type.into();
        self
    }

    /// Set the terminal size
    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Fail the attempt when negotiation produced warnings
    pub fn with_fail_on_warnings(mut self, enabled: bool) -> Self {
        self.fail_on_warnings = enabled;
        self
    }

    /// Set the read buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Initial window size
    pub fn window_size(&self) -> WindowSize {
        WindowSize::new(self.terminal_width, self.terminal_height)
    }

    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SSH user authentication method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthenticationType {
    /// Password authentication
    #[default]
    Password,
    /// Public key authentication with an identity file
    PublicKey,
    /// Keyboard-interactive authentication
    KeyboardInteractive,
}

/// A password or passphrase. Never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

/// SSH connection parameters
#[derive(Debug, Clone)]
pub struct SshParameters {
    /// Server hostname or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Protocol generation
    pub protocol: SshProtocol,

    /// Authentication method
    pub authentication: AuthenticationType,

    /// Account name
    pub account: String,

    /// Password for password authentication, passphrase for public key authentication
    pub password_or_passphrase: Option<Secret>,

    /// Private key file for public key authentication
    pub identity_file: Option<PathBuf>,

    /// Terminal type to request
    pub terminal_type: String,

    /// Terminal width in columns
    pub terminal_width: u16,

    /// Terminal height in rows
    pub terminal_height: u16,

    /// Channel window size in bytes
    pub window_size: u32,

    /// Time to wait for each server response (None for no timeout)
    pub response_timeout: Option<Duration>,

    /// Fail on MAC verification errors
    pub check_mac_error: bool,

    /// Preferred ciphers, most preferred first
    pub cipher_algorithms: Vec<String>,

    /// Preferred host key algorithms, most preferred first
    pub host_key_algorithms: Vec<String>,

    /// Forward the local authentication agent
    pub agent_forwarding: bool,

    /// Forward X11 connections
    pub x11_forwarding: bool,

    /// Remember the password or passphrase after a successful login
    pub save_password: bool,

    /// Log protocol events
    pub log_events: bool,
}

impl Default for SshParameters {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_SSH_PORT,
            protocol: SshProtocol::Ssh2,
            authentication: AuthenticationType::Password,
            account: String::new(),
            password_or_passphrase: None,
            identity_file: None,
            terminal_type: "xterm".to_string(),
            terminal_width: 80,
            terminal_height: 24,
            window_size: 4096,
            response_timeout: None,
            check_mac_error: true,
            cipher_algorithms: to_strings(SUPPORTED_CIPHER_ALGORITHMS),
            host_key_algorithms: to_strings(SUPPORTED_HOST_KEY_ALGORITHMS),
            agent_forwarding: false,
            x11_forwarding: false,
            save_password: false,
            log_events: false,
        }
    }
}

impl SshParameters {
    /// Create parameters for `account` at the given host and port
    pub fn new(host: impl Into<String>, port: u16, account: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            account: account.into(),
            ..Default::default()
        }
    }

    /// Set the protocol generation
    pub fn with_protocol(mut self, protocol: SshProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Use password authentication
    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.authentication = AuthenticationType::Password;
        self.password_or_passphrase = Some(password.into());
        self
    }

    /// Use public key authentication with the given identity file and passphrase
    pub fn with_identity_file(
        mut self,
        identity_file: impl Into<PathBuf>,
        passphrase: Option<Secret>,
    ) -> Self {
        self.authentication = AuthenticationType::PublicKey;
        self.identity_file = Some(identity_file.into());
        self.password_or_passphrase = passphrase;
        self
    }

    /// Use keyboard-interactive authentication
    pub fn with_keyboard_interactive(mut self) -> Self {
        self.authentication = AuthenticationType::KeyboardInteractive;
        self
    }

    /// Set the terminal type
    pub fn with_terminal_type(mut self, terminal_type: impl Into<String>) -> Self {
        self.terminal_type = terminal_type.into();
        self
    }

    /// Set the terminal size
    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the channel window size
    pub fn with_window_size(mut self, window_size: u32) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the response timeout
    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Enable or disable MAC error checking
    pub fn with_check_mac_error(mut self, enabled: bool) -> Self {
        self.check_mac_error = enabled;
        self
    }

    /// Set the cipher preference order
    pub fn with_cipher_algorithms<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cipher_algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    /// Set the host key algorithm preference order
    pub fn with_host_key_algorithms<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.host_key_algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    /// Enable agent forwarding
    pub fn with_agent_forwarding(mut self, enabled: bool) -> Self {
        self.agent_forwarding = enabled;
        self
    }

    /// Enable X11 forwarding
    pub fn with_x11_forwarding(mut self, enabled: bool) -> Self {
        self.x11_forwarding = enabled;
        self
    }

    /// Remember the password or passphrase after login
    pub fn with_save_password(mut self, enabled: bool) -> Self {
        self.save_password = enabled;
        self
    }

    /// Log protocol events
    pub fn with_log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
