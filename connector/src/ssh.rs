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

//! SSH connection strategy
//!
//! The SSH wire protocol is delegated to an [`SshEngine`]. This module builds
//! the engine parameters, installs the callbacks the engine needs while
//! connecting, and finishes the attempt once the engine has logged in.

use crate::{
    AuthenticationType, BoxedTransport, ConnectError, ConnectResult, InterruptFlag,
    SSH_SERVICE_NAME, Secret, SshParameters, SUPPORTED_CIPHER_ALGORITHMS,
};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use termlink_knownhosts::{HostKeyInfo, HostKeyVerifier, SshProtocol};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Everything the engine needs to open a terminal channel.
#[derive(Debug, Clone)]
pub struct SshConnectionParameters {
    /// Server hostname
    pub host: String,
    /// Server port
    pub port: u16,
    /// Protocol generation
    pub protocol: SshProtocol,
    /// Authentication method
    pub authentication: AuthenticationType,
    /// Account name
    pub user_name: String,
    /// Password or key passphrase
    pub password: Option<Secret>,
    /// Private key file
    pub identity_file: Option<PathBuf>,
    /// Terminal type requested for the pty
    pub terminal_name: String,
    /// Terminal width in columns
    pub terminal_width: u16,
    /// Terminal height in rows
    pub terminal_height: u16,
    /// Channel window size in bytes
    pub window_size: u32,
    /// Time to wait for each server response
    pub response_timeout: Option<Duration>,
    /// Fail on MAC verification errors
    pub check_mac_error: bool,
    /// Cipher preference order, complete
    pub cipher_algorithms: Vec<String>,
    /// Host key algorithm preference order
    pub host_key_algorithms: Vec<String>,
    /// Forward the authentication agent
    pub agent_forwarding: bool,
    /// Forward X11
    pub x11_forwarding: bool,
}

impl From<&SshParameters> for SshConnectionParameters {
    fn from(params: &SshParameters) -> Self {
        Self {
            host: params.host.clone(),
            port: params.port,
            protocol: params.protocol,
            authentication: params.authentication,
            user_name: params.account.clone(),
            password: params.password_or_passphrase.clone(),
            identity_file: params.identity_file.clone(),
            terminal_name: params.terminal_type.clone(),
            terminal_width: params.terminal_width,
            terminal_height: params.terminal_height,
            window_size: params.window_size,
            response_timeout: params.response_timeout,
            check_mac_error: params.check_mac_error,
            cipher_algorithms: complete_cipher_order(&params.cipher_algorithms),
            host_key_algorithms: params.host_key_algorithms.clone(),
            agent_forwarding: params.agent_forwarding,
            x11_forwarding: params.x11_forwarding,
        }
    }
}

/// Keeps the known ciphers of `preferred` in order, then appends every
/// supported cipher it left out.
pub fn complete_cipher_order(preferred: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(SUPPORTED_CIPHER_ALGORITHMS.len());
    for name in preferred {
        let name = name.trim();
        if SUPPORTED_CIPHER_ALGORITHMS.contains(&name) && !order.iter().any(|n| n == name) {
            order.push(name.to_string());
        } else {
            trace!(cipher = name, "Skipping cipher preference");
        }
    }
    for name in SUPPORTED_CIPHER_ALGORITHMS {
        if !order.iter().any(|n| n == name) {
            order.push((*name).to_string());
        }
    }
    order
}

/// State of user authentication when the engine returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationStatus {
    /// The user is logged in
    Success,
    /// The server is waiting for keyboard-interactive answers
    NeedKeyboardInput,
}

/// A keyboard-interactive question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardPrompt {
    /// Question text
    pub prompt: String,
    /// Whether the answer may be shown while typed
    pub echo: bool,
}

/// Answers keyboard-interactive authentication requests for one connection.
#[async_trait]
pub trait KeyboardInteractiveHandler: Send + Sync {
    /// Returns one answer per prompt, or `None` to abort.
    async fn respond(
        &self,
        name: &str,
        instruction: &str,
        prompts: &[KeyboardPrompt],
    ) -> Option<Vec<String>>;
}

/// Creates a [`KeyboardInteractiveHandler`] when the server asks for one.
pub trait KeyboardInteractiveHandlerFactory: Send + Sync + 'static {
    /// Creates the handler for the connection to `destination`.
    fn create(&self, destination: &str) -> Box<dyn KeyboardInteractiveHandler>;
}

/// Receives protocol events from the engine.
pub trait SshEventLogger: Send + Sync + 'static {
    /// A message was sent.
    fn on_send(&self, message_type: &str, details: &str);
    /// A message was received.
    fn on_receive(&self, message_type: &str, details: &str);
    /// Free form trace output.
    fn on_trace(&self, details: &str);
}

/// Event logger writing through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingEventLogger {
    destination: String,
}

impl TracingEventLogger {
    /// Creates a logger tagging every line with `destination`.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }
}

impl SshEventLogger for TracingEventLogger {
    fn on_send(&self, message_type: &str, details: &str) {
        debug!(destination = %self.destination, "Send    : {message_type} {details}");
    }

    fn on_receive(&self, message_type: &str, details: &str) {
        debug!(destination = %self.destination, "Receive : {message_type} {details}");
    }

    fn on_trace(&self, details: &str) {
        debug!(destination = %self.destination, "Trace   : {details}");
    }
}

/// Trusts every host key it is shown.
///
/// Only for hosts whose identity is established some other way, such as a
/// test server on loopback. Each accepted key is logged at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAnyHostKey;

#[async_trait]
impl HostKeyVerifier for AcceptAnyHostKey {
    async fn verify(&self, info: &HostKeyInfo) -> bool {
        warn!(
            host = %info.hostname,
            port = info.port,
            fingerprint = %info.fingerprint_hex(),
            "Accepting host key without verification"
        );
        true
    }
}

/// Callbacks the engine invokes while connecting.
#[derive(Clone)]
pub struct SshCallbacks {
    /// Host key trust decision
    pub verifier: Arc<dyn HostKeyVerifier>,
    /// Keyboard-interactive authentication
    pub keyboard_interactive: Option<Arc<dyn KeyboardInteractiveHandlerFactory>>,
    /// Protocol event sink
    pub event_logger: Option<Arc<dyn SshEventLogger>>,
}

impl SshCallbacks {
    /// Creates callbacks around `verifier` with no handler or event logger.
    pub fn new(verifier: Arc<dyn HostKeyVerifier>) -> Self {
        Self {
            verifier,
            keyboard_interactive: None,
            event_logger: None,
        }
    }

    /// Asks the installed verifier about `info`.
    pub async fn verify_host_key(&self, info: &HostKeyInfo) -> bool {
        self.verifier.verify(info).await
    }
}

impl fmt::Debug for SshCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCallbacks")
            .field("keyboard_interactive", &self.keyboard_interactive.is_some())
            .field("event_logger", &self.event_logger.is_some())
            .finish_non_exhaustive()
    }
}

/// What the engine hands back after logging in.
pub struct SshEngineOutput {
    /// Terminal channel as a byte stream
    pub channel: BoxedTransport,
    /// Authentication state
    pub authentication: AuthenticationStatus,
}

/// Engine failures
#[derive(Debug, Error)]
pub enum SshEngineError {
    /// The host key verifier refused the key
    #[error("host key rejected")]
    HostKeyRejected,

    /// The server refused the credentials
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The server did not answer in time
    #[error("response timed out")]
    Timeout,

    /// Transport failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol violation or unsupported peer
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SshEngineError {
    /// Converts into the attempt error for a connection to `host`.
    pub fn into_connect_error(self, host: &str) -> ConnectError {
        match self {
            SshEngineError::HostKeyRejected => ConnectError::HostKeyRejected {
                host: host.to_string(),
            },
            SshEngineError::Authentication(reason) => ConnectError::Authentication(reason),
            SshEngineError::Timeout => ConnectError::Timeout,
            SshEngineError::Io(e) => ConnectError::Io(e),
            SshEngineError::Protocol(reason) => ConnectError::Ssh(reason),
        }
    }
}

/// SSH protocol implementation.
///
/// `connect` performs key exchange, consults `callbacks.verifier` with the
/// server's host key, authenticates and opens a terminal channel.
#[async_trait]
pub trait SshEngine: Send + Sync + 'static {
    /// Logs in over `transport`.
    async fn connect(
        &self,
        transport: BoxedTransport,
        params: SshConnectionParameters,
        callbacks: SshCallbacks,
    ) -> Result<SshEngineOutput, SshEngineError>;
}

/// Persists login secrets after a successful connection.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Saves the password of `account` at `host` for `service`.
    async fn save_password(
        &self,
        service: &str,
        host: &str,
        account: &str,
        password: &str,
    ) -> std::io::Result<()>;

    /// Saves the passphrase of the private key at `key_file` for `service`.
    async fn save_key_passphrase(
        &self,
        service: &str,
        key_file: &Path,
        passphrase: &str,
    ) -> std::io::Result<()>;
}

/// SSH strategy: parameters plus the services used while connecting.
#[derive(Clone)]
pub struct SshNegotiation {
    /// Connection parameters
    pub parameters: SshParameters,
    /// Protocol engine
    pub engine: Arc<dyn SshEngine>,
    /// Host key trust decision, normally a shared `KnownHosts` store
    pub verifier: Arc<dyn HostKeyVerifier>,
    /// Keyboard-interactive authentication
    pub keyboard_interactive: Option<Arc<dyn KeyboardInteractiveHandlerFactory>>,
    /// Where to remember the password when `save_password` is set
    pub credentials: Option<Arc<dyn CredentialStore>>,
}

impl SshNegotiation {
    /// Creates a strategy that trusts host keys only as far as `verifier`
    /// does. No keyboard-interactive handler or credential store is set.
    pub fn new(
        parameters: SshParameters,
        engine: Arc<dyn SshEngine>,
        verifier: Arc<dyn HostKeyVerifier>,
    ) -> Self {
        Self {
            parameters,
            engine,
            verifier,
            keyboard_interactive: None,
            credentials: None,
        }
    }

    /// Set the keyboard-interactive handler factory
    pub fn with_keyboard_interactive(
        mut self,
        factory: Arc<dyn KeyboardInteractiveHandlerFactory>,
    ) -> Self {
        self.keyboard_interactive = Some(factory);
        self
    }

    /// Set the credential store
    pub fn with_credential_store(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl fmt::Debug for SshNegotiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshNegotiation")
            .field("parameters", &self.parameters)
            .field("keyboard_interactive", &self.keyboard_interactive.is_some())
            .field("credentials", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

/// An established SSH session.
pub struct SshSession {
    channel: BoxedTransport,
    authentication: AuthenticationStatus,
    destination: String,
}

impl SshSession {
    /// `host:port` of the peer.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Authentication state reported by the engine.
    pub fn authentication(&self) -> AuthenticationStatus {
        self.authentication
    }

    /// The terminal channel.
    pub fn channel(&mut self) -> &mut BoxedTransport {
        &mut self.channel
    }

    /// Releases the terminal channel.
    pub fn into_channel(self) -> BoxedTransport {
        self.channel
    }
}

impl fmt::Debug for SshSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshSession")
            .field("destination", &self.destination)
            .field("authentication", &self.authentication)
            .finish_non_exhaustive()
    }
}

/// Runs the engine on `transport`. The interrupt is checked before and after
/// the engine call; the engine itself is never preempted.
pub(crate) async fn negotiate_ssh(
    transport: BoxedTransport,
    negotiation: SshNegotiation,
    interrupt: &InterruptFlag,
) -> ConnectResult<SshSession> {
    if interrupt.is_interrupted() {
        return Err(ConnectError::Interrupted);
    }

    let params = &negotiation.parameters;
    let destination = params.address();
    let event_logger = params.log_events.then(|| {
        Arc::new(TracingEventLogger::new(params.host.clone())) as Arc<dyn SshEventLogger>
    });
    let callbacks = SshCallbacks {
        verifier: negotiation.verifier.clone(),
        keyboard_interactive: negotiation.keyboard_interactive.clone(),
        event_logger,
    };

    debug!(host = %params.host, port = params.port, protocol = %params.protocol, "SSH negotiation started");
    let output = negotiation
        .engine
        .connect(transport, SshConnectionParameters::from(params), callbacks)
        .await
        .map_err(|e| e.into_connect_error(&params.host))?;

    if interrupt.is_interrupted() {
        return Err(ConnectError::Interrupted);
    }
    info!(host = %params.host, port = params.port, "SSH login accepted");

    if params.save_password {
        if let Some(credentials) = &negotiation.credentials {
            save_credentials(credentials.as_ref(), params).await;
        }
    }

    Ok(SshSession {
        channel: output.channel,
        authentication: output.authentication,
        destination,
    })
}

async fn save_credentials(credentials: &dyn CredentialStore, params: &SshParameters) {
    let Some(secret) = &params.password_or_passphrase else {
        return;
    };
    let result = match (params.authentication, &params.identity_file) {
        (AuthenticationType::Password, _) => {
            credentials
                .save_password(SSH_SERVICE_NAME, &params.host, &params.account, secret.expose())
                .await
        }
        (AuthenticationType::PublicKey, Some(key_file)) => {
            credentials
                .save_key_passphrase(SSH_SERVICE_NAME, key_file, secret.expose())
                .await
        }
        _ => return,
    };
    if let Err(e) = result {
        warn!(host = %params.host, error = %e, "Failed to save credentials");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn cipher_order_appends_missing() {
        let order = complete_cipher_order(&[
            "aes128-ctr".to_string(),
            "blowfish-cbc".to_string(),
            "aes128-ctr".to_string(),
        ]);
        assert_eq!(order[0], "aes128-ctr");
        assert_eq!(order.len(), SUPPORTED_CIPHER_ALGORITHMS.len());
        assert!(!order.iter().any(|name| name == "blowfish-cbc"));
    }

    #[test]
    fn engine_errors_map_to_attempt_errors() {
        let err = SshEngineError::HostKeyRejected.into_connect_error("alpha");
        assert!(matches!(err, ConnectError::HostKeyRejected { ref host } if host == "alpha"));
        assert!(matches!(
            SshEngineError::Timeout.into_connect_error("alpha"),
            ConnectError::Timeout
        ));
        assert!(matches!(
            SshEngineError::Protocol("bad".to_string()).into_connect_error("alpha"),
            ConnectError::Ssh(_)
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn accept_any_host_key_logs_what_it_trusts() {
        let callbacks = SshCallbacks::new(Arc::new(AcceptAnyHostKey));
        let info = HostKeyInfo::new(
            "alpha",
            2222,
            SshProtocol::Ssh2,
            "ssh-ed25519 AAAA",
            vec![0xAB, 0x01],
        );
        assert!(callbacks.verify_host_key(&info).await);
        assert!(logs_contain("Accepting host key without verification"));
        assert!(logs_contain("host=alpha"));
    }

    #[test]
    #[traced_test]
    fn event_logger_tags_destination() {
        let logger = TracingEventLogger::new("alpha");
        logger.on_send("SSH_MSG_KEXINIT", "cookie");
        logger.on_receive("SSH_MSG_NEWKEYS", "");
        logger.on_trace("switching keys");
        assert!(logs_contain("Send    : SSH_MSG_KEXINIT cookie"));
        assert!(logs_contain("Receive : SSH_MSG_NEWKEYS"));
        assert!(logs_contain("Trace   : switching keys"));
        assert!(logs_contain("destination=alpha"));
    }

    struct FailingStore;

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn save_password(&self, _: &str, _: &str, _: &str, _: &str) -> std::io::Result<()> {
            Err(std::io::Error::other("vault locked"))
        }

        async fn save_key_passphrase(&self, _: &str, _: &Path, _: &str) -> std::io::Result<()> {
            Err(std::io::Error::other("vault locked"))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn credential_failure_is_logged() {
        let params = SshParameters::new("alpha", 22, "root")
            .with_password("hunter2")
            .with_save_password(true);
        save_credentials(&FailingStore, &params).await;
        assert!(logs_contain("Failed to save credentials"));
        assert!(!logs_contain("hunter2"));
    }
}
