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

//! # Termlink Connector
//!
//! Establishes terminal sessions over an already connected byte stream.
//!
//! A [`Connector`] pairs a [`Transport`] with a [`Negotiation`] strategy:
//!
//! - [`Negotiation::Telnet`] runs the initial Telnet option exchange with a
//!   [`TelnetNegotiator`](termlink_telnet::TelnetNegotiator) and yields a
//!   [`TelnetSession`] that keeps answering the peer while it is read.
//! - [`Negotiation::Ssh`] hands the transport to an [`SshEngine`], with a host
//!   key verifier (normally a shared [`KnownHosts`](termlink_knownhosts::KnownHosts)
//!   store) installed, and yields an [`SshSession`]. The verifier is a required
//!   argument of [`SshNegotiation::new`]; trusting every key takes an explicit
//!   [`AcceptAnyHostKey`].
//!
//! The attempt runs on its own Tokio task and reports to a [`ConnectorClient`]
//! exactly once. [`SynchronizedClient`] turns that callback into something a
//! caller can await with a timeout.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use termlink_connector::{Connector, Negotiation, SynchronizedClient, TelnetParameters};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = TelnetParameters::new("bbs.example.com", 23).with_terminal_type("vt100");
//! let stream = tokio::net::TcpStream::connect(params.address()).await?;
//!
//! let mut connector = Connector::new(stream, Negotiation::Telnet(params));
//! let client = Arc::new(SynchronizedClient::new());
//! connector.begin(client.clone())?;
//!
//! if let Some(session) = client.wait_connection(&connector, Duration::from_secs(10)).await {
//!     let mut telnet = session.into_telnet().expect("telnet session");
//!     let banner = telnet.read().await?;
//!     println!("{}", String::from_utf8_lossy(&banner));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! [`Connector::interrupt`] is advisory. A Telnet attempt stops at its next read;
//! an SSH attempt checks before and after the engine call and lets a running
//! engine call finish. An interrupted attempt reports
//! [`ConnectError::Interrupted`].

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
mod connector;
mod error;
mod interrupt;
mod session;
mod ssh;
mod sync_client;
mod telnet;
mod transport;

pub use self::config::{
    AuthenticationType, DEFAULT_SSH_PORT, DEFAULT_TELNET_PORT, SSH_SERVICE_NAME,
    SUPPORTED_CIPHER_ALGORITHMS, SUPPORTED_HOST_KEY_ALGORITHMS, Secret, SshParameters,
    TelnetParameters,
};
pub use self::connector::{AttemptState, Connector, ConnectorClient, Interruptible, Negotiation};
pub use self::error::{ConnectError, ConnectResult};
pub use self::interrupt::InterruptFlag;
pub use self::session::TerminalSession;
pub use self::ssh::{
    AcceptAnyHostKey, AuthenticationStatus, CredentialStore, KeyboardInteractiveHandler,
    KeyboardInteractiveHandlerFactory, KeyboardPrompt, SshCallbacks, SshConnectionParameters,
    SshEngine, SshEngineError, SshEngineOutput, SshEventLogger, SshNegotiation, SshSession,
    TracingEventLogger, complete_cipher_order,
};
pub use self::sync_client::{SynchronizedClient, TIMED_OUT_MESSAGE};
pub use self::telnet::TelnetSession;
pub use self::transport::{BoxedTransport, Transport};

pub use termlink_knownhosts::{HostKeyInfo, HostKeyVerifier, SshProtocol};
pub use termlink_telnet::{NegotiationWarning, WindowSize};
