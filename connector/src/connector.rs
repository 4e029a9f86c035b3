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

//! Connection attempt lifecycle
//!
//! A [`Connector`] owns one connected transport and one negotiation strategy.
//! [`Connector::begin`] runs the strategy on a Tokio task and reports the
//! outcome to a [`ConnectorClient`] exactly once.

use crate::telnet::negotiate_telnet;
use crate::ssh::negotiate_ssh;
use crate::{
    BoxedTransport, ConnectError, ConnectResult, InterruptFlag, SshNegotiation, TelnetParameters,
    TerminalSession, Transport,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How the session is established on the transport.
#[derive(Debug, Clone)]
pub enum Negotiation {
    /// Telnet option negotiation
    Telnet(TelnetParameters),
    /// SSH login through an engine
    Ssh(SshNegotiation),
}

impl Negotiation {
    /// `host:port` of the peer.
    pub fn destination(&self) -> String {
        match self {
            Negotiation::Telnet(params) => params.address(),
            Negotiation::Ssh(ssh) => ssh.parameters.address(),
        }
    }
}

/// Attempt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttemptState {
    /// Not started
    Created = 0,
    /// Worker running
    Negotiating = 1,
    /// Session established
    Succeeded = 2,
    /// Attempt failed
    Failed = 3,
    /// Attempt cancelled
    Interrupted = 4,
}

impl AttemptState {
    /// Convert from u8 (for atomic operations)
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Negotiating,
            2 => Self::Succeeded,
            4 => Self::Interrupted,
            _ => Self::Failed,
        }
    }

    /// Convert to u8 (for atomic operations)
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if the attempt has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Interrupted)
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Receives the outcome of a connection attempt.
///
/// Exactly one of the two methods is called, once, from the worker task.
/// Implementations must not block.
pub trait ConnectorClient: Send + Sync + 'static {
    /// The session was established.
    fn succeeded(&self, session: TerminalSession);

    /// The attempt failed or was interrupted.
    fn failed(&self, error: ConnectError);
}

/// State shared between the connector and its worker.
#[derive(Debug)]
struct AttemptShared {
    state: AtomicU8,
    error: Mutex<Option<String>>,
    interrupt: InterruptFlag,
}

impl AttemptShared {
    fn state(&self) -> AttemptState {
        AttemptState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves from `from` to `to`. Terminal states never change again.
    fn transition(&self, from: AttemptState, to: AttemptState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// One interruptible connection attempt.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use termlink_connector::{Connector, Negotiation, SynchronizedClient, TelnetParameters};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = TelnetParameters::new("bbs.example.com", 23);
/// let stream = tokio::net::TcpStream::connect(params.address()).await?;
/// let mut connector = Connector::new(stream, Negotiation::Telnet(params));
/// let client = Arc::new(SynchronizedClient::new());
/// connector.begin(client.clone())?;
/// match client.wait_connection(&connector, Duration::from_secs(10)).await {
///     Some(session) => println!("connected to {}", session.destination()),
///     None => println!("{}", client.error().unwrap_or_default()),
/// }
/// # Ok(())
/// # }
/// ```
pub struct Connector {
    destination: String,
    pending: Option<(BoxedTransport, Negotiation)>,
    shared: Arc<AttemptShared>,
    worker: Option<JoinHandle<()>>,
}

impl Connector {
    /// Binds a connected transport to a negotiation strategy.
    pub fn new(transport: impl Transport, negotiation: Negotiation) -> Self {
        Self {
            destination: negotiation.destination(),
            pending: Some((Box::new(transport), negotiation)),
            shared: Arc::new(AttemptShared {
                state: AtomicU8::new(AttemptState::Created.as_u8()),
                error: Mutex::new(None),
                interrupt: InterruptFlag::new(),
            }),
            worker: None,
        }
    }

    /// `host:port` of the peer.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Starts the attempt on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn begin(&mut self, client: Arc<dyn ConnectorClient>) -> ConnectResult<()> {
        let Some((transport, negotiation)) = self.pending.take() else {
            return Err(ConnectError::AlreadyStarted);
        };
        self.shared
            .transition(AttemptState::Created, AttemptState::Negotiating);
        debug!(destination = %self.destination, "Connection attempt started");

        let shared = self.shared.clone();
        let destination = self.destination.clone();
        self.worker = Some(tokio::spawn(run_attempt(
            shared,
            destination,
            transport,
            negotiation,
            client,
        )));
        Ok(())
    }

    /// Asks the attempt to stop. Advisory: the worker notices at its next
    /// suspension point, and an engine call in progress runs to completion.
    pub fn interrupt(&self) {
        debug!(destination = %self.destination, "Interrupt requested");
        self.shared.interrupt.interrupt();
    }

    /// Current state.
    pub fn state(&self) -> AttemptState {
        self.shared.state()
    }

    /// Failure message once the attempt has failed.
    pub fn error(&self) -> Option<String> {
        self.shared.error.lock().clone()
    }

    /// Waits for the worker task to finish.
    pub async fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!(destination = %self.destination, error = %e, "Connection worker aborted");
            }
        }
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("destination", &self.destination)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

mod private {
    pub trait Sealed {}
}

/// An operation a waiter may cancel. Only [`Connector`] implements it.
pub trait Interruptible: private::Sealed {
    /// Asks the operation to stop.
    fn interrupt(&self);
}

impl private::Sealed for Connector {}

impl Interruptible for Connector {
    fn interrupt(&self) {
        Connector::interrupt(self);
    }
}

async fn run_attempt(
    shared: Arc<AttemptShared>,
    destination: String,
    transport: BoxedTransport,
    negotiation: Negotiation,
    client: Arc<dyn ConnectorClient>,
) {
    let result = match negotiation {
        Negotiation::Telnet(params) => negotiate_telnet(transport, &params, &shared.interrupt)
            .await
            .map(TerminalSession::Telnet),
        Negotiation::Ssh(ssh) => negotiate_ssh(transport, ssh, &shared.interrupt)
            .await
            .map(TerminalSession::Ssh),
    };
    let result = match result {
        Ok(_) if shared.interrupt.is_interrupted() => Err(ConnectError::Interrupted),
        other => other,
    };

    match result {
        Ok(session) => {
            shared.transition(AttemptState::Negotiating, AttemptState::Succeeded);
            info!(destination = %destination, "Connection established");
            client.succeeded(session);
        }
        Err(err) => {
            let state = if matches!(err, ConnectError::Interrupted) {
                AttemptState::Interrupted
            } else {
                AttemptState::Failed
            };
            *shared.error.lock() = Some(err.to_string());
            shared.transition(AttemptState::Negotiating, state);
            warn!(destination = %destination, error = %err, "Connection failed");
            client.failed(err);
        }
    }
}
