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

//! Waiting for a connection attempt with a timeout

use crate::{ConnectError, ConnectorClient, Interruptible, TerminalSession};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Error recorded when [`SynchronizedClient::wait_connection`] gives up.
pub const TIMED_OUT_MESSAGE: &str = "Connection timed out";

#[derive(Debug, Default)]
struct WaitState {
    session: Option<TerminalSession>,
    error: Option<String>,
    completed: bool,
    timed_out: bool,
}

/// [`ConnectorClient`] a caller can wait on.
///
/// The client is single use: one attempt, one wait. Once the wait has timed
/// out, outcomes reported later are discarded; a late session is dropped,
/// which closes its transport.
#[derive(Debug, Default)]
pub struct SynchronizedClient {
    state: Mutex<WaitState>,
    signal: Notify,
}

impl SynchronizedClient {
    /// Creates a client with nothing reported yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for the outcome of `operation`.
    ///
    /// Returns the session on success. On failure or timeout returns `None`
    /// and [`error`](Self::error) holds the reason. A timeout interrupts
    /// `operation`.
    pub async fn wait_connection(
        &self,
        operation: &impl Interruptible,
        timeout: Duration,
    ) -> Option<TerminalSession> {
        let signalled = tokio::time::timeout(timeout, self.signal.notified())
            .await
            .is_ok();

        let mut state = self.state.lock();
        if !signalled && !state.completed {
            state.timed_out = true;
            state.error = Some(TIMED_OUT_MESSAGE.to_string());
            operation.interrupt();
        }

        let session = state.session.take();
        if session.is_none() {
            warn!(
                error = state.error.as_deref().unwrap_or_default(),
                "Connection was not established"
            );
        }
        session
    }

    /// Why the connection was not established.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Whether the wait gave up before an outcome arrived.
    pub fn timed_out(&self) -> bool {
        self.state.lock().timed_out
    }
}

impl ConnectorClient for SynchronizedClient {
    fn succeeded(&self, session: TerminalSession) {
        let mut state = self.state.lock();
        if state.timed_out || state.completed {
            drop(state);
            debug!(destination = session.destination(), "Dropping session reported after the wait ended");
            return;
        }
        state.session = Some(session);
        state.completed = true;
        drop(state);
        self.signal.notify_one();
    }

    fn failed(&self, error: ConnectError) {
        let mut state = self.state.lock();
        if state.timed_out || state.completed {
            debug!(error = %error, "Ignoring failure reported after the wait ended");
            return;
        }
        state.error = Some(error.to_string());
        state.completed = true;
        drop(state);
        self.signal.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telnet::negotiate_telnet;
    use crate::{Connector, InterruptFlag, Negotiation, TelnetParameters};
    use tokio::io::{AsyncWriteExt, duplex};
    use tracing_test::traced_test;

    async fn telnet_session() -> TerminalSession {
        let (client_io, mut server) = duplex(256);
        server.write_all(b"x").await.unwrap();
        let session = negotiate_telnet(
            Box::new(client_io),
            &TelnetParameters::default(),
            &InterruptFlag::new(),
        )
        .await
        .unwrap();
        TerminalSession::Telnet(session)
    }

    fn idle_connector() -> Connector {
        let (client_io, _server) = duplex(64);
        Connector::new(client_io, Negotiation::Telnet(TelnetParameters::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn session_reported_before_wait_is_returned() {
        let client = SynchronizedClient::new();
        client.succeeded(telnet_session().await);

        let session = client
            .wait_connection(&idle_connector(), Duration::from_secs(5))
            .await;
        assert!(session.is_some());
        assert!(client.error().is_none());
        assert!(!client.timed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_message_is_kept() {
        let client = SynchronizedClient::new();
        client.failed(ConnectError::ConnectionClosed);

        let session = client
            .wait_connection(&idle_connector(), Duration::from_secs(5))
            .await;
        assert!(session.is_none());
        assert_eq!(client.error().as_deref(), Some("Connection closed"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn late_outcomes_are_ignored_after_timeout() {
        let client = SynchronizedClient::new();
        let connector = idle_connector();

        let session = client
            .wait_connection(&connector, Duration::from_millis(100))
            .await;
        assert!(session.is_none());
        assert!(client.timed_out());
        assert_eq!(client.error().as_deref(), Some(TIMED_OUT_MESSAGE));

        client.succeeded(telnet_session().await);
        client.failed(ConnectError::Interrupted);
        assert_eq!(client.error().as_deref(), Some(TIMED_OUT_MESSAGE));
        assert!(logs_contain("Dropping session reported after the wait ended"));
        assert!(logs_contain("Interrupt requested"));
    }

    #[tokio::test(start_paused = true)]
    async fn only_first_outcome_counts() {
        let client = SynchronizedClient::new();
        client.failed(ConnectError::Timeout);
        client.failed(ConnectError::ConnectionClosed);
        assert!(
            client
                .wait_connection(&idle_connector(), Duration::from_secs(5))
                .await
                .is_none()
        );
        assert_eq!(client.error().as_deref(), Some("Connection timed out"));
    }
}
