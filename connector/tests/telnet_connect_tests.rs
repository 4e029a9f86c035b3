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

//! Telnet attempts against a scripted peer

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use termlink_connector::{
    AttemptState, ConnectError, Connector, ConnectorClient, Negotiation, NegotiationWarning,
    SynchronizedClient, TIMED_OUT_MESSAGE, TelnetParameters, TelnetSession, TerminalSession,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

// ============================================================================
// Helper Functions
// ============================================================================

const IAC: u8 = 0xFF;
const SB: u8 = 0xFA;
const SE: u8 = 0xF0;
const WILL: u8 = 0xFB;
const DO: u8 = 0xFD;
const DONT: u8 = 0xFE;
const SGA: u8 = 0x03;
const TTYPE: u8 = 0x18;
const NAWS: u8 = 0x1F;

const DEFAULT_ANNOUNCEMENT: [u8; 12] = [
    IAC, WILL, TTYPE, IAC, DO, SGA, IAC, WILL, SGA, IAC, WILL, NAWS,
];

/// Records every outcome reported to it.
#[derive(Default)]
struct RecordingClient {
    sessions: Mutex<Vec<TerminalSession>>,
    errors: Mutex<Vec<ConnectError>>,
}

impl RecordingClient {
    fn outcomes(&self) -> usize {
        self.sessions.lock().len() + self.errors.lock().len()
    }

    fn take_telnet(&self) -> TelnetSession {
        self.sessions
            .lock()
            .pop()
            .and_then(TerminalSession::into_telnet)
            .unwrap()
    }
}

impl ConnectorClient for RecordingClient {
    fn succeeded(&self, session: TerminalSession) {
        self.sessions.lock().push(session);
    }

    fn failed(&self, error: ConnectError) {
        self.errors.lock().push(error);
    }
}

fn telnet_connector(params: TelnetParameters) -> (Connector, DuplexStream) {
    let (client_io, server) = duplex(4096);
    (Connector::new(client_io, Negotiation::Telnet(params)), server)
}

async fn expect_announcement(server: &mut DuplexStream) {
    let mut announcement = [0u8; 12];
    server.read_exact(&mut announcement).await.unwrap();
    assert_eq!(announcement, DEFAULT_ANNOUNCEMENT);
}

async fn read_text(session: &mut TelnetSession, len: usize) -> Vec<u8> {
    let mut text = Vec::new();
    while text.len() < len {
        let chunk = session.read().await.unwrap();
        assert!(!chunk.is_empty(), "peer closed early");
        text.extend_from_slice(&chunk);
    }
    text
}

// ============================================================================
// Successful Negotiation
// ============================================================================

#[tokio::test]
async fn test_full_negotiation_then_data() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::new("bbs", 23));
    let client = Arc::new(SynchronizedClient::new());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    let mut script = vec![
        IAC, DO, TTYPE, IAC, WILL, SGA, IAC, DO, SGA, IAC, DO, NAWS, IAC, SB, TTYPE, 0x01, IAC, SE,
    ];
    script.extend_from_slice(b"Welcome\r\n");
    server.write_all(&script).await.unwrap();

    let mut replies = [0u8; 23];
    server.read_exact(&mut replies).await.unwrap();
    assert_eq!(
        replies,
        [
            IAC, WILL, TTYPE, // DO TTYPE
            IAC, SB, NAWS, 0x00, 0x50, 0x00, 0x18, IAC, SE, // DO NAWS
            IAC, SB, TTYPE, 0x00, b'x', b't', b'e', b'r', b'm', IAC, SE, // SB TTYPE SEND
        ]
    );

    let session = client
        .wait_connection(&connector, Duration::from_secs(5))
        .await
        .expect("session");
    assert_eq!(session.destination(), "bbs:23");
    let mut telnet = session.into_telnet().unwrap();
    assert!(telnet.warnings().is_empty());
    assert_eq!(read_text(&mut telnet, 9).await, b"Welcome\r\n");

    connector.join().await;
    assert_eq!(connector.state(), AttemptState::Succeeded);
    assert!(connector.error().is_none());
}

#[tokio::test]
async fn test_negotiation_completes_without_data() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::new("bbs", 23));
    let client = Arc::new(SynchronizedClient::new());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server
        .write_all(&[IAC, DO, TTYPE, IAC, WILL, SGA, IAC, DO, SGA, IAC, DO, NAWS])
        .await
        .unwrap();
    let mut replies = [0u8; 12];
    server.read_exact(&mut replies).await.unwrap();
    assert_eq!(
        replies,
        [
            IAC, WILL, TTYPE, // DO TTYPE
            IAC, SB, NAWS, 0x00, 0x50, 0x00, 0x18, IAC, SE, // DO NAWS
        ]
    );

    // The peer now waits for the user; the attempt must not.
    let session = client
        .wait_connection(&connector, Duration::from_secs(2))
        .await
        .expect("session");
    assert!(client.error().is_none());
    let mut telnet = session.into_telnet().unwrap();
    assert!(telnet.initial_data().is_empty());
    assert!(telnet.warnings().is_empty());

    server.write_all(b"login: ").await.unwrap();
    assert_eq!(read_text(&mut telnet, 7).await, b"login: ");

    connector.join().await;
    assert_eq!(connector.state(), AttemptState::Succeeded);
}

#[tokio::test]
async fn test_session_keeps_negotiating() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server.write_all(b"$ ").await.unwrap();
    connector.join().await;
    let mut telnet = client.take_telnet();
    assert_eq!(read_text(&mut telnet, 2).await, b"$ ");

    // Commands in the middle of data are answered and stripped.
    server
        .write_all(&[b'a', IAC, DO, 0x27, b'b', IAC, IAC, b'c'])
        .await
        .unwrap();
    assert_eq!(read_text(&mut telnet, 4).await, [b'a', b'b', 0xFF, b'c']);
    let mut reply = [0u8; 3];
    server.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [IAC, 0xFC, 0x27]);

    // Outgoing 0xFF is doubled.
    telnet.write(&[b'q', 0xFF]).await.unwrap();
    let mut written = [0u8; 3];
    server.read_exact(&mut written).await.unwrap();
    assert_eq!(written, [b'q', IAC, IAC]);
}

#[tokio::test]
async fn test_resize_after_naws_request() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server.write_all(&[IAC, DO, NAWS, b'>']).await.unwrap();
    let mut initial = [0u8; 9];
    server.read_exact(&mut initial).await.unwrap();
    connector.join().await;

    let mut telnet = client.take_telnet();
    telnet.resize(132, 43).await.unwrap();
    let mut update = [0u8; 9];
    server.read_exact(&mut update).await.unwrap();
    assert_eq!(update, [IAC, SB, NAWS, 0x00, 0x84, 0x00, 0x2B, IAC, SE]);
}

// ============================================================================
// Warnings
// ============================================================================

#[tokio::test]
async fn test_warnings_are_carried_on_session() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server.write_all(&[IAC, DONT, TTYPE, b'x']).await.unwrap();
    connector.join().await;

    let telnet = client.take_telnet();
    assert_eq!(
        telnet.warnings(),
        &[
            NegotiationWarning::TerminalTypeRefused,
            NegotiationWarning::SuppressGoAheadUnconfirmed
        ]
    );
    assert_eq!(telnet.initial_data(), b"x");
}

#[tokio::test]
async fn test_fail_on_warnings() {
    let params = TelnetParameters::default().with_fail_on_warnings(true);
    let (mut connector, mut server) = telnet_connector(params);
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server
        .write_all(&[IAC, WILL, SGA, IAC, DO, SGA, IAC, DONT, TTYPE, b'x'])
        .await
        .unwrap();
    connector.join().await;

    assert_eq!(connector.state(), AttemptState::Failed);
    assert_eq!(
        connector.error().as_deref(),
        Some("Telnet negotiation failed: Failed to send the terminal type to the host")
    );
    assert_eq!(client.outcomes(), 1);
    assert!(matches!(
        client.errors.lock()[0],
        ConnectError::Negotiation(_)
    ));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_peer_closes_mid_negotiation() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    server.write_all(&[IAC, WILL]).await.unwrap();
    drop(server);
    connector.join().await;

    assert_eq!(connector.state(), AttemptState::Failed);
    assert_eq!(connector.error().as_deref(), Some("Connection closed"));
    assert!(client.errors.lock()[0].is_transport_failure());
}

#[tokio::test]
async fn test_interrupt_stops_waiting_for_data() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();

    expect_announcement(&mut server).await;
    connector.interrupt();
    connector.join().await;

    assert_eq!(connector.state(), AttemptState::Interrupted);
    assert_eq!(client.outcomes(), 1);
    assert!(matches!(
        client.errors.lock()[0],
        ConnectError::Interrupted
    ));
}

#[tokio::test]
async fn test_begin_twice() {
    let (mut connector, _server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(RecordingClient::default());
    connector.begin(client.clone()).unwrap();
    assert!(matches!(
        connector.begin(client.clone()),
        Err(ConnectError::AlreadyStarted)
    ));
    connector.interrupt();
    connector.join().await;
    assert_eq!(client.outcomes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_timeout_interrupts_attempt() {
    let (mut connector, mut server) = telnet_connector(TelnetParameters::default());
    let client = Arc::new(SynchronizedClient::new());
    connector.begin(client.clone()).unwrap();
    expect_announcement(&mut server).await;

    let session = client
        .wait_connection(&connector, Duration::from_secs(3))
        .await;
    assert!(session.is_none());
    assert_eq!(client.error().as_deref(), Some(TIMED_OUT_MESSAGE));

    connector.join().await;
    assert_eq!(connector.state(), AttemptState::Interrupted);
    // The interrupted report arrived after the wait and did not replace the timeout.
    assert_eq!(client.error().as_deref(), Some(TIMED_OUT_MESSAGE));
}
