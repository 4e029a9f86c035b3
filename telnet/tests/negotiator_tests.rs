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

//! Negotiation behavior as seen from the transport

use proptest::prelude::*;
use termlink_telnet::{
    NegotiationState, NegotiationWarning, ProcessResult, TRUNCATED_SUBNEGOTIATION_QUIRK,
    TelnetNegotiator, WindowSize, consts,
};
use tokio::io::{AsyncReadExt, duplex};

// ============================================================================
// Helper Functions
// ============================================================================

const DEFAULT_ANNOUNCEMENT: [u8; 12] = [
    0xFF, 0xFB, 0x18, // WILL TTYPE
    0xFF, 0xFD, 0x03, // DO SGA
    0xFF, 0xFB, 0x03, // WILL SGA
    0xFF, 0xFB, 0x1F, // WILL NAWS
];

fn negotiator() -> TelnetNegotiator {
    TelnetNegotiator::new("xterm-256color", WindowSize::new(80, 24))
}

/// Feeds `input` the way a connection does and returns the data bytes it would deliver.
fn drive(negotiator: &mut TelnetNegotiator, input: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    for &byte in input {
        if negotiator.in_progress() {
            if negotiator.process(byte) == ProcessResult::LiteralFF {
                data.push(0xFF);
            }
        } else if byte == consts::IAC {
            negotiator.start_negotiation();
        } else {
            data.push(byte);
        }
    }
    data
}

// ============================================================================
// Option Requests
// ============================================================================

#[test]
fn do_terminal_type_is_accepted() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::DO, consts::option::TTYPE]);
    assert_eq!(negotiator.state(), NegotiationState::Idle);
    assert_eq!(negotiator.pending(), &[0xFF, 0xFB, 0x18]);
    assert!(negotiator.warnings().is_empty());
}

#[test]
fn refused_terminal_type_is_a_warning() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::DONT, consts::option::TTYPE]);
    assert!(negotiator.pending().is_empty());
    assert_eq!(
        negotiator.warnings(),
        &[NegotiationWarning::TerminalTypeRefused]
    );
}

#[test]
fn do_naws_reports_window_size() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::DO, consts::option::NAWS]);
    assert_eq!(
        negotiator.pending(),
        &[0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0]
    );
    assert!(negotiator.window_size_requested());
}

#[test]
fn naws_uses_latest_window_size() {
    let mut negotiator = negotiator();
    negotiator.set_window_size(WindowSize::new(300, 2));
    drive(&mut negotiator, &[consts::IAC, consts::DO, consts::option::NAWS]);
    assert_eq!(
        negotiator.pending(),
        &[0xFF, 0xFA, 0x1F, 0x01, 0x2C, 0x00, 0x02, 0xFF, 0xF0]
    );
}

#[test]
fn suppress_go_ahead_produces_no_reply() {
    let mut negotiator = negotiator();
    drive(
        &mut negotiator,
        &[
            consts::IAC,
            consts::WILL,
            consts::option::SGA,
            consts::IAC,
            consts::DO,
            consts::option::SGA,
        ],
    );
    assert!(negotiator.pending().is_empty());
    assert!(negotiator.suppress_go_ahead_confirmed());
}

#[test]
fn suppress_go_ahead_refusal_is_a_warning() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::WONT, consts::option::SGA]);
    assert_eq!(
        negotiator.warnings(),
        &[NegotiationWarning::SuppressGoAheadRefused]
    );
}

#[test]
fn do_echo_is_accepted() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::DO, consts::option::ECHO]);
    assert_eq!(negotiator.pending(), &[0xFF, 0xFB, 0x01]);
}

proptest! {
    #[test]
    fn unknown_options_are_always_refused(code in any::<u8>()) {
        prop_assume!(![
            consts::option::ECHO,
            consts::option::SGA,
            consts::option::TTYPE,
            consts::option::NAWS,
        ]
        .contains(&code));

        let mut negotiator = negotiator();
        drive(&mut negotiator, &[consts::IAC, consts::DO, code]);
        prop_assert_eq!(negotiator.pending(), &[0xFF, consts::WONT, code][..]);
        negotiator.take_pending();

        drive(&mut negotiator, &[consts::IAC, consts::WILL, code]);
        prop_assert_eq!(negotiator.pending(), &[0xFF, consts::DONT, code][..]);
        negotiator.take_pending();

        drive(&mut negotiator, &[consts::IAC, consts::WONT, code, consts::IAC, consts::DONT, code]);
        prop_assert!(negotiator.pending().is_empty());
        prop_assert!(negotiator.warnings().is_empty());
        prop_assert_eq!(negotiator.state(), NegotiationState::Idle);
    }
}

// ============================================================================
// Data and Subnegotiation
// ============================================================================

#[test]
fn escaped_iac_is_literal_data() {
    let mut negotiator = negotiator();
    negotiator.start_negotiation();
    assert!(negotiator.in_progress());
    assert_eq!(negotiator.process(consts::IAC), ProcessResult::LiteralFF);
    assert!(!negotiator.in_progress());
    assert!(negotiator.pending().is_empty());
}

#[test]
fn data_around_commands_passes_through() {
    let mut negotiator = negotiator();
    let data = drive(
        &mut negotiator,
        &[b'o', b'k', consts::IAC, consts::IAC, consts::IAC, consts::DO, 0x27, b'!'],
    );
    assert_eq!(data, vec![b'o', b'k', 0xFF, b'!']);
    assert_eq!(negotiator.pending(), &[0xFF, 0xFC, 0x27]);
}

#[test]
fn terminal_type_send_is_answered() {
    let mut negotiator = negotiator();
    drive(
        &mut negotiator,
        &[
            consts::IAC,
            consts::SB,
            consts::option::TTYPE,
            consts::ttype::SEND,
            consts::IAC,
            consts::SE,
        ],
    );
    assert_eq!(negotiator.state(), NegotiationState::Idle);
    let mut expected = vec![0xFF, 0xFA, 0x18, 0x00];
    expected.extend_from_slice(b"xterm-256color");
    expected.extend_from_slice(&[0xFF, 0xF0]);
    assert_eq!(negotiator.pending(), expected.as_slice());
}

#[test]
fn terminal_type_is_ignores_anything_but_send() {
    let mut negotiator = negotiator();
    drive(
        &mut negotiator,
        &[consts::IAC, consts::SB, consts::option::TTYPE, consts::ttype::IS, b'x', consts::IAC, consts::SE],
    );
    assert!(negotiator.pending().is_empty());
    assert!(!negotiator.in_progress());
}

/// Peer-specific behavior: some hosts send `IAC SB NAWS` and stop. The NAWS
/// option code ends the subnegotiation, which is not a Telnet grammar rule.
#[test]
fn truncated_naws_subnegotiation_quirk() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::SB]);
    assert_eq!(negotiator.state(), NegotiationState::Subnegotiation);
    drive(&mut negotiator, &[TRUNCATED_SUBNEGOTIATION_QUIRK]);
    assert_eq!(negotiator.state(), NegotiationState::Idle);
    assert!(negotiator.pending().is_empty());
}

// ============================================================================
// Flushing
// ============================================================================

#[test]
fn first_take_carries_default_announcement_once() {
    let mut negotiator = negotiator();
    negotiator.start_negotiation();
    assert_eq!(negotiator.take_pending().as_ref(), &DEFAULT_ANNOUNCEMENT);
    assert!(negotiator.take_pending().is_empty());
    assert!(negotiator.take_pending().is_empty());
}

#[test]
fn default_announcement_precedes_queued_replies() {
    let mut negotiator = negotiator();
    drive(&mut negotiator, &[consts::IAC, consts::DO, consts::option::ECHO]);
    let flushed = negotiator.take_pending();
    assert_eq!(&flushed[..12], &DEFAULT_ANNOUNCEMENT);
    assert_eq!(&flushed[12..], &[0xFF, 0xFB, 0x01]);
}

#[tokio::test]
async fn flush_writes_to_transport_once() {
    let (mut local, mut remote) = duplex(1024);
    let mut negotiator = negotiator();
    negotiator.start_negotiation();

    negotiator.flush(&mut local).await.unwrap();
    negotiator.flush(&mut local).await.unwrap();
    drop(local);

    let mut received = Vec::new();
    remote.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, DEFAULT_ANNOUNCEMENT);
}

#[tokio::test]
async fn flush_sends_replies_in_order() {
    let (mut local, mut remote) = duplex(1024);
    let mut negotiator = negotiator();
    negotiator.flush(&mut local).await.unwrap();

    drive(
        &mut negotiator,
        &[
            consts::IAC,
            consts::DO,
            consts::option::TTYPE,
            consts::IAC,
            consts::DO,
            consts::option::NAWS,
        ],
    );
    negotiator.flush(&mut local).await.unwrap();
    drop(local);

    let mut received = Vec::new();
    remote.read_to_end(&mut received).await.unwrap();
    assert_eq!(&received[..12], &DEFAULT_ANNOUNCEMENT);
    assert_eq!(
        &received[12..],
        &[0xFF, 0xFB, 0x18, 0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0]
    );
}
