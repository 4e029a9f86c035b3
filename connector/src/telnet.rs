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

//! Telnet connection strategy and session

use crate::{BoxedTransport, ConnectError, ConnectResult, InterruptFlag, TelnetParameters};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use termlink_telnet::{NegotiationWarning, ProcessResult, TelnetNegotiator, WindowSize, consts};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace, warn};

/// An established Telnet session.
///
/// The session keeps negotiating for as long as it lives: command sequences
/// arriving later are answered during [`read`](Self::read) and never reach
/// the caller.
pub struct TelnetSession {
    transport: BoxedTransport,
    negotiator: TelnetNegotiator,
    destination: String,
    initial_data: BytesMut,
    read_buffer: BytesMut,
    buffer_size: usize,
    warnings: Vec<NegotiationWarning>,
}

impl TelnetSession {
    /// `host:port` of the peer.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Data that arrived with the end of negotiation and has not been read yet.
    pub fn initial_data(&self) -> &[u8] {
        &self.initial_data
    }

    /// Negotiation warnings collected so far.
    pub fn warnings(&self) -> &[NegotiationWarning] {
        &self.warnings
    }

    /// The negotiator answering the peer.
    pub fn negotiator(&self) -> &TelnetNegotiator {
        &self.negotiator
    }

    /// Reads the next chunk of application data.
    ///
    /// Returns the initial data first. An empty chunk means the peer closed
    /// the connection.
    pub async fn read(&mut self) -> std::io::Result<Bytes> {
        if !self.initial_data.is_empty() {
            return Ok(self.initial_data.split().freeze());
        }
        loop {
            self.read_buffer.reserve(self.buffer_size);
            let read = self.transport.read_buf(&mut self.read_buffer).await?;
            if read == 0 {
                return Ok(Bytes::new());
            }
            let input = self.read_buffer.split();
            let mut data = BytesMut::with_capacity(input.len());
            filter_commands(&mut self.negotiator, &input, &mut data);
            self.negotiator.flush(&mut self.transport).await?;
            self.collect_warnings();
            if !data.is_empty() {
                return Ok(data.freeze());
            }
        }
    }

    /// Sends application data, escaping `0xFF`.
    pub async fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        let mut escaped = BytesMut::with_capacity(data.len());
        for &byte in data {
            if byte == consts::IAC {
                escaped.put_u8(consts::IAC);
            }
            escaped.put_u8(byte);
        }
        self.transport.write_all(&escaped).await?;
        self.transport.flush().await
    }

    /// Reports a new window size if the peer asked for window size updates.
    pub async fn resize(&mut self, width: u16, height: u16) -> std::io::Result<()> {
        if self.negotiator.resize(WindowSize::new(width, height)) {
            debug!(width, height, "Reporting window size");
            self.negotiator.flush(&mut self.transport).await?;
        }
        Ok(())
    }

    /// Closes the write side of the transport.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.transport.shutdown().await
    }

    /// Releases the transport. Unread initial data is discarded.
    pub fn into_transport(self) -> BoxedTransport {
        self.transport
    }

    fn collect_warnings(&mut self) {
        self.warnings.extend(self.negotiator.take_warnings());
    }
}

impl fmt::Debug for TelnetSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelnetSession")
            .field("destination", &self.destination)
            .field("negotiator", &self.negotiator)
            .field("initial_data", &self.initial_data.len())
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

/// Splits `input` into command sequences, which go to the negotiator, and
/// application data, which is appended to `data`.
fn filter_commands(negotiator: &mut TelnetNegotiator, input: &[u8], data: &mut BytesMut) {
    for &byte in input {
        if negotiator.in_progress() {
            if negotiator.process(byte) == ProcessResult::LiteralFF {
                data.put_u8(consts::IAC);
            }
        } else if byte == consts::IAC {
            negotiator.start_negotiation();
        } else {
            data.put_u8(byte);
        }
    }
}

/// Runs the initial option exchange on `transport`.
///
/// The default capability announcement goes out first. Input is then read
/// batch by batch and replies are flushed after each batch. The exchange ends
/// with the first batch that leaves the engine idle, and any application data
/// in the batches read so far becomes the session's initial data, which may
/// be empty.
pub(crate) async fn negotiate_telnet(
    mut transport: BoxedTransport,
    params: &TelnetParameters,
    interrupt: &InterruptFlag,
) -> ConnectResult<TelnetSession> {
    let destination = params.address();
    let mut negotiator = TelnetNegotiator::new(params.terminal_type.clone(), params.window_size());
    negotiator.flush(&mut transport).await?;
    debug!(destination = %destination, "Telnet negotiation started");

    let mut buffer = BytesMut::with_capacity(params.buffer_size);
    let mut initial_data = BytesMut::new();
    loop {
        buffer.reserve(params.buffer_size);
        let read = tokio::select! {
            biased;
            () = interrupt.interrupted() => return Err(ConnectError::Interrupted),
            read = transport.read_buf(&mut buffer) => read?,
        };
        if read == 0 {
            return Err(ConnectError::ConnectionClosed);
        }
        let input = buffer.split();
        trace!(len = input.len(), "Negotiation input");
        filter_commands(&mut negotiator, &input, &mut initial_data);
        negotiator.flush(&mut transport).await?;
        if !negotiator.in_progress() {
            break;
        }
    }

    negotiator.check_suppress_go_ahead();
    let warnings = negotiator.take_warnings();
    if !warnings.is_empty() {
        if params.fail_on_warnings {
            let reasons = warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConnectError::Negotiation(reasons));
        }
        warn!(destination = %destination, count = warnings.len(), "Telnet negotiation finished with warnings");
    }
    debug!(destination = %destination, initial = initial_data.len(), "Telnet negotiation finished");

    Ok(TelnetSession {
        transport,
        negotiator,
        destination,
        initial_data,
        read_buffer: BytesMut::new(),
        buffer_size: params.buffer_size,
        warnings,
    })
}
