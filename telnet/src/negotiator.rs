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

use crate::writer::OptionWriter;
use crate::{
    NegotiationWarning, OptionRequest, OptionResponse, TelnetOption, TelnetVerb, WindowSize,
    consts,
};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

/// Some hosts send `IAC SB NAWS` and nothing more. Seeing the NAWS option code
/// inside a subnegotiation is therefore taken to mean the subnegotiation has
/// already ended. We never answer such a sequence, so nothing is lost.
pub const TRUNCATED_SUBNEGOTIATION_QUIRK: u8 = consts::option::NAWS;

/// Most subnegotiation bytes kept between `IAC SB` and its terminator. Later
/// bytes are discarded while the terminator is still awaited.
pub const MAX_SUBNEGOTIATION_LEN: usize = 64;

/// Cursor of the negotiator through the IAC grammar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NegotiationState {
    /// Between complete sequences
    #[default]
    Idle,
    /// An IAC has been consumed
    SawIac,
    /// Inside `IAC SB ...`, buffering until the terminator
    Subnegotiation,
    /// `IAC <verb>` has been consumed, the option byte is next
    AwaitingOption(TelnetVerb),
}

/// Outcome of feeding one byte to [`TelnetNegotiator::process`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessResult {
    /// The byte was consumed by the negotiator
    Nop,
    /// `IAC IAC` was seen: the caller must deliver a literal `0xFF` data byte
    LiteralFF,
}

/// Tracks which directions of suppress-go-ahead the peer has agreed to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct SuppressGoAheadAgreement {
    /// Peer sent `WILL SGA`
    remote: bool,
    /// Peer sent `DO SGA`
    local: bool,
}

/// Client side Telnet option negotiator.
///
/// `TelnetNegotiator` consumes the command bytes of a Telnet stream one at a
/// time and queues the replies needed to obtain a working terminal session:
/// terminal type, window size, suppress-go-ahead and local echo. Every other
/// option is refused. Malformed input is absorbed, never reported as an error;
/// results that fall short of a functional session are collected as
/// [`NegotiationWarning`]s for the caller to judge.
///
/// The owner drives it like this:
///
/// 1. When an `IAC` arrives while [`in_progress`](Self::in_progress) is false,
///    call [`start_negotiation`](Self::start_negotiation).
/// 2. While `in_progress` is true, hand each byte to [`process`](Self::process)
///    and deliver `0xFF` to the application whenever it returns
///    [`ProcessResult::LiteralFF`].
/// 3. After each batch of input, call [`flush`](Self::flush).
///
/// The default capability announcement is written by the first flush only, so
/// nothing touches the transport before the owner is ready.
#[derive(Debug)]
pub struct TelnetNegotiator {
    terminal_type: String,
    window_size: WindowSize,
    state: NegotiationState,
    sequence: BytesMut,
    writer: OptionWriter,
    default_options_sent: bool,
    warnings: Vec<NegotiationWarning>,
    window_size_requested: bool,
    suppress_go_ahead: SuppressGoAheadAgreement,
}

impl TelnetNegotiator {
    /// Creates a negotiator reporting `terminal_type` and `window_size`.
    pub fn new(terminal_type: impl Into<String>, window_size: WindowSize) -> TelnetNegotiator {
        TelnetNegotiator {
            terminal_type: terminal_type.into(),
            window_size,
            state: NegotiationState::Idle,
            sequence: BytesMut::new(),
            writer: OptionWriter::new(),
            default_options_sent: false,
            warnings: Vec::new(),
            window_size_requested: false,
            suppress_go_ahead: SuppressGoAheadAgreement::default(),
        }
    }

    /// The terminal type name sent in answer to `TTYPE SEND`.
    pub fn terminal_type(&self) -> &str {
        &self.terminal_type
    }

    /// The window size sent in answer to `DO NAWS`.
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Changes the window size reported by later NAWS replies.
    pub fn set_window_size(&mut self, window_size: WindowSize) {
        self.window_size = window_size;
    }

    /// Changes the window size and, if the peer has asked for NAWS, queues an
    /// update. Returns whether an update was queued.
    pub fn resize(&mut self, window_size: WindowSize) -> bool {
        self.window_size = window_size;
        if self.window_size_requested {
            self.writer.write_window_size(window_size);
            true
        } else {
            false
        }
    }

    /// Current parser state.
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Whether a command sequence is partially consumed.
    pub fn in_progress(&self) -> bool {
        self.state != NegotiationState::Idle
    }

    /// Marks the start of a command sequence; the caller has just consumed an `IAC`.
    pub fn start_negotiation(&mut self) {
        self.state = NegotiationState::SawIac;
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[NegotiationWarning] {
        &self.warnings
    }

    /// Removes and returns the recorded warnings.
    pub fn take_warnings(&mut self) -> Vec<NegotiationWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Whether the peer has asked us to report the window size.
    pub fn window_size_requested(&self) -> bool {
        self.window_size_requested
    }

    /// Whether suppress-go-ahead has been agreed in both directions.
    pub fn suppress_go_ahead_confirmed(&self) -> bool {
        self.suppress_go_ahead.local && self.suppress_go_ahead.remote
    }

    /// Records a warning if suppress-go-ahead has not been agreed in both
    /// directions and no refusal was already reported. Call once the initial
    /// negotiation exchange is over.
    pub fn check_suppress_go_ahead(&mut self) {
        if !self.suppress_go_ahead_confirmed()
            && !self
                .warnings
                .contains(&NegotiationWarning::SuppressGoAheadRefused)
        {
            self.warn(NegotiationWarning::SuppressGoAheadUnconfirmed);
        }
    }

    /// Consumes one byte of a command sequence.
    ///
    /// Callers only feed bytes while [`in_progress`](Self::in_progress) is
    /// true. An `IAC` fed while idle starts a sequence, any other byte fed
    /// while idle is dropped.
    pub fn process(&mut self, byte: u8) -> ProcessResult {
        match self.state {
            NegotiationState::Idle => {
                if byte == consts::IAC {
                    self.state = NegotiationState::SawIac;
                } else {
                    debug!("Dropping byte 0x{:02X} fed outside a command sequence", byte);
                }
            }
            NegotiationState::SawIac => match byte {
                consts::IAC => {
                    self.state = NegotiationState::Idle;
                    return ProcessResult::LiteralFF;
                }
                consts::SB => {
                    self.state = NegotiationState::Subnegotiation;
                }
                _ => {
                    if let Some(verb) = TelnetVerb::from_u8(byte) {
                        self.state = NegotiationState::AwaitingOption(verb);
                    } else {
                        trace!("Ignoring command 0x{:02X}", byte);
                        self.state = NegotiationState::Idle;
                    }
                }
            },
            NegotiationState::Subnegotiation => {
                if byte == consts::SE || byte == TRUNCATED_SUBNEGOTIATION_QUIRK {
                    let sequence = self.sequence.split().freeze();
                    self.process_subnegotiation(&sequence);
                    self.state = NegotiationState::Idle;
                } else if self.sequence.len() < MAX_SUBNEGOTIATION_LEN {
                    self.sequence.put_u8(byte);
                    if self.sequence.len() == MAX_SUBNEGOTIATION_LEN {
                        debug!(
                            limit = MAX_SUBNEGOTIATION_LEN,
                            "Subnegotiation limit reached, discarding until terminator"
                        );
                    }
                }
            }
            NegotiationState::AwaitingOption(verb) => {
                self.process_option_request(OptionRequest::new(verb, TelnetOption::from_u8(byte)));
                self.state = NegotiationState::Idle;
            }
        }
        ProcessResult::Nop
    }

    /// Bytes queued for the peer, not counting a pending default announcement.
    pub fn pending(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    /// Drains the bytes to send. The first call places the default capability
    /// announcement in front of everything else.
    pub fn take_pending(&mut self) -> Bytes {
        if !self.default_options_sent {
            let mut defaults = OptionWriter::new();
            defaults.write_default_options();
            self.writer.prepend(defaults);
            self.default_options_sent = true;
            debug!("Announcing default telnet options");
        }
        self.writer.take()
    }

    /// Writes everything queued for the peer in a single write and clears the queue.
    pub async fn flush<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let pending = self.take_pending();
        if !pending.is_empty() {
            trace!(len = pending.len(), "Flushing telnet negotiation replies");
            writer.write_all(&pending).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    fn process_subnegotiation(&mut self, sequence: &[u8]) {
        if let [option, command, ..] = sequence {
            if *option == consts::option::TTYPE && *command == consts::ttype::SEND {
                debug!(terminal_type = %self.terminal_type, "Sending terminal type");
                self.writer.write_terminal_name(&self.terminal_type);
            }
        }
    }

    fn process_option_request(&mut self, request: OptionRequest) {
        debug!(verb = %request.verb, option = %request.option, "Received option request");
        match request.respond() {
            OptionResponse::Ignore => {}
            OptionResponse::Reply(verb, option) => {
                debug!(verb = %verb, option = %option, "Replying to option request");
                self.writer.write_command(verb, option);
            }
            OptionResponse::SendWindowSize => {
                debug!(size = %self.window_size, "Sending window size");
                self.window_size_requested = true;
                self.writer.write_window_size(self.window_size);
            }
            OptionResponse::ConfirmSuppressGoAhead(TelnetVerb::Will) => {
                self.suppress_go_ahead.remote = true;
            }
            OptionResponse::ConfirmSuppressGoAhead(_) => {
                self.suppress_go_ahead.local = true;
            }
            OptionResponse::Warn(warning) => self.warn(warning),
        }
    }

    fn warn(&mut self, warning: NegotiationWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}
