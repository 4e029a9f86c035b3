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

use crate::NegotiationWarning;
use crate::consts;
use std::fmt::Formatter;

///
/// Telnet options as seen by the negotiator. Everything it does not actively
/// negotiate collapses into [`TelnetOption::Unknown`].
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::ECHO`] Echo [RFC857](https://tools.ietf.org/html/rfc857)
    LocalEcho,
    /// [`consts::option::SGA`] Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    TerminalType,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    NAWS,
    /// Any option this engine refuses
    Unknown(u8),
}

impl TelnetOption {
    /// Maps a raw option code onto a `TelnetOption`.
    pub fn from_u8(byte: u8) -> TelnetOption {
        match byte {
            consts::option::ECHO => TelnetOption::LocalEcho,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::NAWS => TelnetOption::NAWS,
            other => TelnetOption::Unknown(other),
        }
    }

    /// Returns the raw option code.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::LocalEcho => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::Unknown(byte) => *byte,
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        TelnetOption::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::LocalEcho => write!(f, "LocalEcho"),
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::TerminalType => write!(f, "TerminalType"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::Unknown(byte) => write!(f, "Unknown({byte})"),
        }
    }
}

/// Option negotiation verbs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetVerb {
    /// `WILL`: the sender offers to enable the option locally
    Will,
    /// `WONT`: the sender refuses to enable the option locally
    Wont,
    /// `DO`: the sender asks the receiver to enable the option
    Do,
    /// `DONT`: the sender asks the receiver to disable the option
    Dont,
}

impl TelnetVerb {
    /// Maps a command byte onto a verb, or `None` for non-negotiation commands.
    pub fn from_u8(byte: u8) -> Option<TelnetVerb> {
        match byte {
            consts::WILL => Some(TelnetVerb::Will),
            consts::WONT => Some(TelnetVerb::Wont),
            consts::DO => Some(TelnetVerb::Do),
            consts::DONT => Some(TelnetVerb::Dont),
            _ => None,
        }
    }

    /// Returns the command byte.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetVerb::Will => consts::WILL,
            TelnetVerb::Wont => consts::WONT,
            TelnetVerb::Do => consts::DO,
            TelnetVerb::Dont => consts::DONT,
        }
    }
}

impl std::fmt::Display for TelnetVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetVerb::Will => write!(f, "WILL"),
            TelnetVerb::Wont => write!(f, "WONT"),
            TelnetVerb::Do => write!(f, "DO"),
            TelnetVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// A single `IAC <verb> <option>` request received from the peer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionRequest {
    /// What the peer said
    pub verb: TelnetVerb,
    /// What it said it about
    pub option: TelnetOption,
}

impl OptionRequest {
    /// Creates a new request.
    pub fn new(verb: TelnetVerb, option: TelnetOption) -> Self {
        OptionRequest { verb, option }
    }

    /// Applies the option policy table to this request.
    pub fn respond(&self) -> OptionResponse {
        OptionPolicy::for_option(self.option).respond(self.verb, self.option)
    }
}

/// What the negotiator does in answer to an [`OptionRequest`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionResponse {
    /// Nothing to send, nothing to report
    Ignore,
    /// Send `IAC <verb> <option>`
    Reply(TelnetVerb, TelnetOption),
    /// Send the NAWS subnegotiation carrying the current window size
    SendWindowSize,
    /// Record the peer's acceptance of suppress-go-ahead in one direction
    ConfirmSuppressGoAhead(TelnetVerb),
    /// Record a non-fatal warning
    Warn(NegotiationWarning),
}

/// Per-option negotiation behavior.
///
/// Every option the table does not name maps to [`OptionPolicy::Refuse`], so
/// uniform refusal holds for any code the peer invents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionPolicy {
    /// Announce our terminal type when asked
    AnnounceTerminalType,
    /// Report the window size when asked
    ReportWindowSize,
    /// Expect the peer to agree in both directions
    SuppressGoAhead,
    /// Agree to echo when asked, otherwise stay quiet
    AcceptEcho,
    /// `WONT` to every `DO`, `DONT` to every `WILL`
    Refuse,
}

impl OptionPolicy {
    /// Looks up the policy for `option`.
    pub fn for_option(option: TelnetOption) -> OptionPolicy {
        match option {
            TelnetOption::TerminalType => OptionPolicy::AnnounceTerminalType,
            TelnetOption::NAWS => OptionPolicy::ReportWindowSize,
            TelnetOption::SuppressGoAhead => OptionPolicy::SuppressGoAhead,
            TelnetOption::LocalEcho => OptionPolicy::AcceptEcho,
            TelnetOption::Unknown(_) => OptionPolicy::Refuse,
        }
    }

    /// Computes the response to `verb` for `option` under this policy.
    pub fn respond(self, verb: TelnetVerb, option: TelnetOption) -> OptionResponse {
        match (self, verb) {
            (OptionPolicy::AnnounceTerminalType, TelnetVerb::Do) => {
                OptionResponse::Reply(TelnetVerb::Will, option)
            }
            (OptionPolicy::AnnounceTerminalType, _) => {
                OptionResponse::Warn(NegotiationWarning::TerminalTypeRefused)
            }
            (OptionPolicy::ReportWindowSize, TelnetVerb::Do) => OptionResponse::SendWindowSize,
            (OptionPolicy::ReportWindowSize, _) => {
                OptionResponse::Warn(NegotiationWarning::WindowSizeRefused)
            }
            // Our default announcement already carries DO SGA and WILL SGA.
            (OptionPolicy::SuppressGoAhead, TelnetVerb::Will | TelnetVerb::Do) => {
                OptionResponse::ConfirmSuppressGoAhead(verb)
            }
            (OptionPolicy::SuppressGoAhead, _) => {
                OptionResponse::Warn(NegotiationWarning::SuppressGoAheadRefused)
            }
            (OptionPolicy::AcceptEcho, TelnetVerb::Do) => {
                OptionResponse::Reply(TelnetVerb::Will, option)
            }
            (OptionPolicy::AcceptEcho, _) => OptionResponse::Ignore,
            (OptionPolicy::Refuse, TelnetVerb::Do) => OptionResponse::Reply(TelnetVerb::Wont, option),
            (OptionPolicy::Refuse, TelnetVerb::Will) => {
                OptionResponse::Reply(TelnetVerb::Dont, option)
            }
            (OptionPolicy::Refuse, _) => OptionResponse::Ignore,
        }
    }
}
