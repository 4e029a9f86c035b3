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

//! Result of a successful attempt

use crate::{SshSession, TelnetSession};

/// An established terminal session.
#[derive(Debug)]
pub enum TerminalSession {
    /// Telnet session
    Telnet(TelnetSession),
    /// SSH session
    Ssh(SshSession),
}

impl TerminalSession {
    /// `host:port` of the peer.
    pub fn destination(&self) -> &str {
        match self {
            TerminalSession::Telnet(session) => session.destination(),
            TerminalSession::Ssh(session) => session.destination(),
        }
    }

    /// The Telnet session, if this is one.
    pub fn into_telnet(self) -> Option<TelnetSession> {
        match self {
            TerminalSession::Telnet(session) => Some(session),
            TerminalSession::Ssh(_) => None,
        }
    }

    /// The SSH session, if this is one.
    pub fn into_ssh(self) -> Option<SshSession> {
        match self {
            TerminalSession::Ssh(session) => Some(session),
            TerminalSession::Telnet(_) => None,
        }
    }
}
