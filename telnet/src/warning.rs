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

/// A negotiation outcome that falls short of a fully functional terminal
/// session without being worth aborting the connection over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationWarning {
    /// The peer sent something other than `DO TERMINAL-TYPE`
    TerminalTypeRefused,
    /// The peer sent something other than `DO NAWS`
    WindowSizeRefused,
    /// The peer refused suppress-go-ahead in at least one direction
    SuppressGoAheadRefused,
    /// Suppress-go-ahead was not agreed in both directions by the end of negotiation
    SuppressGoAheadUnconfirmed,
}

impl std::fmt::Display for NegotiationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationWarning::TerminalTypeRefused => {
                write!(f, "Failed to send the terminal type to the host")
            }
            NegotiationWarning::WindowSizeRefused => {
                write!(f, "Failed to send the window size to the host")
            }
            NegotiationWarning::SuppressGoAheadRefused => {
                write!(f, "The host refused to suppress go-ahead")
            }
            NegotiationWarning::SuppressGoAheadUnconfirmed => {
                write!(f, "Suppress go-ahead was not confirmed in both directions")
            }
        }
    }
}
