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

//! Telnet command and option byte values used during negotiation.

/// Subnegotiation End
pub const SE: u8 = 0xF0;
/// No Operation
pub const NOP: u8 = 0xF1;
/// Subnegotiation Begin
pub const SB: u8 = 0xFA;
/// Sender wants to enable an option
pub const WILL: u8 = 0xFB;
/// Sender refuses to enable an option
pub const WONT: u8 = 0xFC;
/// Sender asks the receiver to enable an option
pub const DO: u8 = 0xFD;
/// Sender asks the receiver to disable an option
pub const DONT: u8 = 0xFE;
/// Interpret As Command
pub const IAC: u8 = 0xFF;

/// Option codes understood by the negotiator.
pub mod option {
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: u8 = 0x01;
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 0x03;
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    pub const TTYPE: u8 = 0x18;
    /// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: u8 = 0x1F;
}

/// Terminal type subnegotiation commands.
pub mod ttype {
    /// The payload carries a terminal type name.
    pub const IS: u8 = 0x00;
    /// The peer asks for our terminal type name.
    pub const SEND: u8 = 0x01;
}
