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

use crate::{TelnetOption, TelnetVerb, WindowSize, consts};
use bytes::{BufMut, Bytes, BytesMut};

/// Ordered, append-only buffer of negotiation replies waiting to be sent.
///
/// Each `write_*` call appends one complete Telnet sequence. The buffer is
/// drained as a whole by [`OptionWriter::take`].
#[derive(Clone, Debug, Default)]
pub struct OptionWriter {
    buffer: BytesMut,
}

impl OptionWriter {
    /// Creates an empty writer.
    pub fn new() -> OptionWriter {
        OptionWriter::default()
    }

    /// Number of bytes pending.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The pending bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Drains the pending bytes, leaving the writer empty.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Appends `IAC <verb> <option>`.
    pub fn write_command(&mut self, verb: TelnetVerb, option: TelnetOption) {
        self.buffer.reserve(3);
        self.buffer.put_u8(consts::IAC);
        self.buffer.put_u8(verb.to_u8());
        self.buffer.put_u8(option.to_u8());
    }

    /// Appends the capabilities we announce on every new session:
    /// `WILL TTYPE`, `DO SGA`, `WILL SGA`, `WILL NAWS`.
    pub fn write_default_options(&mut self) {
        self.write_command(TelnetVerb::Will, TelnetOption::TerminalType);
        self.write_command(TelnetVerb::Do, TelnetOption::SuppressGoAhead);
        self.write_command(TelnetVerb::Will, TelnetOption::SuppressGoAhead);
        self.write_command(TelnetVerb::Will, TelnetOption::NAWS);
    }

    /// Appends `IAC SB TTYPE IS <name> IAC SE`.
    ///
    /// Characters outside ASCII are sent as `?`.
    pub fn write_terminal_name(&mut self, name: &str) {
        self.buffer.reserve(name.len() + 6);
        self.buffer.put_u8(consts::IAC);
        self.buffer.put_u8(consts::SB);
        self.buffer.put_u8(consts::option::TTYPE);
        self.buffer.put_u8(consts::ttype::IS);
        for ch in name.chars() {
            self.buffer.put_u8(if ch.is_ascii() { ch as u8 } else { b'?' });
        }
        self.buffer.put_u8(consts::IAC);
        self.buffer.put_u8(consts::SE);
    }

    /// Appends `IAC SB NAWS <cols> <rows> IAC SE`.
    pub fn write_window_size(&mut self, size: WindowSize) {
        self.buffer.reserve(size.len() + 5);
        self.buffer.put_u8(consts::IAC);
        self.buffer.put_u8(consts::SB);
        self.buffer.put_u8(consts::option::NAWS);
        size.encode(&mut self.buffer);
        self.buffer.put_u8(consts::IAC);
        self.buffer.put_u8(consts::SE);
    }

    /// Prepends `other` so its bytes go out first.
    pub(crate) fn prepend(&mut self, mut other: OptionWriter) {
        other.buffer.unsplit(self.buffer.split());
        self.buffer = other.buffer;
    }
}
