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

//! # Termlink Telnet Negotiation
//!
//! This crate implements the client side of Telnet option negotiation (RFC 854/855) to the
//! extent a terminal emulator needs it. It is not a general purpose Telnet codec: it answers
//! the handful of options a functional terminal session depends on and refuses the rest.
//!
//! ## Negotiated Options
//!
//! | Option                   | Behavior                                                   |
//! |--------------------------|------------------------------------------------------------|
//! | Terminal Type (RFC 1091) | `WILL` on `DO`, name sent on `SB TTYPE SEND`               |
//! | NAWS (RFC 1073)          | window size subnegotiation on `DO`                         |
//! | Suppress Go Ahead        | expected in both directions, announced up front            |
//! | Echo                     | `WILL` on `DO`                                             |
//! | Anything else            | `WONT` on `DO`, `DONT` on `WILL`                           |
//!
//! On the first flush the negotiator announces `WILL TTYPE`, `DO SGA`, `WILL SGA` and
//! `WILL NAWS`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use termlink_telnet::{ProcessResult, TelnetNegotiator, WindowSize, consts};
//!
//! # async fn example(stream: &mut tokio::net::TcpStream, input: &[u8]) -> std::io::Result<()> {
//! let mut negotiator = TelnetNegotiator::new("xterm", WindowSize::new(80, 24));
//! let mut data = Vec::new();
//! for &byte in input {
//!     if negotiator.in_progress() {
//!         if negotiator.process(byte) == ProcessResult::LiteralFF {
//!             data.push(0xFF);
//!         }
//!     } else if byte == consts::IAC {
//!         negotiator.start_negotiation();
//!     } else {
//!         data.push(byte);
//!     }
//! }
//! negotiator.flush(stream).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Parsing never fails. Protocol anomalies that leave the session less than fully
//! functional are recorded as [`NegotiationWarning`]s; whether they matter is up to the
//! caller. Only [`TelnetNegotiator::flush`] can fail, with the transport's I/O error.
//!
//! ## Thread Safety
//!
//! A `TelnetNegotiator` belongs to exactly one connection and is not shared.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod consts;
mod naws;
mod negotiator;
mod option;
mod warning;
mod writer;

pub use self::naws::WindowSize;
pub use self::negotiator::{
    MAX_SUBNEGOTIATION_LEN, NegotiationState, ProcessResult, TRUNCATED_SUBNEGOTIATION_QUIRK,
    TelnetNegotiator,
};
pub use self::option::{OptionPolicy, OptionRequest, OptionResponse, TelnetOption, TelnetVerb};
pub use self::warning::NegotiationWarning;
pub use self::writer::OptionWriter;
