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

//! Error types for connection attempts

use thiserror::Error;

/// Result type for connection operations
pub type ConnectResult<T> = std::result::Result<T, ConnectError>;

/// Reasons a connection attempt fails
#[derive(Debug, Error)]
pub enum ConnectError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before the session was established
    #[error("Connection closed")]
    ConnectionClosed,

    /// Telnet negotiation finished with warnings the caller refuses to accept
    #[error("Telnet negotiation failed: {0}")]
    Negotiation(String),

    /// The SSH host key was not trusted
    #[error("Host key for {host} was rejected")]
    HostKeyRejected {
        /// Host that presented the key
        host: String,
    },

    /// The SSH server refused the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The SSH engine reported a protocol failure
    #[error("SSH error: {0}")]
    Ssh(String),

    /// No answer within the allowed time
    #[error("Connection timed out")]
    Timeout,

    /// The attempt was cancelled
    #[error("Connection interrupted")]
    Interrupted,

    /// `begin` was called on an attempt that is already running
    #[error("Connection attempt already started")]
    AlreadyStarted,
}

impl ConnectError {
    /// Check if the attempt failed because the host's identity was not trusted
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, ConnectError::HostKeyRejected { .. })
    }

    /// Check if the server refused the credentials
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, ConnectError::Authentication(_))
    }

    /// Check if the attempt failed because of the transport
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ConnectError::Io(_) | ConnectError::ConnectionClosed | ConnectError::Timeout
        )
    }
}
