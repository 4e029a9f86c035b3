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

//! Byte stream a connection attempt runs over

use tokio::io::{AsyncRead, AsyncWrite};

/// An already connected, bidirectional byte stream.
///
/// Implemented for every Tokio stream that is `Unpin + Send + 'static`, such as
/// `TcpStream` or the halves of `tokio::io::duplex`.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Owned, type-erased transport.
pub type BoxedTransport = Box<dyn Transport>;
