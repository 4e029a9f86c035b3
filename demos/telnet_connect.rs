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

//! # Telnet Connect Example
//!
//! Connects to a Telnet server, negotiates the terminal session and copies
//! whatever the server sends to stdout until it closes the connection.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example telnet_connect -- towel.blinkenlights.nl 23
//! RUST_LOG=termlink_telnet=debug cargo run --example telnet_connect -- localhost 2323
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use termlink_connector::{Connector, Negotiation, SynchronizedClient, TelnetParameters};
use tokio::net::TcpStream;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let host = args.get(1).map(|s| s.as_str()).unwrap_or("localhost");
    let port: u16 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(23);

    let params = TelnetParameters::new(host, port)
        .with_terminal_type("xterm")
        .with_terminal_size(80, 24);
    info!("Connecting to {}", params.address());
    let stream = TcpStream::connect(params.address()).await?;

    let mut connector = Connector::new(stream, Negotiation::Telnet(params));
    let client = Arc::new(SynchronizedClient::new());
    connector.begin(client.clone())?;

    let Some(session) = client
        .wait_connection(&connector, Duration::from_secs(10))
        .await
    else {
        connector.join().await;
        return Err(client.error().unwrap_or_default().into());
    };
    let Some(mut telnet) = session.into_telnet() else {
        return Err("unexpected session type".into());
    };
    for warning in telnet.warnings() {
        warn!("{}", warning);
    }

    let mut stdout = std::io::stdout();
    loop {
        let chunk = telnet.read().await?;
        if chunk.is_empty() {
            break;
        }
        stdout.write_all(&chunk)?;
        stdout.flush()?;
    }
    info!("Connection closed by server");
    Ok(())
}
