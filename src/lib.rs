//! silently drop non-tls connections on a tls-only async-std listener
//!
//! Put [`Accept::silence`] between a listener and the TLS acceptor.
//! Connections whose first byte cannot start a TLS record (plaintext
//! HTTP, port scanners, stray SSH clients) are closed on their first
//! read instead of failing a handshake and filling the logs. Everything
//! else passes through untouched.
//!
//! # Example
//! ```rust
//! # use tls_silence::Accept;
//! # use async_std::prelude::*;
//! # fn main() -> std::io::Result<()> { async_std::task::block_on(async {
//! let listener = async_std::net::TcpListener::bind("127.0.0.1:0")
//!     .await?
//!     .silence();
//! let addr = listener.local_addr()?;
//!
//! let mut client = async_std::net::TcpStream::connect(addr).await?;
//! client.write_all(b"GET / HTTP/1.1\r\n\r\n").await?;
//!
//! let (mut stream, _peer) = listener.accept().await?;
//! let mut buf = [0; 1024];
//! assert_eq!(stream.read(&mut buf).await?, 0);
//! # Ok(()) }) }
//! ```
#![forbid(unsafe_code, future_incompatible)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    missing_docs,
    unreachable_pub,
    missing_copy_implementations,
    unused_qualifications
)]

mod accept;
mod connection;
mod record_type;
mod silence_listener;
mod silence_stream;

#[cfg(test)]
mod mock_connection;

pub use accept::{Accept, AddrOf, BoxFuture};
pub use connection::Connection;
pub use record_type::{is_tls_record_type, RecordType};
pub use silence_listener::SilenceListener;
pub use silence_stream::SilenceStream;
