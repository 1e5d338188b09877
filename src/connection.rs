use async_std::io::{self, Read, Write};
use async_std::net::TcpStream;

use std::fmt::Debug;
use std::net::{Shutdown, SocketAddr};

/// The connection capability a host hands to this crate and gets back
/// from it: an async byte stream that can be closed from a shared
/// reference and reports its addresses.
///
/// `close` must take effect for every handle onto the same socket, the
/// way [`TcpStream::shutdown`] does, so that a reader parked on another
/// handle is woken with the transport's closed-connection result.
pub trait Connection: Read + Write + Unpin + Send + 'static {
    /// The address type of this transport.
    type Addr: Debug + Send + 'static;

    /// Shut down both directions of the connection.
    fn close(&self) -> io::Result<()>;

    /// The local address of this connection.
    fn local_addr(&self) -> io::Result<Self::Addr>;

    /// The remote address of this connection.
    fn peer_addr(&self) -> io::Result<Self::Addr>;
}

impl Connection for TcpStream {
    type Addr = SocketAddr;

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }
}

#[cfg(unix)]
mod unix {
    use super::Connection;
    use async_std::io;
    use async_std::os::unix::net::{SocketAddr, UnixStream};
    use std::net::Shutdown;

    impl Connection for UnixStream {
        type Addr = SocketAddr;

        fn close(&self) -> io::Result<()> {
            self.shutdown(Shutdown::Both)
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            UnixStream::local_addr(self)
        }

        fn peer_addr(&self) -> io::Result<SocketAddr> {
            UnixStream::peer_addr(self)
        }
    }
}
