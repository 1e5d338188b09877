use crate::{Connection, SilenceListener};

use async_std::io;
use async_std::net::{TcpListener, TcpStream};

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

/// An owned, boxed, `Send` future, as returned by [`Accept::accept`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The address type of the connections an [`Accept`] produces.
pub type AddrOf<L> = <<L as Accept>::Conn as Connection>::Addr;

/// The listener capability: something that hands out freshly accepted
/// connections.
pub trait Accept: Send + Sync {
    /// The connection type this listener produces.
    type Conn: Connection;

    /// Wait for the next connection, returning it together with the
    /// address of the remote peer.
    fn accept(&self) -> BoxFuture<'_, io::Result<(Self::Conn, AddrOf<Self>)>>;

    /// The local address this listener is bound to.
    fn local_addr(&self) -> io::Result<AddrOf<Self>>;

    /// Turn on silencing for this listener.
    ///
    /// Every connection accepted through the returned listener is closed
    /// without a word the first time it is read, unless its first byte
    /// could start a TLS record.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use tls_silence::Accept;
    /// # async_std::task::block_on(async {
    /// let tcp = async_std::net::TcpListener::bind("127.0.0.1:0").await?;
    /// let listener = tcp.silence();
    /// println!("listening on {}", listener.local_addr()?);
    /// # Ok::<(), std::io::Error>(()) }).unwrap();
    /// ```
    fn silence(self) -> SilenceListener<Self>
    where
        Self: Sized,
    {
        SilenceListener::new(self)
    }
}

impl Accept for TcpListener {
    type Conn = TcpStream;

    fn accept(&self) -> BoxFuture<'_, io::Result<(TcpStream, SocketAddr)>> {
        Box::pin(TcpListener::accept(self))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

#[cfg(unix)]
mod unix {
    use super::{Accept, BoxFuture};
    use async_std::io;
    use async_std::os::unix::net::{SocketAddr, UnixListener, UnixStream};

    impl Accept for UnixListener {
        type Conn = UnixStream;

        fn accept(&self) -> BoxFuture<'_, io::Result<(UnixStream, SocketAddr)>> {
            Box::pin(UnixListener::accept(self))
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            UnixListener::local_addr(self)
        }
    }
}
