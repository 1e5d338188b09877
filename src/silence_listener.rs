use crate::accept::{AddrOf, BoxFuture};
use crate::{Accept, SilenceStream};

use async_std::io;

/// A listener that wraps every accepted connection in a
/// [`SilenceStream`].
///
/// This is the type returned by [`Accept::silence`]. It holds no state
/// of its own: accept errors come back exactly as the inner listener
/// reported them, and the local address is the inner listener's.
#[derive(Debug)]
pub struct SilenceListener<L> {
    listener: L,
}

impl<L> SilenceListener<L> {
    /// Wrap `listener`. Prefer [`Accept::silence`].
    pub fn new(listener: L) -> Self {
        Self { listener }
    }

    /// A reference to the wrapped listener.
    pub fn get_ref(&self) -> &L {
        &self.listener
    }

    /// Unwrap this into the wrapped listener, turning silencing off for
    /// connections accepted from here on.
    pub fn into_inner(self) -> L {
        self.listener
    }
}

impl<L: Accept> Accept for SilenceListener<L> {
    type Conn = SilenceStream<L::Conn>;

    fn accept(&self) -> BoxFuture<'_, io::Result<(Self::Conn, AddrOf<Self>)>> {
        Box::pin(async move {
            let (conn, peer) = self.listener.accept().await?;
            Ok((SilenceStream::new(conn), peer))
        })
    }

    fn local_addr(&self) -> io::Result<AddrOf<Self>> {
        self.listener.local_addr()
    }
}
