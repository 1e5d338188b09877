use crate::{is_tls_record_type, Connection};

use async_dup::{Arc, Mutex};
use async_std::io::{self, BufRead, BufReader, Read, Write};

use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

/// What the first byte of a connection turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Tls,
    NotTls,
    /// The peek failed or the stream ended before any byte arrived.
    Undetermined,
}

/// A connection that gets silently closed if its first byte cannot
/// start a TLS record.
///
/// Nothing happens until the first read. That read peeks at the first
/// byte without consuming it; if the byte is not a TLS record type, the
/// underlying connection is closed and this and every later read report
/// end of stream without touching the socket again. Otherwise every read,
/// including that first one, passes straight through.
///
/// Clones share the same connection and are classified together, so
/// racing first reads on several clones peek exactly once.
pub struct SilenceStream<C>(Arc<Mutex<Inner<C>>>);

impl<C> Clone for SilenceStream<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

struct Inner<C> {
    reader: BufReader<C>,
    classification: Option<Classification>,
}

impl<C: Connection> SilenceStream<C> {
    /// Wrap a freshly accepted connection.
    pub fn new(conn: C) -> Self {
        Self(Arc::new(Mutex::new(Inner {
            reader: BufReader::new(conn),
            classification: None,
        })))
    }
}

impl<C: Connection> Inner<C> {
    fn classify(&mut self, cx: &mut Context<'_>) -> Poll<Classification> {
        if let Some(classification) = self.classification {
            return Poll::Ready(classification);
        }

        let classification = match Pin::new(&mut self.reader).poll_fill_buf(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(peeked)) => match peeked.first() {
                Some(byte) if is_tls_record_type(*byte) => Classification::Tls,
                Some(_) => Classification::NotTls,
                None => Classification::Undetermined,
            },
            // the next read surfaces the error itself
            Poll::Ready(Err(_)) => Classification::Undetermined,
        };

        if classification == Classification::NotTls {
            let _ = self.reader.get_ref().close();
            let buffered = self.reader.buffer().len();
            Pin::new(&mut self.reader).consume(buffered);
        }

        self.classification = Some(classification);
        Poll::Ready(classification)
    }
}

impl<C: Connection> Read for Inner<C> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        match self.classify(cx) {
            Poll::Pending => Poll::Pending,
            // a shut down socket still hands out whatever the kernel had queued
            Poll::Ready(Classification::NotTls) => Poll::Ready(Ok(0)),
            Poll::Ready(_) => Pin::new(&mut self.reader).poll_read(cx, buf),
        }
    }
}

impl<C: Connection> Write for Inner<C> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(self.reader.get_mut()).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(self.reader.get_mut()).poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(self.reader.get_mut()).poll_close(cx)
    }
}

impl<C: Connection> Read for SilenceStream<C> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut &*self.0).poll_read(cx, buf)
    }
}

impl<C: Connection> Write for SilenceStream<C> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut &*self.0).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut &*self.0).poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut &*self.0).poll_close(cx)
    }
}

impl<C: Connection> Connection for SilenceStream<C> {
    type Addr = C::Addr;

    fn close(&self) -> io::Result<()> {
        self.0.lock().reader.get_ref().close()
    }

    fn local_addr(&self) -> io::Result<C::Addr> {
        self.0.lock().reader.get_ref().local_addr()
    }

    fn peer_addr(&self) -> io::Result<C::Addr> {
        self.0.lock().reader.get_ref().peer_addr()
    }
}

impl<C: Debug> Debug for SilenceStream<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(inner) => f
                .debug_struct("SilenceStream")
                .field("conn", inner.reader.get_ref())
                .field("classification", &inner.classification)
                .finish(),
            None => f.debug_struct("SilenceStream").finish_non_exhaustive(),
        }
    }
}
