//! In-memory connection and listener for exercising the wrappers without
//! a socket.

use crate::accept::{Accept, BoxFuture};
use crate::Connection;

use async_std::io::{self, Read, Write};

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

#[derive(Debug, Default)]
struct State {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    eof: bool,
    closed: bool,
    failure: Option<io::ErrorKind>,
    wakers: Vec<Waker>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    data_reads: AtomicUsize,
    closes: AtomicUsize,
}

/// A connection whose peer is the test. Reads park until bytes are
/// sent or the stream is finished. Like a shut down socket, `close`
/// leaves already queued bytes readable; once they are drained, reads
/// fail with `NotConnected`, and writes fail straight away.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockConnection(Arc<Shared>);

impl MockConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A connection that delivers `input` and then reports EOF.
    pub(crate) fn with_input(input: &[u8]) -> Self {
        let conn = Self::new();
        conn.send(input);
        conn.finish();
        conn
    }

    /// A connection whose every read fails with `kind`.
    pub(crate) fn failing(kind: io::ErrorKind) -> Self {
        let conn = Self::new();
        conn.0.state.lock().unwrap().failure = Some(kind);
        conn
    }

    pub(crate) fn send(&self, bytes: &[u8]) {
        let mut state = self.0.state.lock().unwrap();
        state.incoming.extend(bytes);
        wake_all(&mut state);
    }

    pub(crate) fn finish(&self) {
        let mut state = self.0.state.lock().unwrap();
        state.eof = true;
        wake_all(&mut state);
    }

    /// How many inner reads handed out at least one byte.
    pub(crate) fn data_reads(&self) -> usize {
        self.0.data_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.0.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.0.state.lock().unwrap().closed
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.0.state.lock().unwrap().written.clone()
    }
}

fn wake_all(state: &mut State) {
    for waker in state.wakers.drain(..) {
        waker.wake();
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection closed")
}

impl Read for MockConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.0.state.lock().unwrap();

        if let Some(kind) = state.failure {
            return Poll::Ready(Err(io::Error::new(kind, "mock failure")));
        }

        if state.incoming.is_empty() {
            if state.closed {
                return Poll::Ready(Err(not_connected()));
            }
            if state.eof {
                return Poll::Ready(Ok(0));
            }
            state.wakers.push(cx.waker().clone());
            return Poll::Pending;
        }

        let n = buf.len().min(state.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(state.incoming.drain(..n)) {
            *slot = byte;
        }
        self.0.data_reads.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Ok(n))
    }
}

impl Write for MockConnection {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let mut state = self.0.state.lock().unwrap();
        if state.closed {
            return Poll::Ready(Err(not_connected()));
        }
        state.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl Connection for MockConnection {
    type Addr = SocketAddr;

    fn close(&self) -> io::Result<()> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.0.state.lock().unwrap();
        state.closed = true;
        wake_all(&mut state);
        Ok(())
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(SocketAddr::from(([127, 0, 0, 1], 443)))
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        Ok(SocketAddr::from(([192, 0, 2, 7], 50_000)))
    }
}

/// A listener that hands out a scripted sequence of accept results,
/// then fails every further accept.
#[derive(Debug, Default)]
pub(crate) struct MockListener {
    script: Mutex<VecDeque<io::Result<MockConnection>>>,
}

impl MockListener {
    pub(crate) fn new(script: Vec<io::Result<MockConnection>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl Accept for MockListener {
    type Conn = MockConnection;

    fn accept(&self) -> BoxFuture<'_, io::Result<(MockConnection, SocketAddr)>> {
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            let conn = next.unwrap_or_else(|| {
                Err(io::Error::new(io::ErrorKind::Other, "listener closed"))
            })?;
            let peer = conn.peer_addr()?;
            Ok((conn, peer))
        })
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(SocketAddr::from(([127, 0, 0, 1], 443)))
    }
}
