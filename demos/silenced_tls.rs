//! An HTTPS server whose listener hangs up on plaintext clients before the
//! TLS acceptor ever sees them.
//!
//! ```text
//! $ mkcert -key-file key.pem -cert-file cert.pem localhost 127.0.0.1 ::1
//! $ env TIDE_CERT=cert.pem TIDE_KEY=key.pem cargo run --example silenced_tls
//! $ curl -v https://localhost:4433/   # answered
//! $ curl -v http://localhost:4433/    # empty reply from server
//! ```
//!
//! With `TIDE_SILENCE=0` the same plaintext request reaches rustls, which
//! answers it with an alert.

use async_dup::{Arc as DupArc, Mutex};
use async_std::io;
use async_std::net::{SocketAddr, TcpListener};
use async_std::task;

use async_tls::TlsAcceptor;
use rustls::internal::pemfile::{certs, pkcs8_private_keys};
use rustls::{NoClientAuth, ServerConfig};

use tide::{Request, Server};
use tls_silence::{Accept, Connection};

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

/// Build a rustls acceptor from a PEM certificate chain and a PKCS#8 key.
fn acceptor(cert_path: &str, key_path: &str) -> io::Result<TlsAcceptor> {
    let invalid = |what: &'static str| io::Error::new(io::ErrorKind::InvalidInput, what);

    let chain = certs(&mut fs::read(cert_path)?.as_slice())
        .map_err(|_| invalid("unreadable certificate chain"))?;
    let key = pkcs8_private_keys(&mut fs::read(key_path)?.as_slice())
        .ok()
        .and_then(|mut keys| keys.pop())
        .ok_or_else(|| invalid("no PKCS#8 private key"))?;

    let mut config = ServerConfig::new(NoClientAuth::new());
    config
        .set_single_cert(chain, key)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

async fn serve<L>(listener: L, acceptor: TlsAcceptor, app: Server<()>) -> io::Result<()>
where
    L: Accept,
    L::Conn: Connection<Addr = SocketAddr>,
{
    let addr = listener.local_addr()?;
    tide::log::info!("listening", { addr: addr.to_string() });

    loop {
        match listener.accept().await {
            Ok((conn, peer)) => {
                task::spawn(handshake(conn, peer, acceptor.clone(), app.clone()));
            }
            Err(error) => {
                tide::log::warn!("accept failed", { error: error.to_string() });
                task::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn handshake<C>(conn: C, peer: SocketAddr, acceptor: TlsAcceptor, app: Server<()>)
where
    C: Connection<Addr = SocketAddr>,
{
    let local = conn.local_addr().ok();

    let tls = match acceptor.accept(conn).await {
        Ok(tls) => tls,
        // a silenced connection reads as end of stream
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
            tide::log::debug!("hung up before a handshake", { peer: peer.to_string() });
            return;
        }
        Err(error) => {
            tide::log::warn!("handshake failed", { peer: peer.to_string(), error: error.to_string() });
            return;
        }
    };

    let shared = DupArc::new(Mutex::new(tls));
    let served = async_h1::accept(shared, |mut req| async {
        req.set_local_addr(local);
        req.set_peer_addr(Some(peer));
        app.respond(req).await
    });

    if let Err(error) = served.await {
        tide::log::warn!("http error", { peer: peer.to_string(), error: error.to_string() });
    }
}

async fn hello(req: Request<()>) -> tide::Result<String> {
    Ok(format!(
        "{} {} over tls from {}\n",
        req.method(),
        req.url().path(),
        req.peer_addr().unwrap_or("[unknown]")
    ))
}

#[async_std::main]
async fn main() -> io::Result<()> {
    let (cert, key) = match (env::var("TIDE_CERT"), env::var("TIDE_KEY")) {
        (Ok(cert), Ok(key)) => (cert, key),
        _ => {
            eprintln!("set TIDE_CERT and TIDE_KEY to a PEM certificate and PKCS#8 key");
            return Ok(());
        }
    };
    let silence = env::var("TIDE_SILENCE").map_or(true, |v| v != "0");

    tide::log::start();
    let mut app = tide::new();
    app.at("/").get(hello);
    app.at("*").get(hello);

    let acceptor = acceptor(&cert, &key)?;
    let tcp = TcpListener::bind("localhost:4433").await?;
    if silence {
        serve(tcp.silence(), acceptor, app).await
    } else {
        serve(tcp, acceptor, app).await
    }
}
