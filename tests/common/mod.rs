//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use forward_proxy::dns::{DnsError, Resolve};

/// A mock origin server that serves a fixed close-delimited response and
/// counts accepted connections.
pub struct MockOrigin {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockOrigin {
    /// Start an origin on an ephemeral localhost port.
    ///
    /// Every connection gets `body` behind a minimal status line, then the
    /// socket is closed (the proxy reads until close).
    pub async fn start(body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(async move {
                            // Drain the request line before replying.
                            let mut buffer = vec![0u8; 1024];
                            let _ = socket.read(&mut buffer).await;

                            let response =
                                format!("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n{body}");
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, connections }
    }

    /// Number of connections the origin has accepted.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Resolver that maps every hostname to a fixed address and counts lookups.
pub struct StaticResolver {
    address: String,
    lookups: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.to_string(),
            lookups: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, _host: &str) -> BoxFuture<'static, Result<String, DnsError>> {
        let address = self.address.clone();
        let lookups = Arc::clone(&self.lookups);
        Box::pin(async move {
            lookups.fetch_add(1, Ordering::SeqCst);
            Ok(address)
        })
    }
}

/// Resolver that always fails.
pub struct FailingResolver;

impl Resolve for FailingResolver {
    fn resolve(&self, host: &str) -> BoxFuture<'static, Result<String, DnsError>> {
        let host = host.to_string();
        Box::pin(async move { Err(DnsError::NoAddress(host)) })
    }
}
