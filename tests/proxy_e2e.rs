//! End-to-end tests driving the proxy over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use forward_proxy::config::ProxyConfig;
use forward_proxy::dns::Resolve;
use forward_proxy::lifecycle::Shutdown;
use forward_proxy::net::Listener;
use forward_proxy::proxy::ProxyServer;

mod common;
use common::{FailingResolver, MockOrigin, StaticResolver};

/// Spawn a proxy on an ephemeral port, pointed at the given origin port.
async fn start_proxy(
    resolver: Arc<dyn Resolve>,
    origin_port: u16,
    capacity: usize,
) -> (SocketAddr, Arc<ProxyServer>, Arc<Shutdown>) {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.port = origin_port;
    config.cache.capacity = capacity;

    let listener = Listener::bind(&config.listener).unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let shutdown_rx = shutdown.subscribe();
    let server = Arc::new(ProxyServer::with_resolver(config, resolver));

    let runner = Arc::clone(&server);
    tokio::spawn(async move {
        let _ = runner.run(listener, shutdown_rx).await;
    });

    (addr, server, shutdown)
}

/// Send one raw request and collect the reply until the proxy closes.
async fn send_request(proxy: SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn miss_then_hit_serves_second_request_from_cache() {
    let origin = MockOrigin::start("hello world").await;
    let resolver = StaticResolver::new("127.0.0.1");
    let (proxy, server, shutdown) =
        start_proxy(resolver.clone(), origin.addr.port(), 5).await;

    let request = "GET http://example.com/index.html HTTP/1.1\r\n\r\n";
    let first = send_request(proxy, request).await;
    let second = send_request(proxy, request).await;

    let expected = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\nhello world";
    assert_eq!(first, expected, "raw origin bytes relayed verbatim");
    assert_eq!(second, expected, "cached bytes are identical");

    assert_eq!(origin.connection_count(), 1, "second request hits no origin");
    assert_eq!(resolver.lookup_count(), 1, "second request resolves nothing");

    assert_eq!(server.cache().len(), 1, "one entry under the full URL key");
    assert!(server.cache().get("http://example.com/index.html").is_some());
    assert_eq!(server.dns().len(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_request_is_closed_without_reply() {
    let origin = MockOrigin::start("never served").await;
    let resolver = StaticResolver::new("127.0.0.1");
    let (proxy, _server, shutdown) =
        start_proxy(resolver.clone(), origin.addr.port(), 5).await;

    let response = send_request(proxy, "POST /x HTTP/1.1\r\n\r\n").await;

    assert!(response.is_empty(), "no bytes may be written on parse failure");
    assert_eq!(origin.connection_count(), 0);
    assert_eq!(resolver.lookup_count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn resolution_failure_drops_the_connection() {
    let origin = MockOrigin::start("unreachable").await;
    let (proxy, _server, shutdown) =
        start_proxy(Arc::new(FailingResolver), origin.addr.port(), 5).await;

    let response = send_request(proxy, "GET http://no.such.host/ HTTP/1.1\r\n\r\n").await;

    assert!(response.is_empty());
    assert_eq!(origin.connection_count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn distinct_urls_are_fetched_separately() {
    let origin = MockOrigin::start("page").await;
    let resolver = StaticResolver::new("127.0.0.1");
    let (proxy, _server, shutdown) =
        start_proxy(resolver.clone(), origin.addr.port(), 5).await;

    send_request(proxy, "GET http://example.com/a HTTP/1.1\r\n\r\n").await;
    send_request(proxy, "GET http://example.com/b HTTP/1.1\r\n\r\n").await;

    assert_eq!(origin.connection_count(), 2, "each URL is its own cache key");
    assert_eq!(resolver.lookup_count(), 1, "the hostname resolves once");

    shutdown.trigger();
}

#[tokio::test]
async fn concurrent_requests_for_one_host_resolve_once() {
    let origin = MockOrigin::start("body").await;
    let resolver = StaticResolver::new("127.0.0.1");
    let (proxy, _server, shutdown) =
        start_proxy(resolver.clone(), origin.addr.port(), 16).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            send_request(proxy, &format!("GET http://example.com/{i} HTTP/1.1\r\n\r\n")).await
        }));
    }
    for task in tasks {
        let response = task.await.unwrap();
        assert!(response.ends_with(b"body"));
    }

    assert_eq!(
        resolver.lookup_count(),
        1,
        "concurrent misses for one hostname coalesce into a single lookup"
    );
    assert_eq!(origin.connection_count(), 8);

    shutdown.trigger();
}

#[tokio::test]
async fn eviction_forces_a_refetch() {
    let origin = MockOrigin::start("evictable").await;
    let resolver = StaticResolver::new("127.0.0.1");
    let (proxy, server, shutdown) =
        start_proxy(resolver.clone(), origin.addr.port(), 2).await;

    // Fill a capacity-2 cache with /a and /b, then push /c to evict /a.
    for path in ["/a", "/b", "/c"] {
        send_request(proxy, &format!("GET http://example.com{path} HTTP/1.1\r\n\r\n")).await;
    }
    assert_eq!(origin.connection_count(), 3);
    assert_eq!(server.cache().len(), 2, "capacity bound holds");

    // /b is still cached; /a was evicted and must refetch.
    send_request(proxy, "GET http://example.com/b HTTP/1.1\r\n\r\n").await;
    assert_eq!(origin.connection_count(), 3);

    send_request(proxy, "GET http://example.com/a HTTP/1.1\r\n\r\n").await;
    assert_eq!(origin.connection_count(), 4);

    shutdown.trigger();
}
