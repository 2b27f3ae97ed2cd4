//! End-to-end checks against a real listener on an ephemeral port.

use std::net::SocketAddr;

use canned_origin::config::{LoggingConfig, OriginConfig};
use canned_origin::http::pattern;
use canned_origin::OriginServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

const DOCUMENT: &str = r#"{
    "processes": {
        "origin": {
            "interfaces": {"http": {"port": 0}},
            "actions": {
                "GET": {
                    "/obj/fixed": {
                        "type": "nonchunkedresponse",
                        "content_length": 64,
                        "headers": {"Cache-Control": "max-age=3600"}
                    },
                    "/obj/chunked": {
                        "type": "chunkedresponse",
                        "num_chunks": 4,
                        "chunk_size_bytes": 8,
                        "patterned_chunks": "true",
                        "delay_between_chunk_sec": 0.01
                    },
                    "/obj/empty": {"type": "chunkedresponse"}
                }
            }
        }
    }
}"#;

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

fn start() -> Running {
    let config = OriginConfig::from_document(DOCUMENT, "origin", "127.0.0.1").unwrap();
    let logging = LoggingConfig {
        level: "info".to_string(),
        access_log: false,
        access_log_format: "combined".to_string(),
    };
    let origin = OriginServer::bind(&config, logging).unwrap();
    let addr = origin.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(origin.run(async move {
        let _ = stopped.await;
    }));
    Running { addr, stop, task }
}

/// Send one request with `Connection: close` and split the raw response
async fn get(addr: SocketAddr, path: &str, range: Option<&str>) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut request = format!("GET {path} HTTP/1.1\r\nHost: origin\r\nConnection: close\r\n");
    if let Some(range) = range {
        request.push_str(&format!("Range: {range}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let head = String::from_utf8(raw[..split].to_vec()).unwrap().to_ascii_lowercase();
    (head, raw[split + 4..].to_vec())
}

/// Decode a chunked transfer-encoded body
fn dechunk(mut body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let line_end = body.windows(2).position(|w| w == b"\r\n").unwrap();
        let size = usize::from_str_radix(std::str::from_utf8(&body[..line_end]).unwrap(), 16).unwrap();
        body = &body[line_end + 2..];
        if size == 0 {
            return out;
        }
        out.extend_from_slice(&body[..size]);
        body = &body[size + 2..];
    }
}

#[tokio::test]
async fn test_fixed_resource_over_tcp() {
    let origin = start();

    let (head, body) = get(origin.addr, "/obj/fixed", None).await;
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert!(head.contains("content-length: 64"));
    assert!(head.contains("cache-control: max-age=3600"));
    assert_eq!(body, pattern::generate(0, 63).unwrap());

    let (head, body) = get(origin.addr, "/obj/fixed", Some("bytes=6-16")).await;
    assert!(head.starts_with("http/1.1 206"), "{head}");
    assert!(head.contains("content-length: 11"));
    assert!(head.contains("content-range: bytes 6-16/64"));
    assert_eq!(body, b"0 0000001 0");

    // Malformed ranges degrade to the full object
    let (head, body) = get(origin.addr, "/obj/fixed", Some("bytes=16-6")).await;
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert_eq!(body.len(), 64);

    origin.stop.send(()).unwrap();
    origin.task.await.unwrap();
}

#[tokio::test]
async fn test_chunked_resource_over_tcp() {
    let origin = start();

    let (head, body) = get(origin.addr, "/obj/chunked", None).await;
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert!(head.contains("transfer-encoding: chunked"));
    assert_eq!(dechunk(&body), pattern::generate(0, 31).unwrap());

    let (head, body) = get(origin.addr, "/obj/chunked", Some("bytes=6-16")).await;
    assert!(head.starts_with("http/1.1 206"), "{head}");
    assert_eq!(dechunk(&body), b"0 0000001 0");

    let (head, body) = get(origin.addr, "/obj/empty", None).await;
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert!(body.is_empty());

    origin.stop.send(()).unwrap();
    origin.task.await.unwrap();
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let origin = start();
    let (head, _) = get(origin.addr, "/nope", None).await;
    assert!(head.starts_with("http/1.1 404"), "{head}");
    origin.stop.send(()).unwrap();
    origin.task.await.unwrap();
}

#[tokio::test]
async fn test_conflicting_routes_fail_before_binding() {
    let document = r#"{"processes": {"origin": {
        "interfaces": {"http": {"port": 0}},
        "actions": {"GET": {"/a": {"type": "fixed"}, "/a/b": {"type": "fixed"}}}
    }}}"#;
    let config = OriginConfig::from_document(document, "origin", "127.0.0.1").unwrap();
    let logging = LoggingConfig {
        level: "info".to_string(),
        access_log: false,
        access_log_format: "combined".to_string(),
    };
    let err = OriginServer::bind(&config, logging).err().unwrap();
    assert!(err.to_string().contains("leaf cannot contain children"), "{err}");
}
