//! Shared fixtures: a scriptable mock actuator and an exposition parser.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hyper::server::conn::AddrIncoming;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Response, Server, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub const SCENARIO_BODY: &str =
    r#"{"mem": 204800, "mem.free": 51200, "systemload.average": 0.42, "unknown.field": 7}"#;

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

#[derive(Default)]
struct Counters {
    hits: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Mock actuator whose reply can be swapped between scrapes.
pub struct Upstream {
    addr: SocketAddr,
    reply: Arc<Mutex<Reply>>,
    counters: Arc<Counters>,
}

impl Upstream {
    pub async fn start(status: u16, body: &str) -> Upstream {
        let reply = Arc::new(Mutex::new(Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }));
        let counters = Arc::new(Counters::default());

        let incoming = AddrIncoming::bind(&"127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = incoming.local_addr();

        let (svc_reply, svc_counters) = (reply.clone(), counters.clone());
        let make_svc = make_service_fn(move |_conn| {
            let (reply, counters) = (svc_reply.clone(), svc_counters.clone());
            async move {
                Ok::<_, Infallible>(service_fn(move |_req| {
                    let (reply, counters) = (reply.clone(), counters.clone());
                    async move {
                        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
                        counters.hits.fetch_add(1, Ordering::SeqCst);

                        let Reply { status, body, delay } = reply.lock().unwrap().clone();
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        counters.in_flight.fetch_sub(1, Ordering::SeqCst);

                        let mut resp = Response::new(Body::from(body));
                        *resp.status_mut() = status;
                        Ok::<_, Infallible>(resp)
                    }
                }))
            }
        });

        tokio::spawn(Server::builder(incoming).serve(make_svc));
        Upstream { addr, reply, counters }
    }

    pub fn url(&self) -> String {
        format!("http://{}/metrics", self.addr)
    }

    pub fn respond(&self, status: u16, body: &str) {
        let mut reply = self.reply.lock().unwrap();
        reply.status = StatusCode::from_u16(status).unwrap();
        reply.body = body.to_string();
    }

    pub fn delay(&self, delay: Duration) {
        self.reply.lock().unwrap().delay = delay;
    }

    pub fn hits(&self) -> usize {
        self.counters.hits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Upstream that promises more body than it sends, then hangs up.
pub async fn truncating_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"mem\": 1")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}/metrics")
}

/// URL on a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/metrics")
}

/// Parse a text exposition into `series -> value`, skipping comments.
pub fn parse_exposition(body: &[u8]) -> HashMap<String, f64> {
    String::from_utf8_lossy(body)
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            Some((series.to_string(), value.parse().ok()?))
        })
        .collect()
}

/// Series other than `spring_actuator_up`.
pub fn gauge_series(samples: &HashMap<String, f64>) -> Vec<&String> {
    samples.keys().filter(|k| k.as_str() != "spring_actuator_up").collect()
}
