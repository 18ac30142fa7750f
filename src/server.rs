//! HTTP front end: the metrics endpoint plus a landing page on every other path.
//!
//! A fatal scrape error (see [`ExporterError::is_fatal`]) is handed back to
//! [`MetricsServer::run`], which stops serving and returns it so the process
//! can exit.

use std::{convert::Infallible, fmt, net::SocketAddr, sync::Arc};

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::AddrIncoming;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use prometheus::{Encoder, TextEncoder};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::collector::Exporter;
use crate::errors::ExporterError;

struct ServerContext {
    exporter: Arc<Exporter>,
    telemetry_path: String,
    landing_page: String,
    fatal_tx: mpsc::Sender<ExporterError>,
}

/// A bound, not yet serving, metrics server.
pub struct MetricsServer {
    incoming: AddrIncoming,
    ctx: Arc<ServerContext>,
    fatal_rx: mpsc::Receiver<ExporterError>,
}

impl MetricsServer {
    /// Bind `addr`. Fails immediately if the address is unusable.
    pub fn bind(
        addr: &SocketAddr,
        telemetry_path: &str,
        exporter: Arc<Exporter>,
    ) -> Result<Self, ExporterError> {
        let incoming = AddrIncoming::bind(addr)?;
        let (fatal_tx, fatal_rx) = mpsc::channel(1);

        let ctx = Arc::new(ServerContext {
            exporter,
            telemetry_path: telemetry_path.to_string(),
            landing_page: landing_page(telemetry_path),
            fatal_tx,
        });

        Ok(MetricsServer { incoming, ctx, fatal_rx })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.incoming.local_addr()
    }

    /// Serve until the listener fails or a scrape hits a fatal error.
    pub async fn run(self) -> Result<(), ExporterError> {
        let MetricsServer { incoming, ctx, mut fatal_rx } = self;
        let addr = incoming.local_addr();

        let make_svc = make_service_fn(move |_conn| {
            let ctx = Arc::clone(&ctx);
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let ctx = Arc::clone(&ctx);
                    async move { Ok::<_, Infallible>(handle(&ctx, req).await) }
                }))
            }
        });

        info!(%addr, "Starting Server");
        let server = Server::builder(incoming).serve(make_svc);

        tokio::select! {
            served = server => served.map_err(ExporterError::from),
            Some(fatal) = fatal_rx.recv() => Err(fatal),
        }
    }
}

impl fmt::Debug for MetricsServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsServer")
            .field("local_addr", &self.local_addr())
            .field("telemetry_path", &self.ctx.telemetry_path)
            .finish_non_exhaustive()
    }
}

async fn handle(ctx: &ServerContext, req: Request<Body>) -> Response<Body> {
    if req.uri().path() != ctx.telemetry_path {
        return html(ctx.landing_page.clone());
    }

    match ctx.exporter.collect().await {
        Ok(body) => {
            // Prometheus rejects scrapes without the versioned text content type.
            let encoder = TextEncoder::new();
            let mut resp = Response::new(Body::from(body));
            if let Ok(mime) = HeaderValue::from_str(encoder.format_type()) {
                resp.headers_mut().insert(CONTENT_TYPE, mime);
            }
            resp
        }
        Err(e) => {
            error!(url = %ctx.exporter.url(), error = %e, "Shutting down on fatal scrape error");
            let _ = ctx.fatal_tx.try_send(e);
            let mut resp = Response::new(Body::from("fatal scrape error\n"));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        }
    }
}

fn html(page: String) -> Response<Body> {
    let mut resp = Response::new(Body::from(page));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    resp
}

fn landing_page(telemetry_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Spring Actuator Exporter</title></head>\n\
         <body>\n\
         <h1>Spring Actuator Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        htmlescape::encode_minimal(telemetry_path)
    )
}
