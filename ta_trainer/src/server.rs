//! Blocking HTTP front end.
//!
//! A fixed pool of threads pulls requests off one [`tiny_http::Server`]. Each
//! request is routed by [`route`], which runs the async trainer on the tokio
//! runtime through a [`Handle`].

use std::{net::SocketAddr, sync::Arc, thread};

use market_data_ingestor::{models::timeframe::TimeFrame, providers::DataProvider};
use serde::Serialize;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::trainer::{Trainer, UserAction};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A finished response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(err) => {
                error!(error = %err, "failed to serialize response");
                Self::error(500, "internal error")
            }
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::json!({ "error": message }).to_string().into_bytes(),
        }
    }
}

#[derive(Serialize)]
struct TimeframeOption {
    value: TimeFrame,
    label: &'static str,
}

#[derive(Serialize)]
struct Options {
    pairs: Vec<String>,
    timeframes: Vec<TimeframeOption>,
    default_pair: String,
    default_timeframe: TimeFrame,
    training_size: usize,
    future_size: usize,
    selected_pair: String,
    selected_timeframe: TimeFrame,
}

/// Maps one request onto the trainer.
pub async fn route<P: DataProvider>(
    trainer: &Trainer<P>,
    method: &Method,
    url: &str,
    body: &str,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/") | (Method::Get, "/index.html") => Reply::html(INDEX_HTML),
        (Method::Get, "/api/options") => {
            let catalog = trainer.catalog();
            let selection = trainer.selection();
            let options = Options {
                pairs: catalog.pairs.iter().map(ToString::to_string).collect(),
                timeframes: catalog
                    .timeframes
                    .iter()
                    .map(|tf| TimeframeOption {
                        value: *tf,
                        label: tf.label(),
                    })
                    .collect(),
                default_pair: catalog.default_pair.to_string(),
                default_timeframe: catalog.default_timeframe,
                training_size: trainer.sampler().training_size(),
                future_size: trainer.sampler().future_size(),
                selected_pair: selection.pair.to_string(),
                selected_timeframe: selection.timeframe,
            };
            Reply::json(200, &options)
        }
        (Method::Get, "/api/state") => Reply::json(200, &trainer.current_view()),
        (Method::Post, "/api/action") => match serde_json::from_str::<UserAction>(body) {
            Ok(action) => {
                debug!(?action, "dispatching action");
                Reply::json(200, &trainer.handle(action).await)
            }
            Err(err) => Reply::error(400, &format!("Invalid action: {err}")),
        },
        (_, "/" | "/index.html" | "/api/options" | "/api/state" | "/api/action") => {
            Reply::error(405, "method not allowed")
        }
        _ => Reply::error(404, "not found"),
    }
}

pub fn bind(addr: SocketAddr) -> Result<Server, ServerError> {
    Server::http(addr).map_err(|err| ServerError::Bind {
        addr,
        message: err.to_string(),
    })
}

/// Serves until the listener shuts down. Blocks the calling thread.
pub fn run<P>(
    server: Arc<Server>,
    trainer: Arc<Trainer<P>>,
    runtime: Handle,
    workers: usize,
) -> Result<(), ServerError>
where
    P: DataProvider + 'static,
{
    if let Some(addr) = server.server_addr().to_ip() {
        info!(%addr, workers, "listening");
    }

    let mut handles = Vec::with_capacity(workers);
    let mut spawn_error = None;
    for id in 0..workers.max(1) {
        let listener = Arc::clone(&server);
        let trainer = Arc::clone(&trainer);
        let runtime = runtime.clone();
        let spawned = thread::Builder::new()
            .name(format!("http-worker-{id}"))
            .spawn(move || {
                while let Ok(request) = listener.recv() {
                    serve_one(request, &trainer, &runtime);
                }
                debug!(worker = id, "worker stopped");
            });
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                spawn_error = Some(err);
                break;
            }
        }
    }

    // Workers already started must not outlive a failed startup.
    if spawn_error.is_some() {
        for _ in &handles {
            server.unblock();
        }
    }
    join_all(handles);

    match spawn_error {
        Some(err) => Err(ServerError::Spawn(err)),
        None => Ok(()),
    }
}

fn join_all(handles: Vec<thread::JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            error!("http worker panicked");
        }
    }
}

fn serve_one<P: DataProvider>(mut request: Request, trainer: &Trainer<P>, runtime: &Handle) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    let reply = match request.as_reader().read_to_string(&mut body) {
        Ok(_) => runtime.block_on(route(trainer, &method, &url, &body)),
        Err(err) => Reply::error(400, &format!("Unreadable body: {err}")),
    };
    debug!(%method, %url, status = reply.status, "handled request");

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response.add_header(header);
    }
    if let Err(err) = request.respond(response) {
        warn!(%url, error = %err, "failed to send response");
    }
}
