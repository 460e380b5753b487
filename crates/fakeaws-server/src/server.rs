//! HTTP front end for a [`QueryDispatcher`]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::Result;
use crate::config::ServerConfig;
use crate::dispatch::QueryDispatcher;

const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Builder for [`FakeServer`]
pub struct FakeServerBuilder {
    config: ServerConfig,
}

impl FakeServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    pub fn build(self, dispatcher: QueryDispatcher) -> FakeServer {
        FakeServer::new(self.config, dispatcher)
    }
}

impl Default for FakeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An HTTP server standing in for one or more AWS query-protocol endpoints
#[derive(Clone)]
pub struct FakeServer {
    config: ServerConfig,
    dispatcher: Arc<QueryDispatcher>,
}

impl FakeServer {
    pub fn builder() -> FakeServerBuilder {
        FakeServerBuilder::new()
    }

    pub fn new(config: ServerConfig, dispatcher: QueryDispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the listener without serving yet, so callers can learn the port
    pub async fn bind(&self) -> Result<RunningServer> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        info!("Fake AWS server listening on {}", local_addr);
        Ok(RunningServer {
            listener,
            local_addr,
            handler: RequestHandler {
                dispatcher: Arc::clone(&self.dispatcher),
                max_body_size: self.config.max_body_size,
            },
        })
    }

    /// Bind and serve until the accept loop fails
    pub async fn run(&self) -> Result<()> {
        self.bind().await?.serve().await
    }
}

/// A bound server, ready to accept connections
pub struct RunningServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    handler: RequestHandler,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL to point an AWS client's endpoint at
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Accept connections forever, one tokio task per connection
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer_addr) = self.listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle_request(req, handler.clone()));

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected: {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}

#[derive(Clone)]
struct RequestHandler {
    dispatcher: Arc<QueryDispatcher>,
    max_body_size: usize,
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    handler: RequestHandler,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    debug!("Handling {} {}", req.method(), req.uri().path());

    if req.method() != Method::POST {
        let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        response.headers_mut().insert(ALLOW, HeaderValue::from_static("POST"));
        return Ok(response);
    }

    let declared_length = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > handler.max_body_size) {
        return Ok(text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
    }

    let body = match Limited::new(req.into_body(), handler.max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Ok(text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
        }
        Err(err) => {
            error!("Failed to read request body: {}", err);
            return Ok(text_response(StatusCode::BAD_REQUEST, "Failed to read request body"));
        }
    };

    // Backends may block, keep them off the reactor threads
    let dispatcher = Arc::clone(&handler.dispatcher);
    let result = tokio::task::spawn_blocking(move || dispatcher.dispatch(&body)).await;

    let response = match result {
        Ok(Ok(reply)) => {
            let mut response = Response::new(Full::new(reply.body));
            *response.status_mut() = reply.status;
            let headers = response.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
            if let Ok(value) = HeaderValue::from_str(&reply.request_id.to_string()) {
                headers.insert(REQUEST_ID_HEADER, value);
            }
            response
        }
        Ok(Err(err)) => {
            error!(status = err.status().as_u16(), "Dispatch failed: {}", err);
            text_response(err.status(), err.to_string())
        }
        Err(err) => {
            error!("Dispatch task failed: {}", err);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    };

    Ok(response)
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
