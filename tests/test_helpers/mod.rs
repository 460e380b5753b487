//! Shared helpers: start a fake server and talk to it like an SDK client would

#![allow(dead_code)]

use std::net::SocketAddr;

use bytes::Bytes;
use fakeaws_query::{Dialect, QueryShape};
use fakeaws_server::{ActionRegistry, FakeServer, QueryDispatcher};
use http::header::{CONTENT_TYPE, HOST};
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

/// Initialize tracing once for the test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fakeaws_server=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Serve `registry` on an ephemeral port in the background
pub async fn start_server(registry: ActionRegistry) -> SocketAddr {
    init_tracing();
    let server = FakeServer::builder().build(QueryDispatcher::new(registry));
    let running = server.bind().await.expect("bind fake server");
    let addr = running.local_addr();
    tokio::spawn(running.serve());
    addr
}

/// Encode `input` as an SDK would and prepend `Action` and `Version`
pub fn request_body<T: QueryShape>(action: &str, version: &str, input: &T, dialect: Dialect) -> String {
    let mut values = fakeaws_query::encode(input, dialect).expect("encode input");
    values.insert("Action", action);
    values.insert("Version", version);
    values.to_form_body()
}

/// POST a raw form body and return status and body text
pub async fn post(addr: SocketAddr, body: String) -> (StatusCode, String) {
    let stream = TcpStream::connect(addr).await.expect("connect");
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .expect("handshake");
    tokio::spawn(conn);

    let request = Request::post("/")
        .header(HOST, addr.to_string())
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .expect("request");
    let response = sender.send_request(request).await.expect("send");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

/// Text of the first `<tag>...</tag>` element in `xml`
pub fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(&xml[start..end])
}

/// Records the inputs an action received and replays a configured result,
/// in the style of a hand-written test double
pub struct Call<I, O> {
    received: std::sync::Mutex<Vec<I>>,
    result: std::sync::Mutex<Result<O, fakeaws_server::ErrorResponse>>,
}

impl<I: Clone, O: Clone + Default> Call<I, O> {
    pub fn receive(&self, input: I) -> Result<O, fakeaws_server::ErrorResponse> {
        self.received.lock().expect("lock").push(input);
        self.result.lock().expect("lock").clone()
    }

    pub fn returns(&self, result: Result<O, fakeaws_server::ErrorResponse>) {
        *self.result.lock().expect("lock") = result;
    }

    pub fn received(&self) -> Vec<I> {
        self.received.lock().expect("lock").clone()
    }
}

impl<I, O: Default> Default for Call<I, O> {
    fn default() -> Self {
        Self {
            received: std::sync::Mutex::new(Vec::new()),
            result: std::sync::Mutex::new(Ok(O::default())),
        }
    }
}
