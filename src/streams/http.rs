//! HTTP webhook stream
//!
//! Sends each blob as the body of one HTTP request. Pair it with a
//! `BufferedStream` so a burst of log lines becomes a single request.

use crate::core::{Result, Stream, StreamError};
use reqwest::blocking::Client;
use reqwest::{Method, Url};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Transforms a blob into the request body before it is sent
pub type BodyPrepareFn = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// Stream that delivers blobs to an HTTP(S) endpoint
///
/// Defaults to `POST` over plain HTTP. The scheme is taken from the HTTPS
/// toggle, not from the configured URL. Query parameters are only attached
/// to `GET` requests.
///
/// # Example
///
/// ```no_run
/// use rust_stream_logger::core::BufferedStream;
/// use rust_stream_logger::streams::HttpStream;
/// use reqwest::Method;
///
/// let webhook = HttpStream::new("hooks.example.com/logs")
///     .expect("Failed to build HTTP client")
///     .with_https(true)
///     .with_method(Method::PUT)
///     .with_header("Authorization", "Bearer token");
/// let buffered = BufferedStream::new(webhook);
/// buffered.set_buffer_limit(50);
/// ```
pub struct HttpStream {
    client: Client,
    url: String,
    method: Method,
    use_https: bool,
    prepare_body: Option<BodyPrepareFn>,
    headers: BTreeMap<String, String>,
    query_params: BTreeMap<String, String>,
}

impl HttpStream {
    /// Create a stream for the webhook at `url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| StreamError::writer(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            method: Method::POST,
            use_https: false,
            prepare_body: None,
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Send over HTTPS instead of plain HTTP
    ///
    /// Default: disabled
    #[must_use]
    pub fn with_https(mut self, enable: bool) -> Self {
        self.use_https = enable;
        self
    }

    /// Run `prepare` on every blob; its output becomes the request body
    #[must_use]
    pub fn with_body_prepare(mut self, prepare: BodyPrepareFn) -> Self {
        self.prepare_body = Some(prepare);
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replace every header at once
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn without_header(mut self, key: &str) -> Self {
        self.headers.remove(key);
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Replace every query parameter at once
    #[must_use]
    pub fn with_query_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.query_params = params;
        self
    }

    #[must_use]
    pub fn without_query_param(mut self, key: &str) -> Self {
        self.query_params.remove(key);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uses_https(&self) -> bool {
        self.use_https
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    /// The URL requests go to, with the configured scheme applied
    pub fn target_url(&self) -> String {
        let host_and_path = self
            .url
            .strip_prefix("https://")
            .or_else(|| self.url.strip_prefix("http://"))
            .unwrap_or(&self.url);
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}", scheme, host_and_path)
    }

    fn request_url(&self) -> Result<Url> {
        let target = self.target_url();
        let parsed = if self.method == Method::GET && !self.query_params.is_empty() {
            Url::parse_with_params(&target, &self.query_params)
        } else {
            Url::parse(&target)
        };
        parsed.map_err(|e| {
            StreamError::config("HttpStream", format!("invalid URL '{}': {}", target, e))
        })
    }

    fn prepare(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        match &self.prepare_body {
            Some(prepare) => prepare(bytes)
                .map_err(|e| StreamError::writer(format!("custom body prepare failed: {}", e))),
            None => Ok(bytes.to_vec()),
        }
    }
}

impl Stream for HttpStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let body = self.prepare(bytes)?;
        let written = body.len();

        let mut request = self.client.request(self.method.clone(), self.request_url()?);
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .body(body)
            .send()
            .map_err(|e| StreamError::writer(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(StreamError::writer(format!(
                "HTTP endpoint {} answered {}",
                self.target_url(),
                response.status()
            )));
        }
        Ok(written)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BufferedStream;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    struct ReceivedRequest {
        request_line: String,
        headers: BTreeMap<String, String>,
        body: Vec<u8>,
    }

    /// Accept one request on a local port and answer it with `status`
    fn serve_once(status: u16) -> (String, thread::JoinHandle<ReceivedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(socket.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = BTreeMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.insert(key.trim().to_lowercase(), value.trim().to_string());
                }
            }

            let length = headers
                .get("content-length")
                .map_or(0, |v| v.parse::<usize>().unwrap());
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            write!(
                socket,
                "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            )
            .unwrap();
            socket.flush().unwrap();

            ReceivedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body,
            }
        });

        (format!("{}/hook", addr), handle)
    }

    #[test]
    fn test_defaults() {
        let stream = HttpStream::new("the-url.com").unwrap();
        assert_eq!(stream.method(), &Method::POST);
        assert!(!stream.uses_https());
        assert!(stream.headers().is_empty());
        assert!(stream.query_params().is_empty());
        assert_eq!(stream.target_url(), "http://the-url.com");
    }

    #[test]
    fn test_https_toggle_sets_scheme() {
        let stream = HttpStream::new("http://the-url.com/hook")
            .unwrap()
            .with_https(true);
        assert_eq!(stream.target_url(), "https://the-url.com/hook");

        let stream = stream.with_https(false);
        assert_eq!(stream.target_url(), "http://the-url.com/hook");
    }

    #[test]
    fn test_header_and_query_param_setters() {
        let stream = HttpStream::new("the-url.com")
            .unwrap()
            .with_header("hey", "ho")
            .with_header("lets", "go")
            .without_header("hey")
            .without_header("not present")
            .with_query_param("page", "1");

        assert_eq!(stream.headers().len(), 1);
        assert_eq!(stream.headers()["lets"], "go");
        assert_eq!(stream.query_params()["page"], "1");

        let mut replaced = BTreeMap::new();
        replaced.insert("a".to_string(), "b".to_string());
        let stream = stream
            .with_headers(replaced.clone())
            .with_query_params(replaced.clone());
        assert_eq!(stream.headers(), &replaced);
        assert_eq!(stream.query_params(), &replaced);
    }

    #[test]
    fn test_put_request_carries_body() {
        let (url, server) = serve_once(200);
        let stream = HttpStream::new(url).unwrap().with_method(Method::PUT);

        assert_eq!(stream.write(b"hey").unwrap(), 3);

        let received = server.join().unwrap();
        assert!(received.request_line.starts_with("PUT /hook "));
        assert_eq!(received.body, b"hey");
    }

    #[test]
    fn test_headers_are_sent() {
        let (url, server) = serve_once(200);
        let stream = HttpStream::new(url)
            .unwrap()
            .with_header("hey", "oh")
            .with_header("lets", "go");

        stream.write(b"").unwrap();

        let received = server.join().unwrap();
        assert!(received.request_line.starts_with("POST /hook "));
        assert_eq!(received.headers["hey"], "oh");
        assert_eq!(received.headers["lets"], "go");
    }

    #[test]
    fn test_get_request_carries_query_params() {
        let (url, server) = serve_once(200);
        let stream = HttpStream::new(url)
            .unwrap()
            .with_method(Method::GET)
            .with_query_param("hey", "ho")
            .with_query_param("lets", "go");

        stream.write(b"").unwrap();

        let received = server.join().unwrap();
        assert!(
            received.request_line.starts_with("GET /hook?hey=ho&lets=go "),
            "got: {}",
            received.request_line
        );
    }

    #[test]
    fn test_body_prepare_transforms_payload() {
        let (url, server) = serve_once(200);
        let prepare: BodyPrepareFn = Arc::new(|bytes: &[u8]| -> Result<Vec<u8>> {
            let text = String::from_utf8_lossy(bytes);
            Ok(serde_json::to_vec(&serde_json::json!({ "text": text }))?)
        });
        let stream = HttpStream::new(url).unwrap().with_body_prepare(prepare);

        let written = stream.write(b"line one\nline two").unwrap();

        let received = server.join().unwrap();
        assert_eq!(received.body, br#"{"text":"line one\nline two"}"#.to_vec());
        assert_eq!(written, received.body.len());
    }

    #[test]
    fn test_body_prepare_failure_skips_request() {
        let prepare: BodyPrepareFn = Arc::new(|_bytes: &[u8]| -> Result<Vec<u8>> {
            Err(StreamError::other("bad payload"))
        });
        let stream = HttpStream::new("127.0.0.1:9/hook")
            .unwrap()
            .with_body_prepare(prepare);

        let err = stream.write(b"anything").unwrap_err();
        assert!(err.to_string().contains("custom body prepare failed: bad payload"));
    }

    #[test]
    fn test_error_status_is_reported() {
        let (url, server) = serve_once(500);
        let stream = HttpStream::new(url).unwrap();

        let err = stream.write(b"rejected").unwrap_err();
        assert!(err.to_string().contains("500"), "got: {}", err);
        server.join().unwrap();
    }

    #[test]
    fn test_buffered_http_stream_sends_one_request() {
        let (url, server) = serve_once(200);
        let buffered = BufferedStream::builder()
            .stream(HttpStream::new(url).unwrap())
            .silent()
            .build()
            .unwrap();

        buffered.write_entry("first");
        buffered.write_entry("second");
        assert_eq!(buffered.flush_now().unwrap(), 2);

        let received = server.join().unwrap();
        assert_eq!(received.body, b"first\nsecond");
        assert_eq!(buffered.metrics().transmissions(), 1);
    }
}
