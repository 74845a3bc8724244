#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use flate2::Compression;
use flate2::write::GzEncoder;
use prudent_fetch::{Connection, Error, ErrorHandler, Exchange, Headers, HttpClient, Severity};
use url::Url;

#[derive(Debug, Default)]
pub struct ConnectionLog {
    pub released: AtomicUsize,
    pub aborted: AtomicUsize,
}

impl ConnectionLog {
    pub fn released(&self) -> usize { self.released.load(Ordering::SeqCst) }

    pub fn aborted(&self) -> usize { self.aborted.load(Ordering::SeqCst) }
}

struct MockConnection(Arc<ConnectionLog>);

impl Connection for MockConnection {
    fn release(&mut self) -> io::Result<()> {
        self.0.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn abort(&mut self) -> io::Result<()> {
        self.0.aborted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub final_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            final_url: None,
            headers: vec![("Content-Type".into(), content_type.into())],
            content_length: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok("text/html", Vec::new())
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn declared_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn redirected_to(mut self, url: &str) -> Self {
        self.final_url = Some(url.into());
        self
    }
}

#[derive(Debug)]
pub struct MockError(pub String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl std::error::Error for MockError {}

/// Serves canned responses in order and records what was asked for.
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<Canned, String>>>,
    pub requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    pub connections: Arc<ConnectionLog>,
}

impl MockClient {
    pub fn new() -> Self { Self::default() }

    pub fn respond(self, canned: Canned) -> Self {
        self.responses.lock().unwrap().push_back(Ok(canned));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn request_count(&self) -> usize { self.requests.lock().unwrap().len() }
}

impl HttpClient for MockClient {
    type Error = MockError;

    fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Exchange, MockError> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        ));

        let canned = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("connection refused".into()))
            .map_err(MockError)?;

        Ok(Exchange {
            status: canned.status,
            url: canned.final_url.unwrap_or_else(|| url.to_string()),
            headers: canned.headers.into_iter().collect::<Headers>(),
            content_length: canned.content_length,
            body: Box::new(Cursor::new(canned.body)),
            connection: Box::new(MockConnection(Arc::clone(&self.connections))),
        })
    }
}

/// Remembers every report it receives.
#[derive(Default)]
pub struct RecordingHandler {
    pub reports: Mutex<Vec<(Severity, String, String)>>,
}

impl RecordingHandler {
    pub fn reports(&self) -> Vec<(Severity, String, String)> { self.reports.lock().unwrap().clone() }

    fn push(&self, severity: Severity, error: &Error) {
        self.reports.lock().unwrap().push((
            severity,
            error.location().system_id.clone(),
            error.to_string(),
        ));
    }
}

impl ErrorHandler for RecordingHandler {
    fn warning(&self, error: &Error) { self.push(Severity::Warning, error); }

    fn fatal_error(&self, error: &Error) { self.push(Severity::Fatal, error); }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
