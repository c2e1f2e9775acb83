//! Shared fixtures for integration tests: an in-memory transport and
//! synthetic store pages.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use playbadge::{HttpResponse, HttpTransport, TransportError};

pub const APP_ID: &str = "org.example.app";
pub const BASE_URL: &str = "https://store.test/details?id=";

/// Transport serving canned responses by URL and counting requests.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Result<HttpResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.respond(
            url,
            Ok(HttpResponse {
                status: 200,
                status_text: "200 OK".into(),
                body: body.into(),
            }),
        )
    }

    pub fn status(self, url: impl Into<String>, status: u16, status_text: &str) -> Self {
        self.respond(
            url,
            Ok(HttpResponse {
                status,
                status_text: status_text.into(),
                body: String::new(),
            }),
        )
    }

    pub fn error(self, url: impl Into<String>, message: &str) -> Self {
        self.respond(url, Err(TransportError(message.into())))
    }

    fn respond(self, url: impl Into<String>, response: Result<HttpResponse, TransportError>) -> Self {
        self.responses.lock().unwrap().insert(url.into(), response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Ok(HttpResponse {
                    status: 404,
                    status_text: "404 Not Found".into(),
                    body: String::new(),
                })
            })
    }
}

/// Store page URL of `app_id` below [`BASE_URL`].
pub fn url_for(app_id: &str) -> String {
    playbadge::extract::store_url(BASE_URL, app_id)
}

/// Set `leaf` at `path`, growing lists with nulls as needed.
pub fn put(document: &mut Value, path: &[usize], leaf: Value) {
    let mut node = document;
    for &index in path {
        if !node.is_array() {
            *node = Value::Array(Vec::new());
        }
        let items = node.as_array_mut().unwrap();
        if items.len() <= index {
            items.resize(index + 1, Value::Null);
        }
        node = &mut items[index];
    }
    *node = leaf;
}

/// A document carrying every Play Store field.
pub fn document(app_id: &str) -> Value {
    let mut doc = json!([[app_id]]);
    put(&mut doc, &[1, 2, 0, 0], json!("Example App"));
    put(&mut doc, &[1, 2, 9, 0], json!("Everyone"));
    put(&mut doc, &[1, 2, 10, 0], json!("Jan 1, 2015"));
    put(&mut doc, &[1, 2, 13, 2], json!(1234567));
    put(&mut doc, &[1, 2, 13, 3], json!("1,000,000+"));
    put(&mut doc, &[1, 2, 51, 0, 0], json!("4.5"));
    put(&mut doc, &[1, 2, 51, 0, 1], json!(4.4871));
    put(&mut doc, &[1, 2, 140, 0, 0, 0], json!("2.3.1"));
    put(&mut doc, &[1, 2, 140, 1, 0, 0, 0], json!(34));
    put(&mut doc, &[1, 2, 140, 1, 0, 0, 1], json!("Android 14"));
    put(&mut doc, &[1, 2, 140, 1, 1, 0, 0, 0], json!(21));
    put(&mut doc, &[1, 2, 140, 1, 1, 0, 0, 1], json!("5.0"));
    put(&mut doc, &[1, 2, 145, 0, 0], json!("Mar 3, 2024"));
    doc
}

/// Wrap a document the way the store embeds it.
pub fn page(document: &Value) -> String {
    format!(
        "<html><head><script>AF_initDataCallback({{key: 'ds:0', data:[[\"unrelated\"]], sideChannel: {{}}}});</script></head>\
         <body><script>AF_initDataCallback({{key: 'ds:5', hash: '7', data:{document}, sideChannel: {{}}}});</script></body></html>"
    )
}
