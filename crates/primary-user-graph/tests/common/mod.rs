// crates/primary-user-graph/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted local HTTP server for Graph client tests.
// Purpose: Serve canned responses and record every request received.
// Dependencies: primary-user-graph, tiny_http
// ============================================================================

//! ## Overview
//! [`spawn_api`] starts a `tiny_http` server that answers requests in order
//! from a script. Response bodies may contain `{base}`, replaced with the
//! server's base URL so next links can point back at it. The join handle
//! yields the recorded requests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use primary_user_graph::GraphClient;
use primary_user_graph::GraphClientConfig;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Bearer token used by every test client.
pub const TEST_TOKEN: &str = "test-token";

/// Request observed by the scripted server.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Raw path and query.
    pub url: String,
    /// Authorization header value, if any.
    pub authorization: Option<String>,
    /// Request body.
    pub body: String,
}

/// Starts a server answering with `script` in order.
pub fn spawn_api(script: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<Recorded>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base = format!("http://{addr}/beta");
    let thread_base = base.clone();

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, body) in script {
            let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                break;
            };
            let mut request_body = String::new();
            let _ = request.as_reader().read_to_string(&mut request_body);
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            recorded.push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                authorization,
                body: request_body,
            });
            let body = body.replace("{base}", &thread_base);
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
        recorded
    });

    (base, handle)
}

/// Builds a client for a local base URL.
pub fn client_for(base: &str) -> GraphClient {
    client_with(base, |_| {})
}

/// Builds a client for a local base URL after adjusting the config.
pub fn client_with(base: &str, adjust: impl FnOnce(&mut GraphClientConfig)) -> GraphClient {
    let mut config = GraphClientConfig {
        base_url: base.to_string(),
        allow_http: true,
        ..GraphClientConfig::default()
    };
    adjust(&mut config);
    GraphClient::new(config, TEST_TOKEN).unwrap()
}

/// Returns a JSON collection page body.
pub fn page(items: &str, next: Option<&str>) -> String {
    match next {
        Some(link) => format!(r#"{{"value":[{items}],"@odata.nextLink":"{link}"}}"#),
        None => format!(r#"{{"value":[{items}]}}"#),
    }
}
