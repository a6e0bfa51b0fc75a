//! Shared test helpers: a scripted transport and a local fake SIDSP API
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use sidsp_checker::transport::{CallOutcome, Transport};
use sidsp_checker::QueryParams;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call: path plus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub params: QueryParams,
}

/// Transport answering from a fixed script, recording every call
///
/// Once the script runs out every call answers 404.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<CallOutcome>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<CallOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str, params: &QueryParams) -> CallOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            params: params.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(not_found)
    }
}

pub fn json_ok(body: &str) -> CallOutcome {
    CallOutcome::new(200, "application/json; charset=utf-8", body)
}

pub fn not_found() -> CallOutcome {
    CallOutcome::new(404, "application/json", r#"{"message":"Not Found"}"#)
}

/// Serve `router` on an ephemeral loopback port, returning its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
