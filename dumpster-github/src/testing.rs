//! Scripted transport for exercising the fetchers without a network

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::transport::Transport;
use crate::{Error, Result};

/// Replays canned response envelopes in order and records every request
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Value>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Parse("unexpected request: no scripted response left".to_string()))
    }
}

/// Envelope for one page of `repository.<field>`
pub(crate) fn page(field: &str, nodes: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "data": {
            "repository": {
                field: {
                    "pageInfo": {
                        "hasNextPage": next_cursor.is_some(),
                        "endCursor": next_cursor,
                    },
                    "nodes": nodes,
                }
            }
        }
    })
}
