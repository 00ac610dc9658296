//! Read-through cache for query results.
//!
//! Keyed by the operation document plus its serialised variables, so the
//! same query with different variables occupies distinct entries. Only
//! [`Transport::query_cache_and_network`](crate::transport::Transport::query_cache_and_network)
//! populates it; mutations never touch it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::transport::Request;

#[derive(Clone, Debug, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<(String, String), Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, request: &Request) -> Option<Value> {
        self.entries.lock().unwrap().get(&key(request)).cloned()
    }

    pub fn insert(&self, request: &Request, data: Value) {
        self.entries.lock().unwrap().insert(key(request), data);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

fn key(request: &Request) -> (String, String) {
    (request.query.clone(), request.variables.to_string())
}
