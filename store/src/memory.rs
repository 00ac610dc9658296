use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::TokenStore;

/// In-memory TokenStore for testing and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn clear(&self, name: &str) {
        self.values.lock().unwrap().remove(name);
    }
}
