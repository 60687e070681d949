//! Mock client registry for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::registry::{ClientRecord, ClientRegistry, RegistryError};

/// Registry returning a fixed client list, or a fixed error.
#[derive(Debug, Default)]
pub struct MockRegistry {
    clients: Vec<ClientRecord>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        Self {
            clients,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A registry whose listing always fails with a query error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            clients: Vec::new(),
            error: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the client list was read.
    pub fn list_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClientRegistry for MockRegistry {
    fn list_clients(&self) -> Result<Vec<ClientRecord>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(RegistryError::Query(message.clone())),
            None => Ok(self.clients.clone()),
        }
    }
}
