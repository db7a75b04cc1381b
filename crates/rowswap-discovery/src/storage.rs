//! In-memory storage for the discovery directory.
//!
//! The directory upholds two uniqueness invariants: at most one live entry
//! per name, and at most one live entry per endpoint. Both checks and the
//! mutation they guard execute under a single lock, so the map only exposes
//! composite check-then-act operations — there is no bare `insert` a caller
//! could use to bypass the checks.

use chrono::{DateTime, Utc};
use rowswap_common::{Endpoint, ServiceName};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// A live directory entry for one registered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Endpoint the service is reachable at.
    pub endpoint: Endpoint,

    /// When the entry was registered.
    pub registered_at: DateTime<Utc>,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The name now maps to the endpoint.
    Registered,
    /// Another service already holds the name.
    NameInUse,
    /// Another name already points at the endpoint.
    EndpointInUse,
}

/// Outcome of a dismissal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// The entry was removed.
    Dismissed,
    /// No entry exists under the name. Dismissal is idempotent, so this is
    /// a report, not a fault.
    NameNotRegistered,
    /// The stored endpoint differs from the caller's; only the registrant
    /// matching the stored endpoint may dismiss its entry.
    EndpointMismatch,
}

/// Thread-safe name→endpoint directory.
///
/// State lives only for the process lifetime: initialized empty, never
/// persisted, torn down with the process.
pub struct ServiceDirectory {
    entries: Mutex<HashMap<ServiceName, DirectoryEntry>>,
}

impl ServiceDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ServiceName, DirectoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `name` at `endpoint` if both are free.
    ///
    /// The name check runs before the endpoint check, so a request that
    /// conflicts on both reports the name conflict.
    pub fn register_if_free(&self, name: ServiceName, endpoint: Endpoint) -> RegisterOutcome {
        let mut entries = self.lock();

        if entries.contains_key(&name) {
            return RegisterOutcome::NameInUse;
        }
        if entries.values().any(|entry| entry.endpoint == endpoint) {
            return RegisterOutcome::EndpointInUse;
        }

        entries.insert(
            name.clone(),
            DirectoryEntry {
                endpoint,
                registered_at: Utc::now(),
            },
        );
        tracing::info!("Registered service: {} at {}", name, endpoint);
        RegisterOutcome::Registered
    }

    /// Removes the entry for `name` if `endpoint` matches the stored one.
    pub fn dismiss_if_owned(&self, name: &ServiceName, endpoint: Endpoint) -> DismissOutcome {
        let mut entries = self.lock();

        match entries.get(name) {
            None => DismissOutcome::NameNotRegistered,
            Some(entry) if entry.endpoint != endpoint => DismissOutcome::EndpointMismatch,
            Some(_) => {
                entries.remove(name);
                tracing::info!("Dismissed service: {} at {}", name, endpoint);
                DismissOutcome::Dismissed
            }
        }
    }

    /// Resolves a name to its registered endpoint.
    pub fn lookup(&self, name: &ServiceName) -> Option<Endpoint> {
        self.lock().get(name).map(|entry| entry.endpoint)
    }

    /// Returns true if a live entry exists under `name`.
    pub fn contains_name(&self, name: &ServiceName) -> bool {
        self.lock().contains_key(name)
    }

    /// Returns true if any live entry points at `endpoint`.
    pub fn contains_endpoint(&self, endpoint: Endpoint) -> bool {
        self.lock().values().any(|entry| entry.endpoint == endpoint)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the directory holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a point-in-time copy of all entries, for diagnostics.
    pub fn snapshot(&self) -> Vec<(ServiceName, DirectoryEntry)> {
        self.lock()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }
}

impl Default for ServiceDirectory {
    fn default() -> Self {
        Self::new()
    }
}
