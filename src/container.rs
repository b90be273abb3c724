//! The container handle returned by the pool.
//!
//! The pool constructs, snapshots, and destroys containers; everything else
//! about a container's runtime life (exec, streams, limits, port mappings)
//! belongs to the owning backend. The handle therefore carries identity,
//! the resource envelope, and a small mutation surface for the backend's
//! state machine and event log.

use crate::snapshot::{ContainerSnapshot, ResourcesSnapshot};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

// =============================================================================
// State
// =============================================================================

/// Container lifecycle state.
///
/// Live containers move `born` → `active` → `stopped`. The value is kept as
/// an open string rather than a closed enum: snapshots written by a newer
/// backend may carry states this build does not know, and they must
/// round-trip through restore verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    /// Freshly created, never started.
    pub fn born() -> Self {
        State("born".to_string())
    }

    /// At least one process has been run.
    pub fn active() -> Self {
        State("active".to_string())
    }

    /// Stopped by the backend.
    pub fn stopped() -> Self {
        State("stopped".to_string())
    }

    /// The state as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        State(s.to_string())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State(s)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Resources
// =============================================================================

/// The scarce host resources held by one live container.
///
/// The uid block and subnet are fixed at creation. Ports are acquired
/// lazily by the backend as port mappings are requested, so the list is
/// interior-mutable.
#[derive(Debug)]
pub struct Resources {
    uid: u32,
    subnet: Ipv4Network,
    ports: Mutex<Vec<u16>>,
}

impl Resources {
    /// Creates a resource envelope with no ports.
    pub fn new(uid: u32, subnet: Ipv4Network) -> Self {
        Self::with_ports(uid, subnet, Vec::new())
    }

    /// Creates a resource envelope with an initial port list (restore path).
    pub fn with_ports(uid: u32, subnet: Ipv4Network, ports: Vec<u16>) -> Self {
        Self {
            uid,
            subnet,
            ports: Mutex::new(ports),
        }
    }

    /// The container's base uid.
    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// The container's /30 subnet.
    pub fn subnet(&self) -> Ipv4Network {
        self.subnet
    }

    /// Records a port acquired for this container.
    pub fn add_port(&self, port: u16) {
        self.ports.lock().expect("ports lock poisoned").push(port);
    }

    /// The ports currently tracked for this container.
    pub fn ports(&self) -> Vec<u16> {
        self.ports.lock().expect("ports lock poisoned").clone()
    }
}

// =============================================================================
// Container
// =============================================================================

/// A live container.
///
/// Identity, grace time, and properties are immutable; state and the event
/// log are owned by the backend driving the container.
#[derive(Debug)]
pub struct Container {
    id: String,
    handle: String,
    grace_time: Duration,
    properties: HashMap<String, String>,
    state: Mutex<State>,
    events: Mutex<Vec<String>>,
    resources: Resources,
}

impl Container {
    /// Creates a newly-born container handle.
    pub fn new(
        id: String,
        handle: String,
        grace_time: Duration,
        properties: HashMap<String, String>,
        resources: Resources,
    ) -> Self {
        Self {
            id,
            handle,
            grace_time,
            properties,
            state: Mutex::new(State::born()),
            events: Mutex::new(Vec::new()),
            resources,
        }
    }

    /// Reconstructs a container from a snapshot's fields.
    pub fn from_snapshot(snapshot: ContainerSnapshot) -> Self {
        let ContainerSnapshot {
            id,
            handle,
            grace_time,
            state,
            events,
            resources,
            properties,
        } = snapshot;

        Self {
            id,
            handle,
            grace_time,
            properties,
            state: Mutex::new(state),
            events: Mutex::new(events),
            resources: Resources::with_ports(resources.uid, resources.network, resources.ports),
        }
    }

    /// The container's unique id; also its depot directory name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The container's handle (caller-facing alias).
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Idle grace time before the backend reaps the container.
    pub fn grace_time(&self) -> Duration {
        self.grace_time
    }

    /// Caller-supplied properties.
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// The resource envelope.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state.lock().expect("state lock poisoned").clone()
    }

    /// Moves the container to a new state.
    pub fn set_state(&self, state: State) {
        *self.state.lock().expect("state lock poisoned") = state;
    }

    /// The event log.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock poisoned").clone()
    }

    /// Appends an event to the log.
    pub fn add_event(&self, event: impl Into<String>) {
        self.events
            .lock()
            .expect("events lock poisoned")
            .push(event.into());
    }

    /// Captures the container as a serializable snapshot.
    pub fn snapshot(&self) -> ContainerSnapshot {
        ContainerSnapshot {
            id: self.id.clone(),
            handle: self.handle.clone(),
            grace_time: self.grace_time,
            state: self.state(),
            events: self.events(),
            resources: ResourcesSnapshot {
                uid: self.resources.uid(),
                network: self.resources.subnet(),
                ports: self.resources.ports(),
            },
            properties: self.properties.clone(),
        }
    }
}
