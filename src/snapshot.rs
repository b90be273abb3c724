//! Persisted container snapshots.
//!
//! A snapshot is a self-describing JSON record holding everything the pool
//! needs to reconstruct a container after a process restart: identity, the
//! backend's state and event log, the resource envelope, and properties.
//! Durability is the caller's concern; the pool only encodes and decodes.
//!
//! Unknown fields are ignored on read so older builds can restore snapshots
//! written by newer ones. Missing required fields are a decode error.

use crate::container::State;
use crate::error::Result;
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::time::Duration;

/// The persisted form of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSnapshot {
    /// Container id; also the depot directory name.
    pub id: String,
    /// Caller-facing alias.
    pub handle: String,
    /// Idle grace time, encoded as integer nanoseconds.
    #[serde(with = "duration_nanos")]
    pub grace_time: Duration,
    /// Backend state at snapshot time.
    pub state: State,
    /// Backend event log.
    pub events: Vec<String>,
    /// Resource envelope.
    pub resources: ResourcesSnapshot,
    /// Caller-supplied properties.
    pub properties: HashMap<String, String>,
}

/// The persisted resource envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSnapshot {
    /// Base uid of the container's uid block.
    pub uid: u32,
    /// The /30 subnet, as a CIDR string.
    pub network: Ipv4Network,
    /// Ports held by the container.
    pub ports: Vec<u16>,
}

impl ContainerSnapshot {
    /// Decodes a snapshot from a reader.
    pub fn read_from(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Encodes the snapshot to a writer.
    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        Ok(serde_json::to_writer(writer, self)?)
    }
}

/// Durations on the wire are integer nanoseconds.
mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_nanos() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
