//! Outbound door events.
//!
//! A [`DoorEvent`] is created at the instant of a state transition and is
//! immutable from then on; ownership moves into the retry queue as a
//! serialized payload. The JSON schema is the telemetry contract:
//!
//! ```json
//! {"id":"…","timestampTicks":1234,"sender":"gatekeeper-fw",
//!  "name":"main-gate","kind":"open"}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a door transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorEventKind {
    Open,
    Close,
}

/// One state transition, as reported to the telemetry endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorEvent {
    pub id: Uuid,
    pub timestamp_ticks: i64,
    pub sender: heapless::String<32>,
    pub name: heapless::String<32>,
    pub kind: DoorEventKind,
}

impl DoorEvent {
    pub fn new(
        sender: &heapless::String<32>,
        name: &heapless::String<32>,
        kind: DoorEventKind,
        timestamp_ticks: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_ticks,
            sender: sender.clone(),
            name: name.clone(),
            kind,
        }
    }

    /// Serialize to the wire payload handed to the retry queue.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
