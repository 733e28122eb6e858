//! Best-effort relay of reviews to an external form inbox.
//!
//! Local persistence never waits on the network. A review is relayed once
//! right after it is written and then by a periodic sweep until the endpoint
//! confirms delivery, at which point its `synced` flag is set. Anything short
//! of a confirmed delivery leaves the review pending.

mod agent;
mod endpoint;
mod relay;

pub use agent::{SweepReport, SyncAgent, SyncEvent, SyncHandle, DEFAULT_SWEEP_INTERVAL_SECS};
pub use endpoint::{GoogleFormFields, RelayBody, RelayEndpoint, RelayPayload};
pub use relay::{HttpRelay, Relay, RelayOutcome};
