// LCU module - discovers the League client and assembles champion select snapshots

pub mod error;
pub mod gateway;
pub mod locator;
pub mod session;
pub mod static_data;
pub mod types;

// Re-export public types and functions
pub use error::{ApiError, AssembleError, LocateError};
pub use gateway::{ApiGateway, GatewaySettings};
pub use locator::{ConnectionLocator, ConnectionSource, FixedEndpoint};
pub use session::{SnapshotAssembler, SnapshotSource};
pub use types::*;
