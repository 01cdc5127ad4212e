//! Champion select monitor for the League Client.
//!
//! Finds the running client, polls its local API and keeps an immutable
//! [`GameSnapshot`](lcu::GameSnapshot) of champion select that any number
//! of readers can query while the poll loop refreshes it.

pub mod cache;
pub mod config;
pub mod cooldown;
pub mod lcu;
pub mod logging;
pub mod mock;

pub use cache::{CacheSettings, ConnectionStatus, PollingCache, RefreshOutcome};
pub use cooldown::{project, CooldownProjection, PlayerCooldowns};
pub use lcu::{ApiGateway, ConnectionInfo, ConnectionLocator, GamePhase, GameSnapshot, SnapshotAssembler};
