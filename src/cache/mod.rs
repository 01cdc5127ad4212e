// Cache module - polls the client on a schedule and fans snapshots out to listeners

pub mod backoff;
pub mod clock;
pub mod listeners;
pub mod poller;

pub use backoff::BackoffPolicy;
pub use clock::{Clock, ManualClock, SystemClock};
pub use listeners::{ListenerHandle, ListenerRegistry};
pub use poller::{CacheSettings, ConnectionStatus, PollState, PollingCache, RefreshOutcome};
