//! Stand-in for the League client API, used by tests and `--mock` runs.

pub mod data;
pub mod server;

pub use data::{MockPlayer, MockScenario};
pub use server::{MockEndpoint, MOCK_TOKEN, MOCK_USER};
