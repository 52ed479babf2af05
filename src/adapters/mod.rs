//! Port implementations: live adapters for production, replaying adapters
//! for tests.

pub mod live;
pub mod replaying;
