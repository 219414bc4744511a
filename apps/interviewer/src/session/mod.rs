// Per-candidate interview state.
// The store is the only owner of session data; everything else works on snapshots.

pub mod models;
pub mod store;

pub use models::{Message, Phase, Role, Session, SessionSummary};
pub use store::SessionStore;
