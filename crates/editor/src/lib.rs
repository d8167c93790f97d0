//! `callie-editor`: the agent editing core.
//!
//! One canonical [`AgentRecord`](callie_domain::agent::AgentRecord) lives in
//! an [`AgentStore`]. Panels read it through the [`projection`] layer and
//! write it through the [`reconcile`] layer, which turns a field edit into
//! typed mutations for the reducer. The [`autosave`] bridge debounces LLM
//! saves and [`EditorSession`] ties it all to a backend.

pub mod autosave;
pub mod phones;
pub mod projection;
pub mod reconcile;
pub mod session;
pub mod store;

pub use autosave::{AutoSaver, SaveStatus};
pub use projection::{ProjectionCache, Views};
pub use session::{EditorSession, Notification, NotificationLevel, PublishOutcome, PublishRequest};
pub use store::{reduce, Action, AgentStore};
