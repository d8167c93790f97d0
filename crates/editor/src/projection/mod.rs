//! Panel view-models derived from the canonical record.
//!
//! Every deriver is a pure `&AgentRecord -> View` function. [`Views`]
//! bundles all six and [`ProjectionCache`] memoizes them per record `Arc`.

mod audio;
mod call_settings;
mod functions;
mod identity;
mod llm;
mod post_call;

pub use audio::*;
pub use call_settings::*;
pub use functions::*;
pub use identity::*;
pub use llm::*;
pub use post_call::*;

use std::sync::Arc;

use callie_domain::agent::AgentRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Views {
    pub identity: IdentityView,
    pub llm: LlmView,
    pub audio: AudioView,
    pub call_settings: CallSettingsView,
    pub post_call: PostCallView,
    pub functions: FunctionsView,
}

impl Views {
    pub fn derive(rec: &AgentRecord) -> Self {
        Self {
            identity: IdentityView::derive(rec),
            llm: LlmView::derive(rec),
            audio: AudioView::derive(rec),
            call_settings: CallSettingsView::derive(rec),
            post_call: PostCallView::derive(rec),
            functions: FunctionsView::derive(rec),
        }
    }
}

/// Remembers the views of the last record it saw.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    last: Option<(Arc<AgentRecord>, Arc<Views>)>,
}

impl ProjectionCache {
    pub fn get(&mut self, rec: &Arc<AgentRecord>) -> Arc<Views> {
        if let Some((seen, views)) = &self.last {
            if Arc::ptr_eq(seen, rec) {
                return Arc::clone(views);
            }
        }
        let views = Arc::new(Views::derive(rec));
        self.last = Some((Arc::clone(rec), Arc::clone(&views)));
        views
    }
}
