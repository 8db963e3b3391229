use crate::store::EventStore;
use crate::validation::EventPolicy;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub policy: EventPolicy,
}
