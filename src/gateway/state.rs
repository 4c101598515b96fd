use std::sync::Arc;

use crate::embedding::MultimodalEmbedder;
use crate::service::LostFoundService;
use crate::storage::Store;

pub struct HandlerState<S, E>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    pub service: Arc<LostFoundService<S, E>>,
}

impl<S, E> Clone for HandlerState<S, E>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S, E> HandlerState<S, E>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    pub fn new(service: Arc<LostFoundService<S, E>>) -> Self {
        Self { service }
    }
}
