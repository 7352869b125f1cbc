use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    features::sponsorship::feed::PremiumFeed,
    services::{image_store::ImageStore, store::DocumentStore},
    utilities::{config::Config, errors::AppError},
};

pub type Store = Arc<dyn DocumentStore>;
pub type Images = Arc<dyn ImageStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub images: Images,
    pub premium: PremiumFeed,
    pub config: Config,
}

impl AppState {
    /// Starts the premium feed subscription against `store`.
    pub async fn new(
        store: Store,
        images: Images,
        config: Config,
    ) -> Result<Self, AppError> {
        let premium = PremiumFeed::start(store.as_ref()).await?;
        Ok(Self {
            store,
            images,
            premium,
            config,
        })
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.store)
    }
}

impl FromRef<AppState> for Images {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.images)
    }
}

impl FromRef<AppState> for PremiumFeed {
    fn from_ref(state: &AppState) -> Self {
        state.premium.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
