use std::sync::Arc;

use hsorter_core::{Config, StatsCache, StatsQuery};

use crate::api::WsBroadcaster;
use crate::recompute::RecomputeController;

/// Shared application state
pub struct AppState {
    config: Config,
    query: StatsQuery,
    cache: Arc<dyn StatsCache>,
    recompute: RecomputeController,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        query: StatsQuery,
        cache: Arc<dyn StatsCache>,
        recompute: RecomputeController,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            query,
            cache,
            recompute,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn query(&self) -> &StatsQuery {
        &self.query
    }

    pub fn cache(&self) -> &dyn StatsCache {
        self.cache.as_ref()
    }

    pub fn recompute(&self) -> &RecomputeController {
        &self.recompute
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
