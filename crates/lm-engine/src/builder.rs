//! Fluent builder for constructing an [`Engine`].

use std::collections::BTreeSet;
use std::sync::Arc;

use lm_anim::{AnimationScheduler, MarkerRegistry};
use lm_cache::ViewportCache;
use lm_core::log::tracing_log;
use lm_core::{DynLog, EngineConfig, Viewport};
use lm_feed::{EntitySource, StaticSource};
use lm_spatial::{RouteResolver, RouteSource};

use crate::{Engine, EngineResult, PositionStore, RefreshCadence};

/// Fluent builder for [`Engine`].
///
/// # Required inputs
///
/// - [`EngineConfig`] — validated in [`build`](Self::build)
/// - the initial [`Viewport`]
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default                                       |
/// |----------------|-----------------------------------------------|
/// | `.source(s)`   | Empty `StaticSource`; refresh finds nothing   |
/// | `.router(r)`   | None; every animation is a straight line      |
/// | `.log(l)`      | `TracingLog`                                  |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(config, viewport)
///     .source(Arc::new(feed))
///     .router(Arc::new(GraphRouteSource::new(network)))
///     .build()?;
/// engine.refresh(FrameTime::ZERO, false, &mut NoopSink).await;
/// ```
pub struct EngineBuilder {
    config:   EngineConfig,
    viewport: Viewport,
    source:   Option<Arc<dyn EntitySource>>,
    router:   Option<Arc<dyn RouteSource>>,
    log:      Option<DynLog>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Self {
        Self { config, viewport, source: None, router: None, log: None }
    }

    /// Supply the snapshot source that [`Engine::refresh`] fetches through.
    pub fn source(mut self, source: Arc<dyn EntitySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Supply a routing collaborator.  Routing is still gated by
    /// `routing_enabled`, the routing zoom threshold, and the minimum
    /// displacement.
    pub fn router(mut self, router: Arc<dyn RouteSource>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn log(mut self, log: DynLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Validate the configuration and return a ready engine with no
    /// markers.
    pub fn build(self) -> EngineResult<Engine> {
        self.config.validate()?;

        let log = self.log.unwrap_or_else(tracing_log);
        let source: Arc<dyn EntitySource> = match self.source {
            Some(s) => s,
            None => Arc::new(StaticSource::new(Vec::new())),
        };

        let cache = ViewportCache::new(source, Arc::clone(&log), &self.config);
        let resolver = self
            .router
            .map(|router| RouteResolver::new(router, Arc::clone(&log), &self.config));

        tracing::info!(
            zoom    = self.viewport.zoom,
            routing = resolver.is_some() && self.config.routing_enabled,
            "engine built"
        );

        Ok(Engine {
            scheduler:       AnimationScheduler::new(self.config.redraw_epsilon_deg),
            cadence:         RefreshCadence::new(&self.config),
            viewport:        self.viewport,
            store:           PositionStore::new(),
            markers:         MarkerRegistry::new(),
            pending_removal: BTreeSet::new(),
            cache,
            resolver,
            log,
            config:          self.config,
        })
    }
}
