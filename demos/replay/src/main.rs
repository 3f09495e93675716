//! replay — headless driver for the livemap engine.
//!
//! Feeds snapshot batches (a seeded synthetic fleet, or a CSV recording) into
//! an [`Engine`] and runs the frame loop between batches on a simulated
//! clock, optionally panning the viewport as it goes.  Nothing is drawn; a
//! counting sink tallies what a map widget would have been told to do.

mod network;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lm_core::{Bounds, EngineConfig, EntityId, EntitySnapshot, FrameTime, GeoPoint, Viewport};
use lm_engine::{EngineBuilder, MarkerSink, TaskOutcome};
use lm_feed::{EntitySource, ReplaySource, SyntheticFeed, load_batches_csv};
use lm_spatial::GraphRouteSource;

use network::build_grid;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Bristol city centre.
const CENTER:        GeoPoint = GeoPoint { lat: 51.4545, lon: -2.5879 };
const HALF_SPAN_DEG: f64      = 0.02;
const GRID_SIZE:     usize    = 12;
const MAX_SNAP_M:    f64      = 500.0;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "replay", about = "Drive the livemap engine from a synthetic or recorded feed")]
struct Cli {
    /// Engine configuration (TOML).  Environment overrides still apply.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay batches from this CSV instead of the synthetic fleet.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Synthetic fleet size.
    #[arg(long, default_value_t = 40)]
    vehicles: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of batches to reconcile.
    #[arg(long, default_value_t = 10)]
    batches: usize,

    /// Simulated time between batches.
    #[arg(long, default_value_t = 5_000.0)]
    batch_ms: f64,

    /// Simulated time between frames.
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    #[arg(long, default_value_t = 17)]
    zoom: u8,

    /// Eastward pan applied to the viewport after every batch, in degrees.
    #[arg(long, default_value_t = 0.0)]
    pan_deg: f64,

    /// Follow streets of a synthetic grid instead of straight lines.
    #[arg(long)]
    route: bool,
}

// ── Counting sink ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct TallySink {
    added:        usize,
    moved:        usize,
    content:      usize,
    removed:      usize,
    routes_shown: usize,
    finished:     usize,
    snapped:      usize,
}

impl MarkerSink for TallySink {
    fn add(&mut self, _id: &EntityId, _position: GeoPoint, _snapshot: &EntitySnapshot) {
        self.added += 1;
    }

    fn set_position(&mut self, _id: &EntityId, _position: GeoPoint) {
        self.moved += 1;
    }

    fn set_content(&mut self, _id: &EntityId, _snapshot: &EntitySnapshot) {
        self.content += 1;
    }

    fn remove(&mut self, _id: &EntityId) {
        self.removed += 1;
    }

    fn show_route(&mut self, _id: &EntityId, _path: &[GeoPoint]) {
        self.routes_shown += 1;
    }

    fn on_animation_end(&mut self, _id: &EntityId, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Finished => self.finished += 1,
            _ => self.snapped += 1,
        }
    }
}

// ── Feed selection ────────────────────────────────────────────────────────────

enum Feed {
    Synthetic(Arc<SyntheticFeed>),
    Replay(Arc<ReplaySource>),
}

impl Feed {
    fn source(&self) -> Arc<dyn EntitySource> {
        match self {
            Feed::Synthetic(f) => f.clone(),
            Feed::Replay(r) => r.clone(),
        }
    }

    /// Move the world on by one batch.  Replays advance on fetch instead.
    fn step(&self) {
        if let Feed::Synthetic(f) = self {
            f.step();
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,livemap::api=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if !(cli.frame_ms > 0.0 && cli.batch_ms > 0.0) {
        bail!("--frame-ms and --batch-ms must be positive");
    }

    // 1. Configuration.
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config.apply_env_overrides()?;

    // 2. Feed.
    let area = Bounds::around(CENTER, HALF_SPAN_DEG);
    let (feed, batches) = match &cli.csv {
        Some(path) => {
            let recorded = load_batches_csv(path)
                .with_context(|| format!("loading {}", path.display()))?;
            let replay = ReplaySource::new(recorded);
            let n = cli.batches.min(replay.batch_count());
            (Feed::Replay(Arc::new(replay)), n)
        }
        None => {
            let fleet = SyntheticFeed::new(area, cli.vehicles, 0.001, cli.seed);
            (Feed::Synthetic(Arc::new(fleet)), cli.batches)
        }
    };

    // 3. Engine.
    let mut viewport = Viewport::new(area, cli.zoom);
    let mut builder = EngineBuilder::new(config, viewport).source(feed.source());
    if cli.route {
        let grid = build_grid(&area, GRID_SIZE);
        println!("Street grid: {} junctions, {} streets", grid.junction_count(), grid.street_count());
        builder = builder.router(Arc::new(
            GraphRouteSource::new(Arc::new(grid)).with_max_snap(MAX_SNAP_M),
        ));
    }
    let mut engine = builder.build()?;

    println!("=== replay — livemap engine ===");
    println!(
        "Batches: {batches}  |  every {} ms  |  frame {} ms  |  zoom {}",
        cli.batch_ms, cli.frame_ms, cli.zoom
    );
    println!();

    // 4. Run.
    let mut sink = TallySink::default();
    let t0 = Instant::now();
    let mut frames = 0usize;

    for batch in 0..batches {
        let start = batch as f64 * cli.batch_ms;
        feed.step();

        // Every batch is a new moment in simulated time; never serve the
        // previous batch from cache.
        match engine.refresh(FrameTime(start), true, &mut sink).await {
            Some(report) => tracing::info!(
                batch,
                added    = report.added.len(),
                animated = report.animated.len(),
                routed   = report.routed,
                removed  = report.removed.len(),
                deferred = report.deferred.len(),
                markers  = engine.markers().len(),
                "reconciled"
            ),
            None => tracing::warn!(batch, "refresh skipped"),
        }

        let mut t = start;
        while t < start + cli.batch_ms {
            engine.frame(FrameTime(t), &mut sink);
            t += cli.frame_ms;
            frames += 1;
        }

        if cli.pan_deg != 0.0 {
            viewport = Viewport::new(viewport.bounds.translate(0.0, cli.pan_deg), viewport.zoom);
            engine.set_viewport(viewport);
        }
    }
    let elapsed = t0.elapsed();

    // 5. Summary.
    println!("Replay complete in {:.3} s ({frames} frames)", elapsed.as_secs_f64());
    println!("  markers added      : {}", sink.added);
    println!("  position updates   : {}", sink.moved);
    println!("  popup refreshes    : {}", sink.content);
    println!("  routes shown       : {}", sink.routes_shown);
    println!("  animations finished: {}", sink.finished);
    println!("  animations snapped : {}", sink.snapped);
    println!("  markers removed    : {}", sink.removed);
    println!(
        "  refresh cadence    : {} ms{}",
        engine.cadence().interval_ms(),
        if engine.cadence().is_scenic() { " (scenic)" } else { "" }
    );
    println!();

    println!("{:<12} {:<10} {:<24}", "Vehicle", "State", "Position");
    println!("{}", "-".repeat(46));
    for marker in engine.markers().iter() {
        println!(
            "{:<12} {:<10} {:<24}",
            marker.id.as_str(),
            format!("{:?}", marker.state()),
            marker.displayed.to_string(),
        );
    }

    Ok(())
}
