//! Floorplan locator server.
//!
//! Polls the device sheet, places each device on its building's floorplan
//! and serves the result as JSON for a map frontend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use floormap::config::Config;
use floormap::directory::{Marker, SearchOutcome, ViewState, AUTOCOMPLETE_LIMIT};
use floormap::feed::SheetFetcher;
use floormap::locator::{Locator, Placement};
use floormap::models::{GeoPoint, LocatedDevice};

mod poller;
use poller::Snapshot;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Facility locator server")]
struct Args {
    /// Config file (defaults to the built-in campus layout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Override the feed poll interval, in seconds
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Fetch the feed once, print located devices as JSON and exit
    #[arg(long)]
    once: bool,
}

/// Application state shared across handlers
struct AppState {
    config: Config,
    locator: Arc<Locator>,
    snapshot: Arc<RwLock<Snapshot>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::builtin()?,
    };
    info!(
        "Loaded {} buildings (fallback {})",
        config.buildings.len(),
        config.fallback_building
    );

    let locator = Arc::new(Locator::from_config(&config));
    let fetcher = SheetFetcher::new(&config.feed)?;

    if args.once {
        let directory = poller::refresh(&fetcher, &locator)
            .await
            .context("Failed to load devices")?;
        println!("{}", serde_json::to_string_pretty(directory.devices())?);
        return Ok(());
    }

    let interval = args
        .poll_interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.feed.poll_interval());
    if interval.is_zero() {
        anyhow::bail!("Poll interval must be greater than zero");
    }

    let snapshot = Arc::new(RwLock::new(Snapshot::default()));
    info!("Polling device feed every {}s", interval.as_secs());
    tokio::spawn(poller::run(
        fetcher,
        Arc::clone(&locator),
        Arc::clone(&snapshot),
        interval,
    ));

    let state = Arc::new(AppState {
        config,
        locator,
        snapshot,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/buildings", get(buildings_handler))
        .route("/v1/devices", get(devices_handler))
        .route("/v1/autocomplete", get(autocomplete_handler))
        .route("/v1/search", get(search_handler))
        .route("/v1/locate", get(locate_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snap = state.snapshot.read().await;

    Json(HealthResponse {
        status: if snap.last_error.is_none() && snap.last_refresh.is_some() {
            "ok"
        } else {
            "degraded"
        },
        devices: snap.directory.len(),
        last_refresh: snap.last_refresh.map(|t| t.to_rfc3339()),
        last_error: snap.last_error.clone(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    devices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_refresh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
}

/// Configured buildings and their floorplans
async fn buildings_handler(State(state): State<Arc<AppState>>) -> Json<BuildingsResponse> {
    let buildings = state
        .config
        .buildings
        .iter()
        .map(|b| BuildingSummary {
            id: b.id.clone(),
            image: b.floorplan.image.clone(),
            width: b.floorplan.width,
            height: b.floorplan.height,
        })
        .collect();

    Json(BuildingsResponse {
        default_building: state.config.fallback_building.clone(),
        buildings,
    })
}

#[derive(Serialize)]
struct BuildingSummary {
    id: String,
    image: String,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct BuildingsResponse {
    default_building: String,
    buildings: Vec<BuildingSummary>,
}

/// Markers for one building
async fn devices_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DevicesQueryParams>,
) -> Result<Json<DevicesResponse>, (StatusCode, String)> {
    let building = params
        .building
        .unwrap_or_else(|| state.config.fallback_building.clone());

    if state.config.building(&building).is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Unknown building '{}'", building),
        ));
    }

    let mut view = ViewState::new(state.config.fallback_building.clone());
    let message = view.select(building);
    view.set_highlight(params.highlight.as_deref());

    let snap = state.snapshot.read().await;
    Ok(Json(DevicesResponse {
        building: view.building().to_string(),
        message,
        markers: view.markers(&snap.directory),
    }))
}

#[derive(Deserialize)]
struct DevicesQueryParams {
    building: Option<String>,
    /// Device name to highlight
    highlight: Option<String>,
}

#[derive(Serialize)]
struct DevicesResponse {
    building: String,
    message: String,
    markers: Vec<Marker>,
}

/// Device name suggestions
async fn autocomplete_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteQueryParams>,
) -> Json<AutocompleteResponse> {
    let size = params
        .size
        .unwrap_or(AUTOCOMPLETE_LIMIT)
        .min(AUTOCOMPLETE_LIMIT);

    let snap = state.snapshot.read().await;
    let names = snap
        .directory
        .autocomplete(&params.text, size)
        .into_iter()
        .map(String::from)
        .collect();

    Json(AutocompleteResponse { names })
}

#[derive(Deserialize)]
struct AutocompleteQueryParams {
    text: String,
    size: Option<usize>,
}

#[derive(Serialize)]
struct AutocompleteResponse {
    names: Vec<String>,
}

/// Exact name lookup
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let mut view = ViewState::new(state.config.fallback_building.clone());

    let snap = state.snapshot.read().await;
    match view.search(&snap.directory, &params.name) {
        SearchOutcome::Found { device, message } => Ok(Json(SearchResponse {
            building: view.building().to_string(),
            description: ViewState::describe(&device),
            device,
            message,
        })),
        SearchOutcome::NotFound { message } => Err((StatusCode::NOT_FOUND, message)),
        SearchOutcome::Empty => Err((StatusCode::BAD_REQUEST, "Empty search".to_string())),
    }
}

#[derive(Deserialize)]
struct SearchQueryParams {
    name: String,
}

#[derive(Serialize)]
struct SearchResponse {
    building: String,
    device: LocatedDevice,
    message: String,
    description: String,
}

/// Place an arbitrary coordinate
async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQueryParams>,
) -> Result<Json<Placement>, (StatusCode, String)> {
    let point = GeoPoint::new(params.lat, params.lon);
    if !point.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "lat and lon must be finite numbers".to_string(),
        ));
    }

    Ok(Json(state.locator.place(point)))
}

#[derive(Deserialize)]
struct LocateQueryParams {
    lat: f64,
    lon: f64,
}
