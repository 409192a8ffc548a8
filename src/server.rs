use crate::chart::Chart;
use crate::config::AppConfig;
use crate::render;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use geo::algorithm::contains::Contains;
use geo::bounding_rect::BoundingRect;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

// Wrapper for RTree indexing
pub struct CountyEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    // The single-threaded update cycle: resize events are serialized here.
    pub chart: Mutex<Chart>,
    pub tree: RTree<CountyEnvelope>,
}

#[derive(Deserialize)]
pub struct MapParams {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    code: String,
    fips: String,
    rate: Option<f64>,
}

pub async fn start_server(config: AppConfig, chart: Chart) -> Result<()> {
    println!("Building spatial index for API...");
    let tree_items: Vec<CountyEnvelope> = chart
        .counties()
        .iter()
        .enumerate()
        .filter_map(|(i, county)| {
            let rect = county.geometry.bounding_rect()?;
            Some(CountyEnvelope {
                index: i,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();
    let tree = RTree::bulk_load(tree_items);
    println!("Spatial index built.");

    let state = Arc::new(AppState {
        chart: Mutex::new(chart),
        tree,
    });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/map.svg", get(map_handler))
        .route("/api/county", get(county_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Each request with explicit dimensions is one resize event; the chart is
/// laid out and reflowed synchronously under the lock, then serialized.
async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> impl IntoResponse {
    let mut chart = match state.chart.lock() {
        Ok(chart) => chart,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let (Some(width), Some(height)) = (params.width, params.height) {
        if (width, height) != chart.viewport() {
            chart.resize(width, height);
        }
    }

    let body = render::svg_document(&chart);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        body,
    )
}

async fn county_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let point = Point::new(params.lon, params.lat);
    let envelope = AABB::from_point([params.lon, params.lat]);

    let chart = match state.chart.lock() {
        Ok(chart) => chart,
        Err(poisoned) => poisoned.into_inner(),
    };

    let candidates = state.tree.locate_in_envelope_intersecting(&envelope);
    for candidate in candidates {
        if let Some(county) = chart.counties().get(candidate.index) {
            if county.geometry.contains(&point) {
                let fips = crate::join::full_fips(&county.code);
                let rate = chart.rates().rate(&fips).filter(|r| r.is_finite());
                return Json(Some(QueryResponse {
                    code: county.code.clone(),
                    fips,
                    rate,
                }));
            }
        }
    }

    Json(None)
}
