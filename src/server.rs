use crate::color::ColorScheme;
use crate::config::AtlasConfig;
use crate::dashboard::{Dashboard, MapPointerOutcome, PointerEvent};
use crate::error::AtlasError;
use crate::line_view::Readout;
use crate::tooltip::Tooltip;
use crate::types::{Dataset, Selection};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

/// One dashboard per process. The lock makes every handler run to
/// completion before the next one starts, so redraws never interleave.
pub struct AppState {
    pub dashboard: Mutex<Dashboard>,
}

#[derive(Deserialize)]
pub struct MapParams {
    year: Option<String>,
    scale: Option<String>,
}

#[derive(Deserialize)]
pub struct MapPointerParams {
    x: f64,
    y: f64,
    #[serde(default)]
    page_x: f64,
    #[serde(default)]
    page_y: f64,
    kind: PointerEvent,
}

#[derive(Deserialize)]
pub struct LineParams {
    region: Option<String>,
}

#[derive(Deserialize)]
pub struct LinePointerParams {
    x: f64,
    #[serde(default)]
    page_x: f64,
    #[serde(default)]
    page_y: f64,
    kind: PointerEvent,
}

#[derive(Serialize)]
pub struct MetaResponse {
    years: Vec<String>,
    regions: Vec<String>,
    schemes: Vec<&'static str>,
    scheme: String,
    selection: Selection,
}

#[derive(Serialize)]
pub struct LinePointerResponse {
    readout: Option<Readout>,
    tooltip: Option<Tooltip>,
}

pub struct ApiError(AtlasError);

impl From<AtlasError> for ApiError {
    fn from(err: AtlasError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AtlasError::UnknownColorScheme(_) => StatusCode::BAD_REQUEST,
            AtlasError::UnknownRegion(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

fn svg(body: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], body).into_response()
}

/// Draws the initial map and wraps the dashboard for sharing across handlers.
pub fn build_state(config: AtlasConfig, dataset: Dataset) -> Result<Arc<AppState>> {
    let mut dashboard = Dashboard::new(dataset, config);
    dashboard.redraw_map()?;
    Ok(Arc::new(AppState {
        dashboard: Mutex::new(dashboard),
    }))
}

pub fn router(state: Arc<AppState>, config: &AtlasConfig) -> Router {
    let mut app = Router::new()
        .route("/api/meta", get(meta_handler))
        .route("/api/map", get(map_handler))
        .route("/api/map/pointer", get(map_pointer_handler))
        .route("/api/line", get(line_handler))
        .route("/api/line/pointer", get(line_pointer_handler));

    if let Some(dir) = &config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive()).with_state(state)
}

pub async fn start_server(config: AtlasConfig, dataset: Dataset) -> Result<()> {
    let port = config.server.port;
    let state = build_state(config.clone(), dataset)?;
    let app = router(state, &config);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn meta_handler(State(state): State<Arc<AppState>>) -> Json<MetaResponse> {
    let dashboard = state.dashboard.lock().await;
    let table = &dashboard.dataset().indicators;
    Json(MetaResponse {
        years: table.years(),
        regions: table.regions.clone(),
        schemes: ColorScheme::ALL.iter().map(|s| s.name()).collect(),
        scheme: dashboard.scheme().to_string(),
        selection: dashboard.selection().clone(),
    })
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Response, ApiError> {
    let mut dashboard = state.dashboard.lock().await;
    if let Some(scale) = &params.scale {
        dashboard.set_scheme(scale)?;
    }
    if let Some(year) = &params.year {
        dashboard.set_year(year)?;
    }
    if params.scale.is_none() && params.year.is_none() {
        dashboard.redraw_map()?;
    }
    Ok(svg(dashboard.map_surface().to_svg()))
}

async fn map_pointer_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapPointerParams>,
) -> Result<Json<MapPointerOutcome>, ApiError> {
    let mut dashboard = state.dashboard.lock().await;
    let outcome = dashboard.map_pointer(
        params.x,
        params.y,
        (params.page_x, params.page_y),
        params.kind,
    )?;
    Ok(Json(outcome))
}

async fn line_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LineParams>,
) -> Result<Response, ApiError> {
    let mut dashboard = state.dashboard.lock().await;
    let region = match params.region.or_else(|| dashboard.selection().region.clone()) {
        Some(region) => region,
        None => return Ok((StatusCode::NO_CONTENT, "").into_response()),
    };
    dashboard.select_region(&region)?;
    Ok(svg(dashboard.line_surface().to_svg()))
}

async fn line_pointer_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LinePointerParams>,
) -> Json<LinePointerResponse> {
    let mut dashboard = state.dashboard.lock().await;
    let readout = dashboard.line_pointer(params.x, (params.page_x, params.page_y), params.kind);
    Json(LinePointerResponse {
        readout,
        tooltip: dashboard.line_tooltip().cloned(),
    })
}
