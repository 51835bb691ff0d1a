use crate::settings::Settings;
use crate::state::ColonyHandle;
use crate::web;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{AntSnapshot, BestGenome, ColonyStats};
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub colony: ColonyHandle,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no generation has been scored yet")]
    NotScored,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotScored => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(handle_stats))
        .route("/api/ants", get(handle_ants))
        .route("/api/best", get(handle_best))
        .route("/health", get(web::health))
        .route("/healthz", get(web::health))
        .route("/", get(web::index))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let colony = ColonyHandle::new(&settings.sim)?;
    let state = AppState {
        colony: colony.clone(),
    };

    tokio::spawn(drive(colony, settings.tick_hz));

    let app = router(state);
    tracing::info!("Server listening on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Tick the colony at a fixed rate; each tick advances the simulation by 1 / tick_hz seconds
async fn drive(colony: ColonyHandle, tick_hz: f32) {
    let dt = 1.0 / tick_hz;
    let mut ticker = tokio::time::interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Driving simulation at {} ticks per second", tick_hz);
    loop {
        ticker.tick().await;
        colony.step(dt).await;
    }
}

/// Get live colony statistics
async fn handle_stats(State(state): State<AppState>) -> Json<ColonyStats> {
    Json(state.colony.stats().await)
}

async fn handle_ants(State(state): State<AppState>) -> Json<Vec<AntSnapshot>> {
    Json(state.colony.ants().await)
}

/// Best genome so far; 404 until the first generation is scored
async fn handle_best(State(state): State<AppState>) -> Result<Json<BestGenome>, ApiError> {
    state.colony.best().await.map(Json).ok_or(ApiError::NotScored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use shared::SimConfig;
    use tower::ServiceExt;

    fn app_state() -> AppState {
        let mut config = SimConfig::default();
        config.evolution.population_size = 4;
        config.evolution.generation_duration = 1.0;
        config.evolution.seed = Some(3);
        AppState {
            colony: ColonyHandle::new(&config).unwrap(),
        }
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (status, body) = fetch(router(app_state()), "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        let stats: ColonyStats = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.live_ants, 4);
    }

    #[tokio::test]
    async fn test_ants_endpoint() {
        let (status, body) = fetch(router(app_state()), "/api/ants").await;

        assert_eq!(status, StatusCode::OK);
        let ants: Vec<AntSnapshot> = serde_json::from_slice(&body).unwrap();
        assert_eq!(ants.len(), 4);
        assert_eq!(
            ants.iter()
                .filter(|a| a.caste == shared::Caste::Queen)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_best_endpoint_before_and_after_scoring() {
        let state = app_state();

        let (status, _) = fetch(router(state.clone()), "/api/best").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        state.colony.step(1.0).await;
        let (status, body) = fetch(router(state), "/api/best").await;
        assert_eq!(status, StatusCode::OK);
        let best: BestGenome = serde_json::from_slice(&body).unwrap();
        assert_eq!(best.genome.len(), shared::WEIGHT_COUNT);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = fetch(router(app_state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }
}
