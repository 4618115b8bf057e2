use std::sync::Arc;
use std::time::Duration;

use mineruca_core::search::SearchOrchestrator;
use mineruca_gourmet::{GeminiClient, GoogleGeocoder, GourmetError, HotpepperClient};

use crate::config::ServerConfig;
use crate::search::SearchSessionStore;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: mineruca_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Domain events for the notification router.
    pub event_bus: Arc<mineruca_events::EventBus>,
    /// Primary search with fallback.
    pub search: Arc<SearchOrchestrator>,
    pub search_sessions: Arc<SearchSessionStore>,
    /// Chat model client.
    pub gemini: Arc<GeminiClient>,
    pub geocoder: Arc<GoogleGeocoder>,
}

impl AppState {
    /// Build the state with the real external service clients.
    pub fn new(
        pool: mineruca_db::DbPool,
        config: Arc<ServerConfig>,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<mineruca_events::EventBus>,
    ) -> Result<Self, GourmetError> {
        let client = config.gourmet.http_client()?;
        let hotpepper = Arc::new(HotpepperClient::new(client.clone(), &config.gourmet));
        let gemini = Arc::new(GeminiClient::new(client.clone(), &config.gourmet));
        let geocoder = Arc::new(GoogleGeocoder::new(client, &config.gourmet));

        if !hotpepper.is_configured() {
            tracing::warn!("HOTPEPPER_API_KEY not set, primary search will always fail");
        }
        if !gemini.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set, fallback search and chat are disabled");
        }
        if !geocoder.is_configured() {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set, geocoding is disabled");
        }

        let search = Arc::new(SearchOrchestrator::new(hotpepper, gemini.clone()));
        let search_sessions = Arc::new(SearchSessionStore::new(Duration::from_secs(
            config.search_session_ttl_secs,
        )));

        Ok(Self {
            pool,
            config,
            ws_manager,
            event_bus,
            search,
            search_sessions,
            gemini,
            geocoder,
        })
    }
}
