//! HTTP surface that triggers campaign runs and exposes their results.

mod error;
pub mod routes;

pub use error::ApiError;

use crate::config::Settings;
use crate::errors::LeadflowError;
use crate::events::{EventSink, LoggingEventSink};
use crate::llm::{ChatClient, GenerativeTextClient};
use crate::services::{LeadStore, Mailer, ReportService, SmtpMailer};
use crate::templates::TemplateLibrary;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide settings.
    pub settings: Arc<Settings>,
    /// Text-generation client shared by all stages.
    pub client: Arc<dyn GenerativeTextClient>,
    /// Send collaborator.
    pub mailer: Arc<dyn Mailer>,
    /// Orchestrator event sink.
    pub events: Arc<dyn EventSink>,
    /// Lead input and output files.
    pub store: LeadStore,
    /// Report writer.
    pub reports: ReportService,
    /// Template catalog.
    pub templates: Arc<TemplateLibrary>,
    /// Held for the duration of a campaign run.
    pub campaign_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Wires the state around explicit collaborators.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        client: Arc<dyn GenerativeTextClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store: LeadStore::from_settings(&settings),
            reports: ReportService::from_settings(&settings),
            settings,
            client,
            mailer,
            events: Arc::new(LoggingEventSink::default()),
            templates: Arc::new(TemplateLibrary::new()),
            campaign_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Builds the HTTP chat client and SMTP mailer from `settings`.
    pub fn from_settings(settings: Arc<Settings>) -> Result<Self, LeadflowError> {
        let client = Arc::new(ChatClient::from_settings(&settings)?);
        let mailer = Arc::new(SmtpMailer::from_settings(&settings));
        Ok(Self::new(settings, client, mailer))
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }
}

/// Builds the router with permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/leads", get(routes::list_leads))
        .route("/leads/processed", get(routes::list_processed))
        .route("/leads/count", get(routes::count_leads))
        .route("/campaigns/run", post(routes::run_campaign))
        .route("/campaigns/stats", get(routes::campaign_stats))
        .route("/templates", get(routes::list_templates));

    Router::new()
        .route("/", get(routes::root_handler))
        .route("/health", get(routes::health_handler))
        .route("/info", get(routes::info_handler))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `settings.bind_addr` and serves until the process exits.
pub async fn serve(state: AppState) -> Result<(), LeadflowError> {
    let addr = state.settings.bind_addr.clone();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, app = %state.settings.app_name, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
