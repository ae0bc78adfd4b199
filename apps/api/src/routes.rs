// [apps/api/src/routes.rs]
//! Route composition: CORS, a nested `/api/v1` mount, and the
//! middleware layering order (health gate innermost, then auth).

use std::time::Duration;

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, emergency, fleet, incidents, mobile};
use crate::middleware::{auth_guard, health_guard};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let public = Router::new().route("/auth/login", post(auth::login));

    let guarded = Router::new()
        .route("/sos", post(incidents::create).get(incidents::list))
        .route("/sos/intake", post(incidents::intake))
        .route("/sos/map", get(incidents::map))
        .route("/sos/:id", get(incidents::get_one).put(incidents::update_notes).delete(incidents::delete))
        .route("/sos/:id/nearest-facilities", get(incidents::nearest_facilities))
        .route("/emergency/smart-assignment", get(emergency::smart_assignment))
        .route("/emergency/assign-emergency", post(emergency::assign_emergency))
        .route("/emergency/accept-assignment", post(emergency::accept_assignment))
        .route("/emergency/reject-assignment", post(emergency::reject_assignment))
        .route("/emergency/complete-emergency", post(emergency::complete_emergency))
        .route("/emergency/emergency-summary", get(emergency::emergency_summary))
        .route("/organizations", get(fleet::list_organisations).post(fleet::create_organisation))
        .route(
            "/organizations/:id",
            get(fleet::get_organisation).put(fleet::update_organisation).delete(fleet::delete_organisation),
        )
        .route("/divisions", get(fleet::list_divisions).post(fleet::create_division))
        .route("/divisions/:id", get(fleet::get_division).put(fleet::update_division).delete(fleet::delete_division))
        .route("/staff", get(fleet::list_staff).post(fleet::create_staff))
        .route("/staff/:id", get(fleet::get_staff).put(fleet::update_staff).delete(fleet::delete_staff))
        .route("/mobile/tickets", post(mobile::submit_ticket))
        .route("/mobile/chat/:session/messages", post(mobile::chat_message))
        .route("/mobile/ai/voice-agent", post(mobile::voice_agent))
        .route("/mobile/incidents/:client_id", get(mobile::ticket_status))
        .route("/mobile/dispatch/retry-pending", post(mobile::retry_pending))
        .layer(middleware::from_fn_with_state(state.clone(), health_guard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .nest("/api/v1", public.merge(guarded))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
