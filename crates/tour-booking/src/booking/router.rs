use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{BookingStatus, NewBookingRequest, RequestId, ShopId};
use super::service::{BookingError, BookingLifecycleService};
use super::store::{BookingStore, RequestQuery};

type SharedService<S> = State<Arc<BookingLifecycleService<S>>>;

/// Router builder exposing the booking lifecycle over JSON.
pub fn booking_router<S>(service: Arc<BookingLifecycleService<S>>) -> Router
where
    S: BookingStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/bookings",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/bookings/:request_id", get(get_handler::<S>))
        .route("/api/v1/bookings/:request_id/logs", get(logs_handler::<S>))
        .route(
            "/api/v1/bookings/:request_id/transitions",
            get(transitions_handler::<S>),
        )
        .route(
            "/api/v1/bookings/:request_id/status",
            post(transition_handler::<S>),
        )
        .route("/api/v1/bookings/:request_id/cancel", post(cancel_handler::<S>))
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/products", get(catalog_handler::<S>))
        .with_state(service)
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookingError::InvalidTransition { .. }
            | BookingError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            BookingError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let payload = match &self {
            BookingError::InvalidTransition { from, to } => json!({
                "error": self.to_string(),
                "current_status": from,
                "attempted_status": to,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status_code(), Json(payload)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    pub(crate) phone: Option<String>,
    pub(crate) shop_id: Option<String>,
    pub(crate) status: Option<BookingStatus>,
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionBody {
    pub(crate) status: BookingStatus,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CancelBody {
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardParams {
    pub(crate) shop_id: Option<String>,
    pub(crate) days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogParams {
    pub(crate) shop_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransitionsView {
    pub(crate) request_id: RequestId,
    pub(crate) status: BookingStatus,
    pub(crate) allowed: &'static [BookingStatus],
    pub(crate) terminal: bool,
}

pub(crate) async fn create_handler<S>(
    State(service): SharedService<S>,
    Json(input): Json<NewBookingRequest>,
) -> Response
where
    S: BookingStore + 'static,
{
    match service.create(input) {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): SharedService<S>,
    Query(params): Query<ListParams>,
) -> Response
where
    S: BookingStore + 'static,
{
    let ListParams {
        phone,
        shop_id,
        status,
        limit,
    } = params;

    let result = match (phone, shop_id, status, limit) {
        (Some(phone), None, None, None) => service.by_phone(&phone),
        (phone, shop_id, status, limit) => service.list(RequestQuery {
            phone,
            shop_id: shop_id.map(ShopId),
            statuses: status.into_iter().collect(),
            limit,
            ..RequestQuery::default()
        }),
    };

    match result {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): SharedService<S>,
    Path(request_id): Path<String>,
) -> Response
where
    S: BookingStore + 'static,
{
    match service.get(&RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn logs_handler<S>(
    State(service): SharedService<S>,
    Path(request_id): Path<String>,
) -> Response
where
    S: BookingStore + 'static,
{
    match service.logs(&RequestId(request_id)) {
        Ok(logs) => (StatusCode::OK, Json(logs)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn transitions_handler<S>(
    State(service): SharedService<S>,
    Path(request_id): Path<String>,
) -> Response
where
    S: BookingStore + 'static,
{
    let request_id = RequestId(request_id);
    let view = service.get(&request_id).map(|request| TransitionsView {
        allowed: super::transitions::allowed_targets(request.status),
        terminal: super::transitions::is_terminal(request.status),
        status: request.status,
        request_id: request.id,
    });

    match view {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn transition_handler<S>(
    State(service): SharedService<S>,
    Path(request_id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Response
where
    S: BookingStore + 'static,
{
    match service.transition(&RequestId(request_id), body.status, body.note) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn cancel_handler<S>(
    State(service): SharedService<S>,
    Path(request_id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> Response
where
    S: BookingStore + 'static,
{
    let reason = body.and_then(|Json(body)| body.reason);
    match service.cancel(&RequestId(request_id), reason) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(service): SharedService<S>,
    Query(params): Query<DashboardParams>,
) -> Response
where
    S: BookingStore + 'static,
{
    let shop_id = params.shop_id.map(ShopId);
    match service.dashboard(shop_id.as_ref(), params.days) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn catalog_handler<S>(
    State(service): SharedService<S>,
    Query(params): Query<CatalogParams>,
) -> Response
where
    S: BookingStore + 'static,
{
    match service.catalog(params.shop_id.map(ShopId)) {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(error) => error.into_response(),
    }
}
