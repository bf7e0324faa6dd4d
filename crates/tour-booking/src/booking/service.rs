use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{
    BookingDraft, BookingRequest, BookingStatus, Currency, NewBookingRequest, Product, ProductId,
    RequestId, RequestLog, ShopId,
};
use super::stats::{DashboardReport, DashboardStats};
use super::store::{
    BookingStore, ProductQuery, RequestQuery, StatusChange, StatusChangeOutcome, StoreError,
};
use super::transitions;
use crate::config::BookingConfig;

/// Owns the booking request lifecycle: creation, validated status transitions
/// with their audit trail, and dashboard aggregates.
pub struct BookingLifecycleService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl<S> BookingLifecycleService<S>
where
    S: BookingStore + 'static,
{
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>, config: BookingConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Price and persist a new booking request in status `new`.
    pub fn create(&self, input: NewBookingRequest) -> Result<BookingRequest, BookingError> {
        validate_new_request(&input)?;

        let product = self.product(&input.product_id)?;
        let child_count = input.child_count.unwrap_or(0);
        let total_amount = product
            .quote(input.adult_count, child_count)
            .ok_or_else(|| {
                BookingError::InvalidArgument(format!(
                    "total for {} adults and {} children overflows",
                    input.adult_count, child_count
                ))
            })?;

        let now = self.clock.now();
        let draft = BookingDraft {
            product_id: product.id,
            shop_id: product.shop_id,
            requester_name: input.requester_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email,
            chat_identity: input.chat_identity,
            requested_date: input.requested_date,
            adult_count: input.adult_count,
            child_count,
            special_request: input.special_request,
            pickup_location: input.pickup_location,
            total_amount,
            currency: Currency::Krw,
            status: BookingStatus::New,
            created_at: now,
            updated_at: now,
        };

        let request = self
            .store
            .insert_request(draft)
            .map_err(upstream("insert_request"))?;

        info!(
            request_id = %request.id,
            product_id = %request.product_id,
            total_amount = request.total_amount,
            "booking request created"
        );
        Ok(request)
    }

    /// Move a request to `target`, appending one audit entry.
    pub fn transition(
        &self,
        request_id: &RequestId,
        target: BookingStatus,
        note: Option<String>,
    ) -> Result<BookingRequest, BookingError> {
        let current = self.get(request_id)?.status;

        if !transitions::is_allowed(current, target) {
            debug!(%request_id, from = %current, to = %target, "transition refused");
            return Err(BookingError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let change = StatusChange {
            request_id: request_id.clone(),
            expected: current,
            next: target,
            note,
            at: self.clock.now(),
        };

        match self
            .store
            .apply_status_change(change)
            .map_err(upstream("apply_status_change"))?
        {
            StatusChangeOutcome::Applied { request, log } => {
                info!(
                    %request_id,
                    from = %log.previous_status,
                    to = %log.new_status,
                    log_id = %log.id,
                    "booking status changed"
                );
                Ok(request)
            }
            StatusChangeOutcome::Missing => {
                Err(BookingError::not_found("booking request", request_id))
            }
            StatusChangeOutcome::Stale { current: actual } => {
                warn!(
                    %request_id,
                    expected = %current,
                    %actual,
                    "concurrent status change detected"
                );
                Err(BookingError::ConcurrentModification {
                    request_id: request_id.clone(),
                    expected: current,
                    actual,
                })
            }
        }
    }

    /// Cancel a request, recording `reason` as the audit note.
    pub fn cancel(
        &self,
        request_id: &RequestId,
        reason: Option<String>,
    ) -> Result<BookingRequest, BookingError> {
        self.transition(request_id, BookingStatus::Cancelled, reason)
    }

    /// Aggregate requests created within the last `days` (configured default when
    /// `None`), optionally scoped to one shop.
    pub fn dashboard(
        &self,
        shop_id: Option<&ShopId>,
        days: Option<u32>,
    ) -> Result<DashboardReport, BookingError> {
        let window_days = days.unwrap_or(self.config.dashboard_window_days);
        let window_start = Duration::try_days(i64::from(window_days))
            .and_then(|window| self.clock.now().checked_sub_signed(window))
            .ok_or_else(|| {
                BookingError::InvalidArgument(format!(
                    "dashboard window of {window_days} days reaches past the supported date range"
                ))
            })?;

        let query = RequestQuery::default()
            .shop(shop_id.cloned())
            .created_since(window_start);
        let requests = self.store.requests(&query).map_err(upstream("requests"))?;

        Ok(DashboardReport {
            shop_id: shop_id.cloned(),
            window_days,
            window_start,
            stats: DashboardStats::from_requests(&requests),
        })
    }

    pub fn get(&self, request_id: &RequestId) -> Result<BookingRequest, BookingError> {
        self.store
            .requests(&RequestQuery::by_id(request_id))
            .map_err(upstream("requests"))?
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::not_found("booking request", request_id))
    }

    pub fn by_phone(&self, phone: &str) -> Result<Vec<BookingRequest>, BookingError> {
        self.store
            .requests(&RequestQuery::by_phone(phone.trim()))
            .map_err(upstream("requests"))
    }

    /// Filtered listing for admin views; unbounded queries get the configured cap.
    pub fn list(&self, mut query: RequestQuery) -> Result<Vec<BookingRequest>, BookingError> {
        if query.limit.is_none() {
            query.limit = Some(self.config.list_limit);
        }
        self.store.requests(&query).map_err(upstream("requests"))
    }

    pub fn logs(&self, request_id: &RequestId) -> Result<Vec<RequestLog>, BookingError> {
        self.store.logs(request_id).map_err(upstream("logs"))
    }

    /// Statuses the request may move to next.
    pub fn available_transitions(
        &self,
        request_id: &RequestId,
    ) -> Result<&'static [BookingStatus], BookingError> {
        let request = self.get(request_id)?;
        Ok(transitions::allowed_targets(request.status))
    }

    pub fn product(&self, product_id: &ProductId) -> Result<Product, BookingError> {
        self.store
            .product(product_id)
            .map_err(upstream("product"))?
            .ok_or_else(|| BookingError::not_found("product", product_id))
    }

    pub fn catalog(&self, shop_id: Option<ShopId>) -> Result<Vec<Product>, BookingError> {
        let query = ProductQuery {
            shop_id,
            active_only: true,
        };
        self.store.products(&query).map_err(upstream("products"))
    }
}

fn validate_new_request(input: &NewBookingRequest) -> Result<(), BookingError> {
    if input.adult_count == 0 {
        return Err(BookingError::InvalidArgument(
            "adult_count must be at least 1".to_string(),
        ));
    }
    if input.requester_name.trim().is_empty() {
        return Err(BookingError::InvalidArgument(
            "requester_name is required".to_string(),
        ));
    }
    if input.phone.trim().is_empty() {
        return Err(BookingError::InvalidArgument("phone is required".to_string()));
    }
    Ok(())
}

fn upstream(operation: &'static str) -> impl FnOnce(StoreError) -> BookingError {
    move |err| {
        error!(operation, error = %err, "data store call failed");
        BookingError::Upstream(err)
    }
}

/// Error raised by the booking lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("cannot move booking request from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("booking request {request_id} changed concurrently (expected {expected}, found {actual})")]
    ConcurrentModification {
        request_id: RequestId,
        expected: BookingStatus,
        actual: BookingStatus,
    },
    #[error("invalid booking input: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl BookingError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
