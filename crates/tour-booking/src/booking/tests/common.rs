use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::booking::clock::ManualClock;
use crate::booking::domain::{
    BookingDraft, BookingRequest, BookingStatus, NewBookingRequest, Product, ProductId, RequestId,
    RequestLog, ShopId,
};
use crate::booking::memory::InMemoryBookingStore;
use crate::booking::service::BookingLifecycleService;
use crate::booking::store::{
    BookingStore, ProductQuery, RequestQuery, StatusChange, StatusChangeOutcome, StoreError,
};
use crate::config::BookingConfig;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap()
}

pub(super) fn jeju_product() -> Product {
    Product {
        id: ProductId::from("jeju-olle-7"),
        shop_id: Some(ShopId::from("shop-jeju")),
        title: "Jeju Olle trail 7 guided walk".to_string(),
        price_adult: 10_000,
        price_child: Some(5_000),
        active: true,
    }
}

pub(super) fn seoul_product() -> Product {
    Product {
        id: ProductId::from("seoul-hanok"),
        shop_id: Some(ShopId::from("shop-seoul")),
        title: "Bukchon hanok village tour".to_string(),
        price_adult: 20_000,
        price_child: None,
        active: true,
    }
}

pub(super) fn retired_product() -> Product {
    Product {
        id: ProductId::from("dmz-classic"),
        shop_id: Some(ShopId::from("shop-seoul")),
        title: "DMZ classic day trip".to_string(),
        price_adult: 80_000,
        price_child: None,
        active: false,
    }
}

pub(super) fn new_request(
    product: &Product,
    adults: u32,
    children: Option<u32>,
) -> NewBookingRequest {
    NewBookingRequest {
        product_id: product.id.clone(),
        requester_name: "Park Seoyeon".to_string(),
        phone: "010-2345-6789".to_string(),
        requested_date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        adult_count: adults,
        child_count: children,
        email: Some("seoyeon@example.com".to_string()),
        chat_identity: None,
        special_request: Some("Vegetarian lunch".to_string()),
        pickup_location: Some("Jeju airport gate 3".to_string()),
    }
}

pub(super) type TestService = BookingLifecycleService<InMemoryBookingStore>;

pub(super) fn build_service() -> (TestService, Arc<InMemoryBookingStore>, Arc<ManualClock>) {
    let store = Arc::new(InMemoryBookingStore::with_products([
        jeju_product(),
        seoul_product(),
        retired_product(),
    ]));
    let clock = Arc::new(ManualClock::new(start()));
    let service =
        BookingLifecycleService::with_clock(store.clone(), clock.clone(), BookingConfig::default());
    (service, store, clock)
}

/// Shortest route from `new` to `status` through the transition table.
pub(super) fn path_to(status: BookingStatus) -> &'static [BookingStatus] {
    use crate::booking::domain::BookingStatus::*;
    match status {
        New => &[],
        Inquiring => &[Inquiring],
        PendingPayment => &[Inquiring, PendingPayment],
        Paid => &[Inquiring, PendingPayment, Paid],
        Confirmed => &[Inquiring, PendingPayment, Paid, Confirmed],
        Rejected => &[Rejected],
        Cancelled => &[Inquiring, PendingPayment, Cancelled],
    }
}

/// Create a request and walk it to `status`, advancing the clock between steps.
pub(super) fn request_in(
    service: &TestService,
    clock: &ManualClock,
    status: BookingStatus,
) -> BookingRequest {
    let mut request = service
        .create(new_request(&jeju_product(), 2, Some(1)))
        .expect("request created");
    for next in path_to(status) {
        clock.advance(chrono::Duration::minutes(5));
        request = service
            .transition(&request.id, *next, None)
            .expect("path follows transition table");
    }
    assert_eq!(request.status, status);
    request
}

pub(super) fn stored(store: &InMemoryBookingStore, id: &RequestId) -> BookingRequest {
    store
        .requests(&RequestQuery::by_id(id))
        .expect("store readable")
        .into_iter()
        .next()
        .expect("request stored")
}

pub(super) fn stored_logs(store: &InMemoryBookingStore, id: &RequestId) -> Vec<RequestLog> {
    store.logs(id).expect("store readable")
}

pub(super) struct UnavailableStore;

impl BookingStore for UnavailableStore {
    fn product(&self, _id: &ProductId) -> Result<Option<Product>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn products(&self, _query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn upsert_product(&self, _product: Product) -> Result<Product, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn insert_request(&self, _draft: BookingDraft) -> Result<BookingRequest, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn requests(&self, _query: &RequestQuery) -> Result<Vec<BookingRequest>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn apply_status_change(
        &self,
        _change: StatusChange,
    ) -> Result<StatusChangeOutcome, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn logs(&self, _request_id: &RequestId) -> Result<Vec<RequestLog>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }
}

/// Delegates to a memory store but lets another writer win every status change.
#[derive(Default)]
pub(super) struct RacingStore {
    pub(super) inner: InMemoryBookingStore,
}

impl BookingStore for RacingStore {
    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.inner.product(id)
    }

    fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        self.inner.products(query)
    }

    fn upsert_product(&self, product: Product) -> Result<Product, StoreError> {
        self.inner.upsert_product(product)
    }

    fn insert_request(&self, draft: BookingDraft) -> Result<BookingRequest, StoreError> {
        self.inner.insert_request(draft)
    }

    fn requests(&self, query: &RequestQuery) -> Result<Vec<BookingRequest>, StoreError> {
        self.inner.requests(query)
    }

    fn apply_status_change(&self, change: StatusChange) -> Result<StatusChangeOutcome, StoreError> {
        let competing = StatusChange {
            next: BookingStatus::Rejected,
            note: Some("rejected by another operator".to_string()),
            ..change.clone()
        };
        self.inner.apply_status_change(competing)?;
        self.inner.apply_status_change(change)
    }

    fn logs(&self, request_id: &RequestId) -> Result<Vec<RequestLog>, StoreError> {
        self.inner.logs(request_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
