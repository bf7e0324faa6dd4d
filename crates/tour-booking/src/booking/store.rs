use chrono::{DateTime, Utc};

use super::domain::{
    BookingDraft, BookingRequest, BookingStatus, Product, ProductId, RequestId, RequestLog, ShopId,
};

/// Persistence collaborator behind the booking lifecycle.
///
/// Mirrors the table-scoped operations of the hosted data service over `products`,
/// `requests` and `request_logs`. Multi-row reads come back newest-created first.
pub trait BookingStore: Send + Sync {
    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;
    fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;
    fn upsert_product(&self, product: Product) -> Result<Product, StoreError>;

    /// Insert one request row; the store assigns the id.
    fn insert_request(&self, draft: BookingDraft) -> Result<BookingRequest, StoreError>;
    fn requests(&self, query: &RequestQuery) -> Result<Vec<BookingRequest>, StoreError>;

    /// Apply a status change and append its audit entry as one unit.
    ///
    /// The change only applies while the stored status still equals
    /// `change.expected`; otherwise nothing is written and the current status is
    /// reported back.
    fn apply_status_change(&self, change: StatusChange) -> Result<StatusChangeOutcome, StoreError>;

    fn logs(&self, request_id: &RequestId) -> Result<Vec<RequestLog>, StoreError>;
}

/// Error enumeration for data store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),
    #[error("data store rejected the operation: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub shop_id: Option<ShopId>,
    pub active_only: bool,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.active {
            return false;
        }
        match &self.shop_id {
            Some(shop_id) => product.shop_id.as_ref() == Some(shop_id),
            None => true,
        }
    }
}

/// Filter over the `requests` table. Empty `statuses` matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub id: Option<RequestId>,
    pub phone: Option<String>,
    pub shop_id: Option<ShopId>,
    pub statuses: Vec<BookingStatus>,
    pub created_since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl RequestQuery {
    pub fn by_id(id: &RequestId) -> Self {
        Self {
            id: Some(id.clone()),
            limit: Some(1),
            ..Self::default()
        }
    }

    pub fn by_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    pub fn shop(mut self, shop_id: Option<ShopId>) -> Self {
        self.shop_id = shop_id;
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn created_since(mut self, since: DateTime<Utc>) -> Self {
        self.created_since = Some(since);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, request: &BookingRequest) -> bool {
        if let Some(id) = &self.id {
            if &request.id != id {
                return false;
            }
        }
        if let Some(phone) = &self.phone {
            if &request.phone != phone {
                return false;
            }
        }
        if let Some(shop_id) = &self.shop_id {
            if request.shop_id.as_ref() != Some(shop_id) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&request.status) {
            return false;
        }
        match self.created_since {
            Some(since) => request.created_at >= since,
            None => true,
        }
    }
}

/// Conditional status update submitted to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub request_id: RequestId,
    pub expected: BookingStatus,
    pub next: BookingStatus,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChangeOutcome {
    Applied {
        request: BookingRequest,
        log: RequestLog,
    },
    Missing,
    Stale {
        current: BookingStatus,
    },
}
