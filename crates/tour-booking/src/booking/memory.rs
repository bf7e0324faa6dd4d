use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    BookingDraft, BookingRequest, LogAction, LogId, Product, ProductId, RequestId, RequestLog,
};
use super::store::{
    BookingStore, ProductQuery, RequestQuery, StatusChange, StatusChangeOutcome, StoreError,
};

/// Process-local store. One lock guards all three tables so a status change and
/// its audit entry commit together.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    requests: Vec<BookingRequest>,
    logs: Vec<RequestLog>,
    request_sequence: u64,
    log_sequence: u64,
}

impl InMemoryBookingStore {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        Self {
            tables: Mutex::new(Tables {
                products,
                ..Tables::default()
            }),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

fn newest_first<T, F>(rows: Vec<&T>, created_at: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    // rows arrive in reverse insertion order; the stable sort keeps that as the tie-break
    let mut rows: Vec<T> = rows.into_iter().cloned().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

impl BookingStore for InMemoryBookingStore {
    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.tables()?.products.get(id).cloned())
    }

    fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables()?;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    fn upsert_product(&self, product: Product) -> Result<Product, StoreError> {
        let mut tables = self.tables()?;
        tables.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    fn insert_request(&self, draft: BookingDraft) -> Result<BookingRequest, StoreError> {
        let mut tables = self.tables()?;
        if !tables.products.contains_key(&draft.product_id) {
            return Err(StoreError::Rejected(format!(
                "requests.product_id references missing product {}",
                draft.product_id
            )));
        }
        tables.request_sequence += 1;
        let id = RequestId(format!("req-{:06}", tables.request_sequence));
        let request = draft.into_request(id);
        tables.requests.push(request.clone());
        Ok(request)
    }

    fn requests(&self, query: &RequestQuery) -> Result<Vec<BookingRequest>, StoreError> {
        let tables = self.tables()?;
        let matching = tables
            .requests
            .iter()
            .rev()
            .filter(|request| query.matches(request))
            .collect();
        let mut requests = newest_first(matching, |request: &BookingRequest| request.created_at);
        if let Some(limit) = query.limit {
            requests.truncate(limit);
        }
        Ok(requests)
    }

    fn apply_status_change(&self, change: StatusChange) -> Result<StatusChangeOutcome, StoreError> {
        let mut tables = self.tables()?;
        let Some(index) = tables
            .requests
            .iter()
            .position(|request| request.id == change.request_id)
        else {
            return Ok(StatusChangeOutcome::Missing);
        };

        let current = tables.requests[index].status;
        if current != change.expected {
            return Ok(StatusChangeOutcome::Stale { current });
        }

        tables.log_sequence += 1;
        let log = RequestLog {
            id: LogId(format!("log-{:06}", tables.log_sequence)),
            request_id: change.request_id,
            action: LogAction::StatusChange,
            previous_status: current,
            new_status: change.next,
            note: change.note,
            created_at: change.at,
        };

        let request = &mut tables.requests[index];
        request.status = change.next;
        request.updated_at = change.at;
        let request = request.clone();

        tables.logs.push(log.clone());
        Ok(StatusChangeOutcome::Applied { request, log })
    }

    fn logs(&self, request_id: &RequestId) -> Result<Vec<RequestLog>, StoreError> {
        let tables = self.tables()?;
        let matching = tables
            .logs
            .iter()
            .rev()
            .filter(|log| &log.request_id == request_id)
            .collect();
        Ok(newest_first(matching, |log: &RequestLog| log.created_at))
    }
}
