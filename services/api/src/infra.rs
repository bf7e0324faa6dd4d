use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tour_booking::booking::{InMemoryBookingStore, Product, ProductId, ShopId};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Products loaded into the in-memory store when the service starts.
pub(crate) fn sample_catalog() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::from("jeju-olle-7"),
            shop_id: Some(ShopId::from("shop-jeju")),
            title: "Jeju Olle trail 7 guided walk".to_string(),
            price_adult: 10_000,
            price_child: Some(5_000),
            active: true,
        },
        Product {
            id: ProductId::from("jeju-udo-bike"),
            shop_id: Some(ShopId::from("shop-jeju")),
            title: "Udo island e-bike loop".to_string(),
            price_adult: 35_000,
            price_child: Some(20_000),
            active: true,
        },
        Product {
            id: ProductId::from("seoul-hanok"),
            shop_id: Some(ShopId::from("shop-seoul")),
            title: "Bukchon hanok village tour".to_string(),
            price_adult: 20_000,
            price_child: None,
            active: true,
        },
    ]
}

pub(crate) fn seeded_store(with_catalog: bool) -> InMemoryBookingStore {
    if with_catalog {
        InMemoryBookingStore::with_products(sample_catalog())
    } else {
        InMemoryBookingStore::default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
