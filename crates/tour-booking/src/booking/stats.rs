use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{BookingRequest, BookingStatus, ShopId};

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_requests: u64,
    pub new_requests: u64,
    pub confirmed_requests: u64,
    pub cancelled_requests: u64,
    /// Sum over `paid` and `confirmed` requests.
    pub total_revenue: u64,
    /// `total_revenue / confirmed_requests`, or 0 without confirmed requests.
    pub average_booking_value: u64,
}

impl DashboardStats {
    pub fn from_requests<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a BookingRequest>,
    {
        let mut stats = requests
            .into_iter()
            .fold(Self::default(), |mut stats, request| {
                stats.total_requests += 1;
                match request.status {
                    BookingStatus::New => stats.new_requests += 1,
                    BookingStatus::Confirmed => stats.confirmed_requests += 1,
                    BookingStatus::Cancelled => stats.cancelled_requests += 1,
                    _ => {}
                }
                if request.status.is_revenue() {
                    stats.total_revenue = stats.total_revenue.saturating_add(request.total_amount);
                }
                stats
            });

        stats.average_booking_value = stats
            .total_revenue
            .checked_div(stats.confirmed_requests)
            .unwrap_or(0);
        stats
    }
}

/// Dashboard statistics together with the window they were computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<ShopId>,
    pub window_days: u32,
    pub window_start: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::domain::{Currency, ProductId, RequestId};
    use chrono::{NaiveDate, TimeZone};

    fn request(seq: u32, status: BookingStatus, total_amount: u64) -> BookingRequest {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        BookingRequest {
            id: RequestId(format!("req-{seq}")),
            product_id: ProductId::from("seoul-palace"),
            shop_id: None,
            requester_name: "Lee Jiho".to_string(),
            phone: format!("010-0000-{seq:04}"),
            email: None,
            chat_identity: None,
            requested_date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            adult_count: 1,
            child_count: 0,
            special_request: None,
            pickup_location: None,
            total_amount,
            currency: Currency::Krw,
            status,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn empty_window_yields_zeroes() {
        let stats = DashboardStats::from_requests(&[]);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.average_booking_value, 0);
    }

    #[test]
    fn aggregates_mixed_statuses() {
        let requests = vec![
            request(1, BookingStatus::Confirmed, 10_000),
            request(2, BookingStatus::Confirmed, 20_000),
            request(3, BookingStatus::Confirmed, 30_000),
            request(4, BookingStatus::Cancelled, 15_000),
            request(5, BookingStatus::Cancelled, 15_000),
            request(6, BookingStatus::New, 40_000),
        ];

        let stats = DashboardStats::from_requests(&requests);

        assert_eq!(stats.total_requests, 6);
        assert_eq!(stats.new_requests, 1);
        assert_eq!(stats.confirmed_requests, 3);
        assert_eq!(stats.cancelled_requests, 2);
        assert_eq!(stats.total_revenue, 60_000);
        assert_eq!(stats.average_booking_value, 20_000);
    }

    #[test]
    fn paid_requests_count_towards_revenue_only() {
        let requests = vec![
            request(1, BookingStatus::Paid, 50_000),
            request(2, BookingStatus::PendingPayment, 70_000),
        ];

        let stats = DashboardStats::from_requests(&requests);

        assert_eq!(stats.total_revenue, 50_000);
        assert_eq!(stats.confirmed_requests, 0);
        assert_eq!(stats.average_booking_value, 0);
    }

    #[test]
    fn report_flattens_stats_when_serialized() {
        let report = DashboardReport {
            shop_id: None,
            window_days: 30,
            window_start: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            stats: DashboardStats::from_requests(&[request(1, BookingStatus::Confirmed, 9_000)]),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_revenue"], 9_000);
        assert_eq!(json["window_days"], 30);
        assert!(json.get("shop_id").is_none());
    }
}
