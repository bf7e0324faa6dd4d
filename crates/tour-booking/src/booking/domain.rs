use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for catalog products.
    ProductId
);
identifier!(
    /// Identifier for the shop operating a product.
    ShopId
);
identifier!(
    /// Identifier assigned by the store when a booking request is inserted.
    RequestId
);
identifier!(
    /// Identifier assigned by the store when an audit entry is appended.
    LogId
);

/// Lifecycle status of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    New,
    Inquiring,
    PendingPayment,
    Paid,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::New,
            Self::Inquiring,
            Self::PendingPayment,
            Self::Paid,
            Self::Confirmed,
            Self::Rejected,
            Self::Cancelled,
        ]
    }

    /// Wire name, identical to the serde representation.
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Inquiring => "inquiring",
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses whose amounts count towards dashboard revenue.
    pub const fn is_revenue(self) -> bool {
        matches!(self, Self::Paid | Self::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Settlement currency. Amounts are whole units; KRW has no subunit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "KRW")]
    Krw,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Krw => "KRW",
        }
    }
}

/// Priced catalog entry. Read-only from the booking lifecycle's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    pub title: String,
    pub price_adult: u64,
    #[serde(default)]
    pub price_child: Option<u64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Total for a headcount; children fall back to the adult price when no
    /// child price is set. `None` on overflow.
    pub fn quote(&self, adult_count: u32, child_count: u32) -> Option<u64> {
        let child_price = self.price_child.unwrap_or(self.price_adult);
        let adults = self.price_adult.checked_mul(u64::from(adult_count))?;
        let children = child_price.checked_mul(u64::from(child_count))?;
        adults.checked_add(children)
    }
}

/// Caller supplied input for a new booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookingRequest {
    pub product_id: ProductId,
    pub requester_name: String,
    pub phone: String,
    pub requested_date: NaiveDate,
    pub adult_count: u32,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub chat_identity: Option<String>,
    #[serde(default)]
    pub special_request: Option<String>,
    #[serde(default)]
    pub pickup_location: Option<String>,
}

/// A booking request row before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub product_id: ProductId,
    pub shop_id: Option<ShopId>,
    pub requester_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub chat_identity: Option<String>,
    pub requested_date: NaiveDate,
    pub adult_count: u32,
    pub child_count: u32,
    pub special_request: Option<String>,
    pub pickup_location: Option<String>,
    pub total_amount: u64,
    pub currency: Currency,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingDraft {
    pub fn into_request(self, id: RequestId) -> BookingRequest {
        BookingRequest {
            id,
            product_id: self.product_id,
            shop_id: self.shop_id,
            requester_name: self.requester_name,
            phone: self.phone,
            email: self.email,
            chat_identity: self.chat_identity,
            requested_date: self.requested_date,
            adult_count: self.adult_count,
            child_count: self.child_count,
            special_request: self.special_request,
            pickup_location: self.pickup_location,
            total_amount: self.total_amount,
            currency: self.currency,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A persisted booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: RequestId,
    pub product_id: ProductId,
    pub shop_id: Option<ShopId>,
    pub requester_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub chat_identity: Option<String>,
    pub requested_date: NaiveDate,
    pub adult_count: u32,
    pub child_count: u32,
    pub special_request: Option<String>,
    pub pickup_location: Option<String>,
    pub total_amount: u64,
    pub currency: Currency,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    StatusChange,
}

/// Append-only audit entry written alongside every committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLog {
    pub id: LogId,
    pub request_id: RequestId,
    pub action: LogAction,
    pub previous_status: BookingStatus,
    pub new_status: BookingStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
