use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum;

string_enum! {
    /// Lifecycle of a villa listing.
    VillaStatus, "villa status" {
        Active => "active",
        Inactive => "inactive",
        Maintenance => "maintenance",
    }
}

string_enum! {
    BookingStatus, "booking status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
        Completed => "completed",
    }
}

string_enum! {
    PaymentStatus, "payment status" {
        Pending => "pending",
        Paid => "paid",
        Refunded => "refunded",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villa {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub price_per_night: u64,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub owner_id: String,
    pub status: VillaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Villa {
    pub fn is_active(&self) -> bool {
        self.status == VillaStatus::Active
    }

    /// "Seminyak Beach, Seminyak, Indonesia"
    pub fn full_location(&self) -> String {
        [&self.location, &self.city, &self.country]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub villa_id: String,
    pub user_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_amount: u64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether `date` falls within the stay, both ends inclusive.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date <= self.check_out
    }
}

/// Per-date availability override for a villa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillaAvailability {
    pub id: String,
    pub villa_id: String,
    pub date: NaiveDate,
    pub available: bool,
    pub price_override: Option<u64>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Homepage search parameters. Every field is optional; an empty filter
/// matches every active villa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Payload handed to the booking-submit callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub villa_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub special_requests: Option<String>,
}
