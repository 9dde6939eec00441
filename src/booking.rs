//! Guest booking form, price quote and the admin booking views.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::info;

use crate::config::BookingSettings;
use crate::dataset::Dataset;
use crate::models::{Booking, BookingRequest, BookingStatus, PaymentStatus, Villa, VillaStatus};

/// Occupancy shown on the admin overview. There is no availability data to
/// compute it from.
pub const OCCUPANCY_RATE_PCT: u32 = 75;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("check-out {check_out} is before check-in {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("at least one guest is required")]
    NoGuests,

    #[error("{guests} guests exceeds the villa maximum of {max}")]
    TooManyGuests { guests: u32, max: u32 },

    #[error("villa not found: {0}")]
    UnknownVilla(String),

    #[error("villa {0} is not taking bookings")]
    VillaUnavailable(String),

    #[error("booking not found: {0}")]
    UnknownBooking(String),
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
    })
}

pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s.trim())
}

/// The guest-facing booking form as filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingForm {
    pub villa_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u32,
    pub special_requests: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl BookingForm {
    /// Check required fields and date order, producing the request handed to
    /// the submit callback.
    pub fn validate(&self) -> Result<BookingRequest, BookingError> {
        let guest_name = self.guest_name.trim();
        if guest_name.is_empty() {
            return Err(BookingError::MissingField("guest name"));
        }
        let guest_email = self.guest_email.trim();
        if guest_email.is_empty() {
            return Err(BookingError::MissingField("guest email"));
        }
        if !is_valid_email(guest_email) {
            return Err(BookingError::InvalidEmail(guest_email.to_string()));
        }
        let check_in = self.check_in.ok_or(BookingError::MissingField("check-in date"))?;
        let check_out = self
            .check_out
            .ok_or(BookingError::MissingField("check-out date"))?;
        if check_out < check_in {
            return Err(BookingError::CheckOutBeforeCheckIn {
                check_in,
                check_out,
            });
        }
        if self.guests == 0 {
            return Err(BookingError::NoGuests);
        }

        Ok(BookingRequest {
            villa_id: self.villa_id.clone(),
            guest_name: guest_name.to_string(),
            guest_email: guest_email.to_string(),
            guest_phone: non_empty(&self.guest_phone),
            check_in,
            check_out,
            guests: self.guests,
            special_requests: non_empty(&self.special_requests),
        })
    }
}

/// Whole nights between two dates; zero when check-out is not after check-in.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
    (check_out - check_in).num_days().max(0) as u32
}

/// Price breakdown shown next to the booking form. Fees and taxes are rounded
/// to whole currency units; the total is rounded on its own, so it can differ
/// by one from the sum of the parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub nightly_rate: u64,
    pub nights: u32,
    pub subtotal: u64,
    pub service_fee: u64,
    pub taxes: u64,
    pub total: u64,
}

impl PriceQuote {
    pub fn for_stay(nightly_rate: u64, nights: u32, settings: &BookingSettings) -> Self {
        let subtotal = nightly_rate * u64::from(nights);
        let base = subtotal as f64;
        Self {
            nightly_rate,
            nights,
            subtotal,
            service_fee: (base * settings.service_fee_rate).round() as u64,
            taxes: (base * settings.tax_rate).round() as u64,
            total: (base * (1.0 + settings.service_fee_rate + settings.tax_rate)).round() as u64,
        }
    }
}

/// Booking form bound to one villa.
pub struct BookingDesk<'a> {
    villa: &'a Villa,
    settings: &'a BookingSettings,
}

impl<'a> BookingDesk<'a> {
    pub fn new(villa: &'a Villa, settings: &'a BookingSettings) -> Self {
        Self { villa, settings }
    }

    pub fn villa(&self) -> &Villa {
        self.villa
    }

    /// A blank form for this villa with the default guest count.
    pub fn blank_form(&self) -> BookingForm {
        BookingForm {
            villa_id: self.villa.id.clone(),
            guests: self.settings.default_guests,
            ..BookingForm::default()
        }
    }

    pub fn quote(&self, check_in: NaiveDate, check_out: NaiveDate) -> PriceQuote {
        PriceQuote::for_stay(
            self.villa.price_per_night,
            nights(check_in, check_out),
            self.settings,
        )
    }

    /// Validate `form` and hand the request to `on_submit`. The callback runs
    /// exactly once for a valid form and never for an invalid one.
    pub fn submit<F>(
        &self,
        form: &BookingForm,
        mut on_submit: F,
    ) -> Result<BookingRequest, BookingError>
    where
        F: FnMut(&BookingRequest),
    {
        if self.villa.status != VillaStatus::Active {
            return Err(BookingError::VillaUnavailable(self.villa.id.clone()));
        }
        let mut request = form.validate()?;
        request.villa_id = self.villa.id.clone();
        if request.guests > self.villa.max_guests {
            return Err(BookingError::TooManyGuests {
                guests: request.guests,
                max: self.villa.max_guests,
            });
        }
        on_submit(&request);
        Ok(request)
    }
}

impl Dataset {
    /// Store a submitted request as a pending, unpaid booking. The amount is
    /// the nightly subtotal at the villa's current price.
    pub fn record_booking(
        &mut self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<String, BookingError> {
        let villa = self
            .villa(&request.villa_id)
            .ok_or_else(|| BookingError::UnknownVilla(request.villa_id.clone()))?;
        let stay = nights(request.check_in, request.check_out);
        let total_amount = villa.price_per_night * u64::from(stay);

        let booking = Booking {
            id: format!("booking_{}", uuid::Uuid::new_v4().simple()),
            villa_id: request.villa_id.clone(),
            user_id: format!("guest_{}", uuid::Uuid::new_v4().simple()),
            guest_name: request.guest_name.clone(),
            guest_email: request.guest_email.clone(),
            guest_phone: request.guest_phone.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            total_amount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            special_requests: request.special_requests.clone(),
            created_at: now,
            updated_at: now,
        };
        info!(
            "Recorded booking {} for {} at {} ({} to {})",
            booking.id, booking.guest_name, booking.villa_id, booking.check_in, booking.check_out
        );
        let id = booking.id.clone();
        self.bookings.push(booking);
        Ok(id)
    }

    /// Set a booking's status. Any transition is allowed.
    pub fn set_booking_status(
        &mut self,
        id: &str,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let booking = self
            .booking_mut(id)
            .ok_or_else(|| BookingError::UnknownBooking(id.to_string()))?;
        booking.status = status;
        booking.updated_at = now;
        Ok(())
    }

    pub fn set_payment_status(
        &mut self,
        id: &str,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let booking = self
            .booking_mut(id)
            .ok_or_else(|| BookingError::UnknownBooking(id.to_string()))?;
        booking.payment_status = status;
        booking.updated_at = now;
        Ok(())
    }
}

/// Bookings whose stay includes `date` (calendar tab).
pub fn bookings_on(bookings: &[Booking], date: NaiveDate) -> Vec<&Booking> {
    bookings.iter().filter(|b| b.covers(date)).collect()
}

/// Bookings overlapping the inclusive range `from..=to`.
pub fn bookings_between(bookings: &[Booking], from: NaiveDate, to: NaiveDate) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|b| b.check_in <= to && b.check_out >= from)
        .collect()
}

/// Admin overview cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_villas: usize,
    pub active_villas: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    /// Sum of paid bookings.
    pub total_revenue: u64,
    pub occupancy_rate: u32,
}

impl DashboardSummary {
    pub fn from_dataset(ds: &Dataset) -> Self {
        Self {
            total_villas: ds.villas.len(),
            active_villas: ds.villas.iter().filter(|v| v.is_active()).count(),
            total_bookings: ds.bookings.len(),
            pending_bookings: ds
                .bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending)
                .count(),
            total_revenue: ds
                .bookings
                .iter()
                .filter(|b| b.payment_status == PaymentStatus::Paid)
                .map(|b| b.total_amount)
                .sum(),
            occupancy_rate: OCCUPANCY_RATE_PCT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn filled_form() -> BookingForm {
        BookingForm {
            villa_id: "villa_1".to_string(),
            guest_name: "Ana Silva".to_string(),
            guest_email: "ana@example.com".to_string(),
            guest_phone: Some("  ".to_string()),
            check_in: Some(d(2024, 8, 1)),
            check_out: Some(d(2024, 8, 5)),
            guests: 2,
            special_requests: Some("Late arrival".to_string()),
        }
    }

    #[test]
    fn valid_form_produces_request() {
        let req = filled_form().validate().unwrap();
        assert_eq!(req.guest_name, "Ana Silva");
        assert_eq!(req.guest_phone, None);
        assert_eq!(req.special_requests.as_deref(), Some("Late arrival"));
    }

    #[test]
    fn missing_and_malformed_fields_are_rejected() {
        let mut f = filled_form();
        f.guest_name = " ".to_string();
        assert_eq!(f.validate().unwrap_err(), BookingError::MissingField("guest name"));

        let mut f = filled_form();
        f.guest_email = "ana.example.com".to_string();
        assert!(matches!(f.validate().unwrap_err(), BookingError::InvalidEmail(_)));

        let mut f = filled_form();
        f.check_out = None;
        assert_eq!(f.validate().unwrap_err(), BookingError::MissingField("check-out date"));

        let mut f = filled_form();
        f.guests = 0;
        assert_eq!(f.validate().unwrap_err(), BookingError::NoGuests);
    }

    #[test]
    fn check_out_before_check_in_is_rejected_but_same_day_is_not() {
        let mut f = filled_form();
        f.check_out = Some(d(2024, 7, 31));
        assert!(matches!(
            f.validate().unwrap_err(),
            BookingError::CheckOutBeforeCheckIn { .. }
        ));

        f.check_out = f.check_in;
        assert!(f.validate().is_ok());
    }

    #[test]
    fn nights_never_negative() {
        assert_eq!(nights(d(2024, 6, 15), d(2024, 6, 22)), 7);
        assert_eq!(nights(d(2024, 6, 22), d(2024, 6, 15)), 0);
    }

    #[test]
    fn quote_applies_fee_and_tax() {
        let q = PriceQuote::for_stay(850, 7, &BookingSettings::default());
        assert_eq!(q.subtotal, 5950);
        assert_eq!(q.service_fee, 595);
        assert_eq!(q.taxes, 476);
        assert_eq!(q.total, 7021);
    }

    #[test]
    fn submit_calls_back_once_for_valid_form_only() {
        let ds = Dataset::mock();
        let settings = BookingSettings::default();
        let desk = BookingDesk::new(ds.villa("villa_1").unwrap(), &settings);

        let mut calls = Vec::new();
        desk.submit(&filled_form(), |r| calls.push(r.clone())).unwrap();
        assert_eq!(calls.len(), 1);

        let mut bad = filled_form();
        bad.guest_email.clear();
        assert!(desk.submit(&bad, |r| calls.push(r.clone())).is_err());

        let mut crowd = filled_form();
        crowd.guests = 9;
        assert_eq!(
            desk.submit(&crowd, |r| calls.push(r.clone())).unwrap_err(),
            BookingError::TooManyGuests { guests: 9, max: 8 }
        );
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn inactive_villa_refuses_bookings() {
        let mut ds = Dataset::mock();
        ds.villas[0].status = VillaStatus::Inactive;
        let settings = BookingSettings::default();
        let desk = BookingDesk::new(&ds.villas[0], &settings);
        let err = desk.submit(&filled_form(), |_| {}).unwrap_err();
        assert_eq!(err, BookingError::VillaUnavailable("villa_1".to_string()));
    }

    #[test]
    fn blank_form_uses_default_guests() {
        let ds = Dataset::mock();
        let settings = BookingSettings::default();
        let desk = BookingDesk::new(ds.villa("villa_2").unwrap(), &settings);
        let f = desk.blank_form();
        assert_eq!(f.villa_id, "villa_2");
        assert_eq!(f.guests, 2);
        assert_eq!(desk.quote(d(2024, 7, 1), d(2024, 7, 8)).subtotal, 8400);
    }

    #[test]
    fn recorded_booking_is_pending_and_unpaid() {
        let mut ds = Dataset::mock();
        let req = filled_form().validate().unwrap();
        let id = ds.record_booking(&req, now()).unwrap();

        let b = ds.booking(&id).unwrap();
        assert_eq!(b.total_amount, 850 * 4);
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.payment_status, PaymentStatus::Pending);

        let mut orphan = req.clone();
        orphan.villa_id = "villa_9".to_string();
        assert_eq!(
            ds.record_booking(&orphan, now()).unwrap_err(),
            BookingError::UnknownVilla("villa_9".to_string())
        );
    }

    #[test]
    fn status_changes_are_not_guarded() {
        let mut ds = Dataset::mock();
        ds.set_booking_status("booking_2", BookingStatus::Cancelled, now()).unwrap();
        ds.set_booking_status("booking_2", BookingStatus::Confirmed, now()).unwrap();
        assert_eq!(ds.booking("booking_2").unwrap().status, BookingStatus::Confirmed);
        assert_eq!(ds.booking("booking_2").unwrap().updated_at, now());

        ds.set_payment_status("booking_2", PaymentStatus::Refunded, now()).unwrap();
        assert_eq!(ds.booking("booking_2").unwrap().payment_status, PaymentStatus::Refunded);
        assert!(ds.set_payment_status("booking_x", PaymentStatus::Paid, now()).is_err());
    }

    #[test]
    fn calendar_and_range_filters() {
        let ds = Dataset::mock();
        let on: Vec<_> = bookings_on(&ds.bookings, d(2024, 6, 22))
            .iter()
            .map(|b| b.id.clone())
            .collect();
        assert_eq!(on, vec!["booking_1"]);
        assert!(bookings_on(&ds.bookings, d(2024, 6, 23)).is_empty());

        let july = bookings_between(&ds.bookings, d(2024, 7, 1), d(2024, 7, 31));
        assert_eq!(july.len(), 1);
        assert_eq!(bookings_between(&ds.bookings, d(2024, 6, 1), d(2024, 12, 31)).len(), 2);
    }

    #[test]
    fn dashboard_revenue_counts_paid_only() {
        let s = DashboardSummary::from_dataset(&Dataset::mock());
        assert_eq!(s.total_villas, 2);
        assert_eq!(s.total_bookings, 2);
        assert_eq!(s.pending_bookings, 1);
        assert_eq!(s.total_revenue, 5950);
        assert_eq!(s.occupancy_rate, 75);
    }
}
