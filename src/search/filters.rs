use crate::models::{Booking, BookingStatus, Lead, LeadStatus, SearchFilters, Villa};

/// Filters for the CRM lead table.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    /// Case-insensitive substring of name, email or villa interest.
    pub query: Option<String>,
    pub status: Option<LeadStatus>,
    pub min_score: Option<u8>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(ref q) = self.query {
            let q = q.trim().to_lowercase();
            if !q.is_empty()
                && !lead.name.to_lowercase().contains(&q)
                && !lead.email.to_lowercase().contains(&q)
                && !lead.villa_interest.to_lowercase().contains(&q)
            {
                return false;
            }
        }

        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }

        if let Some(min) = self.min_score {
            if lead.score < min {
                return false;
            }
        }

        true
    }
}

impl SearchFilters {
    /// Whether `villa` satisfies the listing filters. Date availability is
    /// checked separately against bookings, see [`SearchFilters::is_free`].
    pub fn matches(&self, villa: &Villa) -> bool {
        if !villa.is_active() {
            return false;
        }

        if let Some(ref city) = self.city {
            let city = city.trim().to_lowercase();
            if !city.is_empty()
                && !villa.city.to_lowercase().contains(&city)
                && !villa.location.to_lowercase().contains(&city)
                && !villa.country.to_lowercase().contains(&city)
            {
                return false;
            }
        }

        if let Some(guests) = self.guests {
            if guests > villa.max_guests {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if villa.price_per_night < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if villa.price_per_night > max {
                return false;
            }
        }

        self.amenities.iter().all(|wanted| {
            villa
                .amenities
                .iter()
                .any(|a| a.eq_ignore_ascii_case(wanted.trim()))
        })
    }

    /// True unless a live booking of `villa_id` overlaps the requested stay.
    /// Without both dates every villa is free. Check-out day is free for the
    /// next check-in.
    pub fn is_free(&self, villa_id: &str, bookings: &[Booking]) -> bool {
        let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) else {
            return true;
        };
        !bookings.iter().any(|b| {
            b.villa_id == villa_id
                && b.status != BookingStatus::Cancelled
                && b.check_in < check_out
                && check_in < b.check_out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use chrono::NaiveDate;

    #[test]
    fn lead_query_is_case_insensitive_over_three_fields() {
        let ds = Dataset::mock();
        let by = |q: &str| LeadFilter {
            query: Some(q.to_string()),
            ..LeadFilter::default()
        };

        assert!(by("SARAH").matches(ds.lead("1").unwrap()));
        assert!(by("company.com").matches(ds.lead("2").unwrap()));
        assert!(by("tuscan").matches(ds.lead("3").unwrap()));
        assert!(!by("tuscan").matches(ds.lead("1").unwrap()));
        assert!(by("  ").matches(ds.lead("1").unwrap()));
    }

    #[test]
    fn lead_status_and_score_filters() {
        let ds = Dataset::mock();
        let hot = LeadFilter {
            status: Some(LeadStatus::Hot),
            ..LeadFilter::default()
        };
        assert!(hot.matches(ds.lead("1").unwrap()));
        assert!(!hot.matches(ds.lead("2").unwrap()));

        let strong = LeadFilter {
            min_score: Some(60),
            ..LeadFilter::default()
        };
        assert!(strong.matches(ds.lead("2").unwrap()));
        assert!(!strong.matches(ds.lead("3").unwrap()));
    }

    #[test]
    fn villa_filters() {
        let ds = Dataset::mock();
        let beach = ds.villa("villa_1").unwrap();
        let amenity = |name: &str| SearchFilters {
            amenities: vec![name.to_string()],
            ..SearchFilters::default()
        };

        assert!(SearchFilters::default().matches(beach));
        let country = SearchFilters {
            city: Some("indonesia".into()),
            ..SearchFilters::default()
        };
        assert!(country.matches(beach));
        let crowd = SearchFilters {
            guests: Some(9),
            ..SearchFilters::default()
        };
        assert!(!crowd.matches(beach));
        let cheap = SearchFilters {
            max_price: Some(800),
            ..SearchFilters::default()
        };
        assert!(!cheap.matches(beach));
        assert!(amenity("wifi").matches(beach));
        assert!(!amenity("Hot Tub").matches(beach));
    }

    #[test]
    fn overlapping_bookings_make_a_villa_unavailable() {
        let ds = Dataset::mock();
        let stay = |from: u32, to: u32| SearchFilters {
            check_in: NaiveDate::from_ymd_opt(2024, 6, from),
            check_out: NaiveDate::from_ymd_opt(2024, 6, to),
            ..SearchFilters::default()
        };

        let clash = stay(20, 25);
        assert!(!clash.is_free("villa_1", &ds.bookings));
        assert!(clash.is_free("villa_2", &ds.bookings));

        let back_to_back = stay(22, 25);
        assert!(back_to_back.is_free("villa_1", &ds.bookings));
    }
}
