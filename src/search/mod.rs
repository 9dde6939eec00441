pub mod filters;

use crate::dataset::Dataset;
use crate::models::{Lead, SearchFilters, Villa};

use filters::LeadFilter;

/// Homepage search: active villas matching the filters and free for the
/// requested dates, in catalog order.
pub fn search_villas<'a>(ds: &'a Dataset, filters: &SearchFilters) -> Vec<&'a Villa> {
    ds.villas
        .iter()
        .filter(|v| filters.matches(v))
        .filter(|v| filters.is_free(&v.id, &ds.bookings))
        .collect()
}

/// Lead table rows after search and status filters.
pub fn filter_leads<'a>(leads: &'a [Lead], filter: &LeadFilter) -> Vec<&'a Lead> {
    leads.iter().filter(|l| filter.matches(l)).collect()
}
