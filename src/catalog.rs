//! Villa administration: the add/edit form, delete and status toggle.
//!
//! Nothing here checks bookings. Deleting a villa leaves its bookings in
//! place, and editing the nightly price leaves existing totals alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Villa, VillaStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("villa not found: {0}")]
    NotFound(String),

    #[error("villa {0} is required")]
    MissingField(&'static str),
}

/// Admin form fields. Amenities and images are comma-separated, the way they
/// are typed into the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillaForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub price_per_night: u64,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: String,
    pub images: String,
}

impl Default for VillaForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            location: String::new(),
            city: String::new(),
            country: String::new(),
            price_per_night: 0,
            max_guests: 2,
            bedrooms: 1,
            bathrooms: 1,
            amenities: String::new(),
            images: String::new(),
        }
    }
}

impl VillaForm {
    /// Prefill the form from an existing villa for editing.
    pub fn from_villa(villa: &Villa) -> Self {
        Self {
            name: villa.name.clone(),
            description: villa.description.clone(),
            location: villa.location.clone(),
            city: villa.city.clone(),
            country: villa.country.clone(),
            price_per_night: villa.price_per_night,
            max_guests: villa.max_guests,
            bedrooms: villa.bedrooms,
            bathrooms: villa.bathrooms,
            amenities: villa.amenities.join(", "),
            images: villa.images.join(", "),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        Ok(())
    }

    fn apply(&self, villa: &mut Villa, now: DateTime<Utc>) {
        villa.name = self.name.trim().to_string();
        villa.description = self.description.trim().to_string();
        villa.location = self.location.trim().to_string();
        villa.city = self.city.trim().to_string();
        villa.country = self.country.trim().to_string();
        villa.price_per_night = self.price_per_night;
        villa.max_guests = self.max_guests;
        villa.bedrooms = self.bedrooms;
        villa.bathrooms = self.bathrooms;
        villa.amenities = parse_list(&self.amenities);
        villa.images = parse_list(&self.images);
        villa.updated_at = now;
    }
}

/// Split a comma-separated form field, trimming and dropping empty entries.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add a new active villa owned by `owner_id`. Returns its id.
pub fn add_villa(
    villas: &mut Vec<Villa>,
    form: &VillaForm,
    owner_id: &str,
    now: DateTime<Utc>,
) -> Result<String, CatalogError> {
    form.validate()?;
    let mut villa = Villa {
        id: format!("villa_{}", uuid::Uuid::new_v4().simple()),
        name: String::new(),
        description: String::new(),
        location: String::new(),
        city: String::new(),
        country: String::new(),
        price_per_night: 0,
        max_guests: 0,
        bedrooms: 0,
        bathrooms: 0,
        amenities: Vec::new(),
        images: Vec::new(),
        owner_id: owner_id.to_string(),
        status: VillaStatus::Active,
        created_at: now,
        updated_at: now,
    };
    form.apply(&mut villa, now);

    info!("Added villa {} ({})", villa.name, villa.id);
    let id = villa.id.clone();
    villas.push(villa);
    Ok(id)
}

/// Overwrite a villa's form fields. Id, owner, status and creation time stay.
pub fn edit_villa(
    villas: &mut [Villa],
    id: &str,
    form: &VillaForm,
    now: DateTime<Utc>,
) -> Result<(), CatalogError> {
    form.validate()?;
    let villa = villas
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    form.apply(villa, now);
    info!("Updated villa {} ({})", villa.name, villa.id);
    Ok(())
}

/// Remove a villa and return it.
pub fn delete_villa(villas: &mut Vec<Villa>, id: &str) -> Result<Villa, CatalogError> {
    let pos = villas
        .iter()
        .position(|v| v.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    let villa = villas.remove(pos);
    info!("Deleted villa {} ({})", villa.name, villa.id);
    Ok(villa)
}

/// Flip active to inactive and anything else to active. Returns the new status.
pub fn toggle_status(villas: &mut [Villa], id: &str) -> Result<VillaStatus, CatalogError> {
    let villa = villas
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    villa.status = match villa.status {
        VillaStatus::Active => VillaStatus::Inactive,
        VillaStatus::Inactive | VillaStatus::Maintenance => VillaStatus::Active,
    };
    Ok(villa.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn form() -> VillaForm {
        VillaForm {
            name: "  Cliffside Villa ".to_string(),
            city: "Oia".to_string(),
            country: "Greece".to_string(),
            price_per_night: 990,
            amenities: "Infinity Pool, , Sea View ,WiFi".to_string(),
            images: "https://img/1, https://img/2".to_string(),
            ..VillaForm::default()
        }
    }

    #[test]
    fn parse_list_trims_and_drops_empties() {
        assert_eq!(parse_list(" a, b ,,c ,"), vec!["a", "b", "c"]);
        assert!(parse_list("  ").is_empty());
    }

    #[test]
    fn add_creates_active_villa_from_form() {
        let mut villas = Dataset::mock().villas;
        let id = add_villa(&mut villas, &form(), "current_user", now()).unwrap();

        let v = villas.iter().find(|v| v.id == id).unwrap();
        assert!(id.starts_with("villa_"));
        assert_eq!(v.name, "Cliffside Villa");
        assert_eq!(v.amenities, vec!["Infinity Pool", "Sea View", "WiFi"]);
        assert_eq!(v.images.len(), 2);
        assert_eq!(v.status, VillaStatus::Active);
        assert_eq!(v.owner_id, "current_user");
        assert_eq!(v.max_guests, 2);
        assert_eq!(v.created_at, now());
    }

    #[test]
    fn add_requires_a_name() {
        let mut villas = Vec::new();
        let err = add_villa(&mut villas, &VillaForm::default(), "u", now()).unwrap_err();
        assert_eq!(err, CatalogError::MissingField("name"));
        assert!(villas.is_empty());
    }

    #[test]
    fn edit_keeps_identity_and_status() {
        let mut villas = Dataset::mock().villas;
        villas[0].status = VillaStatus::Maintenance;
        let created = villas[0].created_at;

        let mut f = VillaForm::from_villa(&villas[0]);
        assert_eq!(f.amenities, "Private Pool, Beach Access, WiFi, Air Conditioning");
        f.price_per_night = 900;
        edit_villa(&mut villas, "villa_1", &f, now()).unwrap();

        assert_eq!(villas[0].id, "villa_1");
        assert_eq!(villas[0].price_per_night, 900);
        assert_eq!(villas[0].status, VillaStatus::Maintenance);
        assert_eq!(villas[0].created_at, created);
        assert_eq!(villas[0].updated_at, now());
        assert_eq!(villas[0].amenities.len(), 4);
    }

    #[test]
    fn delete_leaves_bookings_untouched() {
        let mut ds = Dataset::mock();
        let removed = delete_villa(&mut ds.villas, "villa_1").unwrap();
        assert_eq!(removed.name, "Luxury Beachfront Villa");
        assert!(ds.villa("villa_1").is_none());
        assert!(ds.bookings.iter().any(|b| b.villa_id == "villa_1"));
        assert_eq!(
            delete_villa(&mut ds.villas, "villa_1").unwrap_err(),
            CatalogError::NotFound("villa_1".to_string())
        );
    }

    #[test]
    fn toggle_flips_between_active_and_inactive() {
        let mut villas = Dataset::mock().villas;
        assert_eq!(toggle_status(&mut villas, "villa_2").unwrap(), VillaStatus::Inactive);
        assert_eq!(toggle_status(&mut villas, "villa_2").unwrap(), VillaStatus::Active);
        villas[0].status = VillaStatus::Maintenance;
        assert_eq!(toggle_status(&mut villas, "villa_1").unwrap(), VillaStatus::Active);
        assert!(toggle_status(&mut villas, "nope").is_err());
    }
}
