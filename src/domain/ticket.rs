//! Ticket entity — a customer request received during off-hours.

use chrono::NaiveDate;

use super::enums::{GeoStatus, Segment};
use super::geo_point::GeoPoint;

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: i32,
    pub guid: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub attachments: Option<String>,
    pub segment: Segment,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building: Option<String>,
    pub client_location: Option<GeoPoint>,
    pub geo_status: GeoStatus,
}

/// City/region substrings (lower-cased) that identify a domestic address
/// when the country field is missing. Mirrors the set of known major
/// domestic cities and administrative regions used by the geocoder's
/// centroid tables, so a ticket resolves "domestic" exactly when it would
/// also resolve against those tables.
pub const DOMESTIC_IDENTIFIERS: &[&str] = &[
    "almaty", "алматы", "astana", "астана", "nur-sultan", "нур-султан",
    "shymkent", "шымкент", "karaganda", "караганда", "aktobe", "актобе",
    "taraz", "тараз", "pavlodar", "павлодар", "ust-kamenogorsk", "усть-каменогорск",
    "semey", "семей", "atyrau", "атырау", "kostanay", "костанай",
    "kyzylorda", "кызылорда", "aktau", "актау", "petropavlovsk", "петропавловск",
    "turkestan", "туркестан", "kokshetau", "кокшетау", "taldykorgan", "талдыкорган",
    "zhezkazgan", "жезказган", "ekibastuz", "экибастуз", "temirtau", "темиртау",
];

impl Ticket {
    pub fn is_address_known(&self) -> bool {
        self.client_location.is_some()
    }

    pub fn requires_vip_handling(&self) -> bool {
        matches!(self.segment, Segment::VIP | Segment::Priority)
    }

    /// Build a structured geocoding query: "<country>, <region>, <city>,
    /// <street building>". Street and building are combined into a single
    /// part. Returns `None` unless at least two comma-separated parts are
    /// present (an address with only a country, say, is not specific
    /// enough to geocode).
    pub fn build_address_string(&self, domestic_country_name: &str) -> Option<String> {
        let street_part = [self.street.as_deref(), self.building.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let parts = [
            self.country.as_deref().unwrap_or(domestic_country_name),
            self.region.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            street_part.as_str(),
        ];

        let non_empty: Vec<&str> = parts
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if non_empty.len() > 1 {
            Some(non_empty.join(", "))
        } else {
            None
        }
    }

    /// A ticket is domestic if its country matches `domestic_country_name`
    /// (case-insensitive), or, when country is missing, its city/region
    /// matches a known domestic identifier.
    pub fn is_domestic(&self, domestic_country_name: &str) -> bool {
        if let Some(country) = &self.country {
            return country.trim().eq_ignore_ascii_case(domestic_country_name);
        }

        let city = self.city.as_deref().unwrap_or("").to_lowercase();
        let region = self.region.as_deref().unwrap_or("").to_lowercase();

        DOMESTIC_IDENTIFIERS
            .iter()
            .any(|id| (!city.is_empty() && city.contains(id)) || (!region.is_empty() && region.contains(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_ticket() -> Ticket {
        Ticket {
            id: 1,
            guid: "t-1".into(),
            gender: None,
            birth_date: None,
            description: None,
            attachments: None,
            segment: Segment::Mass,
            country: None,
            region: None,
            city: None,
            street: None,
            building: None,
            client_location: None,
            geo_status: GeoStatus::Pending,
        }
    }

    #[test]
    fn address_string_needs_two_parts() {
        let mut t = base_ticket();
        t.country = Some("Kazakhstan".into());
        assert_eq!(t.build_address_string("Kazakhstan"), None);

        t.city = Some("Almaty".into());
        assert!(t.build_address_string("Kazakhstan").is_some());
    }

    #[test]
    fn domestic_by_country_name() {
        let mut t = base_ticket();
        t.country = Some("kazakhstan".into());
        assert!(t.is_domestic("Kazakhstan"));

        t.country = Some("Foreign".into());
        assert!(!t.is_domestic("Kazakhstan"));
    }

    #[test]
    fn domestic_inferred_from_city_when_country_missing() {
        let mut t = base_ticket();
        t.city = Some("Almaty-equivalent city".into());
        assert!(t.is_domestic("Kazakhstan"));
    }
}
