//! Static city/region centroid fallback tables, consulted after the API
//! lookup fails. Matching is case-insensitive substring containment
//! against the lower-cased address — Cyrillic city names included.

use crate::domain::GeoPoint;

pub const CITY_CENTROIDS: &[(&str, GeoPoint)] = &[
    ("алматы", GeoPoint { latitude: 43.238949, longitude: 76.945465 }),
    ("астана", GeoPoint { latitude: 51.128207, longitude: 71.430411 }),
    ("нур-султан", GeoPoint { latitude: 51.128207, longitude: 71.430411 }),
    ("караганда", GeoPoint { latitude: 49.806406, longitude: 73.085485 }),
    ("шымкент", GeoPoint { latitude: 42.315514, longitude: 69.596428 }),
    ("актобе", GeoPoint { latitude: 50.283935, longitude: 57.166978 }),
    ("тараз", GeoPoint { latitude: 42.901183, longitude: 71.378309 }),
    ("павлодар", GeoPoint { latitude: 52.287430, longitude: 76.967454 }),
    ("усть-каменогорск", GeoPoint { latitude: 49.948759, longitude: 82.627808 }),
    ("семей", GeoPoint { latitude: 50.411137, longitude: 80.227607 }),
    ("атырау", GeoPoint { latitude: 47.106700, longitude: 51.903538 }),
    ("костанай", GeoPoint { latitude: 53.214773, longitude: 63.631557 }),
    ("кызылорда", GeoPoint { latitude: 44.842614, longitude: 65.502530 }),
    ("актау", GeoPoint { latitude: 43.635100, longitude: 51.169300 }),
    ("петропавловск", GeoPoint { latitude: 54.865559, longitude: 69.135552 }),
    ("туркестан", GeoPoint { latitude: 43.297222, longitude: 68.241389 }),
    ("кокшетау", GeoPoint { latitude: 53.283333, longitude: 69.383333 }),
    ("талдыкорган", GeoPoint { latitude: 45.015833, longitude: 78.373611 }),
    ("жезказган", GeoPoint { latitude: 47.783333, longitude: 67.766667 }),
    ("экибастуз", GeoPoint { latitude: 51.723667, longitude: 75.322278 }),
    ("темиртау", GeoPoint { latitude: 50.054722, longitude: 72.964722 }),
];

pub const REGION_CENTROIDS: &[(&str, &str)] = &[
    ("акмолинская", "кокшетау"),
    ("алматинская", "алматы"),
    ("атырауская", "атырау"),
    ("актюбинская", "актобе"),
    ("жамбылская", "тараз"),
    ("карагандинская", "караганда"),
    ("костанайская", "костанай"),
    ("кызылординская", "кызылорда"),
    ("мангистауская", "актау"),
    ("павлодарская", "павлодар"),
    ("северо-казахстанская", "петропавловск"),
    ("туркестанская", "туркестан"),
    ("восточно-казахстанская", "усть-каменогорск"),
];

fn city_centroid(name: &str) -> GeoPoint {
    CITY_CENTROIDS.iter().find(|(k, _)| *k == name).map(|(_, p)| *p).expect("known region target city")
}

/// Try to match a known city name as a substring of the (already
/// lower-cased) address.
pub fn lookup_city(address_lower: &str) -> Option<GeoPoint> {
    CITY_CENTROIDS.iter().find(|(city, _)| address_lower.contains(city)).map(|(_, p)| *p)
}

/// Try to match a known region name, resolving to its administrative
/// center's city centroid.
pub fn lookup_region(address_lower: &str) -> Option<GeoPoint> {
    REGION_CENTROIDS
        .iter()
        .find(|(region, _)| address_lower.contains(region))
        .map(|(_, city)| city_centroid(city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_lookup_matches_substring() {
        assert!(lookup_city("г. алматы, ул. абая 1").is_some());
    }

    #[test]
    fn region_lookup_resolves_to_a_city_centroid() {
        let p = lookup_region("мангистауская область").unwrap();
        assert_eq!(p, city_centroid("актау"));
    }
}
