//! OfficeSelectionPolicy — pick the nearest office or apply the 50/50 fallback.

use crate::domain::{GeoPoint, Office};
use crate::error::RouterError;

/// Result of the office selection policy.
#[derive(Debug, Clone)]
pub struct OfficeSelection {
    pub office_id: i32,
    pub office_name: String,
    /// `None` when a fallback was used.
    pub distance_km: Option<f64>,
    pub fallback_used: bool,
    pub reason: String,
}

/// Select the geographically nearest office with a known location.
/// Ties are broken by office id ascending.
pub fn select_nearest(client_location: &GeoPoint, offices: &[Office]) -> Result<OfficeSelection, RouterError> {
    let mut candidates: Vec<(&Office, f64)> = offices
        .iter()
        .filter_map(|o| o.location.map(|loc| (o, client_location.haversine_km(&loc))))
        .collect();

    if candidates.is_empty() {
        return Err(RouterError::NoCandidates);
    }

    candidates.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    let (office, distance) = candidates[0];
    let rounded = (distance * 100.0).round() / 100.0;

    Ok(OfficeSelection {
        office_id: office.id,
        office_name: office.name.clone(),
        distance_km: Some(rounded),
        fallback_used: false,
        reason: format!("Nearest office: {} ({:.1} km)", office.name, distance),
    })
}

/// Configuration for the hub 50/50 fallback: offices whose name contains
/// either substring are treated as the two well-known hubs.
pub struct HubNames<'a> {
    pub hub_a: &'a str,
    pub hub_b: &'a str,
    /// When `false` (the default), the absence of both hubs is treated as
    /// a configuration bug and raises [`RouterError::HubOfficesNotFound`]
    /// rather than silently falling back to a sorted-by-id split.
    pub allow_sorted_fallback: bool,
}

/// Deterministic 50/50 split between the two hub offices, or (when
/// explicitly allowed) a sorted-by-id split across all offices.
pub fn select_fallback(counter: i64, offices: &[Office], hubs: &HubNames) -> Result<OfficeSelection, RouterError> {
    if offices.is_empty() {
        return Err(RouterError::NoOffices);
    }

    let hub_a = offices.iter().find(|o| o.name.contains(hubs.hub_a));
    let hub_b = offices.iter().find(|o| o.name.contains(hubs.hub_b));

    if let (Some(a), Some(b)) = (hub_a, hub_b) {
        let pick_a = counter.rem_euclid(2) == 0;
        let chosen = if pick_a { a } else { b };
        let reason = format!("Fallback 50/50 → {} (round-robin)", chosen.name);
        return Ok(OfficeSelection {
            office_id: chosen.id,
            office_name: chosen.name.clone(),
            distance_km: None,
            fallback_used: true,
            reason,
        });
    }

    if !hubs.allow_sorted_fallback {
        return Err(RouterError::HubOfficesNotFound);
    }

    let mut sorted: Vec<&Office> = offices.iter().collect();
    sorted.sort_by_key(|o| o.id);
    let index = (counter.rem_euclid(sorted.len() as i64)) as usize;
    let chosen = sorted[index];

    Ok(OfficeSelection {
        office_id: chosen.id,
        office_name: chosen.name.clone(),
        distance_km: None,
        fallback_used: true,
        reason: format!("Fallback → {} (round-robin across all offices)", chosen.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(id: i32, name: &str, loc: Option<GeoPoint>) -> Office {
        Office { id, name: name.to_string(), address: "addr".into(), location: loc }
    }

    #[test]
    fn nearest_tie_broken_by_ascending_id() {
        let point = GeoPoint::new(43.24, 76.95);
        let offices = vec![
            office(2, "B", Some(point)),
            office(1, "A", Some(point)),
        ];
        let sel = select_nearest(&point, &offices).unwrap();
        assert_eq!(sel.office_id, 1);
    }

    #[test]
    fn nearest_ignores_offices_without_location() {
        let point = GeoPoint::new(43.24, 76.95);
        let offices = vec![office(1, "NoLoc", None)];
        assert!(select_nearest(&point, &offices).is_err());
    }

    #[test]
    fn fallback_alternates_by_counter_parity() {
        let offices = vec![
            office(1, "Astana-hub", None),
            office(2, "Almaty-hub", None),
        ];
        let hubs = HubNames { hub_a: "Astana-hub", hub_b: "Almaty-hub", allow_sorted_fallback: false };
        let even = select_fallback(0, &offices, &hubs).unwrap();
        let odd = select_fallback(1, &offices, &hubs).unwrap();
        assert_eq!(even.office_id, 1);
        assert_eq!(odd.office_id, 2);
        assert!(even.fallback_used && even.distance_km.is_none());
    }

    #[test]
    fn fallback_without_hubs_is_a_hard_error_by_default() {
        let offices = vec![office(1, "Regional office", None)];
        let hubs = HubNames { hub_a: "Astana-hub", hub_b: "Almaty-hub", allow_sorted_fallback: false };
        assert!(matches!(select_fallback(0, &offices, &hubs), Err(RouterError::HubOfficesNotFound)));
    }

    #[test]
    fn fallback_sorted_by_id_when_explicitly_allowed() {
        let offices = vec![office(5, "X", None), office(3, "Y", None)];
        let hubs = HubNames { hub_a: "Astana-hub", hub_b: "Almaty-hub", allow_sorted_fallback: true };
        let sel = select_fallback(1, &offices, &hubs).unwrap();
        assert_eq!(sel.office_id, 5);
    }
}
