//! Nearest ordering and radius filtering.
//!
//! Ordering uses plain planar distance in degree space, which is what a
//! spatial index can sort by cheaply. The radius cutoff is user-facing
//! and uses the great-circle distance in kilometres instead.

use harrastus_core::error::{FieldErrors, HarrastusResult};
use harrastus_core::models::coordinate::Coordinate;

/// Mean Earth radius (IUGG) in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

pub const NEAR_LATITUDE: &str = "near_latitude";
pub const NEAR_LONGITUDE: &str = "near_longitude";
pub const MAX_DISTANCE: &str = "max_distance";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Split a `-`-prefixed ordering key into direction and field name.
    pub fn split_key(raw: &str) -> (Self, &str) {
        match raw.strip_prefix('-') {
            Some(field) => (Self::Descending, field),
            None => (Self::Ascending, raw),
        }
    }
}

/// Reference point for a nearest query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQueryPoint {
    pub origin: Coordinate,
    pub max_distance_km: Option<u32>,
    pub direction: SortDirection,
}

impl GeoQueryPoint {
    pub fn new(origin: Coordinate, direction: SortDirection) -> Self {
        Self {
            origin,
            max_distance_km: None,
            direction,
        }
    }

    pub fn with_max_distance(mut self, km: u32) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    /// Validate raw request values. Checks run in stages and each stage
    /// reports every failing field before the next stage runs: presence,
    /// then float parsing, then range.
    ///
    /// The range check accepts latitude within [-180, 180] and longitude
    /// within [-90, 90], matching the behaviour existing clients rely on.
    pub fn from_params(
        near_latitude: Option<&str>,
        near_longitude: Option<&str>,
        max_distance: Option<&str>,
        direction: SortDirection,
    ) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();
        const REQUIRED: &str = "This field is required when nearest ordering is used.";
        if near_latitude.is_none() {
            errors.add(NEAR_LATITUDE, REQUIRED);
        }
        if near_longitude.is_none() {
            errors.add(NEAR_LONGITUDE, REQUIRED);
        }
        let (Some(raw_lat), Some(raw_lon)) = (near_latitude, near_longitude) else {
            return Err(errors.into());
        };

        let latitude = raw_lat.trim().parse::<f64>();
        let longitude = raw_lon.trim().parse::<f64>();
        if latitude.is_err() {
            errors.add(NEAR_LATITUDE, "Must be a float.");
        }
        if longitude.is_err() {
            errors.add(NEAR_LONGITUDE, "Must be a float.");
        }
        let (Ok(latitude), Ok(longitude)) = (latitude, longitude) else {
            return Err(errors.into());
        };

        if !(-180.0..=180.0).contains(&latitude) {
            errors.add(NEAR_LATITUDE, "Value must be within -180.0 and 180.0.");
        }
        if !(-90.0..=90.0).contains(&longitude) {
            errors.add(NEAR_LONGITUDE, "Value must be within -90.0 and 90.0.");
        }
        errors.into_result()?;

        Ok(Self {
            origin: Coordinate::new(latitude, longitude),
            max_distance_km: parse_max_distance(max_distance)?,
            direction,
        })
    }
}

/// Parse the optional `max_distance` parameter (whole kilometres).
pub fn parse_max_distance(raw: Option<&str>) -> HarrastusResult<Option<u32>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| FieldErrors::single(MAX_DISTANCE, "Must be an integer."))?;
    let km = u32::try_from(value)
        .map_err(|_| FieldErrors::single(MAX_DISTANCE, "Must be a non-negative integer."))?;
    Ok(Some(km))
}

/// Euclidean distance in degree space, used only for ordering.
pub fn planar_distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = a.latitude - b.latitude;
    let d_lon = a.longitude - b.longitude;
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}

/// Great-circle distance in kilometres (haversine formula).
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Order items by planar distance to `point`, dropping items without a
/// coordinate and, when a radius is set, items farther than it.
///
/// Ascending order is stable: equal distances keep their input order.
/// Descending order is exactly the reverse of ascending order.
pub fn order_by_distance<T, F>(items: Vec<T>, point: &GeoQueryPoint, coordinate_of: F) -> Vec<T>
where
    F: Fn(&T) -> Option<Coordinate>,
{
    let origin = point.origin;
    let mut ranked: Vec<(f64, T)> = items
        .into_iter()
        .filter_map(|item| {
            let coordinate = coordinate_of(&item)?;
            if let Some(km) = point.max_distance_km {
                if haversine_km(origin, coordinate) > f64::from(km) {
                    return None;
                }
            }
            Some((planar_distance(origin, coordinate), item))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    if point.direction == SortDirection::Descending {
        ranked.reverse();
    }
    ranked.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoQueryPoint {
        GeoQueryPoint::new(Coordinate::new(lat, lon), SortDirection::Ascending)
    }

    #[test]
    fn near_mid_far_ordering() {
        let items = vec![
            ("far", Some(Coordinate::new(8.0, 10.0))),
            ("mid", Some(Coordinate::new(6.0, 4.0))),
            ("near", Some(Coordinate::new(2.0, 3.0))),
        ];

        let asc = order_by_distance(items.clone(), &point(1.0, 1.0), |i| i.1);
        let names: Vec<_> = asc.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);

        let mut desc_point = point(1.0, 1.0);
        desc_point.direction = SortDirection::Descending;
        let desc = order_by_distance(items, &desc_point, |i| i.1);
        let names: Vec<_> = desc.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["far", "mid", "near"]);
    }

    #[test]
    fn items_without_coordinate_are_dropped() {
        let items = vec![("a", None), ("b", Some(Coordinate::new(1.0, 1.0)))];
        let ordered = order_by_distance(items, &point(0.0, 0.0), |i| i.1);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].0, "b");
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![
            ("first", Some(Coordinate::new(1.0, 0.0))),
            ("second", Some(Coordinate::new(0.0, 1.0))),
            ("third", Some(Coordinate::new(-1.0, 0.0))),
        ];
        let ordered = order_by_distance(items, &point(0.0, 0.0), |i| i.1);
        let names: Vec<_> = ordered.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn radius_uses_great_circle_distance() {
        // Tampere -> Helsinki is roughly 160 km.
        let tampere = Coordinate::new(61.4978, 23.7610);
        let helsinki = Coordinate::new(60.1699, 24.9384);
        let d = haversine_km(tampere, helsinki);
        assert!((155.0..165.0).contains(&d), "unexpected distance {d}");

        let items = vec![("helsinki", Some(helsinki)), ("tampere", Some(tampere))];
        let q = GeoQueryPoint::new(tampere, SortDirection::Ascending).with_max_distance(100);
        let kept = order_by_distance(items.clone(), &q, |i| i.1);
        assert_eq!(kept.iter().map(|i| i.0).collect::<Vec<_>>(), vec!["tampere"]);

        let q = q.with_max_distance(200);
        assert_eq!(order_by_distance(items, &q, |i| i.1).len(), 2);
    }

    #[test]
    fn missing_coordinates_name_each_field() {
        let err =
            GeoQueryPoint::from_params(None, None, None, SortDirection::Ascending).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains(NEAR_LATITUDE));
        assert!(fields.contains(NEAR_LONGITUDE));

        let err = GeoQueryPoint::from_params(Some("1.0"), None, None, SortDirection::Ascending)
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(!fields.contains(NEAR_LATITUDE));
        assert!(fields.contains(NEAR_LONGITUDE));
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let err = GeoQueryPoint::from_params(
            Some("abc"),
            Some("2.0"),
            None,
            SortDirection::Ascending,
        )
        .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get(NEAR_LATITUDE).unwrap(),
            ["Must be a float."]
        );
    }

    #[test]
    fn bounds_follow_existing_ranges() {
        // Latitude is checked against +-180 and longitude against +-90.
        let ok =
            GeoQueryPoint::from_params(Some("120"), Some("45"), None, SortDirection::Ascending);
        assert!(ok.is_ok());

        let err =
            GeoQueryPoint::from_params(Some("10"), Some("120"), None, SortDirection::Ascending)
                .unwrap_err();
        assert!(err.field_errors().unwrap().contains(NEAR_LONGITUDE));

        let err =
            GeoQueryPoint::from_params(Some("-181"), Some("0"), None, SortDirection::Ascending)
                .unwrap_err();
        assert!(err.field_errors().unwrap().contains(NEAR_LATITUDE));
    }

    #[test]
    fn max_distance_must_be_integer() {
        let err = GeoQueryPoint::from_params(
            Some("1"),
            Some("1"),
            Some("5.5"),
            SortDirection::Ascending,
        )
        .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get(MAX_DISTANCE).unwrap(),
            ["Must be an integer."]
        );

        assert!(parse_max_distance(Some("-3")).is_err());
        assert_eq!(parse_max_distance(Some(" 25 ")).unwrap(), Some(25));
        assert_eq!(parse_max_distance(None).unwrap(), None);
    }

    #[test]
    fn split_key_reads_direction() {
        assert_eq!(
            SortDirection::split_key("-nearest"),
            (SortDirection::Descending, "nearest")
        );
        assert_eq!(
            SortDirection::split_key("start_date"),
            (SortDirection::Ascending, "start_date")
        );
    }
}
