use std::cmp::Ordering;

use log::debug;

use super::place_finder_types::{Candidate, Coordinate, FinderConfig, PlaceDistance};

/// Great-circle distance between `a` and `b` on a sphere of radius `earth_radius_km`.
/// Returns kilometers.
pub fn haversine_distance(a: Coordinate, b: Coordinate, earth_radius_km: f64) -> f64 {
    let lat1 = a.lat.to_radians();
    let lng1 = a.lng.to_radians();
    let lat2 = b.lat.to_radians();
    let lng2 = b.lng.to_radians();

    let delta_lat = lat2 - lat1;
    let delta_lng = lng2 - lng1;

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    // Rounding can push h slightly outside [0, 1] for near-antipodal points.
    // NaN must fall through untouched.
    let h = if h > 1.0 {
        1.0
    } else if h < 0.0 {
        0.0
    } else {
        h
    };

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    earth_radius_km * c
}

pub struct DistanceFilter {
    config: FinderConfig,
}

impl DistanceFilter {
    pub fn new(config: FinderConfig) -> DistanceFilter {
        DistanceFilter { config }
    }

    #[inline]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    #[inline]
    pub fn distance(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_distance(a, b, self.config.earth_radius_km)
    }

    /**
     * Candidates within `radius_km` of the reference (boundary included),
     * nearest first. Equal distances keep their input order.
     */
    pub fn find_within_radius<'a>(&self, candidates: &'a [Candidate]) -> Vec<PlaceDistance<'a>> {
        let mut results: Vec<PlaceDistance<'a>> = candidates
            .iter()
            .filter_map(|candidate| {
                let distance_km = self.distance(self.config.reference, candidate.coordinate);
                debug!("{}: {:.3} km", candidate.name, distance_km);

                if distance_km <= self.config.radius_km {
                    Some(PlaceDistance {
                        name: &candidate.name,
                        distance_km,
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable.
        results.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        });

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place_finder::place_finder_types::MEAN_EARTH_RADIUS_KM;

    const TOLERANCE_KM: f64 = 1e-9;

    fn office() -> Coordinate {
        FinderConfig::default().reference
    }

    fn filter_with_radius(radius_km: f64) -> DistanceFilter {
        DistanceFilter::new(FinderConfig {
            radius_km,
            ..FinderConfig::default()
        })
    }

    fn sample_coordinates() -> Vec<Coordinate> {
        vec![
            office(),
            Coordinate::new(48.4647, 35.0462),
            Coordinate::new(50.4501, 30.5234),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 45.0),
            Coordinate::new(0.0, 180.0),
            Coordinate::new(0.0, -180.0),
        ]
    }

    #[test]
    fn distance_to_itself_is_zero() {
        for p in sample_coordinates() {
            assert_eq!(haversine_distance(p, p, MEAN_EARTH_RADIUS_KM), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric_and_non_negative() {
        let points = sample_coordinates();
        for a in &points {
            for b in &points {
                let ab = haversine_distance(*a, *b, MEAN_EARTH_RADIUS_KM);
                let ba = haversine_distance(*b, *a, MEAN_EARTH_RADIUS_KM);

                assert!(ab >= 0.0, "negative distance {:?} -> {:?}", a, b);
                assert!((ab - ba).abs() <= TOLERANCE_KM, "{} != {}", ab, ba);
            }
        }
    }

    #[test]
    fn distances_add_up_along_a_great_circle() {
        let equator = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 10.0),
            Coordinate::new(0.0, 25.0),
        ];
        let meridian = [
            Coordinate::new(10.0, 35.0),
            Coordinate::new(30.0, 35.0),
            Coordinate::new(60.0, 35.0),
        ];

        for line in &[equator, meridian] {
            let ab = haversine_distance(line[0], line[1], MEAN_EARTH_RADIUS_KM);
            let bc = haversine_distance(line[1], line[2], MEAN_EARTH_RADIUS_KM);
            let ac = haversine_distance(line[0], line[2], MEAN_EARTH_RADIUS_KM);

            assert!((ac - (ab + bc)).abs() < 1e-6, "{} vs {}", ac, ab + bc);
        }
    }

    #[test]
    fn antipodal_points_are_half_a_circumference_apart() {
        let expected = std::f64::consts::PI * MEAN_EARTH_RADIUS_KM;

        let equator = haversine_distance(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 180.0),
            MEAN_EARTH_RADIUS_KM,
        );
        let poles = haversine_distance(
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 0.0),
            MEAN_EARTH_RADIUS_KM,
        );
        let office_antipode = haversine_distance(
            office(),
            Coordinate::new(-48.471207, 35.038810 - 180.0),
            MEAN_EARTH_RADIUS_KM,
        );

        for d in &[equator, poles, office_antipode] {
            assert!(d.is_finite());
            assert!((d - expected).abs() < 1e-3, "{} vs {}", d, expected);
        }
    }

    #[test]
    fn dnipro_center_is_under_a_kilometer_from_the_office() {
        let d = haversine_distance(
            Coordinate::new(48.4647, 35.0462),
            office(),
            MEAN_EARTH_RADIUS_KM,
        );

        // Hand computed: ~0.905 km.
        assert!(d > 0.85 && d < 0.95, "unexpected distance {}", d);
    }

    #[test]
    fn it_should_agree_with_geo_haversine() {
        use geo::algorithm::haversine_distance::HaversineDistance;

        let kyiv = Coordinate::new(50.4501, 30.5234);
        let ours = haversine_distance(office(), kyiv, MEAN_EARTH_RADIUS_KM);

        let office_point = geo::Point::new(office().lng, office().lat);
        let kyiv_point = geo::Point::new(kyiv.lng, kyiv.lat);
        let theirs_km = office_point.haversine_distance(&kyiv_point) / 1000.0;

        // geo uses a slightly larger mean radius (6371.0088 km).
        let relative_error = (ours - theirs_km).abs() / theirs_km;
        assert!(relative_error < 1e-5, "{} vs {}", ours, theirs_km);
    }

    #[test]
    fn distance_uses_the_configured_earth_radius() {
        let unit_sphere = DistanceFilter::new(FinderConfig {
            earth_radius_km: 1.0,
            ..FinderConfig::default()
        });

        let d = unit_sphere.distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 90.0));

        assert!((d - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn nan_coordinates_never_end_up_in_range() {
        let broken = Coordinate::new(std::f64::NAN, 35.0);

        assert!(haversine_distance(office(), broken, MEAN_EARTH_RADIUS_KM).is_nan());

        let candidates = vec![
            Candidate {
                name: "Broken".to_owned(),
                coordinate: broken,
            },
            Candidate::new("A", 48.471207, 35.038810),
        ];
        let results = filter_with_radius(5.0).find_within_radius(&candidates);
        let names: Vec<&str> = results.iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn it_should_keep_only_places_within_the_radius() {
        let candidates = vec![
            Candidate::new("A", 48.471207, 35.038810),
            Candidate::new("B", 48.52, 35.04),
        ];

        let results = filter_with_radius(5.0).find_within_radius(&candidates);

        assert_eq!(
            results,
            vec![PlaceDistance {
                name: "A",
                distance_km: 0.0
            }]
        );

        let b_distance = haversine_distance(office(), candidates[1].coordinate, MEAN_EARTH_RADIUS_KM);
        assert!(b_distance > 5.0 && b_distance < 5.6, "B at {}", b_distance);
    }

    #[test]
    fn a_place_exactly_on_the_radius_is_included() {
        let candidates = vec![Candidate::new("Edge", 48.4647, 35.0462)];
        let edge_km = haversine_distance(office(), candidates[0].coordinate, MEAN_EARTH_RADIUS_KM);

        let results = filter_with_radius(edge_km).find_within_radius(&candidates);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Edge");
        assert_eq!(results[0].distance_km, edge_km);
    }

    #[test]
    fn it_should_return_nothing_when_no_place_is_close() {
        let candidates = vec![
            Candidate::new("Kyiv", 50.4501, 30.5234),
            Candidate::new("Sydney", -33.8688, 151.2093),
        ];

        let results = filter_with_radius(5.0).find_within_radius(&candidates);

        assert!(results.is_empty());
        assert!(filter_with_radius(5.0).find_within_radius(&[]).is_empty());
    }

    #[test]
    fn it_should_sort_by_distance() {
        let candidates = vec![
            Candidate::new("far", 48.50, 35.04),
            Candidate::new("here", 48.471207, 35.038810),
            Candidate::new("near", 48.4647, 35.0462),
            Candidate::new("out", 49.0, 35.0),
        ];

        let results = filter_with_radius(5.0).find_within_radius(&candidates);
        let names: Vec<&str> = results.iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["here", "near", "far"]);
        assert!(results
            .windows(2)
            .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    }

    #[test]
    fn equal_distances_keep_the_input_order() {
        let candidates = vec![
            Candidate::new("second-nearest", 48.4647, 35.0462),
            Candidate::new("first", 48.48, 35.038810),
            Candidate::new("same-spot-1", 48.471207, 35.038810),
            Candidate::new("second", 48.48, 35.038810),
            Candidate::new("same-spot-2", 48.471207, 35.038810),
            Candidate::new("third", 48.48, 35.038810),
        ];

        let results = filter_with_radius(5.0).find_within_radius(&candidates);
        let names: Vec<&str> = results.iter().map(|r| r.name).collect();

        assert_eq!(
            names,
            vec!["same-spot-1", "same-spot-2", "second-nearest", "first", "second", "third"]
        );
    }
}
