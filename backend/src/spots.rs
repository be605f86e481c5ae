use std::collections::HashSet;

use shared::{HikeSpot, LngLat, Position};

use crate::normalize::{extract_lines, resolve_name};
use crate::overpass::OverpassElement;

/// Upper bound on spots returned by one listing.
pub const MAX_SPOTS: usize = 60;

/// Unweighted mean of the points. Not a true line centroid.
pub fn centroid(points: &[Position]) -> Option<LngLat> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lng, lat) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), [lng, lat]| (x + lng, y + lat));
    Some(LngLat::new(lng / n, lat / n))
}

/// Reduces elements to at most [`MAX_SPOTS`] spots in scan order.
///
/// Elements without a usable line are skipped, and only the first usable
/// occurrence of each `(kind, id)` is kept. The spot center is the centroid
/// of the element's first line only.
pub fn reduce_spots<'a, I>(elements: I) -> Vec<HikeSpot>
where
    I: IntoIterator<Item = &'a OverpassElement>,
{
    let mut seen = HashSet::new();
    let mut spots = Vec::new();

    for element in elements {
        let lines = extract_lines(element);
        let Some(center) = lines.first().and_then(|line| centroid(line)) else {
            continue;
        };

        let osm_ref = element.osm_ref();
        if !seen.insert(osm_ref) {
            continue;
        }

        spots.push(HikeSpot {
            id: osm_ref.to_string(),
            name: resolve_name(element.tags(), osm_ref),
            center,
            kind: osm_ref.kind,
        });

        if spots.len() >= MAX_SPOTS {
            break;
        }
    }

    spots
}

#[cfg(test)]
mod tests {
    use shared::ElementKind;

    use super::*;
    use crate::normalize::fixtures::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn centroid_is_unweighted_mean() {
        let center = centroid(&[[0.0, 0.0], [2.0, 0.0], [1.0, 2.0]]).unwrap();
        assert!(close(center.lng, 1.0));
        assert!(close(center.lat, 0.6667));
    }

    #[test]
    fn centroid_of_nothing() {
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn caps_at_sixty() {
        let elements: Vec<_> = (0..70)
            .map(|id| OverpassElement::Way(way(id, &[(0.0, 0.0), (1.0, 1.0)])))
            .collect();

        let spots = reduce_spots(&elements);
        assert_eq!(spots.len(), MAX_SPOTS);
        assert_eq!(spots[0].id, "way/0");
        assert_eq!(spots[59].id, "way/59");
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut first = way(1, &[(0.0, 0.0), (2.0, 2.0)]);
        first.tags = tags(&[("name", "First")]);
        let mut second = way(1, &[(10.0, 10.0), (12.0, 12.0)]);
        second.tags = tags(&[("name", "Second")]);

        let spots = reduce_spots(&[OverpassElement::Way(first), OverpassElement::Way(second)]);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].name, "First");
        assert_eq!(spots[0].center, LngLat::new(1.0, 1.0));
    }

    #[test]
    fn same_id_different_kind_is_distinct() {
        let elements = [
            OverpassElement::Way(way(5, &[(0.0, 0.0), (1.0, 1.0)])),
            OverpassElement::Relation(relation(5, vec![way_member(9, &[(0.0, 0.0), (1.0, 1.0)])])),
        ];
        let spots = reduce_spots(&elements);
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].kind, ElementKind::Way);
        assert_eq!(spots[1].kind, ElementKind::Relation);
        assert_eq!(spots[1].id, "relation/5");
    }

    #[test]
    fn skips_elements_without_lines() {
        let elements = [
            OverpassElement::Way(way(1, &[(0.0, 0.0)])),
            OverpassElement::Relation(relation(2, vec![node_member(3)])),
            OverpassElement::Way(way(4, &[(0.0, 0.0), (4.0, 0.0)])),
        ];
        let spots = reduce_spots(&elements);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].id, "way/4");
        assert_eq!(spots[0].name, "Trail way/4");
    }

    #[test]
    fn relation_center_uses_first_member_only() {
        let mut hiking = relation(
            7,
            vec![
                node_member(1),
                way_member(2, &[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]),
                way_member(3, &[(100.0, 50.0), (101.0, 51.0)]),
            ],
        );
        hiking.tags = tags(&[("ref", "GR5"), ("route", "hiking")]);

        let spots = reduce_spots(&[OverpassElement::Relation(hiking)]);
        assert_eq!(spots[0].name, "GR5");
        assert!(close(spots[0].center.lng, 1.0));
        assert!(close(spots[0].center.lat, 0.6667));
    }

    #[test]
    fn unqualified_duplicate_does_not_shadow_later_one() {
        let elements = [
            OverpassElement::Way(way(1, &[(0.0, 0.0)])),
            OverpassElement::Way(way(1, &[(0.0, 0.0), (2.0, 0.0)])),
        ];
        let spots = reduce_spots(&elements);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].center, LngLat::new(1.0, 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_centroid_within_bounds(
                pts in prop::collection::vec((-180.0f64..=180.0, -90.0f64..=90.0), 1..40)
            ) {
                let positions: Vec<Position> = pts.iter().map(|&(lng, lat)| [lng, lat]).collect();
                let center = centroid(&positions).unwrap();
                let min_lng = pts.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
                let max_lng = pts.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
                let min_lat = pts.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
                let max_lat = pts.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

                prop_assert!(center.lng >= min_lng - 1e-9 && center.lng <= max_lng + 1e-9);
                prop_assert!(center.lat >= min_lat - 1e-9 && center.lat <= max_lat + 1e-9);
            }

            #[test]
            fn prop_spots_unique_and_capped(ids in prop::collection::vec(0u64..100, 0..200)) {
                let elements: Vec<_> = ids
                    .iter()
                    .map(|&id| OverpassElement::Way(way(id, &[(0.0, 0.0), (1.0, 1.0)])))
                    .collect();
                let spots = reduce_spots(&elements);
                let unique: HashSet<_> = spots.iter().map(|s| s.id.clone()).collect();

                prop_assert!(spots.len() <= MAX_SPOTS);
                prop_assert_eq!(unique.len(), spots.len());
            }
        }
    }
}
