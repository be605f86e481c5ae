//! Turns Overpass ways and relations into a single GeoJSON trail record.
//!
//! A way contributes one line; a relation contributes one line per way member
//! carrying at least two points, in member order. Lines are never merged,
//! reordered or deduplicated, so a multi-line trail's `start`/`end` are only
//! the first point of the first line and the last point of the last line.

use shared::{ElementKind, Geometry, LngLat, NormalizedTrail, Position};

use crate::overpass::{MemberKind, OsmRef, OverpassElement, Relation, Tags, Way};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TrailError {
    #[error("way {0} has fewer than two geometry points")]
    InsufficientGeometry(u64),
    #[error("no geometry: relation {0} has no member ways with geometry")]
    NoGeometry(u64),
    #[error("{0} not found")]
    NotFound(OsmRef),
}

/// First non-empty of `name`, `ref`, `route`, else `Trail <kind>/<id>`.
pub fn resolve_name(tags: &Tags, osm_ref: OsmRef) -> String {
    ["name", "ref", "route"]
        .iter()
        .filter_map(|key| tags.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("Trail {osm_ref}"))
}

fn way_line(way: &Way) -> Option<Vec<Position>> {
    (way.geometry.len() >= 2).then(|| way.geometry.iter().map(|p| p.position()).collect())
}

fn relation_lines(relation: &Relation) -> Vec<Vec<Position>> {
    relation
        .members
        .iter()
        .filter(|member| member.kind == MemberKind::Way && member.geometry.len() >= 2)
        .map(|member| member.geometry.iter().map(|p| p.position()).collect())
        .collect()
}

/// Every qualifying line of `element`, each with at least two points.
pub fn extract_lines(element: &OverpassElement) -> Vec<Vec<Position>> {
    match element {
        OverpassElement::Way(way) => way_line(way).into_iter().collect(),
        OverpassElement::Relation(relation) => relation_lines(relation),
    }
}

fn assemble(mut lines: Vec<Vec<Position>>) -> Option<Geometry> {
    match lines.len() {
        0 => None,
        1 => lines.pop().map(Geometry::LineString),
        _ => Some(Geometry::MultiLineString(lines)),
    }
}

/// First and last point of the geometry. Lines always hold two or more points.
pub fn endpoints(geometry: &Geometry) -> Option<(LngLat, LngLat)> {
    let (first, last) = match geometry {
        Geometry::LineString(line) => (line.first()?, line.last()?),
        Geometry::MultiLineString(lines) => (lines.first()?.first()?, lines.last()?.last()?),
    };
    Some((LngLat::from(*first), LngLat::from(*last)))
}

pub fn normalize(element: &OverpassElement) -> Result<NormalizedTrail, TrailError> {
    let osm_ref = element.osm_ref();
    let missing = || match osm_ref.kind {
        ElementKind::Way => TrailError::InsufficientGeometry(osm_ref.id),
        ElementKind::Relation => TrailError::NoGeometry(osm_ref.id),
    };

    let geometry = assemble(extract_lines(element)).ok_or_else(missing)?;
    let (start, end) = endpoints(&geometry).ok_or_else(missing)?;

    Ok(NormalizedTrail {
        name: resolve_name(element.tags(), osm_ref),
        geometry,
        start,
        end,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::overpass::{LatLon, Member, MemberKind, Relation, Tags, Way};

    pub fn points(coords: &[(f64, f64)]) -> Vec<LatLon> {
        coords.iter().map(|&(lon, lat)| LatLon { lat, lon }).collect()
    }

    pub fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn way(id: u64, coords: &[(f64, f64)]) -> Way {
        Way {
            id,
            geometry: points(coords),
            tags: Tags::new(),
        }
    }

    pub fn way_member(id: u64, coords: &[(f64, f64)]) -> Member {
        Member {
            kind: MemberKind::Way,
            id,
            role: String::new(),
            geometry: points(coords),
        }
    }

    pub fn node_member(id: u64) -> Member {
        Member {
            kind: MemberKind::Node,
            id,
            role: "guidepost".into(),
            geometry: Vec::new(),
        }
    }

    pub fn relation(id: u64, members: Vec<Member>) -> Relation {
        Relation {
            id,
            members,
            tags: Tags::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn way_becomes_line_string() {
        let element = OverpassElement::Way(way(7, &[(5.0, 45.0), (5.1, 45.1), (5.2, 45.3)]));
        let trail = normalize(&element).unwrap();

        assert_eq!(
            trail.geometry,
            Geometry::LineString(vec![[5.0, 45.0], [5.1, 45.1], [5.2, 45.3]])
        );
        assert_eq!(trail.start, LngLat::new(5.0, 45.0));
        assert_eq!(trail.end, LngLat::new(5.2, 45.3));
        assert_eq!(trail.name, "Trail way/7");
    }

    #[test]
    fn short_way_has_insufficient_geometry() {
        let empty = OverpassElement::Way(way(1, &[]));
        let single = OverpassElement::Way(way(2, &[(5.0, 45.0)]));

        assert_eq!(normalize(&empty), Err(TrailError::InsufficientGeometry(1)));
        assert_eq!(normalize(&single), Err(TrailError::InsufficientGeometry(2)));
    }

    #[test]
    fn relation_with_two_ways_keeps_member_order() {
        let element = OverpassElement::Relation(relation(
            999,
            vec![
                way_member(1, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
                way_member(2, &[(10.0, 10.0), (11.0, 11.0)]),
            ],
        ));
        let trail = normalize(&element).unwrap();

        let Geometry::MultiLineString(lines) = &trail.geometry else {
            panic!("expected MultiLineString, got {:?}", trail.geometry);
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 3);
        assert_eq!(lines[1].len(), 2);
        assert_eq!(trail.start, LngLat::new(0.0, 0.0));
        assert_eq!(trail.end, LngLat::new(11.0, 11.0));
    }

    #[test]
    fn relation_skips_nodes_and_short_members() {
        let element = OverpassElement::Relation(relation(
            5,
            vec![
                node_member(100),
                way_member(1, &[(0.0, 0.0)]),
                way_member(2, &[(3.0, 4.0), (5.0, 6.0)]),
            ],
        ));
        let trail = normalize(&element).unwrap();

        assert_eq!(
            trail.geometry,
            Geometry::LineString(vec![[3.0, 4.0], [5.0, 6.0]])
        );
        assert_eq!(trail.start, LngLat::new(3.0, 4.0));
        assert_eq!(trail.end, LngLat::new(5.0, 6.0));
    }

    #[test]
    fn relation_without_usable_members_has_no_geometry() {
        let element = OverpassElement::Relation(relation(
            8,
            vec![node_member(1), way_member(2, &[(1.0, 1.0)])],
        ));
        assert_eq!(normalize(&element), Err(TrailError::NoGeometry(8)));

        let empty = OverpassElement::Relation(relation(9, Vec::new()));
        assert_eq!(normalize(&empty), Err(TrailError::NoGeometry(9)));
    }

    #[test]
    fn name_precedence() {
        let osm_ref = OsmRef::relation(12);

        assert_eq!(
            resolve_name(&tags(&[("name", "Bruce Trail"), ("ref", "BT")]), osm_ref),
            "Bruce Trail"
        );
        assert_eq!(resolve_name(&tags(&[("ref", "BT")]), osm_ref), "BT");
        assert_eq!(resolve_name(&tags(&[("route", "hiking")]), osm_ref), "hiking");
        assert_eq!(resolve_name(&tags(&[("highway", "path")]), osm_ref), "Trail relation/12");
    }

    #[test]
    fn empty_tag_values_are_skipped() {
        let osm_ref = OsmRef::way(3);
        assert_eq!(resolve_name(&tags(&[("name", ""), ("ref", "GR5")]), osm_ref), "GR5");
        assert_eq!(resolve_name(&tags(&[("name", "")]), osm_ref), "Trail way/3");
    }

    #[test]
    fn normalize_is_repeatable() {
        let mut relation = relation(4, vec![way_member(1, &[(0.0, 0.0), (1.0, 1.0)])]);
        relation.tags = tags(&[("name", "Loop")]);
        let element = OverpassElement::Relation(relation);

        assert_eq!(normalize(&element), normalize(&element));
        assert_eq!(normalize(&element).unwrap().name, "Loop");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coords(min: usize, max: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
            prop::collection::vec((-180.0..=180.0, -90.0..=90.0), min..max)
        }

        proptest! {
            #[test]
            fn prop_way_preserves_points_in_order(id in any::<u64>(), pts in coords(2, 50)) {
                let trail = normalize(&OverpassElement::Way(way(id, &pts))).unwrap();
                let expected: Vec<Position> = pts.iter().map(|&(lon, lat)| [lon, lat]).collect();

                prop_assert_eq!(&trail.geometry, &Geometry::LineString(expected.clone()));
                prop_assert_eq!(trail.start, LngLat::from(expected[0]));
                prop_assert_eq!(trail.end, LngLat::from(expected[expected.len() - 1]));
            }

            #[test]
            fn prop_relation_line_count_matches_qualifying_members(
                lines in prop::collection::vec(coords(0, 6), 0..8)
            ) {
                let members = lines
                    .iter()
                    .enumerate()
                    .map(|(i, pts)| way_member(i as u64, pts))
                    .collect();
                let qualifying = lines.iter().filter(|pts| pts.len() >= 2).count();
                let result = normalize(&OverpassElement::Relation(relation(1, members)));

                match result {
                    Ok(trail) => {
                        prop_assert_eq!(trail.geometry.line_count(), qualifying);
                        prop_assert_eq!(
                            matches!(trail.geometry, Geometry::MultiLineString(_)),
                            qualifying > 1
                        );
                    }
                    Err(err) => {
                        prop_assert_eq!(qualifying, 0);
                        prop_assert_eq!(err, TrailError::NoGeometry(1));
                    }
                }
            }
        }
    }
}
