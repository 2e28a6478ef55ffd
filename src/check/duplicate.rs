use geo::{Geometry, Point};
use itertools::Itertools;

use super::Check;
use crate::util::feature_linestring;
use crate::{Anomaly, AnomalyKind, Feature};

/// Flags consecutive vertices that coincide, either by referencing the same
/// node or by resolving to bit-identical locations.
///
/// Every duplicate pair yields a point record; the whole feature is flagged
/// once, on the first pair found.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicateVertexCheck;

impl Check for DuplicateVertexCheck {
    fn check(&self, feature: &Feature) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        let mut already_flagged = false;
        for (a, b) in feature.vertices.iter().tuple_windows() {
            if !a.valid() || !b.valid() {
                continue;
            }
            if a.same_node(b) || a.same_location(b) {
                anomalies.push(Anomaly {
                    node: a.node,
                    geometry: a.location.map(|location| Geometry::Point(Point(location))),
                    last_change: feature.last_change.clone(),
                    ..Anomaly::new(AnomalyKind::DuplicateVertex, feature.id)
                });
                if !already_flagged {
                    anomalies.push(Anomaly {
                        node: a.node,
                        geometry: feature_linestring(feature).map(Geometry::LineString),
                        tags: feature.tags_string(),
                        last_change: feature.last_change.clone(),
                        ..Anomaly::new(AnomalyKind::DuplicateVertexFeature, feature.id)
                    });
                }
                already_flagged = true;
            }
        }
        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use geo::coord;

    fn vertex(node: i64, x: f64, y: f64) -> Vertex {
        Vertex::new(node, coord! { x: x, y: y })
    }

    fn kinds(anomalies: &[Anomaly]) -> Vec<AnomalyKind> {
        anomalies.iter().map(|anomaly| anomaly.kind).collect()
    }

    #[test]
    fn coincident_locations_are_duplicates() {
        let feature = Feature::new(
            1,
            vec![vertex(1, 9.0, 48.0), vertex(2, 9.0, 48.0), vertex(3, 9.5, 48.5)],
        );
        let anomalies = DuplicateVertexCheck.check(&feature);
        assert_eq!(
            kinds(&anomalies),
            vec![
                AnomalyKind::DuplicateVertex,
                AnomalyKind::DuplicateVertexFeature,
            ]
        );
        assert_eq!(anomalies[0].node, Some(1));
        assert_eq!(
            anomalies[0].geometry,
            Some(Geometry::Point(Point::new(9.0, 48.0)))
        );
    }

    #[test]
    fn repeated_node_is_a_duplicate() {
        let feature = Feature::new(
            1,
            vec![vertex(7, 9.0, 48.0), vertex(7, 9.1, 48.1), vertex(8, 9.5, 48.5)],
        );
        assert_eq!(
            kinds(&DuplicateVertexCheck.check(&feature)),
            vec![
                AnomalyKind::DuplicateVertex,
                AnomalyKind::DuplicateVertexFeature,
            ]
        );
    }

    #[test]
    fn feature_flagged_only_once() {
        let feature = Feature::new(
            1,
            vec![
                vertex(1, 9.0, 48.0),
                vertex(1, 9.0, 48.0),
                vertex(2, 9.5, 48.5),
                vertex(2, 9.5, 48.5),
            ],
        );
        assert_eq!(
            kinds(&DuplicateVertexCheck.check(&feature)),
            vec![
                AnomalyKind::DuplicateVertex,
                AnomalyKind::DuplicateVertexFeature,
                AnomalyKind::DuplicateVertex,
            ]
        );
    }

    #[test]
    fn distinct_consecutive_vertices_are_silent() {
        let feature = Feature::new(
            1,
            vec![vertex(1, 9.0, 48.0), vertex(2, 9.1, 48.0), vertex(3, 9.2, 48.1)],
        );
        assert!(DuplicateVertexCheck.check(&feature).is_empty());
    }

    #[test]
    fn pairs_spanning_an_unresolved_vertex_are_not_compared() {
        let feature = Feature::new(
            1,
            vec![
                vertex(1, 9.0, 48.0),
                Vertex::unresolved(2),
                vertex(3, 9.0, 48.0),
            ],
        );
        assert!(DuplicateVertexCheck.check(&feature).is_empty());
    }
}
