use geo::{Geometry, Point};
use itertools::Itertools;
use tracing::warn;

use super::Check;
use crate::{Anomaly, AnomalyKind, Feature, Vertex};

/// Flags features whose path collapses to a single effective point.
///
/// When this check fires, no other check runs on the feature: duplicates,
/// length and self-intersection are meaningless on a path with no extent.
#[derive(Debug, Default, Clone, Copy)]
pub struct DegenerateCheck;

impl DegenerateCheck {
    /// A feature is degenerate when it has fewer than two resolved vertices,
    /// or when every consecutive pair of resolved vertices coincides in
    /// location or references the same node. Most valid features leave the
    /// loop on the first pair.
    pub fn is_degenerate(feature: &Feature) -> bool {
        let valid: Vec<&Vertex> = feature
            .vertices
            .iter()
            .filter(|vertex| vertex.valid())
            .collect();
        if valid.len() < 2 {
            return true;
        }
        for (a, b) in valid.iter().copied().tuple_windows() {
            if !a.same_location(b) && !a.same_node(b) {
                return false;
            }
        }
        true
    }
}

impl Check for DegenerateCheck {
    fn check(&self, feature: &Feature) -> Vec<Anomaly> {
        if !Self::is_degenerate(feature) {
            return Vec::new();
        }
        let Some(anchor) = feature.vertices.iter().find(|vertex| vertex.valid()) else {
            warn!(
                feature = feature.id,
                "dropping degenerate-feature anomaly: no vertex has a resolved location"
            );
            return Vec::new();
        };
        vec![Anomaly {
            node: anchor.node,
            geometry: anchor.location.map(|location| Geometry::Point(Point(location))),
            tags: feature.tags_string(),
            last_change: feature.last_change.clone(),
            ..Anomaly::new(AnomalyKind::SingleVertexFeature, feature.id)
        }]
    }
}
