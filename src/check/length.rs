use geo::{Geometry, HaversineDistance, Point};
use itertools::Itertools;

use super::Check;
use crate::util::{feature_linestring, segment_linestring};
use crate::{Anomaly, AnomalyKind, Feature};

/// Flags features with an excessive vertex count and features containing
/// segments longer than a configured great-circle distance.
///
/// Both sub-checks need the whole geometry: if any vertex lacks a resolved
/// location the feature is not reliable enough to measure and nothing is
/// reported.
#[derive(Debug, Clone, Copy)]
pub struct LengthCheck {
    max_vertices: usize,
    long_segment_meters: f64,
}

impl LengthCheck {
    pub fn new(max_vertices: usize, long_segment_meters: f64) -> Self {
        LengthCheck {
            max_vertices,
            long_segment_meters,
        }
    }
}

impl Check for LengthCheck {
    fn check(&self, feature: &Feature) -> Vec<Anomaly> {
        if !feature.all_vertices_valid() {
            return Vec::new();
        }
        let mut anomalies = Vec::new();
        if feature.vertices.len() >= self.max_vertices {
            anomalies.push(Anomaly {
                geometry: feature_linestring(feature).map(Geometry::LineString),
                length: Some(feature.vertices.len() as i64),
                tags: feature.tags_string(),
                last_change: feature.last_change.clone(),
                ..Anomaly::new(AnomalyKind::ManyVertices, feature.id)
            });
        }
        let mut long_segment = false;
        for (from, to) in feature
            .vertices
            .iter()
            .filter_map(|vertex| vertex.location)
            .tuple_windows()
        {
            let meters = Point(from).haversine_distance(&Point(to));
            if meters > self.long_segment_meters {
                long_segment = true;
                anomalies.push(Anomaly {
                    geometry: Some(Geometry::LineString(segment_linestring(from, to))),
                    length: Some(meters.round() as i64),
                    last_change: feature.last_change.clone(),
                    ..Anomaly::new(AnomalyKind::LongSegment, feature.id)
                });
            }
        }
        // One record for the whole feature, however many segments tripped.
        if long_segment {
            anomalies.push(Anomaly {
                geometry: feature_linestring(feature).map(Geometry::LineString),
                tags: feature.tags_string(),
                last_change: feature.last_change.clone(),
                ..Anomaly::new(AnomalyKind::LongFeature, feature.id)
            });
        }
        anomalies
    }
}
