use geo::{Coord, Geometry, Point};

use super::Check;
use crate::util::{
    feature_linestring, intersection, outside_x_range, undirected_segments, y_range_overlap,
};
use crate::{Anomaly, AnomalyKind, Feature};

/// Finds places where a feature's path crosses or retraces itself.
///
/// The undirected segments of the path are sorted and swept pairwise. Two
/// equal segments mean the path runs over the same stretch twice; two
/// crossing segments yield the computed intersection point. Sorting lets the
/// inner loop stop as soon as a candidate starts past the current segment's
/// x-extent, which keeps the sweep sub-quadratic on real data. The feature
/// itself is flagged at most once, however many crossings it has.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfIntersectionCheck;

impl SelfIntersectionCheck {
    fn feature_anomaly(feature: &Feature) -> Anomaly {
        Anomaly {
            geometry: feature_linestring(feature).map(Geometry::LineString),
            tags: feature.tags_string(),
            ..Anomaly::new(AnomalyKind::SelfIntersectingFeature, feature.id)
        }
    }

    fn point_anomaly(feature: &Feature, location: Coord<f64>) -> Anomaly {
        Anomaly {
            geometry: Some(Geometry::Point(Point(location))),
            ..Anomaly::new(AnomalyKind::SelfIntersectionPoint, feature.id)
        }
    }
}

impl Check for SelfIntersectionCheck {
    fn check(&self, feature: &Feature) -> Vec<Anomaly> {
        let mut segments = undirected_segments(feature);
        // A single segment cannot intersect itself.
        if segments.len() < 2 {
            return Vec::new();
        }
        segments.sort_unstable();
        let mut anomalies = Vec::new();
        let mut already_flagged = false;
        for i in 0..segments.len() - 1 {
            for j in i + 1..segments.len() {
                let (s1, s2) = (&segments[i], &segments[j]);
                if s1 == s2 {
                    // The path retraces this segment; both endpoints count as
                    // intersection points.
                    if !already_flagged {
                        anomalies.push(Self::feature_anomaly(feature));
                        already_flagged = true;
                    }
                    anomalies.push(Self::point_anomaly(feature, s1.first()));
                    anomalies.push(Self::point_anomaly(feature, s1.second()));
                } else {
                    if outside_x_range(s2, s1) {
                        break;
                    }
                    if y_range_overlap(s1, s2) {
                        if let Some(location) = intersection(s1, s2) {
                            if !already_flagged {
                                anomalies.push(Self::feature_anomaly(feature));
                                already_flagged = true;
                            }
                            anomalies.push(Self::point_anomaly(feature, location));
                        }
                    }
                }
            }
        }
        anomalies
    }
}
