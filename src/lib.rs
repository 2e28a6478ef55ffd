use geo::Coord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod check;
pub mod config;
pub mod report;
pub mod util;

pub use check::{
    Check, DegenerateCheck, DuplicateVertexCheck, LengthCheck, SelfIntersectionCheck,
};
pub use config::Config;
pub use report::{AnomalyReporter, JsonLinesReporter, MemoryReporter};

/// Maximum length of the concatenated tag string attached to an anomaly.
pub const MAX_FIELD_LENGTH: usize = 254;

/// One point of a feature's path.
///
/// `location` is `None` when the upstream coordinate resolution step could not
/// attach a position to this vertex; such vertices never take part in a
/// segment. `node` is the upstream node identifier and may be absent for
/// synthetic vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub node: Option<i64>,
    pub location: Option<Coord<f64>>,
}

impl Vertex {
    pub fn new(node: i64, location: Coord<f64>) -> Self {
        Vertex {
            node: Some(node),
            location: Some(location),
        }
    }

    pub fn synthetic(location: Coord<f64>) -> Self {
        Vertex {
            node: None,
            location: Some(location),
        }
    }

    /// A vertex whose coordinate resolution failed.
    pub fn unresolved(node: i64) -> Self {
        Vertex {
            node: Some(node),
            location: None,
        }
    }

    pub fn valid(&self) -> bool {
        self.location.is_some()
    }

    /// True when both vertices reference the same upstream node.
    pub fn same_node(&self, other: &Vertex) -> bool {
        matches!((self.node, other.node), (Some(a), Some(b)) if a == b)
    }

    /// True when both locations are resolved and bit-identical. Two locations
    /// differ as soon as either the longitude or the latitude differs.
    pub fn same_location(&self, other: &Vertex) -> bool {
        matches!(
            (self.location, other.location),
            (Some(a), Some(b)) if a.x == b.x && a.y == b.y
        )
    }
}

/// A linear geographic feature: an ordered vertex sequence with opaque
/// attributes. Coordinates use `x` for longitude and `y` for latitude.
/// Features are immutable during validation and carry no state between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub vertices: Vec<Vertex>,
    /// Upstream last-modification timestamp (ISO 8601), copied verbatim onto
    /// anomaly records.
    pub last_change: Option<String>,
    /// Opaque key/value attributes; not interpreted by any check.
    pub tags: Vec<(String, String)>,
}

impl Feature {
    pub fn new(id: i64, vertices: Vec<Vertex>) -> Self {
        Feature {
            id,
            vertices,
            last_change: None,
            tags: Vec::new(),
        }
    }

    pub fn all_vertices_valid(&self) -> bool {
        for vertex in &self.vertices {
            if !vertex.valid() {
                debug!(
                    feature = self.id,
                    node = vertex.node,
                    "vertex without a resolved location"
                );
                return false;
            }
        }
        true
    }

    /// Concatenates the feature's tags as `key=value` pairs separated by `|`.
    /// Pairs whose key and value together reach 50 characters are skipped, and
    /// the result always stays below [`MAX_FIELD_LENGTH`]. `None` when no tag
    /// qualifies.
    pub fn tags_string(&self) -> Option<String> {
        let mut tag_str = String::new();
        for (key, value) in &self.tags {
            let add_length = key.len() + value.len() + 2;
            if add_length < 50 && tag_str.len() + add_length < MAX_FIELD_LENGTH {
                tag_str.push_str(key);
                tag_str.push('=');
                tag_str.push_str(value);
                tag_str.push('|');
            }
        }
        tag_str.pop();
        (!tag_str.is_empty()).then_some(tag_str)
    }
}

/// The classes of geometry anomaly reported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    ManyVertices,
    LongSegment,
    LongFeature,
    SingleVertexFeature,
    DuplicateVertex,
    DuplicateVertexFeature,
    SelfIntersectingFeature,
    SelfIntersectionPoint,
}

impl AnomalyKind {
    /// Name of the output layer this kind is rendered into. Point-level and
    /// feature-level records of the same check go to separate layers.
    pub fn layer_name(&self) -> &'static str {
        match self {
            AnomalyKind::ManyVertices => "geometry_long_features",
            AnomalyKind::LongSegment => "geometry_long_segments",
            AnomalyKind::LongFeature => "geometry_long_segment_features",
            AnomalyKind::SingleVertexFeature => "geometry_single_vertex_features",
            AnomalyKind::DuplicateVertex => "geometry_duplicate_vertex_points",
            AnomalyKind::DuplicateVertexFeature => "geometry_duplicate_vertex_features",
            AnomalyKind::SelfIntersectingFeature => "geometry_self_intersection_features",
            AnomalyKind::SelfIntersectionPoint => "geometry_self_intersection_points",
        }
    }
}

/// A single detected anomaly, consumed by an [`AnomalyReporter`].
///
/// `geometry` is the renderable payload (a point or the feature's path) and
/// may be absent when it could not be built from the resolved vertices; the
/// detection itself is still valid in that case. `length` carries the vertex
/// count for [`AnomalyKind::ManyVertices`] and the rounded distance in meters
/// for [`AnomalyKind::LongSegment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub feature: i64,
    pub node: Option<i64>,
    pub geometry: Option<geo::Geometry<f64>>,
    pub length: Option<i64>,
    pub tags: Option<String>,
    pub last_change: Option<String>,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, feature: i64) -> Self {
        Anomaly {
            kind,
            feature,
            node: None,
            geometry: None,
            length: None,
            tags: None,
            last_change: None,
        }
    }
}

/// Runs every geometry check on a feature stream.
///
/// Features are independent, so [`GeometryChecker::check_features`] shards
/// them across the rayon thread pool; within one feature the anomalies keep
/// the emission order of the checks.
#[derive(Debug, Clone)]
pub struct GeometryChecker {
    length: LengthCheck,
    duplicate: DuplicateVertexCheck,
    self_intersection: SelfIntersectionCheck,
}

impl GeometryChecker {
    pub fn new(config: &Config) -> Self {
        GeometryChecker {
            length: LengthCheck::new(config.max_vertices, config.long_segment_meters),
            duplicate: DuplicateVertexCheck,
            self_intersection: SelfIntersectionCheck,
        }
    }

    /// Checks one feature. A feature without vertices is skipped silently; a
    /// degenerate feature is reported once and skips every other check.
    pub fn check_feature(&self, feature: &Feature) -> Vec<Anomaly> {
        if feature.vertices.is_empty() {
            return Vec::new();
        }
        if DegenerateCheck::is_degenerate(feature) {
            return DegenerateCheck.check(feature);
        }
        let mut anomalies = self.length.check(feature);
        anomalies.extend(self.duplicate.check(feature));
        anomalies.extend(self.self_intersection.check(feature));
        if !anomalies.is_empty() {
            debug!(
                feature = feature.id,
                count = anomalies.len(),
                "feature has geometry anomalies"
            );
        }
        anomalies
    }

    /// Checks a batch of features in parallel. The result keeps the features'
    /// order: all anomalies of one feature appear before those of the next.
    pub fn check_features(&self, features: &[Feature]) -> Vec<Anomaly> {
        features
            .par_iter()
            .flat_map_iter(|feature| self.check_feature(feature))
            .collect()
    }

    /// Checks a batch of features and forwards every anomaly to the sink.
    pub fn run<R: AnomalyReporter>(&self, features: &[Feature], reporter: &mut R) {
        for anomaly in self.check_features(features) {
            reporter.report(anomaly);
        }
    }
}

impl Default for GeometryChecker {
    fn default() -> Self {
        GeometryChecker::new(&Config::default())
    }
}
