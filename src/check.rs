mod degenerate;
mod duplicate;
mod length;
mod self_intersection;

pub use degenerate::DegenerateCheck;
pub use duplicate::DuplicateVertexCheck;
pub use length::LengthCheck;
pub use self_intersection::SelfIntersectionCheck;

use crate::{Anomaly, Feature};

/// A single geometry check.
///
/// Checks are pure: the same feature always yields the same anomalies in the
/// same order, and no state survives between features, so a feature stream can
/// be sharded across threads freely.
pub trait Check {
    fn check(&self, feature: &Feature) -> Vec<Anomaly>;
}
