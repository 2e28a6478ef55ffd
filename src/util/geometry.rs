use std::cmp::Ordering;

use geo::{Coord, LineString};
use itertools::Itertools;
use tracing::warn;

use crate::Feature;

fn coord_cmp(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// A path segment whose endpoints are stored in lexicographic (x, then y)
/// order, so two segments covering the same pair of points compare equal
/// regardless of digitization direction. The `Ord` instance sorts a segment
/// list by the leftmost endpoint, which is what allows the x-range cutoff in
/// the self-intersection sweep.
#[derive(Debug, Clone, Copy)]
pub struct UndirectedSegment {
    first: Coord<f64>,
    second: Coord<f64>,
}

impl UndirectedSegment {
    pub fn new(a: Coord<f64>, b: Coord<f64>) -> Self {
        if coord_cmp(&a, &b) == Ordering::Greater {
            UndirectedSegment {
                first: b,
                second: a,
            }
        } else {
            UndirectedSegment {
                first: a,
                second: b,
            }
        }
    }

    pub fn first(&self) -> Coord<f64> {
        self.first
    }

    pub fn second(&self) -> Coord<f64> {
        self.second
    }
}

impl PartialEq for UndirectedSegment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UndirectedSegment {}

impl PartialOrd for UndirectedSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UndirectedSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        coord_cmp(&self.first, &other.first)
            .then_with(|| coord_cmp(&self.second, &other.second))
    }
}

/// Builds the undirected segments of a feature's path. A vertex pair touching
/// an unresolved vertex produces no segment, which shortens the effective path
/// at that point. Zero-length segments (coincident consecutive locations) are
/// excluded as well; they belong to the duplicate-vertex check and would put a
/// zero denominator into the intersection math.
pub fn undirected_segments(feature: &Feature) -> Vec<UndirectedSegment> {
    feature
        .vertices
        .iter()
        .tuple_windows()
        .filter_map(|(a, b)| {
            let (from, to) = (a.location?, b.location?);
            (from != to).then(|| UndirectedSegment::new(from, to))
        })
        .collect()
}

/// True when `later` starts right of `earlier`'s end. In an x-sorted segment
/// list no segment after `later` can reach back to `earlier`.
pub fn outside_x_range(later: &UndirectedSegment, earlier: &UndirectedSegment) -> bool {
    later.first().x > earlier.second().x
}

pub fn y_range_overlap(s1: &UndirectedSegment, s2: &UndirectedSegment) -> bool {
    let tmin = s1.first().y.min(s1.second().y);
    let tmax = s1.first().y.max(s1.second().y);
    let omin = s2.first().y.min(s2.second().y);
    let omax = s2.first().y.max(s2.second().y);
    !(tmin > omax || omin > tmax)
}

/// The interior intersection point of two segments, if any.
///
/// Segments sharing an endpoint meet at a vertex of the path, which is
/// expected and never reported. A zero denominator means the segments are
/// parallel; collinear overlap is not detected here.
pub fn intersection(s1: &UndirectedSegment, s2: &UndirectedSegment) -> Option<Coord<f64>> {
    if s1.first() == s2.first()
        || s1.first() == s2.second()
        || s1.second() == s2.first()
        || s1.second() == s2.second()
    {
        return None;
    }

    let denom = (s2.second().y - s2.first().y) * (s1.second().x - s1.first().x)
        - (s2.second().x - s2.first().x) * (s1.second().y - s1.first().y);
    if denom == 0.0 {
        return None;
    }

    let nume_a = (s2.second().x - s2.first().x) * (s1.first().y - s2.first().y)
        - (s2.second().y - s2.first().y) * (s1.first().x - s2.first().x);
    let nume_b = (s1.second().x - s1.first().x) * (s1.first().y - s2.first().y)
        - (s1.second().y - s1.first().y) * (s1.first().x - s2.first().x);

    let crosses = if denom > 0.0 {
        nume_a >= 0.0 && nume_a <= denom && nume_b >= 0.0 && nume_b <= denom
    } else {
        nume_a <= 0.0 && nume_a >= denom && nume_b <= 0.0 && nume_b >= denom
    };
    if !crosses {
        return None;
    }

    let ua = nume_a / denom;
    Some(Coord {
        x: s1.first().x + ua * (s1.second().x - s1.first().x),
        y: s1.first().y + ua * (s1.second().y - s1.first().y),
    })
}

/// The renderable path of a feature, built from its resolved vertices. At
/// least two points are needed for a line; otherwise the anomaly being built
/// loses its geometry payload.
pub fn feature_linestring(feature: &Feature) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = feature
        .vertices
        .iter()
        .filter_map(|vertex| vertex.location)
        .collect();
    if coords.len() < 2 {
        warn!(
            feature = feature.id,
            "cannot build a path from fewer than two resolved vertices"
        );
        return None;
    }
    Some(LineString::new(coords))
}

pub fn segment_linestring(from: Coord<f64>, to: Coord<f64>) -> LineString<f64> {
    LineString::new(vec![from, to])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use geo::coord;

    fn segment(ax: f64, ay: f64, bx: f64, by: f64) -> UndirectedSegment {
        UndirectedSegment::new(coord! { x: ax, y: ay }, coord! { x: bx, y: by })
    }

    #[test]
    fn endpoints_are_canonicalized() {
        let forward = segment(0.0, 0.0, 1.0, 1.0);
        let backward = segment(1.0, 1.0, 0.0, 0.0);
        assert_eq!(forward, backward);
        assert_eq!(forward.first(), coord! { x: 0.0, y: 0.0 });
    }

    #[test]
    fn sorted_by_leftmost_endpoint() {
        let mut segments = vec![
            segment(2.0, 0.0, 3.0, 0.0),
            segment(0.0, 5.0, 1.0, 5.0),
            segment(0.0, 1.0, 4.0, 1.0),
        ];
        segments.sort_unstable();
        assert_eq!(segments[0].first(), coord! { x: 0.0, y: 1.0 });
        assert_eq!(segments[1].first(), coord! { x: 0.0, y: 5.0 });
        assert_eq!(segments[2].first(), coord! { x: 2.0, y: 0.0 });
    }

    #[test]
    fn segments_skip_unresolved_and_zero_length() {
        let feature = Feature::new(
            1,
            vec![
                Vertex::new(1, coord! { x: 0.0, y: 0.0 }),
                Vertex::unresolved(2),
                Vertex::new(3, coord! { x: 1.0, y: 0.0 }),
                Vertex::new(4, coord! { x: 1.0, y: 0.0 }),
                Vertex::new(5, coord! { x: 2.0, y: 0.0 }),
            ],
        );
        let segments = undirected_segments(&feature);
        // (1,2) and (2,3) span the unresolved vertex, (3,4) has zero length.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], segment(1.0, 0.0, 2.0, 0.0));
    }

    mod intersections {
        use super::*;

        #[test]
        fn crossing_segments_meet_in_the_middle() {
            let s1 = segment(0.0, 0.0, 10.0, 10.0);
            let s2 = segment(0.0, 10.0, 10.0, 0.0);
            assert_eq!(intersection(&s1, &s2), Some(coord! { x: 5.0, y: 5.0 }));
        }

        #[test]
        fn shared_endpoint_is_not_an_intersection() {
            let s1 = segment(0.0, 0.0, 10.0, 10.0);
            let s2 = segment(10.0, 10.0, 20.0, 0.0);
            assert_eq!(intersection(&s1, &s2), None);
        }

        #[test]
        fn parallel_segments_do_not_intersect() {
            let s1 = segment(0.0, 0.0, 10.0, 0.0);
            let s2 = segment(0.0, 1.0, 10.0, 1.0);
            assert_eq!(intersection(&s1, &s2), None);
        }

        #[test]
        fn disjoint_segments_do_not_intersect() {
            let s1 = segment(0.0, 0.0, 1.0, 1.0);
            let s2 = segment(5.0, 5.0, 6.0, 4.0);
            assert_eq!(intersection(&s1, &s2), None);
        }

        #[test]
        fn touching_at_an_interior_point_counts() {
            // s2 ends exactly on s1's interior.
            let s1 = segment(0.0, 0.0, 10.0, 0.0);
            let s2 = segment(5.0, 0.0, 5.0, 5.0);
            assert_eq!(intersection(&s1, &s2), Some(coord! { x: 5.0, y: 0.0 }));
        }
    }

    #[test]
    fn feature_linestring_needs_two_resolved_vertices() {
        let feature = Feature::new(
            1,
            vec![Vertex::new(1, coord! { x: 0.0, y: 0.0 }), Vertex::unresolved(2)],
        );
        assert!(feature_linestring(&feature).is_none());
        let feature = Feature::new(
            2,
            vec![
                Vertex::new(1, coord! { x: 0.0, y: 0.0 }),
                Vertex::unresolved(2),
                Vertex::new(3, coord! { x: 1.0, y: 1.0 }),
            ],
        );
        let line = feature_linestring(&feature).unwrap();
        assert_eq!(line.0.len(), 2);
    }
}
