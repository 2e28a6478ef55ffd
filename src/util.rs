mod geometry;

pub use geometry::{
    feature_linestring, intersection, outside_x_range, segment_linestring, undirected_segments,
    y_range_overlap, UndirectedSegment,
};
