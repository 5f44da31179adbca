//! 2D k-d tree for nearest-neighbour lookups over stored points.
//!
//! Used to assign synthetic boundary points the value of their closest
//! existing point. Distances are Euclidean in degree space.

use crate::grid::GeoPoint;

/// A static k-d tree over a slice of points. Indices returned by queries
/// refer to positions in the slice the tree was built from.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<GeoPoint>,
}

#[derive(Debug)]
struct KdNode {
    point_idx: usize,
    /// 0 = latitude, 1 = longitude
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance_sq: f64,
}

impl KdTree {
    /// Build a tree with median splits, alternating latitude/longitude.
    pub fn build(points: &[GeoPoint]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        if !points.is_empty() {
            build_recursive(points, &mut indices, 0, &mut nodes);
        }
        Self {
            nodes,
            points: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest stored point to `(lat, lon)`.
    ///
    /// Equidistant candidates resolve to the lowest index so results do not
    /// depend on tree shape. Returns `None` for an empty tree.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<Nearest> {
        if self.nodes.is_empty() {
            return None;
        }
        let query = GeoPoint::new(lat, lon);
        let mut best = Nearest {
            index: usize::MAX,
            distance_sq: f64::INFINITY,
        };
        // Root is always the first node pushed.
        self.nearest_recursive(0, &query, &mut best);
        Some(best)
    }

    fn nearest_recursive(&self, node_idx: usize, query: &GeoPoint, best: &mut Nearest) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];
        let dist_sq = query.distance_sq(p);

        if dist_sq < best.distance_sq || (dist_sq == best.distance_sq && node.point_idx < best.index) {
            best.distance_sq = dist_sq;
            best.index = node.point_idx;
        }

        let diff = if node.split_dim == 0 {
            query.lat - p.lat
        } else {
            query.lon - p.lon
        };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, query, best);
        }
        // `<=` so equidistant points across the split are still visited.
        if diff * diff <= best.distance_sq {
            if let Some(child) = second {
                self.nearest_recursive(child, query, best);
            }
        }
    }
}

fn build_recursive(
    points: &[GeoPoint],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }

    let split_dim = (depth % 2) as u8;
    let key = |i: &usize| {
        if split_dim == 0 {
            points[*i].lat
        } else {
            points[*i].lon
        }
    };
    indices.sort_by(|a, b| key(a).total_cmp(&key(b)).then(a.cmp(b)));

    let median = indices.len() / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    let (left_slice, rest) = indices.split_at_mut(median);
    let right_slice = &mut rest[1..];

    let left = build_recursive(points, left_slice, depth + 1, nodes);
    let right = build_recursive(points, right_slice, depth + 1, nodes);
    nodes[node_idx].left = left;
    nodes[node_idx].right = right;

    Some(node_idx)
}
