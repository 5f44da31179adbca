//! Delaunay triangulation with point location.
//!
//! Wraps `delaunator` and adds what scattered-data interpolation needs:
//! per-triangle barycentric transforms, neighbour lookup across edges and
//! a directed walk to find the triangle containing a query point.
//!
//! Coordinates are planar `(x, y)`; callers pass `x = lat`, `y = lon`.

use delaunator::{triangulate, Point, EMPTY};

/// Tolerance on barycentric coordinates for points on edges and vertices.
const EPS: f64 = 100.0 * f64::EPSILON;

/// Wider tolerance for the brute-force fallback near the hull.
const EPS_BROAD: f64 = 1.4901161193847656e-8; // sqrt(f64::EPSILON)

/// Affine map from a point to the barycentric coordinates `(b1, b2)` of a
/// triangle; `b0 = 1 - b1 - b2`.
#[derive(Debug, Clone, Copy)]
struct Transform {
    x0: f64,
    y0: f64,
    m00: f64,
    m01: f64,
    m10: f64,
    m11: f64,
}

impl Transform {
    fn new(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2]) -> Option<Self> {
        let (d1x, d1y) = (p1[0] - p0[0], p1[1] - p0[1]);
        let (d2x, d2y) = (p2[0] - p0[0], p2[1] - p0[1]);
        let det = d1x * d2y - d2x * d1y;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self {
            x0: p0[0],
            y0: p0[1],
            m00: d2y / det,
            m01: -d2x / det,
            m10: -d1y / det,
            m11: d1x / det,
        })
    }

    fn barycentric(&self, x: f64, y: f64) -> [f64; 3] {
        let dx = x - self.x0;
        let dy = y - self.y0;
        let b1 = self.m00 * dx + self.m01 * dy;
        let b2 = self.m10 * dx + self.m11 * dy;
        [1.0 - b1 - b2, b1, b2]
    }
}

/// A Delaunay triangulation of a planar point set.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    /// Vertex indices, three per triangle.
    triangles: Vec<usize>,
    /// Opposite half-edge for every half-edge, `EMPTY` on the hull.
    halfedges: Vec<usize>,
    transforms: Vec<Option<Transform>>,
}

impl Triangulation {
    /// Triangulate `points`. Returns `None` when no triangle can be formed
    /// (fewer than three distinct points, or all collinear).
    pub fn new(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let input: Vec<Point> = points.iter().map(|p| Point { x: p[0], y: p[1] }).collect();
        let result = triangulate(&input);
        if result.triangles.is_empty() {
            return None;
        }

        let transforms = result
            .triangles
            .chunks_exact(3)
            .map(|t| Transform::new(points[t[0]], points[t[1]], points[t[2]]))
            .collect();

        Some(Self {
            points: points.to_vec(),
            triangles: result.triangles,
            halfedges: result.halfedges,
            transforms,
        })
    }

    pub fn len(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Vertex indices of a triangle.
    pub fn vertices(&self, tri: usize) -> [usize; 3] {
        let base = 3 * tri;
        [
            self.triangles[base],
            self.triangles[base + 1],
            self.triangles[base + 2],
        ]
    }

    /// Triangle across the edge opposite vertex `k` of `tri`, or `None` on
    /// the convex hull.
    pub fn neighbor(&self, tri: usize, k: usize) -> Option<usize> {
        // Half-edge 3t+j runs from vertex j to vertex j+1, so the edge
        // opposite vertex k is half-edge 3t + (k+1) % 3.
        let edge = 3 * tri + (k + 1) % 3;
        match self.halfedges[edge] {
            EMPTY => None,
            opposite => Some(opposite / 3),
        }
    }

    /// Barycentric coordinates of `(x, y)` with respect to `tri`.
    pub fn barycentric(&self, tri: usize, x: f64, y: f64) -> Option<[f64; 3]> {
        self.transforms[tri].map(|t| t.barycentric(x, y))
    }

    /// Centroid of a triangle.
    pub fn centroid(&self, tri: usize) -> [f64; 2] {
        let [a, b, c] = self.vertices(tri);
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        [(pa[0] + pb[0] + pc[0]) / 3.0, (pa[1] + pb[1] + pc[1]) / 3.0]
    }

    /// Neighbouring vertices of every vertex, sorted and deduplicated.
    /// Vertices that are not part of any triangle get an empty list.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.points.len()];
        for t in self.triangles.chunks_exact(3) {
            for j in 0..3 {
                let v = t[j];
                neighbors[v].push(t[(j + 1) % 3]);
                neighbors[v].push(t[(j + 2) % 3]);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        neighbors
    }

    /// Locate the triangle containing `(x, y)`.
    ///
    /// Walks from `hint` towards the query and falls back to a linear scan
    /// when the walk leaves the hull. Returns the triangle and the
    /// barycentric coordinates of the query with respect to it.
    pub fn find_triangle(&self, x: f64, y: f64, hint: Option<usize>) -> Option<(usize, [f64; 3])> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let start = hint.filter(|&t| t < self.len()).unwrap_or(0);
        if let Some(found) = self.walk(start, x, y) {
            return Some(found);
        }
        self.scan(x, y, EPS).or_else(|| self.scan(x, y, EPS_BROAD))
    }

    fn walk(&self, start: usize, x: f64, y: f64) -> Option<(usize, [f64; 3])> {
        let mut tri = start;
        for _ in 0..self.len() {
            let b = self.barycentric(tri, x, y)?;
            if contains(&b, EPS) {
                return Some((tri, b));
            }
            // Step across the edge opposite the most negative coordinate.
            let mut k = 0;
            for j in 1..3 {
                if b[j] < b[k] {
                    k = j;
                }
            }
            tri = self.neighbor(tri, k)?;
        }
        None
    }

    fn scan(&self, x: f64, y: f64, eps: f64) -> Option<(usize, [f64; 3])> {
        (0..self.len()).find_map(|tri| {
            let b = self.barycentric(tri, x, y)?;
            contains(&b, eps).then_some((tri, b))
        })
    }
}

fn contains(b: &[f64; 3], eps: f64) -> bool {
    b.iter().all(|&c| c >= -eps && c <= 1.0 + eps)
}
