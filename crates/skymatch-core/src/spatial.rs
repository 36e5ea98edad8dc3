//! Nearest-neighbour index over points on the unit sphere.
//!
//! A 3-D k-d tree over unit vectors. Euclidean (chord) distance in 3-D is
//! monotonic in great-circle angle, so the nearest chord neighbour is the
//! nearest neighbour on the sky, with no RA wrap-around or polar special cases.

use nalgebra::Vector3;

/// Static k-d tree over unit vectors, built once and queried per target row
#[derive(Debug)]
pub struct SkyTree {
    nodes: Vec<Node>,
    points: Vec<Vector3<f64>>,
}

#[derive(Debug, Clone)]
struct Node {
    point_idx: usize,
    left: Option<usize>,
    right: Option<usize>,
    /// 0 = x, 1 = y, 2 = z
    split_dim: usize,
}

impl SkyTree {
    /// Build a balanced tree by median split. Indices returned by queries
    /// refer to positions in `points`.
    pub fn build(points: &[Vector3<f64>]) -> Self {
        let points = points.to_vec();
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());

        Self::build_recursive(&points, &mut indices, 0, &mut nodes);

        Self { nodes, points }
    }

    fn build_recursive(
        points: &[Vector3<f64>],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<Node>,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let split_dim = depth % 3;
        indices.sort_by(|&a, &b| points[a][split_dim].total_cmp(&points[b][split_dim]));

        let median = indices.len() / 2;
        let node_idx = nodes.len();
        nodes.push(Node {
            point_idx: indices[median],
            left: None,
            right: None,
            split_dim,
        });

        let (left_indices, right_part) = indices.split_at_mut(median);
        let right_indices = &mut right_part[1..];

        let left = Self::build_recursive(points, left_indices, depth + 1, nodes);
        let right = Self::build_recursive(points, right_indices, depth + 1, nodes);

        nodes[node_idx].left = left;
        nodes[node_idx].right = right;

        Some(node_idx)
    }

    /// Nearest point to `query` as `(index, chord_distance)`.
    ///
    /// Equidistant candidates resolve to the lowest index.
    pub fn nearest(&self, query: &Vector3<f64>) -> Option<(usize, f64)> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best = Best {
            idx: usize::MAX,
            dist_sq: f64::INFINITY,
        };
        self.nearest_recursive(0, query, &mut best);

        (best.idx != usize::MAX).then(|| (best.idx, best.dist_sq.sqrt()))
    }

    fn nearest_recursive(&self, node_idx: usize, query: &Vector3<f64>, best: &mut Best) {
        let node = &self.nodes[node_idx];
        let point = &self.points[node.point_idx];

        best.offer(node.point_idx, (query - point).norm_squared());

        let diff = query[node.split_dim] - point[node.split_dim];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(first_idx) = first {
            self.nearest_recursive(first_idx, query, best);
        }

        // `<=` keeps equidistant lower indices reachable across the split plane
        if let Some(second_idx) = second {
            if diff * diff <= best.dist_sq {
                self.nearest_recursive(second_idx, query, best);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

struct Best {
    idx: usize,
    dist_sq: f64,
}

impl Best {
    fn offer(&mut self, idx: usize, dist_sq: f64) {
        if dist_sq < self.dist_sq || (dist_sq == self.dist_sq && idx < self.idx) {
            self.idx = idx;
            self.dist_sq = dist_sq;
        }
    }
}
