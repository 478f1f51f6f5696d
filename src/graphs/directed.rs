use std::collections::VecDeque;

use ndarray::prelude::*;

/// A directed graph over a fixed set of vertex indices `0..n`, backed by an
/// adjacency matrix.
///
/// This carries exactly the operations [`crate::models::Network`] needs to
/// validate closure and acyclicity and to seed a deterministic elimination
/// ordering; it is not a general-purpose graph library.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiGraph {
    adjacency_matrix: Array2<bool>,
}

impl DiGraph {
    /// Creates an edgeless digraph over `n` vertices.
    pub fn empty(n: usize) -> Self {
        Self {
            adjacency_matrix: Array::from_elem((n, n), false),
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn order(&self) -> usize {
        self.adjacency_matrix.nrows()
    }

    /// Adds the edge `x -> y`.
    ///
    /// # Panics
    ///
    /// * If either vertex is out of bounds.
    ///
    pub fn add_edge(&mut self, x: usize, y: usize) {
        assert!(x < self.order(), "Vertex `{x}` is out of bounds");
        assert!(y < self.order(), "Vertex `{y}` is out of bounds");

        self.adjacency_matrix[[x, y]] = true;
    }

    /// Returns the parents of vertex `y`, in ascending index order.
    pub fn parents(&self, y: usize) -> Vec<usize> {
        assert!(y < self.order(), "Vertex `{y}` is out of bounds");

        self.adjacency_matrix
            .column(y)
            .iter()
            .enumerate()
            .filter_map(|(x, &has_edge)| has_edge.then_some(x))
            .collect()
    }

    /// Returns the children of vertex `x`, in ascending index order.
    pub fn children(&self, x: usize) -> Vec<usize> {
        assert!(x < self.order(), "Vertex `{x}` is out of bounds");

        self.adjacency_matrix
            .row(x)
            .iter()
            .enumerate()
            .filter_map(|(y, &has_edge)| has_edge.then_some(y))
            .collect()
    }
}

/// Topological sort trait, implemented via Kahn's algorithm.
pub trait TopologicalOrder {
    /// Returns a topological order of the graph's vertices, or `None` if the
    /// graph contains a cycle.
    fn topological_order(&self) -> Option<Vec<usize>>;
}

impl TopologicalOrder for DiGraph {
    fn topological_order(&self) -> Option<Vec<usize>> {
        // Compute the in-degree of every vertex.
        let mut in_degree: Vec<usize> = self
            .adjacency_matrix
            .mapv(|x| x as usize)
            .sum_axis(Axis(0))
            .to_vec();

        // Seed the queue with the vertices that have no incoming edges.
        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| (d == 0).then_some(i))
            .collect();

        let mut order = Vec::with_capacity(self.order());
        while let Some(x) = queue.pop_front() {
            order.push(x);
            for y in self.children(x) {
                in_degree[y] -= 1;
                if in_degree[y] == 0 {
                    queue.push_back(y);
                }
            }
        }

        (order.len() == self.order()).then_some(order)
    }
}
