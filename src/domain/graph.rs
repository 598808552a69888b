//! Dependency graph for targets
//!
//! Adjacency lists indexed by [`TargetId`], with edges pointing from a
//! dependency to its dependent. Provides cycle detection, topological
//! ordering and reachability. All traversals use explicit stacks, so deep
//! dependency chains cannot overflow the call stack.

use std::collections::{HashSet, VecDeque};
use thiserror::Error;

use super::declarations::Declarations;
use super::target::TargetId;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Unknown vertex: {0}")]
    UnknownVertex(TargetId),

    #[error("Graph contains a dependency cycle")]
    CycleDetected,
}

/// DFS marking used by cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A directed graph over target ids
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Dependents of each vertex (edge source -> targets)
    outgoing: Vec<Vec<TargetId>>,

    /// Dependencies of each vertex (edge target -> sources)
    incoming: Vec<Vec<TargetId>>,

    edge_count: usize,
}

impl DependencyGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` vertices and no edges
    pub fn with_vertices(count: usize) -> Self {
        Self {
            outgoing: vec![Vec::new(); count],
            incoming: vec![Vec::new(); count],
            edge_count: 0,
        }
    }

    /// Builds the graph for parsed declarations
    ///
    /// One vertex per target; for every declared `dependent = dependency`
    /// pair an edge `dependency -> dependent`.
    pub fn from_declarations(declarations: &Declarations) -> Result<Self, GraphError> {
        let mut graph = Self::with_vertices(declarations.len());

        for (dependent, deps) in declarations.dependency_map() {
            for dep in deps {
                graph.add_edge(*dep, dependent)?;
            }
        }

        Ok(graph)
    }

    /// Adds a vertex and returns its id
    pub fn add_vertex(&mut self) -> TargetId {
        let id = TargetId::new(self.outgoing.len());
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds the edge `from -> to`
    ///
    /// Returns `false` if the edge already existed. Self-loops are accepted.
    pub fn add_edge(&mut self, from: TargetId, to: TargetId) -> Result<bool, GraphError> {
        self.check(from)?;
        self.check(to)?;

        if self.outgoing[from.index()].contains(&to) {
            return Ok(false);
        }

        self.outgoing[from.index()].push(to);
        self.incoming[to.index()].push(from);
        self.edge_count += 1;
        Ok(true)
    }

    fn check(&self, id: TargetId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownVertex(id))
        }
    }

    pub fn contains(&self, id: TargetId) -> bool {
        id.index() < self.outgoing.len()
    }

    /// Returns the number of vertices
    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn vertices(&self) -> impl Iterator<Item = TargetId> {
        (0..self.len()).map(TargetId::new)
    }

    /// Iterates over all edges as `(from, to)`
    pub fn edges(&self) -> impl Iterator<Item = (TargetId, TargetId)> + '_ {
        self.outgoing
            .iter()
            .enumerate()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (TargetId::new(from), *to)))
    }

    /// Direct dependencies of a vertex (sources of its incoming edges)
    pub fn dependencies(&self, id: TargetId) -> Result<&[TargetId], GraphError> {
        self.check(id)?;
        Ok(&self.incoming[id.index()])
    }

    /// Direct dependents of a vertex (targets of its outgoing edges)
    pub fn dependents(&self, id: TargetId) -> Result<&[TargetId], GraphError> {
        self.check(id)?;
        Ok(&self.outgoing[id.index()])
    }

    /// Vertices with no incoming edges
    pub fn sources(&self) -> Vec<TargetId> {
        self.vertices()
            .filter(|id| self.incoming[id.index()].is_empty())
            .collect()
    }

    /// Vertices with no outgoing edges
    pub fn leaves(&self) -> Vec<TargetId> {
        self.vertices()
            .filter(|id| self.outgoing[id.index()].is_empty())
            .collect()
    }

    /// Returns true if the graph contains a directed cycle
    ///
    /// Three-color DFS started from every unvisited vertex; reaching an
    /// in-progress vertex again is a back edge. Self-loops count.
    pub fn has_cycle(&self) -> bool {
        let mut marks = vec![Mark::Unvisited; self.len()];
        // (vertex, index of the next outgoing edge to follow)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            marks[root] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(&(vertex, next)) = stack.last() {
                match self.outgoing[vertex].get(next) {
                    Some(succ) => {
                        let top = stack.len() - 1;
                        stack[top].1 += 1;

                        match marks[succ.index()] {
                            Mark::InProgress => return true,
                            Mark::Unvisited => {
                                marks[succ.index()] = Mark::InProgress;
                                stack.push((succ.index(), 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[vertex] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }

        false
    }

    /// Returns all vertices in topological order (dependencies first)
    ///
    /// Kahn's algorithm seeded with the sources in id order, so the result
    /// is deterministic for a given graph. Fails with
    /// [`GraphError::CycleDetected`] if no order exists.
    pub fn topological_order(&self) -> Result<Vec<TargetId>, GraphError> {
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();
        let mut queue: VecDeque<TargetId> = self
            .vertices()
            .filter(|id| in_degree[id.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(vertex) = queue.pop_front() {
            order.push(vertex);

            for succ in &self.outgoing[vertex.index()] {
                let degree = &mut in_degree[succ.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*succ);
                }
            }
        }

        if order.len() == self.len() {
            Ok(order)
        } else {
            Err(GraphError::CycleDetected)
        }
    }

    /// Returns every vertex reachable from `start`, including `start`
    ///
    /// Vertices are listed in DFS discovery order, each once.
    pub fn reachable_from(&self, start: TargetId) -> Result<Vec<TargetId>, GraphError> {
        self.check(start)?;

        // Proportional to the reached set, not the graph
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        let mut reached = Vec::new();

        while let Some(vertex) = stack.pop() {
            reached.push(vertex);

            for succ in self.outgoing[vertex.index()].iter().rev() {
                if seen.insert(*succ) {
                    stack.push(*succ);
                }
            }
        }

        Ok(reached)
    }
}
