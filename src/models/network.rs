use crate::graphs::{DiGraph, TopologicalOrder};
use crate::models::factor::Factor;
use crate::models::node::{Domain, Node};
use crate::types::{Error, Map, Result, Set};

/// A Bayesian network over a fixed set of named, possibly heterogeneous
/// (continuous or discrete) variables.
///
/// Construction validates that parent references resolve, that variable
/// names are unique, and that the induced graph is acyclic; once built, a
/// [`Network`] is immutable.
#[derive(Clone, Debug)]
pub struct Network {
    nodes: Map<Node>,
    graph: DiGraph,
    topological_order: Vec<usize>,
    system_parameter_names: Set<String>,
}

impl Network {
    /// Builds a network from its nodes.
    ///
    /// # Raises
    ///
    /// * [`Error::DuplicateNode`] if two nodes share a variable name.
    /// * [`Error::UnknownParent`] if a node references a parent that is not
    ///   among the given nodes.
    /// * [`Error::NotDAG`] if the induced graph contains a cycle.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut by_name: Map<Node> = Map::default();
        for node in nodes {
            let name = node.variable_name().to_string();
            if by_name.contains_key(&name) {
                return Err(Error::DuplicateNode(name));
            }
            by_name.insert(name, node);
        }

        let index_of: Map<usize> = by_name
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let mut graph = DiGraph::empty(by_name.len());
        for (name, node) in &by_name {
            let y = index_of[name];
            for parent in node.parent_variable_names() {
                let &x = index_of
                    .get(parent)
                    .ok_or_else(|| Error::UnknownParent(parent.clone(), name.clone()))?;
                graph.add_edge(x, y);
            }
        }

        let topological_order = graph.topological_order().ok_or(Error::NotDAG)?;
        log::debug!(
            "built network over {} variables, topological order {:?}",
            by_name.len(),
            topological_order
        );

        let mut system_parameter_names = Set::default();
        for node in by_name.values() {
            system_parameter_names.extend(node.system_parameter_names().iter().cloned());
        }

        Ok(Self {
            nodes: by_name,
            graph,
            topological_order,
            system_parameter_names,
        })
    }

    /// Returns the number of variables in the network.
    #[inline]
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the names of the network's variables, in insertion order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Returns the node named `variable_name`, if any.
    pub fn node(&self, variable_name: &str) -> Option<&Node> {
        self.nodes.get(variable_name)
    }

    /// Returns the set of system parameter names referenced by any node in
    /// the network.
    #[inline]
    pub fn system_parameter_names(&self) -> &Set<String> {
        &self.system_parameter_names
    }

    fn domains(&self) -> Map<Domain> {
        self.nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.domain().clone()))
            .collect()
    }

    fn validate_complete_assignment(&self, variables: &Map<f64>, theta: &Map<f64>) -> Result<()> {
        for name in self.nodes.keys() {
            if !variables.contains_key(name) {
                return Err(Error::UnknownVariable(name.clone()));
            }
        }
        for name in &self.system_parameter_names {
            if !theta.contains_key(name) {
                return Err(Error::UnknownParameter(name.clone()));
            }
        }
        for (name, node) in &self.nodes {
            let x = variables[name];
            if !node.domain().contains(x) {
                return Err(Error::DomainViolation(x, name.clone()));
            }
        }
        Ok(())
    }

    /// Evaluates the joint density (or, for a fully discrete network, the
    /// joint probability mass) at a complete assignment of every variable.
    ///
    /// # Raises
    ///
    /// * [`Error::UnknownVariable`] if `variables` omits a network variable.
    /// * [`Error::UnknownParameter`] if `theta` omits a system parameter
    ///   referenced by some node.
    /// * [`Error::DomainViolation`] if any assignment lies outside its
    ///   variable's domain.
    pub fn joint_pdf(&self, variables: &Map<f64>, theta: &Map<f64>) -> Result<f64> {
        self.validate_complete_assignment(variables, theta)?;

        let mut probability = 1.0;
        for (name, node) in &self.nodes {
            let x = variables[name];
            let local = if node.is_root() {
                node.marginal_pdf(x, theta)?
            } else if node.domain().is_continuous() {
                let parent_values: Map<f64> = node
                    .parent_variable_names()
                    .iter()
                    .map(|p| (p.clone(), variables[p]))
                    .collect();
                node.conditional_pdf(x, &parent_values, theta)?
            } else {
                let parent_assignments: Vec<usize> = node
                    .parent_variable_names()
                    .iter()
                    .map(|p| variables[p] as usize)
                    .collect();
                node.conditional_prob(x as usize, &parent_assignments)?
            };
            probability *= local;
        }
        Ok(probability)
    }

    /// Factorises the network into one [`Factor`] per node.
    pub fn factorise(&self) -> Vec<Factor> {
        let domains = self.domains();
        self.nodes.values().map(|node| node.to_factor(&domains)).collect()
    }

    /// Returns the network's elimination ordering for a query against
    /// `query` and `evidence`: every other variable, in insertion order.
    pub(crate) fn elimination_order(&self, query: &str, evidence: &Map<f64>) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|name| name.as_str() != query && !evidence.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Returns whether vertex ordering respects the network's own
    /// topological order (exposed for diagnostics and tests).
    #[cfg(test)]
    pub(crate) fn topological_order(&self) -> &[usize] {
        &self.topological_order
    }
}
