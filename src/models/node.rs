use std::sync::Arc;

use ndarray::{ArrayD, Axis, IxDyn};
use statrs::distribution::{Continuous, Normal};

use crate::models::factor::Factor;
use crate::types::{Error, Map, Result, Set, CPT_SUM_TOLERANCE};

/// The domain of a single variable.
///
/// Continuous domains are closed real intervals; discrete domains are the
/// finite set `{0, .., cardinality - 1}`. A [`Domain`] never changes once a
/// [`Node`] is built — the network's DAG structure is static, not the
/// probabilities it carries.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// A closed interval `[lo, hi]`, with `lo < hi`.
    Continuous {
        /// The lower bound, inclusive.
        lo: f64,
        /// The upper bound, inclusive.
        hi: f64,
    },
    /// The finite set of states `{0, .., cardinality - 1}`.
    Discrete {
        /// The number of states.
        cardinality: usize,
    },
}

impl Domain {
    /// Returns whether `x` lies within this domain.
    ///
    /// For a discrete domain, `x` must be a non-negative integer strictly
    /// less than the cardinality.
    pub fn contains(&self, x: f64) -> bool {
        match *self {
            Domain::Continuous { lo, hi } => x >= lo && x <= hi,
            Domain::Discrete { cardinality } => {
                x >= 0.0 && x.fract() == 0.0 && (x as usize) < cardinality
            }
        }
    }

    /// Returns whether this is a continuous domain.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Domain::Continuous { .. })
    }

    /// Returns whether this is a discrete domain.
    #[inline]
    pub fn is_discrete(&self) -> bool {
        matches!(self, Domain::Discrete { .. })
    }
}

/// A user-supplied marginal density `μ(x; distribution_parameters, θ)` for a
/// root node.
///
/// Implemented for any `Fn(f64, &Map<f64>, &Map<f64>) -> f64` closure, so a
/// plain closure is almost always all a caller needs to write.
pub trait MarginalDensity: Send + Sync {
    /// Evaluates the density at `x`, given this node's own distribution
    /// parameters and the network's system parameters.
    fn evaluate(&self, x: f64, distribution_parameters: &Map<f64>, theta: &Map<f64>) -> f64;
}

impl<F> MarginalDensity for F
where
    F: Fn(f64, &Map<f64>, &Map<f64>) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64, distribution_parameters: &Map<f64>, theta: &Map<f64>) -> f64 {
        self(x, distribution_parameters, theta)
    }
}

/// A user-supplied structural equation `f(parents; θ) -> ℝ` for a continuous
/// child node.
///
/// Implemented for any `Fn(&Map<f64>, &Map<f64>) -> f64` closure.
pub trait StructuralEquation: Send + Sync {
    /// Evaluates the equation at the given parent values and system
    /// parameters, returning the theoretical (noise-free) value.
    fn evaluate(&self, parents: &Map<f64>, theta: &Map<f64>) -> f64;
}

impl<F> StructuralEquation for F
where
    F: Fn(&Map<f64>, &Map<f64>) -> f64 + Send + Sync,
{
    fn evaluate(&self, parents: &Map<f64>, theta: &Map<f64>) -> f64 {
        self(parents, theta)
    }
}

/// The Gaussian noise wrapped around a continuous child's structural
/// equation: `X ~ Normal(intercept + slope * f(parents; θ), scale)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianParameters {
    /// Additive offset applied to the equation's output.
    pub intercept: f64,
    /// Multiplicative scaling applied to the equation's output.
    pub slope: f64,
    /// The standard deviation of the Gaussian noise, must be positive.
    pub scale: f64,
}

impl Default for GaussianParameters {
    fn default() -> Self {
        Self {
            intercept: 0.0,
            slope: 1.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone)]
enum NodeKind {
    Root {
        marginal: Arc<dyn MarginalDensity>,
        distribution_parameters: Map<f64>,
    },
    ChildContinuous {
        equation: Arc<dyn StructuralEquation>,
        distribution_parameters: GaussianParameters,
    },
    ChildDiscrete {
        cpt: ArrayD<f64>,
    },
}

/// A single variable in a [`crate::models::Network`].
///
/// A node is either a root (an unconditional marginal density) or a child
/// (a continuous structural equation with Gaussian noise, or a discrete
/// conditional probability table), over a fixed [`Domain`].
#[derive(Clone)]
pub struct Node {
    variable_name: String,
    domain: Domain,
    parent_variable_names: Vec<String>,
    system_parameter_names: Set<String>,
    kind: NodeKind,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("variable_name", &self.variable_name)
            .field("domain", &self.domain)
            .field("parent_variable_names", &self.parent_variable_names)
            .field("system_parameter_names", &self.system_parameter_names)
            .finish_non_exhaustive()
    }
}

fn validate_domain(variable_name: &str, domain: &Domain) -> Result<()> {
    match *domain {
        Domain::Continuous { lo, hi } if !(lo < hi) => Err(Error::InvalidNode(
            variable_name.to_string(),
            format!("continuous domain lower bound {lo} must be less than upper bound {hi}"),
        )),
        Domain::Discrete { cardinality: 0 } => Err(Error::InvalidNode(
            variable_name.to_string(),
            "discrete cardinality must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}

impl Node {
    /// Builds a root node with an unconditional marginal density.
    ///
    /// A discrete root's factor is baked into a table once, at
    /// [`Node::to_factor`] time, with no system parameters in scope (see
    /// that method's docs); a discrete root therefore cannot declare any
    /// `system_parameter_names` — a continuous root has no such
    /// restriction, since its factor stays a closure that receives `θ` on
    /// every call.
    ///
    /// # Raises
    ///
    /// * [`Error::InvalidNode`] if `variable_name` is empty, `domain` is
    ///   malformed, or `domain` is discrete and `system_parameter_names` is
    ///   non-empty.
    pub fn root(
        variable_name: impl Into<String>,
        domain: Domain,
        system_parameter_names: impl IntoIterator<Item = String>,
        marginal: impl MarginalDensity + 'static,
        distribution_parameters: Map<f64>,
    ) -> Result<Self> {
        let variable_name = variable_name.into();
        if variable_name.is_empty() {
            return Err(Error::InvalidNode(
                variable_name,
                "variable name must not be empty".to_string(),
            ));
        }
        validate_domain(&variable_name, &domain)?;

        let system_parameter_names: Set<String> = system_parameter_names.into_iter().collect();
        if domain.is_discrete() && !system_parameter_names.is_empty() {
            return Err(Error::InvalidNode(
                variable_name,
                "a discrete root's factor is baked into a table with no system parameters in \
                 scope, so it cannot declare any system_parameter_names"
                    .to_string(),
            ));
        }

        Ok(Self {
            variable_name,
            domain,
            parent_variable_names: Vec::new(),
            system_parameter_names,
            kind: NodeKind::Root {
                marginal: Arc::new(marginal),
                distribution_parameters,
            },
        })
    }

    /// Builds a continuous child node: `X ~ Normal(intercept + slope *
    /// equation(parents; θ), scale)`.
    ///
    /// `distribution_parameters` defaults to the identity transform with
    /// unit scale when `None`.
    ///
    /// # Raises
    ///
    /// * [`Error::InvalidNode`] if `variable_name` is empty, `domain` is
    ///   malformed, `parent_variable_names` is empty, or `scale` is not
    ///   positive.
    pub fn child_continuous(
        variable_name: impl Into<String>,
        domain: Domain,
        parent_variable_names: impl IntoIterator<Item = String>,
        system_parameter_names: impl IntoIterator<Item = String>,
        equation: impl StructuralEquation + 'static,
        distribution_parameters: Option<GaussianParameters>,
    ) -> Result<Self> {
        let variable_name = variable_name.into();
        validate_domain(&variable_name, &domain)?;

        let parent_variable_names: Vec<String> = parent_variable_names.into_iter().collect();
        if parent_variable_names.is_empty() {
            return Err(Error::InvalidNode(
                variable_name,
                "a child node must have at least one parent".to_string(),
            ));
        }

        let distribution_parameters = distribution_parameters.unwrap_or_default();
        if !(distribution_parameters.scale > 0.0) {
            return Err(Error::InvalidNode(
                variable_name,
                format!(
                    "Gaussian scale {} must be positive",
                    distribution_parameters.scale
                ),
            ));
        }

        Ok(Self {
            variable_name,
            domain,
            parent_variable_names,
            system_parameter_names: system_parameter_names.into_iter().collect(),
            kind: NodeKind::ChildContinuous {
                equation: Arc::new(equation),
                distribution_parameters,
            },
        })
    }

    /// Builds a discrete child node from a conditional probability table.
    ///
    /// `parents` lists each parent's name together with its cardinality, in
    /// the order the table's leading axes are indexed; the table's trailing
    /// axis indexes this node's own `cardinality` states, and every row
    /// (fixed parent assignment) must sum to one within
    /// [`CPT_SUM_TOLERANCE`].
    ///
    /// # Raises
    ///
    /// * [`Error::InvalidNode`] if `parents` is empty, `cardinality` is
    ///   zero, `cpt`'s shape does not match `parents` and `cardinality`, or
    ///   any row fails to sum to one.
    pub fn child_discrete(
        variable_name: impl Into<String>,
        cardinality: usize,
        parents: impl IntoIterator<Item = (String, usize)>,
        cpt: ArrayD<f64>,
    ) -> Result<Self> {
        let variable_name = variable_name.into();
        let parents: Vec<(String, usize)> = parents.into_iter().collect();

        if parents.is_empty() {
            return Err(Error::InvalidNode(
                variable_name,
                "a child node must have at least one parent".to_string(),
            ));
        }
        if cardinality == 0 {
            return Err(Error::InvalidNode(
                variable_name,
                "discrete cardinality must be at least 1".to_string(),
            ));
        }

        let expected_shape: Vec<usize> = parents
            .iter()
            .map(|(_, c)| *c)
            .chain(std::iter::once(cardinality))
            .collect();
        if cpt.shape() != expected_shape.as_slice() {
            return Err(Error::InvalidNode(
                variable_name,
                format!(
                    "CPT shape {:?} does not match the expected shape {expected_shape:?}",
                    cpt.shape()
                ),
            ));
        }

        let last_axis = Axis(cpt.ndim() - 1);
        let row_sums = cpt.sum_axis(last_axis);
        if !row_sums
            .iter()
            .all(|&sum| (sum - 1.0).abs() <= CPT_SUM_TOLERANCE)
        {
            return Err(Error::InvalidNode(
                variable_name,
                "every CPT row must sum to one".to_string(),
            ));
        }

        let parent_variable_names = parents.into_iter().map(|(name, _)| name).collect();

        Ok(Self {
            variable_name,
            domain: Domain::Discrete { cardinality },
            parent_variable_names,
            system_parameter_names: Set::default(),
            kind: NodeKind::ChildDiscrete { cpt },
        })
    }

    /// Returns this node's variable name.
    #[inline]
    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    /// Returns this node's domain.
    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns the names of this node's parents, empty for a root node.
    #[inline]
    pub fn parent_variable_names(&self) -> &[String] {
        &self.parent_variable_names
    }

    /// Returns the names of the system parameters this node's density or
    /// equation consumes.
    #[inline]
    pub fn system_parameter_names(&self) -> &Set<String> {
        &self.system_parameter_names
    }

    /// Returns whether this is a root node.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root { .. })
    }

    /// Evaluates this root node's marginal density at `x`.
    ///
    /// Returns `0.0` if `x` lies outside the node's domain.
    ///
    /// # Raises
    ///
    /// * [`Error::NotRoot`] if this is not a root node.
    pub fn marginal_pdf(&self, x: f64, theta: &Map<f64>) -> Result<f64> {
        match &self.kind {
            NodeKind::Root {
                marginal,
                distribution_parameters,
            } => {
                if !self.domain.contains(x) {
                    return Ok(0.0);
                }
                Ok(marginal.evaluate(x, distribution_parameters, theta))
            }
            _ => Err(Error::NotRoot(self.variable_name.clone())),
        }
    }

    /// Evaluates this continuous child's structural equation at the given
    /// parent values, returning the theoretical (noise-free) value.
    ///
    /// # Raises
    ///
    /// * [`Error::NotChild`] if this is not a continuous child node.
    pub fn equation(&self, parents: &Map<f64>, theta: &Map<f64>) -> Result<f64> {
        match &self.kind {
            NodeKind::ChildContinuous { equation, .. } => Ok(equation.evaluate(parents, theta)),
            _ => Err(Error::NotChild(self.variable_name.clone())),
        }
    }

    /// Evaluates this continuous child's conditional density at `x`, given
    /// its parents' values.
    ///
    /// Returns `0.0` if `x` lies outside the node's domain.
    ///
    /// # Raises
    ///
    /// * [`Error::NotChild`] if this is not a continuous child node.
    pub fn conditional_pdf(&self, x: f64, parents: &Map<f64>, theta: &Map<f64>) -> Result<f64> {
        match &self.kind {
            NodeKind::ChildContinuous {
                equation,
                distribution_parameters,
            } => {
                if !self.domain.contains(x) {
                    return Ok(0.0);
                }
                let theoretical = equation.evaluate(parents, theta);
                let mean = distribution_parameters.intercept
                    + distribution_parameters.slope * theoretical;
                let normal = Normal::new(mean, distribution_parameters.scale)
                    .unwrap_or_else(|_| unreachable!("scale was validated at construction"));
                Ok(normal.pdf(x))
            }
            _ => Err(Error::NotChild(self.variable_name.clone())),
        }
    }

    /// Looks up this discrete child's conditional probability of state `i`
    /// given its parents' state assignments (in `parent_variable_names`
    /// order).
    ///
    /// # Raises
    ///
    /// * [`Error::NotChild`] if this is not a discrete child node.
    /// * [`Error::OutOfRange`] if `i` is not a valid state of this node.
    pub fn conditional_prob(&self, i: usize, parent_assignments: &[usize]) -> Result<f64> {
        match &self.kind {
            NodeKind::ChildDiscrete { cpt } => {
                let Domain::Discrete { cardinality } = self.domain else {
                    unreachable!("a discrete child always has a discrete domain");
                };
                if i >= cardinality {
                    return Err(Error::OutOfRange(i, self.variable_name.clone(), cardinality));
                }
                let mut index: Vec<usize> = parent_assignments.to_vec();
                index.push(i);
                Ok(cpt[IxDyn(&index)])
            }
            _ => Err(Error::NotChild(self.variable_name.clone())),
        }
    }

    /// Builds the [`Factor`] this node contributes to a network's joint
    /// distribution.
    ///
    /// `domains` must contain this node's own domain and the domain of
    /// every parent; it is used to mask functional factors and to read off
    /// parent cardinalities for the factor's own domain bookkeeping.
    ///
    /// A root's own domain — not its ROOT/CHILD variant — decides its
    /// factor's representation, matching every other node: a discrete root
    /// is materialised into a one-axis table (its density sampled once per
    /// state) so it can multiply against a discrete child's CPT without
    /// tripping [`Error::MixedRepresentation`]. Because `factorise` has no
    /// `θ` to thread through that one-time sampling, [`Node::root`] refuses
    /// to construct a discrete root with any `system_parameter_names` in
    /// the first place — the empty map below is therefore never missing a
    /// parameter the density actually consults.
    pub(crate) fn to_factor(&self, domains: &Map<Domain>) -> Factor {
        match &self.kind {
            NodeKind::Root {
                marginal,
                distribution_parameters,
            } if self.domain.is_discrete() => {
                let Domain::Discrete { cardinality } = self.domain else {
                    unreachable!("guarded by is_discrete() above");
                };
                let theta = Map::default();
                let values: Vec<f64> = (0..cardinality)
                    .map(|i| marginal.evaluate(i as f64, distribution_parameters, &theta))
                    .collect();
                let table = ndarray::Array1::from_vec(values).into_dyn();

                let mut scope_domains = Map::default();
                scope_domains.insert(self.variable_name.clone(), self.domain.clone());
                Factor::tabular(vec![self.variable_name.clone()], scope_domains, table)
            }
            NodeKind::Root {
                marginal,
                distribution_parameters,
            } => {
                let name = self.variable_name.clone();
                let domain = self.domain.clone();
                let distribution_parameters = distribution_parameters.clone();
                let marginal = Arc::clone(marginal);

                let pdf = move |assignment: &Map<f64>, theta: &Map<f64>| {
                    let x = assignment[&name];
                    if !domain.contains(x) {
                        return 0.0;
                    }
                    marginal.evaluate(x, &distribution_parameters, theta)
                };

                let mut scope_domains = Map::default();
                scope_domains.insert(self.variable_name.clone(), self.domain.clone());
                Factor::functional(vec![self.variable_name.clone()], scope_domains, Arc::new(pdf))
            }
            NodeKind::ChildContinuous {
                equation,
                distribution_parameters,
            } => {
                let mut scope: Vec<String> = std::iter::once(self.variable_name.clone())
                    .chain(self.parent_variable_names.iter().cloned())
                    .collect();
                scope.sort();

                let scope_domains: Map<Domain> = scope
                    .iter()
                    .map(|v| (v.clone(), domains[v].clone()))
                    .collect();

                let name = self.variable_name.clone();
                let parent_names = self.parent_variable_names.clone();
                let domain = self.domain.clone();
                let distribution_parameters = distribution_parameters.clone();
                let equation = Arc::clone(equation);
                let masked_domains = scope_domains.clone();

                let pdf = move |assignment: &Map<f64>, theta: &Map<f64>| {
                    let in_domain = masked_domains
                        .iter()
                        .all(|(v, d)| d.contains(assignment[v]));
                    if !in_domain {
                        return 0.0;
                    }
                    let x = assignment[&name];
                    if !domain.contains(x) {
                        return 0.0;
                    }
                    let parent_values: Map<f64> = parent_names
                        .iter()
                        .map(|p| (p.clone(), assignment[p]))
                        .collect();
                    let theoretical = equation.evaluate(&parent_values, theta);
                    let mean = distribution_parameters.intercept
                        + distribution_parameters.slope * theoretical;
                    let normal = Normal::new(mean, distribution_parameters.scale)
                        .unwrap_or_else(|_| unreachable!("scale was validated at construction"));
                    normal.pdf(x)
                };

                Factor::functional(scope, scope_domains, Arc::new(pdf))
            }
            NodeKind::ChildDiscrete { cpt } => {
                let mut scope = self.parent_variable_names.clone();
                scope.push(self.variable_name.clone());

                let mut scope_domains = Map::default();
                for (axis, parent) in self.parent_variable_names.iter().enumerate() {
                    scope_domains.insert(
                        parent.clone(),
                        Domain::Discrete {
                            cardinality: cpt.shape()[axis],
                        },
                    );
                }
                scope_domains.insert(self.variable_name.clone(), self.domain.clone());

                Factor::tabular(scope, scope_domains, cpt.clone())
            }
        }
    }
}
