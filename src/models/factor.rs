use std::sync::Arc;

use ndarray::{ArrayD, Axis};

use crate::models::node::Domain;
use crate::types::{Error, Map, Result, DEFAULT_TABLE_CELL_CAP};
use crate::utils::integrate;

/// A factor's functional representation: a closure over a full assignment of
/// its scope and the network's system parameters.
type Pdf = Arc<dyn Fn(&Map<f64>, &Map<f64>) -> f64 + Send + Sync>;

#[derive(Clone)]
enum Representation {
    Functional(Pdf),
    Tabular(ArrayD<f64>),
}

/// A factor over a scope of variables, in one of two physical
/// representations.
///
/// A functional factor wraps a closure and is used whenever any variable in
/// its scope is continuous; a tabular factor stores an explicit `ndarray`
/// table and is used for purely discrete scopes. Every operation below
/// (`multiply`, `eliminate`, `pdf`) is polymorphic over the representation
/// but refuses to combine the two — mixing continuous and discrete
/// elimination within one query is a programming error, not a silently
/// coerced one.
#[derive(Clone)]
pub struct Factor {
    scope: Vec<String>,
    domains: Map<Domain>,
    representation: Representation,
}

impl std::fmt::Debug for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factor")
            .field("scope", &self.scope)
            .field(
                "representation",
                match &self.representation {
                    Representation::Functional(_) => &"functional",
                    Representation::Tabular(_) => &"tabular",
                },
            )
            .finish()
    }
}

impl Factor {
    pub(crate) fn functional(scope: Vec<String>, domains: Map<Domain>, pdf: Pdf) -> Self {
        Self {
            scope,
            domains,
            representation: Representation::Functional(pdf),
        }
    }

    pub(crate) fn tabular(scope: Vec<String>, domains: Map<Domain>, values: ArrayD<f64>) -> Self {
        Self {
            scope,
            domains,
            representation: Representation::Tabular(values),
        }
    }

    /// Returns this factor's scope.
    #[inline]
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Returns whether this factor is in the functional representation.
    #[inline]
    pub fn is_functional(&self) -> bool {
        matches!(self.representation, Representation::Functional(_))
    }

    /// Returns whether this factor is in the tabular representation.
    #[inline]
    pub fn is_tabular(&self) -> bool {
        matches!(self.representation, Representation::Tabular(_))
    }

    /// Evaluates this factor at a full assignment of its scope.
    ///
    /// `assignment` may carry extra variables beyond the scope (e.g.
    /// evidence not relevant to this particular factor); only the scope's
    /// own variables are read.
    ///
    /// # Raises
    ///
    /// * [`Error::MissingAssignment`] if `assignment` does not cover the
    ///   scope.
    pub fn pdf(&self, assignment: &Map<f64>, theta: &Map<f64>) -> Result<f64> {
        if let Some(missing) = self.scope.iter().find(|v| !assignment.contains_key(*v)) {
            return Err(Error::MissingAssignment(missing.clone()));
        }

        match &self.representation {
            Representation::Functional(pdf) => Ok(pdf(assignment, theta)),
            Representation::Tabular(values) => {
                let index: Vec<usize> = self.scope.iter().map(|v| assignment[v] as usize).collect();
                Ok(values[ndarray::IxDyn(&index)])
            }
        }
    }

    /// Multiplies this factor with `other`, returning a new factor over the
    /// union of their scopes.
    ///
    /// # Raises
    ///
    /// * [`Error::MixedRepresentation`] if one factor is functional and the
    ///   other tabular.
    /// * [`Error::TableTooLarge`] if the resulting tabular factor would
    ///   exceed [`DEFAULT_TABLE_CELL_CAP`] cells.
    pub fn multiply(&self, other: &Factor) -> Result<Factor> {
        match (&self.representation, &other.representation) {
            (Representation::Functional(lhs), Representation::Functional(rhs)) => {
                let mut scope: Vec<String> = self
                    .scope
                    .iter()
                    .chain(other.scope.iter())
                    .cloned()
                    .collect();
                scope.sort();
                scope.dedup();

                let mut domains = self.domains.clone();
                for (name, domain) in &other.domains {
                    domains.entry(name.clone()).or_insert_with(|| domain.clone());
                }

                let lhs = Arc::clone(lhs);
                let rhs = Arc::clone(rhs);
                let pdf: Pdf = Arc::new(move |assignment, theta| {
                    lhs(assignment, theta) * rhs(assignment, theta)
                });
                Ok(Factor::functional(scope, domains, pdf))
            }
            (Representation::Tabular(lhs), Representation::Tabular(rhs)) => {
                let mut scope = self.scope.clone();
                for v in &other.scope {
                    if !scope.contains(v) {
                        scope.push(v.clone());
                    }
                }

                let mut domains = self.domains.clone();
                for (name, domain) in &other.domains {
                    domains.entry(name.clone()).or_insert_with(|| domain.clone());
                }

                let cell_count: usize = scope
                    .iter()
                    .map(|v| match domains[v] {
                        Domain::Discrete { cardinality } => cardinality,
                        Domain::Continuous { .. } => {
                            unreachable!("a tabular factor's scope is purely discrete")
                        }
                    })
                    .product();
                if cell_count > DEFAULT_TABLE_CELL_CAP {
                    return Err(Error::TableTooLarge(
                        scope.clone(),
                        cell_count,
                        DEFAULT_TABLE_CELL_CAP,
                    ));
                }

                let lhs = align_to_scope(lhs, &self.scope, &scope);
                let rhs = align_to_scope(rhs, &other.scope, &scope);
                let values = &lhs * &rhs;
                Ok(Factor::tabular(scope, domains, values))
            }
            _ => Err(Error::MixedRepresentation),
        }
    }

    /// Eliminates `variable` from this factor by quadrature (continuous) or
    /// axis-sum (discrete), returning a new factor over the remaining
    /// scope.
    ///
    /// # Raises
    ///
    /// * [`Error::NotInScope`] if `variable` is not in this factor's scope.
    /// * [`Error::CollapseToScalar`] if this is the last variable in scope.
    ///
    /// Quadrature's own convergence is not checked here: a functional
    /// factor's evaluations are cheap closures, not `Result`-returning
    /// calls, so non-convergence surfaces at the inference engine's final
    /// normaliser and range integrations instead.
    pub fn eliminate(&self, variable: &str) -> Result<Factor> {
        let Some(axis) = self.scope.iter().position(|v| v == variable) else {
            return Err(Error::NotInScope(variable.to_string()));
        };
        if self.scope.len() == 1 {
            return Err(Error::CollapseToScalar(variable.to_string()));
        }

        let new_scope: Vec<String> = self
            .scope
            .iter()
            .filter(|v| v.as_str() != variable)
            .cloned()
            .collect();
        let mut new_domains = self.domains.clone();
        let domain = new_domains
            .shift_remove(variable)
            .expect("scope and domains are kept in sync");

        match &self.representation {
            Representation::Functional(pdf) => {
                let Domain::Continuous { lo, hi } = domain else {
                    unreachable!("a functional factor's variables are continuous")
                };
                let variable = variable.to_string();
                let pdf = Arc::clone(pdf);

                let integrated: Pdf = Arc::new(move |assignment, theta| {
                    let result = integrate(
                        |t| {
                            let mut a = assignment.clone();
                            a.insert(variable.clone(), t);
                            pdf(&a, theta)
                        },
                        lo,
                        hi,
                    );
                    result.value
                });
                Ok(Factor::functional(new_scope, new_domains, integrated))
            }
            Representation::Tabular(values) => {
                let summed = values.sum_axis(Axis(axis));
                Ok(Factor::tabular(new_scope, new_domains, summed))
            }
        }
    }
}

/// Reorders `values`'s axes to match `own_scope`'s relative order within
/// `joined_scope`, then inserts singleton axes for the variables `own_scope`
/// does not have, so that the result broadcasts elementwise against any
/// other array aligned the same way.
fn align_to_scope(values: &ArrayD<f64>, own_scope: &[String], joined_scope: &[String]) -> ArrayD<f64> {
    let mut permutation: Vec<usize> = (0..own_scope.len()).collect();
    permutation.sort_by_key(|&i| {
        joined_scope
            .iter()
            .position(|v| v == &own_scope[i])
            .expect("own_scope is a subset of joined_scope")
    });

    let mut result = values.clone().permuted_axes(permutation);
    for (position, variable) in joined_scope.iter().enumerate() {
        if !own_scope.contains(variable) {
            result = result.insert_axis(Axis(position));
        }
    }
    result
}
