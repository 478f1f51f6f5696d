use rayon::join;

use crate::models::{Domain, Factor, Network};
use crate::types::{Error, Map, Result, Set, PARALLEL_PRODUCT_THRESHOLD, QUADRATURE_ERROR_TOLERANCE};
use crate::utils::integrate;

/// The range of interest for a query variable: a sub-interval for a
/// continuous variable, or a subset of states for a discrete one.
#[derive(Clone, Debug)]
pub enum Range {
    /// A closed interval `[lo, hi]`, queried against a continuous variable.
    Continuous(f64, f64),
    /// A set of states, queried against a discrete variable.
    Discrete(Set<usize>),
}

/// Sum-product variable elimination over a [`Network`].
///
/// Implemented as a trait so that the elimination algorithm lives in the
/// `inference` module while extending the model type defined in `models`,
/// the same split the network's own topological sort uses for the graph
/// substrate.
pub trait Inference {
    /// Computes `P(query ∈ range | evidence, θ)`.
    ///
    /// Eliminates every variable other than `query` and the keys of
    /// `evidence`, in the network's insertion order, multiplying and
    /// reducing factors via sum-product variable elimination; the
    /// remaining factor is then evaluated at the evidence and normalised
    /// over the query's full domain before being integrated or summed over
    /// `range`.
    ///
    /// # Raises
    ///
    /// * [`Error::UnknownVariable`] if `query` or an `evidence` key is not
    ///   in the network.
    /// * [`Error::RangeMismatch`] if `range`'s type does not match the
    ///   query variable's domain.
    /// * [`Error::UnknownParameter`] if `theta` omits a system parameter
    ///   referenced by some node.
    /// * [`Error::DomainViolation`] if an evidence value lies outside its
    ///   variable's domain, or a discrete `range` contains an out-of-bounds
    ///   state.
    /// * [`Error::UnsupportedEvidence`] if the evidence yields a zero
    ///   normaliser.
    /// * [`Error::NumericalError`] if continuous quadrature fails to
    ///   converge within [`QUADRATURE_ERROR_TOLERANCE`].
    /// * Any [`Error`] the underlying factor algebra raises, notably
    ///   [`Error::MixedRepresentation`] if `query`'s connected component
    ///   mixes continuous and discrete nodes.
    fn infer(&self, query: &str, range: Range, evidence: &Map<f64>, theta: &Map<f64>) -> Result<f64>;
}

impl Inference for Network {
    fn infer(&self, query: &str, range: Range, evidence: &Map<f64>, theta: &Map<f64>) -> Result<f64> {
        let query_node = self
            .node(query)
            .ok_or_else(|| Error::UnknownVariable(query.to_string()))?;

        match (query_node.domain(), &range) {
            (Domain::Continuous { .. }, Range::Continuous(_, _)) => {}
            (Domain::Discrete { .. }, Range::Discrete(_)) => {}
            _ => return Err(Error::RangeMismatch(query.to_string())),
        }

        for name in evidence.keys() {
            self.node(name)
                .ok_or_else(|| Error::UnknownVariable(name.clone()))?;
        }
        for name in self.system_parameter_names() {
            if !theta.contains_key(name) {
                return Err(Error::UnknownParameter(name.clone()));
            }
        }
        for (name, &value) in evidence {
            let node = self.node(name).expect("checked above");
            if !node.domain().contains(value) {
                return Err(Error::DomainViolation(value, name.clone()));
            }
        }

        log::debug!("inferring P({query} ∈ range | {} evidence vars)", evidence.len());

        let ordering = self.elimination_order(query, evidence);
        log::debug!("elimination ordering: {ordering:?}");

        let mut factors = self.factorise();
        for variable in ordering {
            let (relevant, mut irrelevant): (Vec<Factor>, Vec<Factor>) = factors
                .into_iter()
                .partition(|f| f.scope().iter().any(|v| v == &variable));
            if relevant.is_empty() {
                log::debug!("variable `{variable}` appears in no factor, skipping");
                factors = irrelevant;
                continue;
            }
            log::debug!("eliminating `{variable}` from {} factors", relevant.len());
            let reduced = product(relevant)?;
            let eliminated = reduced.eliminate(&variable)?;
            irrelevant.push(eliminated);
            factors = irrelevant;
        }
        let residual = product(factors)?;

        let evaluate = |t: f64| -> f64 {
            let mut assignment = evidence.clone();
            assignment.insert(query.to_string(), t);
            residual
                .pdf(&assignment, theta)
                .expect("residual factor's scope is covered by the query and evidence")
        };

        match (query_node.domain(), range) {
            (Domain::Continuous { lo, hi }, Range::Continuous(range_lo, range_hi)) => {
                let normaliser = integrate(evaluate, *lo, *hi);
                if normaliser.abs_error > QUADRATURE_ERROR_TOLERANCE {
                    log::warn!(
                        "quadrature over `{query}`'s domain missed target accuracy: abs error {:e}",
                        normaliser.abs_error
                    );
                    return Err(Error::NumericalError(query.to_string(), normaliser.abs_error));
                }
                if normaliser.value == 0.0 {
                    return Err(Error::UnsupportedEvidence);
                }

                let numerator = integrate(evaluate, range_lo, range_hi);
                if numerator.abs_error > QUADRATURE_ERROR_TOLERANCE {
                    log::warn!(
                        "quadrature over `{query}`'s range missed target accuracy: abs error {:e}",
                        numerator.abs_error
                    );
                    return Err(Error::NumericalError(query.to_string(), numerator.abs_error));
                }

                Ok(numerator.value / normaliser.value)
            }
            (Domain::Discrete { cardinality }, Range::Discrete(states)) => {
                for &state in &states {
                    if state >= *cardinality {
                        return Err(Error::OutOfRange(state, query.to_string(), *cardinality));
                    }
                }

                let normaliser: f64 = (0..*cardinality).map(|i| evaluate(i as f64)).sum();
                if normaliser == 0.0 {
                    return Err(Error::UnsupportedEvidence);
                }

                let numerator: f64 = states.iter().map(|&i| evaluate(i as f64)).sum();
                Ok(numerator / normaliser)
            }
            _ => unreachable!("range/domain agreement was checked above"),
        }
    }
}

/// Multiplies every factor in `factors` into one, reducing in parallel via
/// `rayon` once the set is large enough to be worth the overhead.
///
/// Factor multiplication is commutative and associative, so any reduction
/// order (sequential fold or divide-and-conquer tree) yields the same
/// result up to floating-point rounding.
fn product(mut factors: Vec<Factor>) -> Result<Factor> {
    match factors.len() {
        0 => unreachable!("variable elimination never empties the factor set entirely"),
        1 => Ok(factors.pop().expect("length checked above")),
        len if len >= PARALLEL_PRODUCT_THRESHOLD => {
            let right = factors.split_off(len / 2);
            let (left, right) = join(|| product(factors), || product(right));
            left?.multiply(&right?)
        }
        _ => {
            let mut iter = factors.into_iter();
            let first = iter.next().expect("length checked above");
            iter.try_fold(first, |acc, f| acc.multiply(&f))
        }
    }
}
