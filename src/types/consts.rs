/// Absolute tolerance used when checking that CPT rows sum to one.
pub const CPT_SUM_TOLERANCE: f64 = 1e-6;
/// Default cap on the number of cells a tabular factor may hold.
pub const DEFAULT_TABLE_CELL_CAP: usize = 10_000_000;
/// Target accuracy requested from the adaptive quadrature primitive.
pub const QUADRATURE_TARGET_ACCURACY: f64 = 1e-10;
/// Absolute error above which a quadrature result is treated as non-convergent.
///
/// Looser than [`QUADRATURE_TARGET_ACCURACY`]: the underlying algorithm's
/// error estimate is conservative, so requesting `1e-10` and landing at, say,
/// `1e-8` is still a usable result.
pub const QUADRATURE_ERROR_TOLERANCE: f64 = 1e-6;
/// Number of factors at or above which elimination's product step is
/// parallelised with `rayon` instead of folded sequentially.
pub const PARALLEL_PRODUCT_THRESHOLD: usize = 4;
