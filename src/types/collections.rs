use fxhash::FxBuildHasher;
use indexmap::{IndexMap, IndexSet};

/// A type alias for a hash map with a fast hash function.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
/// A type alias for a hash set with a fast hash function.
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;
/// A type alias for an ordered set of variable names, used as factor and node scopes.
pub type Set<T> = FxIndexSet<T>;
/// A type alias for an ordered map keyed by variable or parameter name.
pub type Map<V> = FxIndexMap<String, V>;
