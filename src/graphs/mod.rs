mod directed;
pub use directed::*;
