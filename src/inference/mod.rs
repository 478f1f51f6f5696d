mod variable_elimination;
pub use variable_elimination::*;
