mod node;
pub use node::*;

mod factor;
pub use factor::Factor;

mod network;
pub use network::Network;
