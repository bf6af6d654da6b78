pub mod algorithms;
pub mod builder;
pub mod transaction_graph;

pub use algorithms::{brandes_betweenness, connected_components};
pub use builder::{AccountIndex, GraphBuilder};
pub use transaction_graph::TransactionGraph;
