pub mod checker;
pub mod government;
pub mod graph;

#[cfg(test)]
mod fixture;

pub use checker::{CheckError, Checker, CheckerConfig};
pub use graph::{Frame, Node, Relation, ValencyGraph};
