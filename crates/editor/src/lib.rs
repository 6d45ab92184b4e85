// Library crate: the scene-graph store and everything around it, exposed for
// integration tests and the JSON command interface. The binary only wires
// the command loop to stdin/stdout.

pub mod build;
pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod math;
pub mod mesh;
pub mod project;
pub mod state;
pub mod storage;
