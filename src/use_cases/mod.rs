// Use cases layer: snapshot normalization and page orchestration.

pub mod normalize;
pub mod orchestrator;
#[cfg(test)]
pub(crate) mod test_support;

pub use normalize::normalize;
pub use orchestrator::{Orchestrator, OrchestratorSettings, PageMachine, PageState};
