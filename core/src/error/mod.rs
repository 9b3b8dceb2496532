pub mod engine;
pub mod runner;

pub use engine::EngineError;
pub use runner::RunnerError;
