mod load;
mod types;

pub use load::load_path;
pub use types::SchedulerConfig;
