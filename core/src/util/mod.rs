pub mod output_sink;

pub use output_sink::OutputSink;
