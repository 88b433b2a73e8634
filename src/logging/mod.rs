pub mod clock;
pub mod logger;
pub mod sanitize;
pub mod sink;

pub use logger::StructuredLogger;
pub use sanitize::sanitize;
pub use sink::{ConsoleSink, FileSink, LogSink, MemorySink, TeeSink};
