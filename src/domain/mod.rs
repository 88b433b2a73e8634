pub mod types;

pub use types::{
    CategorySummary, HttpMethod, LogRecord, PerformanceInfo, RequestInfo, ResponseInfo,
    RunSummary, SlowTest, StatusCounts, TestOutcome, TestStatus,
};
