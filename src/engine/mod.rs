pub mod fanout;
pub mod http;
pub mod tracker;

pub use fanout::{run_fan_out, FanOutBatch, FanOutResult, LatencyStats};
pub use http::{HttpClient, HttpResponse};
pub use tracker::RequestTracker;
