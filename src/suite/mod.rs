//! The built-in test suites: server status probing and the endpoint
//! availability sweep.

pub mod availability;
pub mod status;

pub use availability::{indicates_available, sweep_endpoints, EndpointAvailability};
pub use status::check_server_status;
