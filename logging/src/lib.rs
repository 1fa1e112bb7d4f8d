//! Shared HTTP client construction for everything that talks to external
//! services. The returned client traces every outbound request so provider
//! traffic shows up in the application logs.

mod trace_client;
pub use trace_client::new_client;
