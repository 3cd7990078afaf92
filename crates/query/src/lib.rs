pub mod client;
pub mod lookup;

pub use client::{HoneycombClient, RequestOptions};
pub use lookup::{PollPolicy, TraceLookup, fetch_trace_rows, lookup_trace, poll_query_result};
