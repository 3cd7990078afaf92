pub mod config;
pub mod error;
pub mod invocation;
pub mod normalize;
pub mod query;
pub mod summary;
pub mod time;

pub use error::{HtsError, Result};
