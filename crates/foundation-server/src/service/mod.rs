//! Application state and dependency injection.

mod state;

pub use crate::service::state::{ServiceState, TokenExposure};
