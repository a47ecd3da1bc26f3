//! Bearer session authentication.

mod auth_state;

pub use self::auth_state::AuthState;
