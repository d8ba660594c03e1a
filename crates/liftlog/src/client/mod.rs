//! Terminal-side API client.
//!
//! [`ApiClient`] wraps every endpoint of the REST API, [`TokenStore`] keeps
//! the session token on disk, and [`Session`] ties them together with the
//! login, logout and page-guard flows.

mod api;
mod session;
mod token;

pub use api::ApiClient;
pub use session::Session;
pub use token::TokenStore;
