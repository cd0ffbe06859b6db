//! Client for the PastForward user search and follow flow.
//!
//! [`search::SearchController`] owns the page state and talks to the API
//! through the [`users::api::UsersApi`] trait; [`users::api::HttpUsersApi`]
//! is the HTTP implementation.

pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod search;
pub mod session;
pub mod users;

pub use error::{ClientError, Result};
