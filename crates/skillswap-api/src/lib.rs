pub mod auth;
pub mod error;
pub mod feedback;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod skills;
pub mod stats;
pub mod swaps;
pub mod users;
pub mod views;
