pub mod auth;
pub mod dashboard;
pub mod helpers;
pub mod middleware;
pub mod users;
