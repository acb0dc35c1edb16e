//! HTTP API handlers for scenic-gr

pub mod genres;
pub mod health;

pub use genres::genre_routes;
pub use health::health_routes;
