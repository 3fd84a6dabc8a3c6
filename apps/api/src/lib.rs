pub mod config;
pub mod errors;
pub mod resume;
pub mod routes;
pub mod state;
pub mod upstream;
