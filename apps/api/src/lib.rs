pub mod applications;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
