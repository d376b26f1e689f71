pub mod auth;
pub mod form;
pub mod handlers;
pub mod notify;
pub mod store;
