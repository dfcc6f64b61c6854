pub mod api;
pub mod auth;
pub mod client;
pub mod models;
pub mod pull_requests;
pub mod reference;
pub mod work_items;
