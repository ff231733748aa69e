pub mod api;
pub mod config;
pub mod discord;
pub mod http;
pub mod observability;
pub mod pixiv;
pub mod worker;
