mod error;
pub mod models;
mod server;
pub mod services;
pub mod signature;
pub mod state;

pub use error::ApiError;
pub use server::{router, run};
