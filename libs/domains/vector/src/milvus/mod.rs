mod client;
mod config;
pub(crate) mod wire;

pub use client::MilvusRepository;
pub use config::MilvusConfig;
