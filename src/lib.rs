pub mod app;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod output;
pub mod sdrf;
pub mod store;
pub mod xml;
