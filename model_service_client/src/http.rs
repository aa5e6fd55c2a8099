//! `reqwest` implementation of [`ModelService`](crate::service::ModelService).

pub mod endpoints;
pub mod provider;

pub use provider::HttpModelService;
