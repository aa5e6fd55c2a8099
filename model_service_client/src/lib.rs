//! Thin async client for the forecasting model service.
//!
//! The crate exposes the [`ModelService`](service::ModelService) trait, which names
//! every call the control layer makes against the service, and
//! [`HttpModelService`](http::HttpModelService), its `reqwest` implementation.
//! Policy code depends on the trait only.

pub mod http;
pub mod models;
pub mod service;

pub use http::HttpModelService;
pub use models::window::LookbackDays;
pub use service::{ClientError, ModelService};
