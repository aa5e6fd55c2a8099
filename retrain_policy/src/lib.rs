//! Decision layer that keeps the forecasting model service's data and model fresh.
//!
//! The crate decides *whether* to call the service's ingestion, backfill, training and
//! series-rebuild endpoints; the service does the actual work. Two policies carry the
//! logic:
//! - [`coverage`]: is enough history materialized? (drives backfill)
//! - [`drift`]: has prediction error degraded long enough after the last training run?
//!   (drives retraining)
//!
//! Both feed the fixed train → rebuild → refresh sequence in [`sequencer`]. The four
//! entry points an external scheduler invokes live in [`tasks`]; each run is a pure
//! function of [`config::Settings`] and the service's responses.

#![deny(missing_docs)]

pub mod config;
pub mod coverage;
pub mod drift;
pub mod sequencer;
pub mod tasks;
pub mod timestamp;
