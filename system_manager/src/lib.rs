//! Host process for the retrain control layer: runs the scheduled tasks against
//! the model service on their cron cadences.

pub mod logging;
pub mod runner;
pub mod scheduler;
