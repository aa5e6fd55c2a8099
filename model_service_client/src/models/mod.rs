pub mod futures;
pub mod metrics;
pub mod series;
pub mod window;
