pub mod compare;
pub mod metrics;
pub mod payment;
pub mod plan;
pub mod simulate;
