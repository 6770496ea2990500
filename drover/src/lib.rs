#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod driver;
mod error;
pub mod gate;
mod orchestrator;
pub mod report;
mod workload;

pub use async_trait::async_trait;
pub use driver::Phase;
pub use error::{GateError, ReportError, RunError};
pub use orchestrator::Orchestrator;
pub use tokio_util::sync::CancellationToken;
pub use workload::Workload;

pub use drover_core::{
    Bucket, Concurrency, ConfigError, Histogram, QueryError, Rate, ResultStore, RunArgs,
    RunConfig, DEFAULT_CAPACITY,
};

pub mod prelude {
    pub use crate::report::Report;
    pub use crate::{async_trait, CancellationToken, Orchestrator, RunError, Workload};
    pub use crate::{ResultStore, RunConfig};
}
