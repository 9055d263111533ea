//! EPM - deploys and tests smart contract systems from a job manifest

pub mod backend;
pub mod config;
pub mod defaults;
pub mod error;
pub mod executor;
pub mod handler;
pub mod job;
pub mod manifest;
pub mod report;
pub mod runner;
pub mod vars;

pub use backend::{Backend, MockBackend, RpcBackend};
pub use config::{OutputFormat, RunConfig};
pub use error::{EpmError, FixSuggestion};
pub use executor::execute_jobs;
pub use handler::{ChainHandler, JobHandler, JobScope, MockHandler};
pub use job::{Job, JobKind, JobResult};
pub use manifest::Package;
pub use report::{FileSink, ResultSink};
pub use runner::Runner;
