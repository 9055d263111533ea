//! EPM package runner
//!
//! One run = three phases, strictly in sequence:
//! 1. default job injection (`--address`, `--set`)
//! 2. sequential execution, stopping at the first error
//! 3. result reporting, only when every job succeeded

use tracing::info;

use crate::config::RunConfig;
use crate::defaults::inject_defaults;
use crate::error::EpmError;
use crate::executor::execute_jobs;
use crate::handler::JobHandler;
use crate::job::Job;
use crate::report::{post_process, ResultSink};

/// Runs a job list against a handler and reports to a sink
pub struct Runner<'a, H, S> {
    config: &'a RunConfig,
    handler: H,
    sink: S,
}

impl<'a, H, S> Runner<'a, H, S>
where
    H: JobHandler,
    S: ResultSink,
{
    pub fn new(config: &'a RunConfig, handler: H, sink: S) -> Self {
        Self {
            config,
            handler,
            sink,
        }
    }

    /// Run all phases over `jobs`. On error the jobs that ran keep their
    /// results and no report is written.
    pub fn run(&mut self, jobs: &mut Vec<Job>) -> Result<(), EpmError> {
        inject_defaults(jobs, self.config);
        info!(jobs = jobs.len(), "Running package");

        execute_jobs(jobs, self.config, &mut self.handler)?;
        post_process(jobs, self.config, &mut self.sink)?;

        info!("Package complete");
        Ok(())
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
