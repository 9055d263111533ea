//! Sequential job executor
//!
//! Runs jobs one at a time in list order and stops at the first error.
//! Jobs that already ran keep their results; nothing is retried or undone.

use tracing::{debug, info, instrument, warn};

use crate::config::RunConfig;
use crate::error::EpmError;
use crate::handler::{dispatch, JobHandler, JobScope};
use crate::job::{Job, JobResult};

/// Execute every job in order, recording each result on its job
#[instrument(skip_all, fields(jobs = jobs.len()))]
pub fn execute_jobs<H>(jobs: &mut [Job], config: &RunConfig, handler: &mut H) -> Result<(), EpmError>
where
    H: JobHandler + ?Sized,
{
    for index in 0..jobs.len() {
        let (completed, rest) = jobs.split_at_mut(index);
        let job = &mut rest[0];

        let Some(kind) = &job.kind else {
            debug!(job = %job.name, "Skipping job with no kind");
            continue;
        };

        announce(&job.name, kind.label());
        let scope = JobScope::new(config, completed);
        let result = dispatch(handler, kind, &scope)?;

        debug!(job = %job.name, result = %result, "Job completed");
        job.result = JobResult::Completed(result);
    }
    Ok(())
}

fn announce(job: &str, kind: &str) {
    warn!(job = %job, "Executing job");
    info!(kind = %kind, "Type");
}
