//! Default job injection
//!
//! Command-line overrides become ordinary jobs placed in front of the
//! manifest's own: first the `--set` assignments, then the `--address`
//! account job ahead of everything.

use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::job::Job;

/// Name of the account job synthesized from the default address
pub const DEFAULT_ADDR_JOB: &str = "defaultAddr";

/// Prepend the jobs implied by `config` to `jobs`
pub fn inject_defaults(jobs: &mut Vec<Job>, config: &RunConfig) {
    if !config.default_sets.is_empty() {
        prepend(jobs, default_set_jobs(&config.default_sets));
    }

    if !config.default_addr.is_empty() {
        debug!(address = %config.default_addr, "Injecting default account job");
        prepend(jobs, vec![Job::account(DEFAULT_ADDR_JOB, &config.default_addr)]);
    }
}

/// Build Set jobs from `name=value` strings, in the given order
///
/// Entries with an empty name are dropped. Entries without `=` are skipped
/// with a warning.
pub fn default_set_jobs(assignments: &[String]) -> Vec<Job> {
    assignments
        .iter()
        .filter_map(|assignment| {
            let Some((name, value)) = assignment.split_once('=') else {
                warn!(assignment = %assignment, "Ignoring default set without '='");
                return None;
            };
            if name.is_empty() {
                return None;
            }
            debug!(name, value, "Injecting default set job");
            Some(Job::set(name, value))
        })
        .collect()
}

fn prepend(jobs: &mut Vec<Job>, front: Vec<Job>) {
    if front.is_empty() {
        return;
    }
    jobs.splice(0..0, front);
}
