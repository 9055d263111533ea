//! `$name` substitution of earlier job results

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::job::Job;

/// Pattern for $job_name references
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_\-]*)").expect("valid regex"));

/// Result of the most recent completed job called `name`
pub fn lookup<'a>(jobs: &'a [Job], name: &str) -> Option<&'a str> {
    jobs.iter()
        .rev()
        .find(|job| job.name == name && job.result.is_completed())
        .map(Job::result)
}

/// Replace every `$name` in `text` with that job's result.
/// Unknown names are left as written.
pub fn resolve(text: &str, jobs: &[Job]) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    VAR_PATTERN
        .replace_all(text, |cap: &Captures| match lookup(jobs, &cap[1]) {
            Some(value) => value.to_string(),
            None => cap[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobResult;

    fn done(name: &str, result: &str) -> Job {
        let mut job = Job::set(name, result);
        job.result = JobResult::Completed(result.to_string());
        job
    }

    #[test]
    fn whole_string_reference() {
        let jobs = vec![done("storage", "4A5B6C")];
        assert_eq!(resolve("$storage", &jobs), "4A5B6C");
    }

    #[test]
    fn embedded_references() {
        let jobs = vec![done("fn", "set"), done("val", "5")];
        assert_eq!(resolve("$fn $val", &jobs), "set 5");
    }

    #[test]
    fn unknown_and_pending_are_untouched() {
        let jobs = vec![Job::set("pending", "x")];
        assert_eq!(resolve("$pending and $missing", &jobs), "$pending and $missing");
    }

    #[test]
    fn latest_duplicate_wins() {
        let jobs = vec![done("a", "first"), done("a", "second")];
        assert_eq!(resolve("$a", &jobs), "second");
    }

    #[test]
    fn dashed_names() {
        let jobs = vec![done("deploy-storage", "ADDR")];
        assert_eq!(resolve("$deploy-storage", &jobs), "ADDR");
        assert_eq!(resolve("no vars", &jobs), "no vars");
    }
}
