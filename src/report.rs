//! Result reporting
//!
//! After a fully successful run the name → result mapping is written in
//! the configured format:
//! - `csv`: one `name,result` record per job, in list order (`epm.csv`)
//! - `json`: a single object, later duplicate names winning (`epm.json`)
//! - anything else: nothing

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::debug;

use crate::config::{OutputFormat, RunConfig};
use crate::error::EpmError;
use crate::job::Job;

pub const CSV_FILE: &str = "epm.csv";
pub const JSON_FILE: &str = "epm.json";

/// Destination for job results
pub trait ResultSink {
    /// Append one `(name, result)` record
    fn write_record(&mut self, name: &str, result: &str) -> Result<(), EpmError>;

    /// Write the whole mapping at once
    fn write_mapping(&mut self, results: &BTreeMap<String, String>) -> Result<(), EpmError>;
}

/// Writes `epm.csv` / `epm.json` into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(CSV_FILE)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(JSON_FILE)
    }

    /// Remove report files left over from an earlier run
    pub fn clear(&self) -> Result<(), EpmError> {
        for path in [self.csv_path(), self.json_path()] {
            remove_if_exists(&path)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<(), EpmError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ResultSink for FileSink {
    fn write_record(&mut self, name: &str, result: &str) -> Result<(), EpmError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.csv_path())?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([name, result])?;
        writer.flush()?;
        Ok(())
    }

    fn write_mapping(&mut self, results: &BTreeMap<String, String>) -> Result<(), EpmError> {
        let json = serde_json::to_string_pretty(results)?;
        fs::write(self.json_path(), json)?;
        Ok(())
    }
}

/// name → result, later duplicates overwriting earlier ones
pub fn result_mapping(jobs: &[Job]) -> BTreeMap<String, String> {
    jobs.iter()
        .map(|job| (job.name.clone(), job.result().to_string()))
        .collect()
}

/// Write the report for a completed run
pub fn post_process<S>(jobs: &[Job], config: &RunConfig, sink: &mut S) -> Result<(), EpmError>
where
    S: ResultSink + ?Sized,
{
    match config.output {
        OutputFormat::Csv => {
            for job in jobs {
                sink.write_record(&job.name, job.result())?;
            }
            debug!(records = jobs.len(), "Wrote CSV results");
        }
        OutputFormat::Json => {
            sink.write_mapping(&result_mapping(jobs))?;
            debug!("Wrote JSON results");
        }
        OutputFormat::None => {}
    }

    if config.summary_table {
        println!("{}", render_summary(jobs));
    }

    Ok(())
}

/// Plain-text `name | kind | result` table
pub fn render_summary(jobs: &[Job]) -> String {
    const HEADERS: [&str; 3] = ["Job", "Kind", "Result"];

    let rows: Vec<[&str; 3]> = jobs
        .iter()
        .map(|job| [job.name.as_str(), job.label(), job.result()])
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 3]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(HEADERS).bold().to_string());
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.into_iter().map(line));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobResult;
    use tempfile::TempDir;

    fn done(name: &str, result: &str) -> Job {
        let mut job = Job::set(name, result);
        job.result = JobResult::Completed(result.to_string());
        job
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Vec<(String, String)>,
        mappings: Vec<BTreeMap<String, String>>,
        fail_after: Option<usize>,
    }

    impl ResultSink for RecordingSink {
        fn write_record(&mut self, name: &str, result: &str) -> Result<(), EpmError> {
            if self.fail_after == Some(self.records.len()) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.records.push((name.into(), result.into()));
            Ok(())
        }

        fn write_mapping(&mut self, results: &BTreeMap<String, String>) -> Result<(), EpmError> {
            self.mappings.push(results.clone());
            Ok(())
        }
    }

    fn config(output: OutputFormat) -> RunConfig {
        RunConfig {
            output,
            ..Default::default()
        }
    }

    #[test]
    fn csv_records_follow_list_order() {
        let jobs = vec![done("defaultAddr", "ABC"), done("x", "1"), done("a", "r")];
        let mut sink = RecordingSink::default();

        post_process(&jobs, &config(OutputFormat::Csv), &mut sink).unwrap();

        let names: Vec<_> = sink.records.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["defaultAddr", "x", "a"]);
        assert!(sink.mappings.is_empty());
    }

    #[test]
    fn csv_write_error_stops() {
        let jobs = vec![done("a", "1"), done("b", "2"), done("c", "3")];
        let mut sink = RecordingSink {
            fail_after: Some(1),
            ..Default::default()
        };

        let err = post_process(&jobs, &config(OutputFormat::Csv), &mut sink).unwrap_err();
        assert!(matches!(err, EpmError::Io(_)));
        assert_eq!(sink.records.len(), 1);
    }

    #[test]
    fn json_last_duplicate_wins() {
        let jobs = vec![done("a", "r1"), done("a", "r2")];
        let mut sink = RecordingSink::default();

        post_process(&jobs, &config(OutputFormat::Json), &mut sink).unwrap();

        assert_eq!(sink.mappings.len(), 1);
        assert_eq!(
            sink.mappings[0],
            BTreeMap::from([("a".to_string(), "r2".to_string())])
        );
    }

    #[test]
    fn other_format_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());
        let jobs = vec![done("a", "1")];

        post_process(&jobs, &config(OutputFormat::None), &mut sink).unwrap();

        assert!(!sink.csv_path().exists());
        assert!(!sink.json_path().exists());
    }

    #[test]
    fn json_file_is_byte_identical_across_runs() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());
        let jobs = vec![done("zeta", "1"), done("alpha", "2"), done("mid", "")];
        let config = config(OutputFormat::Json);

        post_process(&jobs, &config, &mut sink).unwrap();
        let first = fs::read(sink.json_path()).unwrap();
        post_process(&jobs, &config, &mut sink).unwrap();
        let second = fs::read(sink.json_path()).unwrap();

        assert_eq!(first, second);
        let parsed: BTreeMap<String, String> = serde_json::from_slice(&first).unwrap();
        assert_eq!(parsed["alpha"], "2");
        assert_eq!(parsed["mid"], "");
    }

    #[test]
    fn csv_file_quotes_fields() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());
        let jobs = vec![done("limit", "100"), done("msg", "hello, world")];

        post_process(&jobs, &config(OutputFormat::Csv), &mut sink).unwrap();

        let text = fs::read_to_string(sink.csv_path()).unwrap();
        assert_eq!(text, "limit,100\nmsg,\"hello, world\"\n");
    }

    #[test]
    fn clear_removes_old_reports() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path());
        fs::write(sink.csv_path(), "old,1\n").unwrap();

        sink.clear().unwrap();
        assert!(!sink.csv_path().exists());
        // Nothing to remove is fine
        sink.clear().unwrap();
    }

    #[test]
    fn summary_lists_every_job() {
        colored::control::set_override(false);
        let jobs = vec![done("limit", "100"), Job::empty("skipped")];

        let table = render_summary(&jobs);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Job     | Kind | Result");
        assert_eq!(lines[2], "limit   | Set  | 100");
        assert_eq!(lines[3], "skipped | -    |");
    }
}
