//! File conversion orchestrator.
//!
//! A [`ConversionJob`] owns everything about converting one input file:
//!
//! 1. Skip the file if its output already exists
//! 2. Stream the input through header binding and row validation into a
//!    JSON array
//! 3. On success move the input to the completed directory and write the
//!    error report; on failure remove the output and leave the input alone
//!
//! Jobs share no state, so one job per file can run on its own thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use fileconverter::{ConversionJob, JobOutcome};
//!
//! let job = ConversionJob::new("/data/in/people.csv", &dirs)?;
//! if let JobOutcome::Converted(summary) = job.process() {
//!     println!("{} records written", summary.records_written);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use super::row::transform_row;
use crate::config::Directories;
use crate::error::{HeaderError, JobError, JobResult};
use crate::models::PersonRecord;
use crate::parser::{bind_header, decode_line};
use crate::report::ErrorCollector;

/// Extension appended to the input file name to form the output name.
pub const OUTPUT_EXTENSION: &str = "json";

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The output already existed; nothing was touched.
    Skipped,
    /// The job was abandoned; the input is still in place.
    Failed(JobError),
    /// The input was converted, possibly with row errors.
    Converted(JobSummary),
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed(_))
    }
}

/// Status of a finished conversion.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub input: PathBuf,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    /// Lines read, header included.
    pub lines_read: u64,
    pub records_written: u64,
    pub row_errors: usize,
    /// Whether the input reached the completed directory.
    pub relocated: bool,
    /// Path of the error report, if one was written.
    pub error_report: Option<PathBuf>,
    /// Why the error report could not be written.
    pub report_error: Option<String>,
}

/// Internal result of the streaming step.
enum Conversion {
    Written,
    OutputExists,
}

/// Conversion state for one input file.
#[derive(Debug)]
pub struct ConversionJob {
    id: Uuid,
    started_at: DateTime<Utc>,
    input_path: PathBuf,
    output_path: PathBuf,
    error_path: PathBuf,
    completed_path: PathBuf,
    output_created: bool,
    lines_read: u64,
    lines_written: u64,
    errors: ErrorCollector,
}

impl ConversionJob {
    /// Prepare a job for `input`, deriving the artifact paths from its
    /// file name.
    pub fn new(input: impl AsRef<Path>, dirs: &Directories) -> JobResult<Self> {
        let input = input.as_ref();
        let file_name = match input.file_name() {
            Some(name) if input.is_file() => name,
            _ => return Err(JobError::NotAFile(input.to_path_buf())),
        };

        let mut output_name = file_name.to_os_string();
        output_name.push(".");
        output_name.push(OUTPUT_EXTENSION);

        Ok(Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            input_path: input.to_path_buf(),
            output_path: dirs.output.join(output_name),
            error_path: dirs.errors.join(file_name),
            completed_path: dirs.completed.join(file_name),
            output_created: false,
            lines_read: 0,
            lines_written: 0,
            errors: ErrorCollector::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    pub fn completed_path(&self) -> &Path {
        &self.completed_path
    }

    /// True when the output artifact already exists.
    pub fn is_already_processed(&self) -> bool {
        self.output_path.exists()
    }

    /// Run the job to completion.
    ///
    /// Never panics on I/O problems and never terminates the process; every
    /// result is logged and also reflected on the filesystem.
    pub fn process(mut self) -> JobOutcome {
        let span = info_span!("job", id = %self.id, file = %self.input_path.display());
        let _enter = span.enter();

        if self.is_already_processed() {
            warn!("file {} is already processed", self.input_path.display());
            return JobOutcome::Skipped;
        }

        let result = self.convert();
        self.conclude(result)
    }

    /// Turn the result of the streaming step into an outcome, cleaning up
    /// or relocating as needed.
    fn conclude(self, result: JobResult<Conversion>) -> JobOutcome {
        match result {
            Ok(Conversion::OutputExists) => {
                warn!(
                    "file {} is already being processed elsewhere",
                    self.input_path.display()
                );
                JobOutcome::Skipped
            }
            Ok(Conversion::Written) => JobOutcome::Converted(self.finish()),
            Err(err) => {
                self.discard_output();
                error!(error = %err, "conversion failed, input left in place");
                JobOutcome::Failed(err)
            }
        }
    }

    /// Open both files and stream the input into the output array.
    ///
    /// The output is created with `create_new`, so a job racing another
    /// for the same file never truncates the winner's output.
    fn convert(&mut self) -> JobResult<Conversion> {
        let input = File::open(&self.input_path).map_err(|source| JobError::OpenInput {
            path: self.input_path.clone(),
            source,
        })?;

        let output = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.output_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(Conversion::OutputExists),
            Err(source) => {
                return Err(JobError::OpenOutput {
                    path: self.output_path.clone(),
                    source,
                })
            }
        };
        self.output_created = true;

        self.stream(BufReader::new(input), BufWriter::new(output))
    }

    fn stream<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> JobResult<Conversion> {
        let mut buf = Vec::new();

        if !self.read_next(&mut reader, &mut buf)? {
            return Err(JobError::Header {
                path: self.input_path.clone(),
                source: HeaderError::Missing,
            });
        }
        let header = bind_header(&decode_line(&buf)).map_err(|source| JobError::Header {
            path: self.input_path.clone(),
            source,
        })?;
        debug!(columns = ?header.columns(), "header bound");

        while self.read_next(&mut reader, &mut buf)? {
            let line = decode_line(&buf);
            if let Some(record) = transform_row(&header, &line, self.lines_read, &mut self.errors) {
                self.write_record(&mut writer, &record)?;
            }
        }

        if self.lines_written > 0 {
            writer.write_all(b"]\n").map_err(|e| self.write_error(e))?;
        }
        writer.flush().map_err(|e| self.write_error(e))?;

        Ok(Conversion::Written)
    }

    /// Read the next raw line into `buf`, counting it. Returns `false` at
    /// end of input.
    fn read_next<R: BufRead>(&mut self, reader: &mut R, buf: &mut Vec<u8>) -> JobResult<bool> {
        buf.clear();
        let n = reader
            .read_until(b'\n', buf)
            .map_err(|source| JobError::Read {
                path: self.input_path.clone(),
                line: self.lines_read + 1,
                source,
            })?;
        if n == 0 {
            return Ok(false);
        }
        self.lines_read += 1;
        Ok(true)
    }

    /// Append one array element.
    fn write_record<W: Write>(&mut self, writer: &mut W, record: &PersonRecord) -> JobResult<()> {
        write_element(writer, record, self.lines_written == 0).map_err(|e| self.write_error(e))?;
        self.lines_written += 1;
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> JobError {
        JobError::Write {
            path: self.output_path.clone(),
            source,
        }
    }

    fn discard_output(&self) {
        if !self.output_created {
            return;
        }
        if let Err(e) = fs::remove_file(&self.output_path) {
            if e.kind() != ErrorKind::NotFound {
                error!(
                    "cannot remove output {} after failure: {}",
                    self.output_path.display(),
                    e
                );
            }
        }
    }

    /// Relocate the input, write the error report and build the summary.
    fn finish(self) -> JobSummary {
        let relocated = match relocate(&self.input_path, &self.completed_path) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "cannot move {} to {}: {}",
                    self.input_path.display(),
                    self.completed_path.display(),
                    e
                );
                false
            }
        };

        let (error_report, report_error) = match self.errors.write_report(&self.error_path) {
            Ok(written) => {
                info!(
                    "successfully processed: {}: lines[{}] errors[{}]",
                    self.input_path.display(),
                    self.lines_read,
                    self.errors.len()
                );
                (written.then(|| self.error_path.clone()), None)
            }
            Err(e) => {
                error!(
                    error = %e,
                    "failed to produce error file. processed: {}: lines[{}] errors[{}]",
                    self.input_path.display(),
                    self.lines_read,
                    self.errors.len()
                );
                (None, Some(e.to_string()))
            }
        };

        JobSummary {
            job_id: self.id,
            input: self.input_path,
            output: self.output_path,
            started_at: self.started_at,
            elapsed_ms: (Utc::now() - self.started_at).num_milliseconds(),
            lines_read: self.lines_read,
            records_written: self.lines_written,
            row_errors: self.errors.len(),
            relocated,
            error_report,
            report_error,
        }
    }
}

/// Write `record` as compact JSON on its own line, preceded by the array
/// opener for the first element or a separator for the rest.
fn write_element<W: Write>(writer: &mut W, record: &PersonRecord, first: bool) -> io::Result<()> {
    writer.write_all(if first { b"[\n" } else { b",\n" })?;
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")
}

/// Move a file, copying across filesystems when a rename is not possible.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            fs::copy(from, to).map_err(|_| rename_err)?;
            drop_copy_on_error(to, fs::remove_file(from))
        }
    }
}

/// If the original could not be removed after a copy, remove the copy so
/// the file only exists in the input directory.
fn drop_copy_on_error(copy: &Path, removed: io::Result<()>) -> io::Result<()> {
    let Err(e) = removed else {
        return Ok(());
    };
    error!(
        "copied to {} but cannot remove the original: {}",
        copy.display(),
        e
    );
    if let Err(cleanup) = fs::remove_file(copy) {
        error!(
            "cannot remove copy {}, file now exists twice: {}",
            copy.display(),
            cleanup
        );
    }
    Err(e)
}
