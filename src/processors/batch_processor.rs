use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::converter::Converter;
use crate::error::{ConversionError, Result};
use crate::utils::progress::ProgressReporter;

/// Result of converting one line of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// 1-based line number in the input
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl BatchOutcome {
    fn from_result(line: usize, result: Result<String>) -> Self {
        match result {
            Ok(converted) => Self {
                line,
                result: Some(converted),
                error: None,
                kind: None,
            },
            Err(e) => Self {
                line,
                result: None,
                error: Some(e.to_string()),
                kind: Some(e.kind().to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Converted {} of {} requests ({} failed)",
            self.succeeded, self.total, self.failed
        )
    }
}

/// Converts many JSON requests in parallel, one per input line.
pub struct BatchProcessor {
    max_workers: usize,
}

impl BatchProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    /// Convert every non-blank line, keeping input order. A failing line
    /// is recorded in its outcome and does not stop the batch.
    pub fn process_lines(
        &self,
        converter: &Converter,
        lines: &[String],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<BatchOutcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ConversionError::WorkerPool(e.to_string()))?;

        debug!(lines = lines.len(), workers = self.max_workers, "starting batch");

        let outcomes = pool.install(|| {
            lines
                .par_iter()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(index, line)| {
                    let outcome =
                        BatchOutcome::from_result(index + 1, converter.handle_request(line));

                    if let Some(p) = progress {
                        p.increment(1);
                    }

                    outcome
                })
                .collect()
        });

        Ok(outcomes)
    }

    /// Read requests from `input` and write one JSON outcome per line to
    /// `output`.
    pub fn process_reader<R: BufRead, W: Write>(
        &self,
        converter: &Converter,
        input: R,
        mut output: W,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchSummary> {
        let lines = input.lines().collect::<std::io::Result<Vec<String>>>()?;

        let outcomes = self.process_lines(converter, &lines, progress)?;

        for outcome in &outcomes {
            writeln!(output, "{}", serde_json::to_string(outcome)?)?;
        }
        output.flush()?;

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch complete"
        );
        Ok(summary)
    }

    /// Convert a JSON-lines request file, writing to `output` or stdout.
    pub fn process_file(
        &self,
        converter: &Converter,
        input: &Path,
        output: Option<&Path>,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchSummary> {
        let reader = BufReader::new(File::open(input)?);

        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let writer = BufWriter::new(File::create(path)?);
                self.process_reader(converter, reader, writer, progress)
            }
            None => {
                let stdout = std::io::stdout();
                self.process_reader(converter, reader, stdout.lock(), progress)
            }
        }
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn requests() -> Vec<String> {
        vec![
            r#"{"coordinates": "8FVC9G8F+6X", "from": "pluscode", "to": "dd"}"#.to_string(),
            String::new(),
            r#"{"coordinates": "x", "from": "barf", "to": "dd"}"#.to_string(),
            r#"{"coordinates": "42 -93", "from": "dd", "to": "mgrs"}"#.to_string(),
            "not json".to_string(),
        ]
    }

    #[test]
    fn test_process_lines_keeps_order_and_skips_blanks() {
        let processor = BatchProcessor::new(2);
        let outcomes = processor
            .process_lines(&Converter::new(), &requests(), None)
            .unwrap();

        let lines: Vec<usize> = outcomes.iter().map(|o| o.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 5]);

        assert_eq!(outcomes[0].result.as_deref(), Some("47.3655625 8.5249375"));
        assert_eq!(outcomes[1].kind.as_deref(), Some("unsupported_format"));
        assert_eq!(outcomes[2].result.as_deref(), Some("15TWG0000049776"));
        assert_eq!(outcomes[3].kind.as_deref(), Some("json"));
    }

    #[test]
    fn test_process_reader_writes_json_lines() {
        let processor = BatchProcessor::default();
        let input = requests().join("\n");
        let mut output = Vec::new();

        let summary = processor
            .process_reader(&Converter::new(), input.as_bytes(), &mut output, None)
            .unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                succeeded: 2,
                failed: 2
            }
        );

        let text = String::from_utf8(output).unwrap();
        let written: Vec<BatchOutcome> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(written.len(), 4);
        assert!(text.lines().next().unwrap().starts_with(r#"{"line":1,"result":"#));
        assert!(!text.lines().next().unwrap().contains("error"));
    }

    #[test]
    fn test_summary_text() {
        let summary = BatchSummary {
            total: 4,
            succeeded: 3,
            failed: 1,
        };
        assert_eq!(summary.summary(), "Converted 3 of 4 requests (1 failed)");
    }
}
