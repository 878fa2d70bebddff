use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use dyad_models::decision::ResultRecord;

use crate::error::ResultsError;

/// Append-only writer for the experiment results file.
///
/// One pipe-delimited line per completed run, flushed per append. The
/// field order in [`format_record`] is the compatibility surface for
/// downstream analysis tooling: new fields may only be appended after
/// `Mismatch`, never inserted or reordered.
pub struct ResultWriter {
    file: File,
    path: PathBuf,
}

impl ResultWriter {
    /// Open the results file in append mode, creating it (and its parent
    /// directory) if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        Ok(Self { file, path })
    }

    /// Append one completed-run record.
    pub fn append(&mut self, record: &ResultRecord) -> Result<(), ResultsError> {
        writeln!(self.file, "{}", format_record(record))?;
        self.file.flush()?;
        info!(path = %self.path.display(), mismatch = record.mismatch, "result recorded");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render one record as a results-file line.
///
/// Downstream analysis scripts key on these labels in this order;
/// `Run_ID` sits last so anything new goes after it.
pub fn format_record(record: &ResultRecord) -> String {
    format!(
        "{timestamp} | Task_ID:{task_id} | Agent1_U_Value:{u1} | Agent2_U_Value:{u2} | \
         Agent1_Belief:{b1} | Agent2_Belief:{b2} | Agent1_Choice:{c1} | Agent1_Strategy:{s1} | \
         Agent2_Choice:{c2} | Agent2_Strategy:{s2} | Mismatch:{mismatch} | Run_ID:{run_id}",
        timestamp = record.completed_at.format("%Y-%m-%d %H:%M:%S"),
        task_id = record.task_id,
        u1 = record.thresholds.initiator.normalize(),
        u2 = record.thresholds.responder.normalize(),
        b1 = record.initial_beliefs.initiator,
        b2 = record.initial_beliefs.responder,
        c1 = record.decisions.initiator.choice,
        s1 = record.decisions.initiator.strategy,
        c2 = record.decisions.responder.choice,
        s2 = record.decisions.responder.strategy,
        mismatch = record.mismatch as u8,
        run_id = record.run_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use dyad_models::conversation::{PerRole, Role};
    use dyad_models::decision::{Decision, Strategy};

    fn sample_record(mismatch_strategies: bool) -> ResultRecord {
        let responder_strategy = if mismatch_strategies {
            Strategy::Individual
        } else {
            Strategy::Collaborative
        };
        let responder_choice = if mismatch_strategies { "Y" } else { "L" };
        ResultRecord::new(
            Uuid::nil(),
            Utc.with_ymd_and_hms(2026, 8, 7, 14, 30, 0).unwrap(),
            1,
            PerRole::new(dec!(0.66), dec!(0.75)),
            PerRole::new(95, 25),
            PerRole::new(
                Decision {
                    agent: Role::Initiator,
                    choice: "A".to_string(),
                    strategy: Strategy::Collaborative,
                    reasoning: "above the u-value".to_string(),
                },
                Decision {
                    agent: Role::Responder,
                    choice: responder_choice.to_string(),
                    strategy: responder_strategy,
                    reasoning: "weighed the downside".to_string(),
                },
            ),
        )
    }

    #[test]
    fn line_format_is_stable() {
        let line = format_record(&sample_record(false));
        assert_eq!(
            line,
            "2026-08-07 14:30:00 | Task_ID:1 | Agent1_U_Value:0.66 | Agent2_U_Value:0.75 | \
             Agent1_Belief:95 | Agent2_Belief:25 | Agent1_Choice:A | \
             Agent1_Strategy:collaborative | Agent2_Choice:L | Agent2_Strategy:collaborative | \
             Mismatch:0 | Run_ID:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn mismatch_renders_as_one() {
        let line = format_record(&sample_record(true));
        assert!(line.contains("Mismatch:1"));
        assert!(line.contains("Agent2_Strategy:individual"));
    }

    #[test]
    fn append_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let mut writer = ResultWriter::open(&path).unwrap();
        writer.append(&sample_record(false)).unwrap();
        writer.append(&sample_record(true)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Mismatch:0"));
        assert!(lines[1].contains("Mismatch:1"));
    }

    #[test]
    fn reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        ResultWriter::open(&path)
            .unwrap()
            .append(&sample_record(false))
            .unwrap();
        ResultWriter::open(&path)
            .unwrap()
            .append(&sample_record(false))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn open_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/results/experiment.txt");
        let writer = ResultWriter::open(&path).unwrap();
        assert_eq!(writer.path(), path.as_path());
        assert!(path.parent().unwrap().exists());
    }
}
