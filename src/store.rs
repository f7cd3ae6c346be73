//! Append-only CSV of assessment records.
//!
//! Every append reads the whole file and writes it back through a temporary
//! file. A mutex serialises that cycle within the process; nothing guards
//! against a second process writing the same file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDateTime, Timelike};
use csv::StringRecord;

use crate::error::StoreError;
use crate::record::{build_record, AssessmentRecord, StudentId, HEADER};
use crate::registration::Profile;
use crate::AnswerStore;

#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier for the next row. Falls back to `STU001` when the store is
    /// missing, empty or its last identifier cannot be read.
    pub fn next_student_id(&self) -> StudentId {
        let _guard = self.guard();
        self.next_student_id_locked()
    }

    /// Adds one row. The store is created with the standard header when it
    /// does not exist yet.
    pub fn append(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.append_locked(record)
    }

    /// Scores `answers`, numbers the record and appends it, all under one lock
    /// so two submissions never share an identifier.
    pub fn submit(
        &self,
        profile: &Profile,
        answers: &AnswerStore,
    ) -> Result<AssessmentRecord, StoreError> {
        self.submit_at(profile, answers, now())
    }

    pub fn submit_at(
        &self,
        profile: &Profile,
        answers: &AnswerStore,
        timestamp: NaiveDateTime,
    ) -> Result<AssessmentRecord, StoreError> {
        let _guard = self.guard();
        let record = build_record(self.next_student_id_locked(), profile, answers, timestamp);
        self.append_locked(&record)?;
        tracing::info!(
            student_id = %record.student_id,
            composite = record.composite_score,
            risk = %record.risk_level,
            "assessment stored"
        );
        Ok(record)
    }

    /// Every data row in insertion order, each parsed on its own so one bad
    /// row does not hide the rest.
    pub fn rows(&self) -> Result<Vec<Result<AssessmentRecord, StoreError>>, StoreError> {
        let _guard = self.guard();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let header = reader.headers()?.clone();
        Ok(reader
            .records()
            .map(|row| -> Result<AssessmentRecord, StoreError> {
                AssessmentRecord::from_row(&header, &row?)
            })
            .collect())
    }

    /// Every readable record in insertion order. Rows that cannot be read
    /// are logged and skipped.
    pub fn records(&self) -> Result<Vec<AssessmentRecord>, StoreError> {
        let records = self
            .rows()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match row {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        row = index + 1,
                        %error,
                        "skipping unreadable row"
                    );
                    None
                }
            })
            .collect();
        Ok(records)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_student_id_locked(&self) -> StudentId {
        if !self.path.exists() {
            return StudentId::FIRST;
        }
        match self.last_student_id() {
            Ok(Some(last)) => last.next(),
            Ok(None) => StudentId::FIRST,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "cannot read last student id, numbering restarts at STU001"
                );
                StudentId::FIRST
            }
        }
    }

    fn last_student_id(&self) -> Result<Option<StudentId>, StoreError> {
        let (header, rows) = self.read_table()?;
        let column = header
            .iter()
            .position(|column| column == "student_id")
            .ok_or_else(|| StoreError::MissingColumn("student_id".to_string()))?;
        match rows.last() {
            Some(row) => row.get(column).unwrap_or("").parse().map(Some),
            None => Ok(None),
        }
    }

    fn append_locked(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        let (header, mut rows) = if self.path.exists() {
            self.read_table()?
        } else {
            (StringRecord::new(), Vec::new())
        };
        let header = if header.is_empty() {
            tracing::debug!(path = %self.path.display(), "creating assessment store");
            HEADER.iter().collect::<StringRecord>()
        } else {
            header
        };
        rows.push(record.to_row(&header));
        self.write_table(&header, &rows)
    }

    fn read_table(&self) -> Result<(StringRecord, Vec<StringRecord>), StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let header = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<StringRecord>, csv::Error>>()?;
        Ok((header, rows))
    }

    fn write_table(&self, header: &StringRecord, rows: &[StringRecord]) -> Result<(), StoreError> {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let written = write_rows(&staging, header, rows).and_then(|()| {
            fs::rename(&staging, &self.path).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
        });
        if written.is_err() && staging.exists() {
            let _ = fs::remove_file(&staging);
        }
        written
    }
}

fn write_rows(path: &Path, header: &StringRecord, rows: &[StringRecord]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Local wall clock, to the second.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
