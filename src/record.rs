use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use csv::StringRecord;
use once_cell::sync::Lazy;

use crate::error::StoreError;
use crate::registration::Profile;
use crate::scoring::{
    composite_risk, gad_category, ghq_category, phq_category, GadCategory, GhqCategory,
    PhqCategory, RiskLevel,
};
use crate::{AnswerStore, TOTAL_ITEMS};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PREFIX: &str = "STU";

/// Column order of a freshly created store.
pub static HEADER: Lazy<Vec<String>> = Lazy::new(|| {
    let mut columns = [
        "student_id",
        "district",
        "college_name",
        "course",
        "year_of_study",
        "gender",
        "age_group",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect::<Vec<String>>();
    columns.extend((1..=TOTAL_ITEMS).map(|no| format!("Q{}", no)));
    columns.extend(
        [
            "PHQ_score",
            "PHQ_category",
            "GAD_score",
            "GAD_category",
            "GHQ_score",
            "GHQ_category",
            "Composite_Score",
            "Risk_Level",
            "Timestamp",
        ]
        .iter()
        .map(|column| column.to_string()),
    );
    columns
});

/// Sequential student identifier, rendered `STU001`, `STU042`, `STU1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StudentId(u32);

impl StudentId {
    pub const FIRST: StudentId = StudentId(1);

    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Past 999 the number simply gets wider.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", PREFIX, self.0)
    }
}

impl FromStr for StudentId {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || StoreError::Malformed {
            column: "student_id".to_string(),
            value: value.to_string(),
        };
        let digits = value.trim().strip_prefix(PREFIX).ok_or_else(malformed)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        digits.parse::<u32>().map(StudentId).map_err(|_| malformed())
    }
}

/// One row of the assessment store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRecord {
    pub student_id: StudentId,
    pub district: String,
    pub college_name: String,
    pub course: String,
    pub year_of_study: String,
    pub gender: String,
    pub age_group: String,
    /// `Q1`..`Q20`: PHQ items, then GAD, then GHQ
    pub answers: [u8; TOTAL_ITEMS],
    pub phq_score: i32,
    pub phq_category: PhqCategory,
    pub gad_score: i32,
    pub gad_category: GadCategory,
    pub ghq_score: i32,
    pub ghq_category: GhqCategory,
    pub composite_score: i32,
    pub risk_level: RiskLevel,
    /// Absent only on rows read from a store without a `Timestamp` column
    pub timestamp: Option<NaiveDateTime>,
}

/// Scores the answers and assembles the row.
///
/// The profile is copied as is; blank fields stay blank.
pub fn build_record(
    student_id: StudentId,
    profile: &Profile,
    answers: &AnswerStore,
    timestamp: NaiveDateTime,
) -> AssessmentRecord {
    let scores = answers.to_scores();
    AssessmentRecord {
        student_id,
        district: profile.district.clone(),
        college_name: profile.college_name.clone(),
        course: profile.course.clone(),
        year_of_study: profile.year_of_study.clone(),
        gender: profile.gender.clone(),
        age_group: profile.age_group.clone(),
        answers: *answers.values(),
        phq_score: scores.phq,
        phq_category: scores.phq_category(),
        gad_score: scores.gad,
        gad_category: scores.gad_category(),
        ghq_score: scores.ghq,
        ghq_category: scores.ghq_category(),
        composite_score: scores.composite(),
        risk_level: scores.risk(),
        timestamp: Some(timestamp),
    }
}

impl AssessmentRecord {
    /// Column name and rendered value for every field, in `HEADER` order.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("student_id".to_string(), self.student_id.to_string()),
            ("district".to_string(), self.district.clone()),
            ("college_name".to_string(), self.college_name.clone()),
            ("course".to_string(), self.course.clone()),
            ("year_of_study".to_string(), self.year_of_study.clone()),
            ("gender".to_string(), self.gender.clone()),
            ("age_group".to_string(), self.age_group.clone()),
        ];
        fields.extend(
            self.answers
                .iter()
                .enumerate()
                .map(|(index, answer)| (format!("Q{}", index + 1), answer.to_string())),
        );
        fields.extend([
            ("PHQ_score".to_string(), self.phq_score.to_string()),
            ("PHQ_category".to_string(), self.phq_category.to_string()),
            ("GAD_score".to_string(), self.gad_score.to_string()),
            ("GAD_category".to_string(), self.gad_category.to_string()),
            ("GHQ_score".to_string(), self.ghq_score.to_string()),
            ("GHQ_category".to_string(), self.ghq_category.to_string()),
            ("Composite_Score".to_string(), self.composite_score.to_string()),
            ("Risk_Level".to_string(), self.risk_level.to_string()),
            (
                "Timestamp".to_string(),
                self.timestamp
                    .map(|timestamp| timestamp.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
        ]);
        fields
    }

    /// Lays the record out against an existing header. Columns the header
    /// does not know are dropped; header columns the record lacks stay empty.
    pub fn to_row(&self, header: &StringRecord) -> StringRecord {
        let fields = self.fields().into_iter().collect::<HashMap<String, String>>();
        header
            .iter()
            .map(|column| fields.get(column).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Reads a row laid out by `header`.
    ///
    /// Only `student_id` is required. Columns the header lacks read as blank
    /// profile fields and zero answers, and missing scores, categories and
    /// risk are derived from the answers the row does carry.
    pub fn from_row(header: &StringRecord, row: &StringRecord) -> Result<Self, StoreError> {
        let row = RowView::new(header, row);

        let mut answers = AnswerStore::default();
        for question_no in 1..=TOTAL_ITEMS as u8 {
            let column = format!("Q{}", question_no);
            if let Some(score) = row.parse_optional::<u8>(&column)? {
                answers
                    .insert(question_no, score)
                    .map_err(|_| row.malformed(&column))?;
            }
        }
        let scores = answers.to_scores();

        let phq_score = row.parse_optional("PHQ_score")?.unwrap_or(scores.phq);
        let gad_score = row.parse_optional("GAD_score")?.unwrap_or(scores.gad);
        let ghq_score = row.parse_optional("GHQ_score")?.unwrap_or(scores.ghq);
        let composite_score = row
            .parse_optional("Composite_Score")?
            .unwrap_or(phq_score + gad_score + ghq_score);

        let timestamp = match row.optional("Timestamp") {
            Some(value) => Some(
                NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
                    .map_err(|_| row.malformed("Timestamp"))?,
            ),
            None => None,
        };

        Ok(AssessmentRecord {
            student_id: row.field("student_id")?.parse()?,
            district: row.text("district"),
            college_name: row.text("college_name"),
            course: row.text("course"),
            year_of_study: row.text("year_of_study"),
            gender: row.text("gender"),
            age_group: row.text("age_group"),
            answers: *answers.values(),
            phq_score,
            phq_category: row
                .label("PHQ_category")?
                .unwrap_or_else(|| phq_category(phq_score)),
            gad_score,
            gad_category: row
                .label("GAD_category")?
                .unwrap_or_else(|| gad_category(gad_score)),
            ghq_score,
            ghq_category: row
                .label("GHQ_category")?
                .unwrap_or_else(|| ghq_category(ghq_score)),
            composite_score,
            risk_level: row
                .label("Risk_Level")?
                .unwrap_or_else(|| composite_risk(composite_score)),
            timestamp,
        })
    }
}

/// Column lookup by name over one CSV row.
struct RowView<'a> {
    positions: HashMap<&'a str, usize>,
    row: &'a StringRecord,
}

impl<'a> RowView<'a> {
    fn new(header: &'a StringRecord, row: &'a StringRecord) -> Self {
        let positions = header
            .iter()
            .enumerate()
            .map(|(index, column)| (column, index))
            .collect();
        Self { positions, row }
    }

    fn optional(&self, column: &str) -> Option<&'a str> {
        self.positions
            .get(column)
            .map(|index| self.row.get(*index).unwrap_or(""))
    }

    fn field(&self, column: &str) -> Result<&'a str, StoreError> {
        self.optional(column)
            .ok_or_else(|| StoreError::MissingColumn(column.to_string()))
    }

    fn text(&self, column: &str) -> String {
        self.optional(column).unwrap_or("").to_string()
    }

    fn malformed(&self, column: &str) -> StoreError {
        StoreError::Malformed {
            column: column.to_string(),
            value: self.optional(column).unwrap_or("").to_string(),
        }
    }

    /// `None` when the header has no such column.
    fn parse_optional<T: FromStr>(&self, column: &str) -> Result<Option<T>, StoreError> {
        match self.optional(column) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.malformed(column)),
            None => Ok(None),
        }
    }

    fn label<T: FromStr<Err = StoreError>>(&self, column: &str) -> Result<Option<T>, StoreError> {
        self.optional(column).map(str::parse).transpose()
    }
}
