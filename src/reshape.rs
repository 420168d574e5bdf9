use std::collections::HashMap;

use serde::Serialize;

use crate::table::{GradeTable, Schema};

/// One row of the long table: a single (student, subject) pair.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct LongRow {
    pub name: String,
    pub grade: String,
    pub subject: String,
    pub marks: Option<f64>,
}

/// A long row with the student's total attached, for the bubble scatter.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ScatterRow {
    pub name: String,
    pub grade: String,
    pub subject: String,
    pub marks: Option<f64>,
    pub total: Option<f64>,
}

/// Unpivots the wide table into one row per (student, subject) pair.
///
/// Identity columns are the student name and grade; each subject column
/// contributes one output row per student, with the subject label as a
/// categorical field and the cell value as the marks. Missing or non-numeric
/// marks stay absent.
pub fn melt(table: &GradeTable, schema: &Schema) -> Vec<LongRow> {
    let mut out = Vec::with_capacity(table.n_rows() * schema.subject_cols.len());
    for row in &table.rows {
        let name = row[schema.name_col].display();
        let grade = row[schema.grade_col].display();
        for &col in &schema.subject_cols {
            out.push(LongRow {
                name: name.clone(),
                grade: grade.clone(),
                subject: table.headers[col].clone(),
                marks: row[col].as_number(),
            });
        }
    }
    out
}

/// Joins each long row with its student's `TOTAL` from the wide table.
///
/// Totals are looked up by student name; with duplicate names the first wide
/// row wins. Students without a numeric total get an absent total.
pub fn attach_totals(long: &[LongRow], table: &GradeTable, schema: &Schema) -> Vec<ScatterRow> {
    let mut totals: HashMap<String, Option<f64>> = HashMap::with_capacity(table.n_rows());
    for row in &table.rows {
        totals
            .entry(row[schema.name_col].display())
            .or_insert_with(|| row[schema.total_col].as_number());
    }

    long.iter()
        .map(|row| ScatterRow {
            name: row.name.clone(),
            grade: row.grade.clone(),
            subject: row.subject.clone(),
            marks: row.marks,
            total: totals.get(&row.name).copied().flatten(),
        })
        .collect()
}
