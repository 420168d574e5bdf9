use serde_json::{json, Value};

use crate::reshape::{LongRow, ScatterRow};
use crate::table::{GradeTable, Schema};

/// Qualitative color cycle used for categorical series (subjects, grades).
pub const PALETTE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Color for the n-th category, wrapping around the palette.
pub fn category_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Frame animation timing shared by every animated figure.
const FRAME_MS: u64 = 500;

/// Builds the grouped bar chart of marks per student, animated by subject
///
/// One frame per subject; each frame shows that subject's marks for every
/// student as a bar series in the subject's palette color. The student axis is
/// pinned to the full student list so bars keep their position across frames.
///
/// # Arguments
/// * `long` - The long table, one row per (student, subject) pair
/// * `name_label` - Header label of the detected name column, used as the x-axis title
///
/// # Returns
/// * A plotly figure descriptor with `data`, `layout` and `frames`
pub fn subject_marks(long: &[LongRow], name_label: &str) -> Value {
    let subjects = unique_in_order(long.iter().map(|r| r.subject.clone()));
    let students = unique_in_order(long.iter().map(|r| r.name.clone()));

    let trace_for = |subject: &str, index: usize| -> Value {
        let rows: Vec<&LongRow> = long.iter().filter(|r| r.subject == subject).collect();
        json!({
            "type": "bar",
            "name": subject,
            "x": rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "y": rows.iter().map(|r| r.marks).collect::<Vec<_>>(),
            "marker": {"color": category_color(index)},
        })
    };

    let frames: Vec<Value> = subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| json!({"name": subject, "data": [trace_for(subject, i)]}))
        .collect();
    let data: Vec<Value> = subjects
        .first()
        .map(|first| vec![trace_for(first, 0)])
        .unwrap_or_default();

    let mut layout = json!({
        "title": {"text": "Subject-wise Marks (Animated)"},
        "barmode": "group",
        "xaxis": {
            "title": {"text": name_label},
            "type": "category",
            "categoryorder": "array",
            "categoryarray": students,
        },
        "yaxis": {"title": {"text": "Marks"}},
    });
    let marks: Vec<f64> = long.iter().filter_map(|r| r.marks).collect();
    if let Some(range) = bar_range(&marks) {
        layout["yaxis"]["range"] = json!(range);
    }
    add_animation_controls(&mut layout, "Subject", &subjects);

    json!({"data": data, "layout": layout, "frames": frames})
}

/// Builds the bar chart of total marks per student, animated by grade
///
/// One frame per grade, in order of first appearance; each frame shows the
/// students holding that grade with their `TOTAL` as bar height, colored by
/// the grade's palette color.
///
/// # Arguments
/// * `table` - The wide table
/// * `schema` - Detected column roles for the table
///
/// # Returns
/// * A plotly figure descriptor with `data`, `layout` and `frames`
pub fn total_by_grade(table: &GradeTable, schema: &Schema) -> Value {
    let rows: Vec<(String, String, Option<f64>)> = table
        .rows
        .iter()
        .map(|row| {
            (
                row[schema.name_col].display(),
                row[schema.grade_col].display(),
                row[schema.total_col].as_number(),
            )
        })
        .collect();

    let grades = unique_in_order(rows.iter().map(|(_, g, _)| g.clone()));
    let students = unique_in_order(rows.iter().map(|(n, _, _)| n.clone()));

    let trace_for = |grade: &str, index: usize| -> Value {
        let members: Vec<&(String, String, Option<f64>)> =
            rows.iter().filter(|(_, g, _)| g == grade).collect();
        json!({
            "type": "bar",
            "name": grade,
            "x": members.iter().map(|(n, _, _)| n.clone()).collect::<Vec<_>>(),
            "y": members.iter().map(|(_, _, t)| *t).collect::<Vec<_>>(),
            "marker": {"color": category_color(index)},
        })
    };

    let frames: Vec<Value> = grades
        .iter()
        .enumerate()
        .map(|(i, grade)| json!({"name": grade, "data": [trace_for(grade, i)]}))
        .collect();
    let data: Vec<Value> = grades
        .first()
        .map(|first| vec![trace_for(first, 0)])
        .unwrap_or_default();

    let mut layout = json!({
        "title": {"text": "Total Marks by Student (Animated by Grade)"},
        "xaxis": {
            "title": {"text": schema.name_header(table)},
            "type": "category",
            "categoryorder": "array",
            "categoryarray": students,
        },
        "yaxis": {"title": {"text": "TOTAL"}},
    });
    let totals: Vec<f64> = rows.iter().filter_map(|(_, _, t)| *t).collect();
    if let Some(range) = bar_range(&totals) {
        layout["yaxis"]["range"] = json!(range);
    }
    add_animation_controls(&mut layout, "GRADE", &grades);

    json!({"data": data, "layout": layout, "frames": frames})
}

/// Builds the grade distribution pie
///
/// Counts students per grade and renders a donut with a 0.3 hole. Slices take
/// palette colors in order of first appearance.
pub fn grade_distribution(table: &GradeTable, schema: &Schema) -> Value {
    let all_grades: Vec<String> = table
        .rows
        .iter()
        .map(|row| row[schema.grade_col].display())
        .collect();
    let grades = unique_in_order(all_grades.iter().cloned());
    let counts: Vec<usize> = grades
        .iter()
        .map(|g| all_grades.iter().filter(|x| *x == g).count())
        .collect();
    let colors: Vec<&str> = (0..grades.len()).map(category_color).collect();

    json!({
        "data": [{
            "type": "pie",
            "labels": grades,
            "values": counts,
            "hole": 0.3,
            "marker": {"colors": colors},
        }],
        "layout": {"title": {"text": "Grade Distribution"}},
    })
}

/// Builds the bubble scatter of marks against totals, animated by subject
///
/// Each frame plots one subject's (marks, total) points. Marker area scales
/// with the marks value; hovering shows the student's name. Axis ranges are
/// padded over the whole dataset so frames share a stable viewport.
///
/// # Arguments
/// * `scatter` - The long table joined with each student's total
///
/// # Returns
/// * A plotly figure descriptor with `data`, `layout` and `frames`
pub fn subject_contribution(scatter: &[ScatterRow]) -> Value {
    let subjects = unique_in_order(scatter.iter().map(|r| r.subject.clone()));

    let marks: Vec<f64> = scatter.iter().filter_map(|r| r.marks).collect();
    let totals: Vec<f64> = scatter.iter().filter_map(|r| r.total).collect();
    // Area scaling against a 20px maximum marker, the usual plotly sizeref formula.
    let max_marks = marks.iter().cloned().fold(f64::NAN, f64::max);
    let sizeref = if max_marks.is_finite() && max_marks > 0.0 {
        2.0 * max_marks / (20.0_f64 * 20.0)
    } else {
        1.0
    };

    let trace_for = |subject: &str, index: usize| -> Value {
        let rows: Vec<&ScatterRow> = scatter.iter().filter(|r| r.subject == subject).collect();
        json!({
            "type": "scatter",
            "mode": "markers",
            "name": subject,
            "x": rows.iter().map(|r| r.marks).collect::<Vec<_>>(),
            "y": rows.iter().map(|r| r.total).collect::<Vec<_>>(),
            "hovertext": rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "hovertemplate": "<b>%{hovertext}</b><br>Marks=%{x}<br>TOTAL=%{y}<extra></extra>",
            "marker": {
                "color": category_color(index),
                "size": rows.iter().map(|r| r.marks).collect::<Vec<_>>(),
                "sizemode": "area",
                "sizeref": sizeref,
            },
        })
    };

    let frames: Vec<Value> = subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| json!({"name": subject, "data": [trace_for(subject, i)]}))
        .collect();
    let data: Vec<Value> = subjects
        .first()
        .map(|first| vec![trace_for(first, 0)])
        .unwrap_or_default();

    let mut layout = json!({
        "title": {"text": "Subject Contribution to Total Marks"},
        "xaxis": {"title": {"text": "Marks"}},
        "yaxis": {"title": {"text": "TOTAL"}},
    });
    if let Some(range) = padded_range(&marks) {
        layout["xaxis"]["range"] = json!(range);
    }
    if let Some(range) = padded_range(&totals) {
        layout["yaxis"]["range"] = json!(range);
    }
    add_animation_controls(&mut layout, "Subject", &subjects);

    json!({"data": data, "layout": layout, "frames": frames})
}

/// Builds the four dashboard figures in page order
///
/// # Arguments
/// * `table` - The wide table
/// * `schema` - Detected column roles
/// * `long` - The melted long table
/// * `scatter` - The long table with totals attached
///
/// # Returns
/// * The figure descriptors in the order they appear on the page
pub fn dashboard_figures(
    table: &GradeTable,
    schema: &Schema,
    long: &[LongRow],
    scatter: &[ScatterRow],
) -> Vec<Value> {
    vec![
        subject_marks(long, schema.name_header(table)),
        total_by_grade(table, schema),
        grade_distribution(table, schema),
        subject_contribution(scatter),
    ]
}

/// First-appearance-ordered unique values.
fn unique_in_order<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Bar chart y-range: zero-based with 5% headroom.
fn bar_range(values: &[f64]) -> Option<[f64; 2]> {
    let max = values.iter().cloned().fold(f64::NAN, f64::max);
    if max.is_finite() {
        Some([0.0, max * 1.05])
    } else {
        None
    }
}

/// Numeric axis range padded 5% past the data extent on both sides.
fn padded_range(values: &[f64]) -> Option<[f64; 2]> {
    let min = values.iter().cloned().fold(f64::NAN, f64::min);
    let max = values.iter().cloned().fold(f64::NAN, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    Some([min - pad, max + pad])
}

/// Attaches the play/pause button group and the frame slider to a layout.
fn add_animation_controls(layout: &mut Value, prefix: &str, frame_names: &[String]) {
    if frame_names.len() < 2 {
        return;
    }
    layout["updatemenus"] = json!([play_pause_menu()]);
    layout["sliders"] = json!([frame_slider(prefix, frame_names)]);
}

fn play_pause_menu() -> Value {
    json!({
        "type": "buttons",
        "direction": "left",
        "showactive": false,
        "x": 0.1,
        "xanchor": "right",
        "y": 0.0,
        "yanchor": "top",
        "pad": {"r": 10, "t": 70},
        "buttons": [
            {
                "label": "&#9654;",
                "method": "animate",
                "args": [null, {
                    "mode": "immediate",
                    "fromcurrent": true,
                    "frame": {"duration": FRAME_MS, "redraw": false},
                    "transition": {"duration": FRAME_MS, "easing": "linear"},
                }],
            },
            {
                "label": "&#9724;",
                "method": "animate",
                "args": [[null], {
                    "mode": "immediate",
                    "fromcurrent": true,
                    "frame": {"duration": 0, "redraw": false},
                    "transition": {"duration": 0},
                }],
            },
        ],
    })
}

fn frame_slider(prefix: &str, frame_names: &[String]) -> Value {
    let steps: Vec<Value> = frame_names
        .iter()
        .map(|name| {
            json!({
                "label": name,
                "method": "animate",
                "args": [[name], {
                    "mode": "immediate",
                    "frame": {"duration": FRAME_MS, "redraw": false},
                    "transition": {"duration": FRAME_MS},
                }],
            })
        })
        .collect();

    json!({
        "active": 0,
        "currentvalue": {"prefix": format!("{}=", prefix)},
        "len": 0.9,
        "x": 0.1,
        "xanchor": "left",
        "y": 0.0,
        "yanchor": "top",
        "pad": {"b": 10, "t": 60},
        "steps": steps,
    })
}
