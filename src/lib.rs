/*!
# Student Performance Dashboard

A browser-based dashboard of student grades, built in Rust.

## Overview

This project loads a spreadsheet of student results, validates its shape,
reshapes it for per-subject analysis, and serves a single page of four
interactive charts. All data is read once at startup; the served page is a
precomputed, immutable snapshot of that file.

## Architecture

The application is a linear pipeline in front of a web server:

### Loading Layer
- **Technologies**: csv, calamine
- **Key Components**:
  - File Loader - Reads `.csv` and `.xlsx` files into a wide table
  - Header Normalizer - Trims column labels on the way in
  - Schema Detector - Finds the name column, the required `TOTAL`/`GRADE`
    columns, and the subject columns

### Reshaping Layer
- **Core Components**:
  - Melt - Unpivots the wide table into one row per (student, subject) pair
  - Total Join - Attaches each student's total to the long rows for the
    bubble scatter

### Chart Layer
- **Technologies**: serde_json (plotly figure schema)
- **Charts**:
  - Subject-wise marks - Grouped bars, one animation frame per subject
  - Total marks by student - Bars colored and animated by grade
  - Grade distribution - Donut of students per grade
  - Subject contribution - Bubble scatter of marks against totals

### Serving Layer
- **Technologies**: axum, tokio, tower-http
- Assembles the page (header plus a two-column chart grid, rendered
  client-side by plotly.js) and serves it read-only to any number of clients.

## Error Handling

All failures are at startup and fail fast: missing file, missing name column,
missing required column, no subject columns. Each error names the missing
element. Once serving begins there is nothing left to fail outside the HTTP
framework itself.

## Usage

```text
gradedash [FILE]        # FILE defaults to Student.xlsx
PORT=9000 gradedash     # listen port, default 8050
```

## HTTP Endpoints

- `/` - The dashboard page
- `/healthz` - Liveness probe
*/

// Re-export all modules so they appear in the documentation
pub mod app;
pub mod chart;
pub mod loader;
pub mod reshape;
pub mod table;

/// Re-export everything from these modules to make it easier to use
pub use chart::*;
pub use loader::*;
pub use reshape::*;
pub use table::*;
