// src/source.rs

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Number, Value};
use csv::StringRecord;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};
use warp::{
    http::{Method, StatusCode},
    reject::Rejection,
    reply::{self, Reply},
    Filter,
};

use crate::record::Record;
use crate::species;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Read a headered CSV into records keyed by the header names, in column
/// order. Each column gets one type, inferred over all of its cells; short
/// rows are padded with `null` and repeated header names become `name.1`,
/// `name.2`, ...
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_comparison_csv(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = unique_headers(
        reader
            .headers()
            .with_context(|| format!("reading CSV header of {}", path.display()))?,
    );

    let mut rows = Vec::new();
    for (i, row) in reader.records().enumerate() {
        rows.push(row.with_context(|| format!("reading CSV row {} of {}", i + 1, path.display()))?);
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(ColumnKind::of)
                .fold(ColumnKind::Empty, ColumnKind::widen)
        })
        .collect();
    debug!(columns = headers.len(), rows = rows.len(), ?kinds, "inferred column types");

    Ok(rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(col, (name, kind))| {
                    let value = row.get(col).map_or(Value::Null, |f| kind.convert(f));
                    (name.clone(), value)
                })
                .collect::<Record>()
        })
        .collect())
}

/// Header names with repeats renamed `name.1`, `name.2`, ... so no column
/// shadows another.
fn unique_headers(headers: &StringRecord) -> Vec<String> {
    let mut taken: HashSet<String> = headers.iter().map(str::to_string).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();

    headers
        .iter()
        .map(|name| {
            if seen.insert(name) {
                return name.to_string();
            }
            let n = next_suffix.entry(name).or_insert(1);
            loop {
                let candidate = format!("{}.{}", name, n);
                *n += 1;
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

/// Cells read as missing.
const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "#N/A", "NULL", "null", "None",
];

/// The type shared by every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Empty,
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnKind {
    fn of(field: &str) -> Self {
        if NA_VALUES.contains(&field) {
            ColumnKind::Empty
        } else if parse_bool(field).is_some() {
            ColumnKind::Bool
        } else if field.parse::<i64>().is_ok() {
            ColumnKind::Int
        } else if field.parse::<f64>().map_or(false, f64::is_finite) {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, Empty) => a,
            (Empty, b) => b,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }

    fn convert(self, field: &str) -> Value {
        if self != ColumnKind::Text && NA_VALUES.contains(&field) {
            return Value::Null;
        }
        match self {
            ColumnKind::Empty => Value::Null,
            ColumnKind::Bool => parse_bool(field).map_or(Value::Null, Value::Bool),
            ColumnKind::Int => field.parse::<i64>().map_or(Value::Null, Value::from),
            ColumnKind::Float => field
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number),
            ColumnKind::Text if field.is_empty() => Value::Null,
            ColumnKind::Text => Value::String(field.to_string()),
        }
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .map(|e| e.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}

async fn get_comparison_data(csv_path: PathBuf) -> Result<impl Reply, Rejection> {
    let path = csv_path.clone();
    let loaded = tokio::task::spawn_blocking(move || load_comparison_csv(&path))
        .await
        .context("CSV loader task failed")
        .and_then(|r| r);

    let reply = match loaded {
        Ok(records) => {
            info!(rows = records.len(), csv = %csv_path.display(), "serving comparison data");
            reply::with_status(reply::json(&records), StatusCode::OK)
        }
        Err(e) if is_missing_file(&e) => {
            warn!(csv = %csv_path.display(), "comparison CSV missing");
            reply::with_status(
                reply::json(&ErrorResponse {
                    error: "Comparison data CSV missing.".to_string(),
                }),
                StatusCode::NOT_FOUND,
            )
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "loading comparison data failed");
            reply::with_status(
                reply::json(&ErrorResponse {
                    error: format!("{:#}", e),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };
    Ok(reply)
}

/// `GET /get_comparison_data` backed by `csv_path`, plus `GET /health` and
/// `GET /get_species_facts`.
/// The file is re-read on every request.
pub fn routes(csv_path: PathBuf) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| reply::json(&json!({ "status": "healthy" })));

    let data = warp::path("get_comparison_data")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || csv_path.clone()))
        .and_then(get_comparison_data);

    health
        .or(data)
        .or(species::route())
        .with(warp::cors().allow_any_origin().allow_method(Method::GET))
}
