use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Capture;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a capture sequence from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `fstart`, `fstop` float columns and a `power` list column
/// * `.json`    – `[{ "fstart": f, "fstop": f, "power": [...] }, ...]`
/// * `.csv`     – columns `fstart`, `fstop` and `power` (semicolon-separated floats)
pub fn load_file(path: &Path) -> Result<Vec<Capture>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let captures = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(&std::fs::read_to_string(path).context("reading JSON file")?)?,
        "csv" => load_csv(csv::Reader::from_path(path).context("opening CSV")?)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    ensure!(!captures.is_empty(), "{} contains no captures", path.display());
    Ok(captures)
}

/// Reject captures the frequency axis cannot be built for.
fn validate(capture: Capture, row: usize) -> Result<Capture> {
    ensure!(!capture.is_empty(), "Row {row}: empty power array");
    ensure!(
        capture.fstart.is_finite() && capture.fstop.is_finite(),
        "Row {row}: non-finite frequency range"
    );
    ensure!(
        capture.len() == 1 || capture.fstop > capture.fstart,
        "Row {row}: fstop ({}) must be above fstart ({})",
        capture.fstop,
        capture.fstart
    );
    Ok(capture)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema, one object per capture:
///
/// ```json
/// [
///   { "fstart": 2400000000.0, "fstop": 2480000000.0, "power": [-92.1, -91.7, ...] },
///   ...
/// ]
/// ```
///
/// Other keys (`usable`, `segments`, ...) are ignored.
fn load_json(text: &str) -> Result<Vec<Capture>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;

            let capture = Capture {
                fstart: json_f64(obj.get("fstart"), i, "fstart")?,
                fstop: json_f64(obj.get("fstop"), i, "fstop")?,
                power: json_array_to_f64(obj.get("power"), i, "power")?,
            };
            validate(capture, i)
        })
        .collect()
}

fn json_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    val.and_then(|v| v.as_f64())
        .with_context(|| format!("Row {row}: missing or invalid '{col}'"))
}

fn json_array_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("Row {row}: missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("Row {row}, {col}[{j}]: not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with `fstart`, `fstop` and `power`.
/// `power` holds semicolon-separated floats: `"-92.1;-91.7;-90.3"`.
fn load_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Capture>> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let fstart_idx = column("fstart")?;
    let fstop_idx = column("fstop")?;
    let power_idx = column("power")?;

    let mut captures = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let capture = Capture {
            fstart: parse_float(field(fstart_idx), row_no, "fstart")?,
            fstop: parse_float(field(fstop_idx), row_no, "fstop")?,
            power: parse_semicolon_floats(field(power_idx), row_no, "power")?,
        };
        captures.push(validate(capture, row_no)?);
    }

    Ok(captures)
}

fn parse_float(s: &str, row: usize, col: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| parse_float(tok.trim(), row, &format!("{col}[{j}]")))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a capture sequence.
///
/// Expected schema:
/// - `fstart`, `fstop`: Float64 or Float32
/// - `power`: List<Float64> or LargeList<Float64> (Float32 items accepted)
fn load_parquet(path: &Path) -> Result<Vec<Capture>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;
    captures_from_batches(reader)
}

/// Collect captures from record batches. Row numbers in errors count from the
/// start of the file, not the batch.
fn captures_from_batches(
    batches: impl IntoIterator<Item = Result<RecordBatch, ArrowError>>,
) -> Result<Vec<Capture>> {
    let mut captures = Vec::new();

    for batch_result in batches {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let column = |name: &str| {
            schema
                .index_of(name)
                .map(|i| batch.column(i))
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let fstart_col = column("fstart")?;
        let fstop_col = column("fstop")?;
        let power_col = column("power")?;

        for row in 0..batch.num_rows() {
            let index = captures.len();
            let capture = Capture {
                fstart: extract_f64(fstart_col, row)
                    .with_context(|| format!("Row {index}: failed to read 'fstart'"))?,
                fstop: extract_f64(fstop_col, row)
                    .with_context(|| format!("Row {index}: failed to read 'fstop'"))?,
                power: extract_f64_list(power_col, row)
                    .with_context(|| format!("Row {index}: failed to read 'power'"))?,
            };
            captures.push(validate(capture, index)?);
        }
    }

    Ok(captures)
}

// -- Parquet / Arrow helpers --

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("Expected Float64 or Float32 column, got {:?}", col.data_type())
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // Missing samples show up as NaN so the axis stays aligned.
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}
