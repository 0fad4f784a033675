use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{SALES_COLUMNS, SalesMeasure, SalesRecord, SalesTable, year_from_f64};

// ---------------------------------------------------------------------------
// Load errors surfaced to the user
// ---------------------------------------------------------------------------

/// Why a sales table could not be loaded. Both cases fall back to an empty table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("'{}' not found. Check the data folder or open a file with File → Open…", .path.display())]
    NotFound { path: PathBuf },

    #[error("'{}' could not be read as a sales table: {source:#}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names (default)
/// * `.json`    – `[{ "Name": ..., "Genre": ..., "Global_Sales": ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<SalesTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow!("Unsupported file extension: .{other}")),
    }
    .and_then(|records| ensure_finite_sales(&records).map(|()| records))
    .map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SalesTable::from_records(records))
}

/// Sales cells such as `nan` or `inf` parse as floats but make the file malformed.
fn ensure_finite_sales(records: &[SalesRecord]) -> Result<()> {
    for (row_no, record) in records.iter().enumerate() {
        if let Some(measure) = record.non_finite_measure() {
            bail!(
                "Row {row_no}: non-finite value {} in '{measure}'",
                record.measure(measure)
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Columns are matched by header name; extra columns such as `Rank` are ignored.
fn load_csv(path: &Path) -> Result<Vec<SalesRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?;
    if headers.is_empty() {
        bail!("CSV has no header row");
    }
    let missing: Vec<&str> = SALES_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        log::warn!("{} lacks columns {missing:?}", path.display());
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<SalesRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
fn load_json(path: &Path) -> Result<Vec<SalesRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing JSON records")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Text columns may be Utf8 or LargeUtf8, numeric columns Int32/Int64/Float32/Float64.
/// `Year` may be null; null sales figures are rejected.
fn load_parquet(path: &Path) -> Result<Vec<SalesRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut offset = 0;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, offset, &mut records)?;
        offset += batch.num_rows();
    }
    Ok(records)
}

fn read_batch(batch: &RecordBatch, offset: usize, out: &mut Vec<SalesRecord>) -> Result<()> {
    let title = required_column(batch, "Name")?;
    let genre = required_column(batch, "Genre")?;
    let year = required_column(batch, "Year")?;
    let platform = optional_column(batch, "Platform");
    let publisher = optional_column(batch, "Publisher");
    let sales = SalesMeasure::ALL
        .iter()
        .map(|m| required_column(batch, m.column()))
        .collect::<Result<Vec<_>>>()?;

    for row in 0..batch.num_rows() {
        let row_no = offset + row;
        let figure = |i: usize| -> Result<f64> {
            let measure = SalesMeasure::ALL[i];
            extract_f64(sales[i], row)?
                .with_context(|| format!("Row {row_no}: null in '{measure}'"))
        };

        let year = extract_f64(year, row)?.and_then(year_from_f64);

        out.push(SalesRecord {
            title: extract_string(title, row)?.unwrap_or_default(),
            platform: match platform {
                Some(col) => extract_string(col, row)?.unwrap_or_default(),
                None => String::new(),
            },
            year,
            genre: extract_string(genre, row)?
                .with_context(|| format!("Row {row_no}: null in 'Genre'"))?,
            publisher: match publisher {
                Some(col) => extract_string(col, row)?.unwrap_or_default(),
                None => String::new(),
            },
            na_sales: figure(0)?,
            eu_sales: figure(1)?,
            jp_sales: figure(2)?,
            other_sales: figure(3)?,
            global_sales: figure(4)?,
        });
    }
    Ok(())
}

// -- Arrow helpers --

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn optional_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a Arc<dyn Array>> {
    let idx = batch.schema().index_of(name).ok()?;
    Some(batch.column(idx))
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .context("expected LargeStringArray")?
            .value(row)
            .to_string(),
        other => bail!("Expected a text column, got {other:?}"),
    };
    Ok(Some(value))
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(Some(value))
}
