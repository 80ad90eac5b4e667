use crate::types::{CreatecError, CreatecResult};
use csv::{ReaderBuilder, Trim};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Split a decoded .vert payload into `(header_line, body)`.
///
/// The payload starts with a throwaway line, then the scan-point header
/// line, then the delimited table body.
pub fn split_payload(text: &str) -> CreatecResult<(&str, &str)> {
    let mut parts = text.splitn(3, '\n');
    let _preamble = parts.next();
    match (parts.next(), parts.next()) {
        (Some(header), Some(body)) => Ok((header, body)),
        _ => Err(CreatecError::MalformedSpecHeader(
            "payload has fewer than three lines".to_string(),
        )),
    }
}

/// Spectroscopy samples indexed by the index column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecTable {
    index_name: String,
    columns: Vec<String>,
    index: Vec<i64>,
    data: Array2<f64>,
}

impl SpecTable {
    /// Parse a headerless delimited body.
    ///
    /// `columns[0]` names the index column; every non-empty row must have
    /// exactly `columns.len()` fields.
    pub fn parse(body: &str, columns: &[String], delimiter: u8) -> CreatecResult<Self> {
        let (index_name, value_columns) = columns.split_first().ok_or_else(|| {
            CreatecError::MalformedSpecHeader("no columns derived for table".to_string())
        })?;
        let expected = columns.len();

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let mut index = Vec::new();
        let mut values = Vec::new();
        // 1-based data row, blank lines not counted
        let mut row = 0;

        for record in reader.records() {
            let record = record.map_err(|e| {
                CreatecError::MalformedSpecHeader(format!("table row {}: {}", row + 1, e))
            })?;

            let mut fields: Vec<&str> = record.iter().collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            row += 1;
            // a terminating delimiter leaves one empty trailing field
            if fields.len() == expected + 1 && fields.last() == Some(&"") {
                fields.pop();
            }
            if fields.len() != expected {
                return Err(CreatecError::ColumnCountMismatch {
                    row,
                    expected,
                    found: fields.len(),
                });
            }

            index.push(parse_index(fields[0], row, index_name)?);
            for (value, column) in fields[1..].iter().zip(value_columns) {
                let parsed = value.parse::<f64>().map_err(|_| CreatecError::MalformedTableValue {
                    row,
                    column: column.clone(),
                    value: value.to_string(),
                })?;
                values.push(parsed);
            }
        }

        let data = Array2::from_shape_vec((index.len(), value_columns.len()), values).map_err(
            |e| CreatecError::MalformedSpecHeader(format!("table shape: {}", e)),
        )?;

        Ok(Self {
            index_name: index_name.clone(),
            columns: value_columns.to_vec(),
            index,
            data,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Value column names (the index column excluded)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    /// Rows x value columns
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.data.column(pos))
    }

    /// Values of the first row carrying index label `idx`
    pub fn row_by_index(&self, idx: i64) -> Option<ArrayView1<'_, f64>> {
        let pos = self.index.iter().position(|&i| i == idx)?;
        Some(self.data.index_axis(Axis(0), pos))
    }
}

fn parse_index(raw: &str, row: usize, column: &str) -> CreatecResult<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => Ok(value as i64),
        _ => Err(CreatecError::MalformedTableValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
