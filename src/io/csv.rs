/*!
# CSV I/O for sample arrays and labelled datasets

Enable via the `csv` feature.

- [`save_samples`] writes an `n × d` sample array with a `dim_0, dim_1, …` header.
- [`load_dataset`] reads a table of binary features plus one label column and
  builds a [`DatasetPrior`] from it.
*/

use ndarray::{Array1, Array2};
use std::fs::File;
use std::path::Path;

use csv::{Reader, Writer};

use crate::dataset::DatasetPrior;
use crate::error::{Error, Result};

/**
Saves samples as a CSV file.

The resulting file has a header row naming one column per dimension
(`"dim_0"`, `"dim_1"`, …) followed by one row per sample.

# Examples

```rust
use sober_priors::io::csv::save_samples;
use ndarray::arr2;

let data = arr2(&[[0.5, 1.0], [0.25, 0.0]]);
save_samples(&data, "/tmp/samples.csv").expect("Expecting saving data to succeed");
```
*/
pub fn save_samples<T, P>(data: &Array2<T>, path: P) -> Result<()>
where
    T: std::fmt::Display,
    P: AsRef<Path>,
{
    let mut wtr = Writer::from_writer(File::create(path)?);
    let header: Vec<String> = (0..data.ncols()).map(|i| format!("dim_{}", i)).collect();
    wtr.write_record(&header)?;
    for row in data.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Loads a labelled dataset: every column except `label_column` is a binary
/// feature, in file order.
pub fn load_dataset<P: AsRef<Path>>(path: P, label_column: &str) -> Result<DatasetPrior> {
    let mut rdr = Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| Error::InvalidConfig(format!("no column named {label_column:?}")))?;
    let n_features = headers.len() - 1;

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.trim().parse().map_err(|e| {
                Error::InvalidConfig(format!("row {row}, column {:?}: {e}", &headers[col]))
            })?;
            if col == label_idx {
                labels.push(value);
            } else {
                features.push(value);
            }
        }
    }
    let features = Array2::from_shape_vec((labels.len(), n_features), features)
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    DatasetPrior::new(features.view(), Array1::from(labels).view())
}
