use super::ServingError;
use std::collections::HashSet;
use std::io::Read;

/// Untyped CSV table as uploaded; cells keep their original text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FeatureTable {
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, ServingError> {
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|column| column.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        if columns.iter().all(|column| column.is_empty()) {
            return Err(ServingError::EmptyUpload);
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ServingError::DuplicateColumn(column.clone()));
            }
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Copy of the table without the columns matching `drop`.
    pub fn without_columns<F>(&self, drop: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !drop(column))
            .map(|(index, _)| index)
            .collect();

        Self {
            columns: keep.iter().map(|&index| self.columns[index].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&index| row[index].clone()).collect())
                .collect(),
        }
    }

    pub(crate) fn push_column(&mut self, name: &str, values: Vec<String>) {
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Overwrite `NaN`/`inf` cells with `0.0`; other text is left alone.
    pub(crate) fn replace_non_finite(&mut self) -> usize {
        let mut replaced = 0;
        for cell in self.rows.iter_mut().flatten() {
            if let Ok(value) = cell.trim().parse::<f64>() {
                if !value.is_finite() {
                    *cell = "0.0".to_string();
                    replaced += 1;
                }
            }
        }
        replaced
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ServingError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|err| ServingError::Encoding(err.to_string()))
    }
}
