use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::ExtractError;
use crate::model::FlatRow;
use crate::options::EvaluatedField;

pub const FILE_COLUMN: &str = "File";

pub const FLAT_ROW_HEADERS: [&str; 7] = [
    FILE_COLUMN,
    "Patient Name",
    "Age",
    "Gender",
    "Report Date",
    "Tests",
    "Diagnosis",
];

pub fn write_rows(path: &Path, rows: &[FlatRow], delimiter: u8) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(FLAT_ROW_HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_rows_to_string(rows: &[FlatRow], delimiter: u8) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    writer.write_record(FLAT_ROW_HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

pub fn read_rows(
    path: &Path,
    table: &str,
    delimiter: u8,
    required: &[EvaluatedField],
) -> Result<Vec<FlatRow>, ExtractError> {
    let file = std::fs::File::open(path)?;
    read_rows_from_reader(file, table, delimiter, required)
}

/// Reads flat rows, matching columns by header name.
///
/// `File` and every `required` column must be present. Other known columns
/// are filled when present; unknown columns are ignored. Blank cells read as
/// `None`.
pub fn read_rows_from_reader<R: Read>(
    reader: R,
    table: &str,
    delimiter: u8,
    required: &[EvaluatedField],
) -> Result<Vec<FlatRow>, ExtractError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let columns = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, header)| (header.trim().trim_start_matches('\u{feff}').to_string(), index))
        .collect::<HashMap<_, _>>();

    let missing = |column: &str| ExtractError::MissingColumn {
        table: table.to_string(),
        column: column.to_string(),
    };
    let file_index = *columns.get(FILE_COLUMN).ok_or_else(|| missing(FILE_COLUMN))?;
    if let Some(field) = required
        .iter()
        .find(|field| !columns.contains_key(field.column()))
    {
        return Err(missing(field.column()));
    }

    let field_indices = EvaluatedField::ALL
        .into_iter()
        .filter_map(|field| columns.get(field.column()).map(|&index| (field, index)))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = FlatRow::new(cell(&record, file_index).unwrap_or_default());
        for &(field, index) in &field_indices {
            *field.value_mut(&mut row) = cell(&record, index);
        }
        rows.push(row);
    }

    tracing::debug!(table, rows = rows.len(), "read flat rows");
    Ok(rows)
}

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{read_rows_from_reader, write_rows_to_string};
    use crate::error::ExtractError;
    use crate::model::FlatRow;
    use crate::options::EvaluatedField;

    #[test]
    fn writes_header_and_blank_cells_for_absent_values() {
        let rows = vec![
            FlatRow {
                patient_name: Some("Ann".to_string()),
                tests: Some("Glucose: 90 mg/dL; MRI: Detected".to_string()),
                diagnosis: Some("asthma, anemia".to_string()),
                ..FlatRow::new("a.pdf")
            },
            FlatRow::new("b.pdf"),
        ];

        let csv = write_rows_to_string(&rows, b',').expect("csv should render");
        assert_eq!(
            csv,
            "File,Patient Name,Age,Gender,Report Date,Tests,Diagnosis\n\
             a.pdf,Ann,,,,Glucose: 90 mg/dL; MRI: Detected,\"asthma, anemia\"\n\
             b.pdf,,,,,,\n"
        );
    }

    #[test]
    fn reads_back_written_rows() {
        let rows = vec![FlatRow {
            age: Some("45".to_string()),
            diagnosis: Some("asthma, anemia".to_string()),
            ..FlatRow::new("a.pdf")
        }];
        let csv = write_rows_to_string(&rows, b';').expect("csv should render");
        let parsed = read_rows_from_reader(csv.as_bytes(), "predicted", b';', &[])
            .expect("csv should parse");
        assert_eq!(parsed, rows);
    }

    #[test]
    fn reads_ground_truth_with_extra_and_reordered_columns() {
        let csv = "Notes,Diagnosis,File,Patient Name\nseen twice,flu,x.pdf, Jo \n";
        let parsed = read_rows_from_reader(
            csv.as_bytes(),
            "ground truth",
            b',',
            &[EvaluatedField::PatientName, EvaluatedField::Diagnosis],
        )
        .expect("csv should parse");
        assert_eq!(
            parsed,
            vec![FlatRow {
                patient_name: Some(" Jo ".to_string()),
                diagnosis: Some("flu".to_string()),
                ..FlatRow::new("x.pdf")
            }]
        );
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let csv = "File,Patient Name\nx.pdf,Jo\n";
        let err = read_rows_from_reader(
            csv.as_bytes(),
            "ground truth",
            b',',
            &[EvaluatedField::PatientName, EvaluatedField::Age],
        )
        .expect_err("Age column is missing");
        assert!(matches!(
            &err,
            ExtractError::MissingColumn { table, column } if table == "ground truth" && column == "Age"
        ));
        assert_eq!(
            err.to_string(),
            "ground truth table is missing required column 'Age'"
        );
    }

    #[test]
    fn missing_file_column_fails_fast() {
        let err = read_rows_from_reader("Name\nJo\n".as_bytes(), "predicted", b',', &[])
            .expect_err("File column is missing");
        assert!(matches!(err, ExtractError::MissingColumn { column, .. } if column == "File"));
    }
}
