// Primitives for reading CSV question files.

use crate::survey::{config_reader::QuestionSource, io_common::questions_from_rows, *};

pub fn read_csv_questions(path: &str, cfs: &QuestionSource) -> SurveyResult<Vec<Question>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno, path })?;
        debug!("read_csv_questions: lineno: {:?} row: {:?}", lineno, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    questions_from_rows(&rows, cfs, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn quoted_options() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "item,pregunta,escala,posibles_respuestas").unwrap();
        writeln!(f, "AV1,\"Pregunta, con coma\",3,\"No,Somewhat,Yes\"").unwrap();
        writeln!(f, "AV2,Pregunta 02,2").unwrap();
        f.flush().unwrap();
        let path = f.path().display().to_string();
        let cfs = QuestionSource::from_file(&path, "csv");
        let qs = read_csv_questions(&path, &cfs).unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].prompt, "Pregunta, con coma");
        assert_eq!(qs[0].options, vec!["No", "Somewhat", "Yes"]);
        // A short row has no options.
        assert!(qs[1].options.is_empty());
    }

    #[test]
    fn missing_file() {
        let cfs = QuestionSource::from_file("/nonexistent/q.csv", "csv");
        assert!(matches!(
            read_csv_questions("/nonexistent/q.csv", &cfs),
            Err(SurveyError::CsvOpen { .. })
        ));
    }
}
