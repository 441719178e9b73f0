use std::collections::HashMap;

use crate::survey::{config_reader::QuestionSource, *};

/// Splits the option cell of a question. Blank entries are dropped.
pub fn split_options(cell: &str, delimiter: &str) -> Vec<String> {
    cell.split(delimiter)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// The positions of the question columns in a header row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionColumns {
    pub id: usize,
    pub prompt: usize,
    // The scale column is optional.
    pub scale: Option<usize>,
    pub options: usize,
}

impl QuestionColumns {
    pub fn locate(header: &[String], cfs: &QuestionSource, path: &str) -> SurveyResult<QuestionColumns> {
        let col_names: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.trim(), idx))
            .collect();
        debug!("QuestionColumns::locate: col_names: {:?}", col_names);

        let find = |name: &str| -> SurveyResult<usize> {
            col_names
                .get(name)
                .cloned()
                .context(MissingColumnSnafu { column: name, path })
        };
        Ok(QuestionColumns {
            id: find(cfs.id_column())?,
            prompt: find(cfs.prompt_column())?,
            scale: col_names.get(cfs.scale_column()).cloned(),
            options: find(cfs.options_column())?,
        })
    }

    /// Reads one data row. Rows without an id are skipped and return `None`.
    ///
    /// `lineno` starts at 1 with the header row.
    pub fn read_row(
        &self,
        row: &[String],
        lineno: usize,
        cfs: &QuestionSource,
        path: &str,
    ) -> SurveyResult<Option<Question>> {
        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");
        let id = cell(self.id);
        if id.is_empty() {
            debug!("read_row: line {} has no id, skipping", lineno);
            return Ok(None);
        }
        let options = split_options(cell(self.options), cfs.option_delimiter());
        let scale: u32 = match self.scale.map(cell) {
            None | Some("") => options.len() as u32,
            Some(s) => parse_scale(s).context(WrongScaleSnafu {
                content: s,
                lineno,
                path,
            })?,
        };
        if scale as usize != options.len() {
            warn!(
                "read_row: question {} at line {} announces a scale of {} but has {} options",
                id,
                lineno,
                scale,
                options.len()
            );
        }
        Ok(Some(Question {
            id: id.to_string(),
            prompt: cell(self.prompt).to_string(),
            scale,
            options,
        }))
    }
}

// Spreadsheets often store integers as floats ("5.0").
fn parse_scale(s: &str) -> Option<u32> {
    if let Ok(x) = s.parse::<u32>() {
        return Some(x);
    }
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as u32),
        _ => None,
    }
}

/// Turns the rows of a question table (header first) into questions.
pub fn questions_from_rows(
    rows: &[Vec<String>],
    cfs: &QuestionSource,
    path: &str,
) -> SurveyResult<Vec<Question>> {
    let header = rows.first().context(EmptyFileSnafu { path })?;
    debug!("questions_from_rows: header: {:?}", header);
    let columns = QuestionColumns::locate(header, cfs, path)?;
    let mut res: Vec<Question> = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        if let Some(q) = columns.read_row(row, idx + 1, cfs, path)? {
            res.push(q);
        }
    }
    info!("Read {} questions from {}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_are_trimmed() {
        assert_eq!(
            split_options(" Yes , No,, Maybe ", ","),
            vec!["Yes".to_string(), "No".to_string(), "Maybe".to_string()]
        );
        assert_eq!(split_options("a;b", ";").len(), 2);
    }

    #[test]
    fn rows_to_questions() {
        let cfs = QuestionSource::from_file("q.csv", "csv");
        let rows = vec![
            row(&["item", "pregunta", "escala", "posibles_respuestas"]),
            row(&["AV1", "Pregunta 01", "3", "No,Somewhat,Yes"]),
            row(&["", "", "", ""]),
            row(&["AV2", "Pregunta 02", "2.0", "No,Yes"]),
        ];
        let qs = questions_from_rows(&rows, &cfs, "q.csv").unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].options.len(), 3);
        assert_eq!(qs[1].scale, 2);
        assert_eq!(qs[1].prompt, "Pregunta 02");
    }

    #[test]
    fn missing_scale_column_uses_option_count() {
        let cfs = QuestionSource::from_file("q.csv", "csv");
        let rows = vec![
            row(&["posibles_respuestas", "item", "pregunta"]),
            row(&["A,B,C,D", "Q1", "?"]),
        ];
        let qs = questions_from_rows(&rows, &cfs, "q.csv").unwrap();
        assert_eq!(qs[0].id, "Q1");
        assert_eq!(qs[0].scale, 4);
    }

    #[test]
    fn missing_column_is_named() {
        let cfs = QuestionSource::from_file("q.csv", "csv");
        let rows = vec![row(&["item", "pregunta"])];
        match questions_from_rows(&rows, &cfs, "q.csv") {
            Err(SurveyError::MissingColumn { column, .. }) => {
                assert_eq!(column, "posibles_respuestas")
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn bad_scale() {
        let cfs = QuestionSource::from_file("q.csv", "csv");
        let rows = vec![
            row(&["item", "pregunta", "escala", "posibles_respuestas"]),
            row(&["AV1", "?", "five", "A,B"]),
        ];
        assert!(matches!(
            questions_from_rows(&rows, &cfs, "q.csv"),
            Err(SurveyError::WrongScale { lineno: 2, .. })
        ));
    }

    #[test]
    fn empty_table() {
        let cfs = QuestionSource::from_file("q.csv", "csv");
        assert!(matches!(
            questions_from_rows(&[], &cfs, "q.csv"),
            Err(SurveyError::EmptyFile { .. })
        ));
    }
}
