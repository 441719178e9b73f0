use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::survey::{config_reader::QuestionSource, io_common::questions_from_rows, *};

pub fn read_excel_questions(path: &str, cfs: &QuestionSource) -> SurveyResult<Vec<Question>> {
    let wrange = get_range(path, cfs)?;
    let cells: Vec<Vec<DataType>> = wrange.rows().map(|r| r.to_vec()).collect();
    questions_from_cells(&cells, cfs, path)
}

/// Same as `questions_from_rows`, starting from raw cells.
pub fn questions_from_cells(
    cells: &[Vec<DataType>],
    cfs: &QuestionSource,
    path: &str,
) -> SurveyResult<Vec<Question>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in cells.iter().enumerate() {
        let mut cs: Vec<String> = Vec::new();
        for cell in row.iter() {
            cs.push(read_cell(cell, idx + 1)?);
        }
        rows.push(cs);
    }
    questions_from_rows(&rows, cfs, path)
}

fn read_cell(cell: &DataType, lineno: usize) -> SurveyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, cfs: &QuestionSource) -> SurveyResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = &cfs.excel_worksheet_name {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyFileSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}
