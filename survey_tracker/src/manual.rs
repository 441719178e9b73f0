/*!

This is the long-form manual for `survey_tracker` and `tsurvey`.

## Question files

The following formats are supported:
* `xlsx` Excel workbook
* `csv` Comma Separated Values
* `json` questions written directly in the configuration file

### `xlsx` and `csv`

One question per row, with a header in the first row. The columns are found by
name; the default names are the ones of the original survey spreadsheets:

```text
item,pregunta,escala,posibles_respuestas
AV1,The course was useful,5,"Strongly disagree,Disagree,Neutral,Agree,Strongly agree"
AV2,The material was clear,3,"No,Somewhat,Yes"
```

- `item` the identifier of the question. Rows with an empty identifier are skipped.
- `pregunta` the prompt.
- `escala` (optional column) the number of options. When missing, it is the number of options.
- `posibles_respuestas` the options, separated by the delimiter (`,` by default).

For Excel workbooks, the worksheet must be named when the workbook contains more than one.

## Configuration

```json
{
  "surveyName": "Doctoral survey",
  "questionSources": [
    { "provider": "csv", "filePath": "questions.csv", "optionDelimiter": "," }
  ],
  "demographics": [
    { "id": "sexo", "label": "Sex", "options": ["Male", "Female", "Other"] },
    { "id": "ciudad", "label": "City" }
  ],
  "demographicPlacement": "beforeQuestions",
  "storage": { "outputDirectory": "responses", "collection": "encuestas" }
}
```

Options for `questionSources`:
 - `provider` (`xlsx`, `csv`): the format of the file.
 - `filePath`: relative to the directory of the configuration file.
 - `excelWorksheetName` (optional): for Excel-based inputs, the name of the worksheet.
 - `idColumn`, `promptColumn`, `scaleColumn`, `optionsColumn` (optional): the header names.
 - `optionDelimiter` (optional): the separator between the options.

Questions may also be listed inline with `"questions": [{"id": ..., "prompt": ..., "options": [...]}]`.

A demographic field without `options` accepts any text. A blank text counts as unanswered.

## Storage

Every complete survey is written as one JSON document
`<outputDirectory>/<collection>/<ID>.json`:

```json
{
  "ID": "ID_20240101120000_1a2b3c4d",
  "fechaHora": "2024-01-01 12:00:00",
  "answers": { "sexo": "Female", "AV1": "Agree" }
}
```

`ID` is the control number shown when the session starts and `fechaHora`
the start time of the session. Existing documents are never overwritten. Use `--out stdout` to print the document instead.

 */
