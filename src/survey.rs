use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_tracker::store::{control_number, RecordStore, StoreError};
use survey_tracker::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::file_store::{answers_js, build_document_js, JsonFileStore};

pub mod config_reader;
pub mod file_store;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod prompt;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet named {name:?}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "The workbook {path} has several worksheets, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("The file {path} does not contain a header row"))]
    EmptyFile { path: String },
    #[snafu(display("Cannot find the column {column:?} in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Cannot read the scale {content:?} at line {lineno} of {path}"))]
    WrongScale {
        content: String,
        lineno: usize,
        path: String,
    },
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        lineno: usize,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Unknown question provider {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("{source}"))]
    Tracker { source: TrackerErrors },
    #[snafu(display("Could not store survey {record_id}: {source}"))]
    Storing {
        source: StoreError,
        record_id: String,
    },
    #[snafu(display("Error talking to the terminal"))]
    Terminal { source: io::Error },
    #[snafu(display("The input ended before the survey was submitted"))]
    InputClosed {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

fn read_question_data(root_path: &Path, cfs: &QuestionSource) -> SurveyResult<Vec<Question>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read question file {:?}", p2);
    match cfs.provider.as_str() {
        "xlsx" | "excel" => io_excel::read_excel_questions(&p2, cfs),
        "csv" => io_csv::read_csv_questions(&p2, cfs),
        "json" => read_json_questions(&p2),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

// The provider named on the command line, or the one suggested by the extension.
fn infer_provider(path: &str, input_type: &Option<String>) -> String {
    if let Some(t) = input_type {
        return t.clone();
    }
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") => "csv".to_string(),
        Some("json") => "json".to_string(),
        _ => "xlsx".to_string(),
    }
}

fn load_questions(args: &Args, config: &SurveyConfig, root: &Path) -> SurveyResult<Vec<Question>> {
    let mut questions: Vec<Question> = Vec::new();
    if let Some(qpath) = &args.questions {
        // Column names and delimiter still come from the configuration when present.
        let mut cfs = config
            .question_sources
            .first()
            .cloned()
            .unwrap_or_else(|| QuestionSource::from_file(qpath, "xlsx"));
        cfs.provider = infer_provider(qpath, &args.input_type);
        cfs.file_path = qpath.clone();
        if args.excel_worksheet_name.is_some() {
            cfs.excel_worksheet_name = args.excel_worksheet_name.clone();
        }
        questions.append(&mut read_question_data(Path::new(""), &cfs)?);
    } else {
        for cfs in config.question_sources.iter() {
            questions.append(&mut read_question_data(root, cfs)?);
        }
    }
    questions.append(&mut config.inline_questions());
    debug!("load_questions: {:?}", questions);
    Ok(questions)
}

pub fn read_answers(path: &str) -> SurveyResult<JSMap<String, JSValue>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    match js {
        JSValue::Object(m) => Ok(m),
        _ => {
            whatever!("The answers in {} must be a JSON object", path)
        }
    }
}

/// Records every scripted answer then submits.
///
/// Numbers and booleans are taken as their text, `null` clears the field.
pub fn apply_answers(
    tracker: &mut SessionTracker,
    answers: &JSMap<String, JSValue>,
) -> SurveyResult<Record> {
    for (field_id, v) in answers.iter() {
        let answer = match v {
            JSValue::Null => Answer::Unanswered,
            JSValue::String(s) => Answer::Value(s.clone()),
            JSValue::Number(n) => Answer::Value(n.to_string()),
            JSValue::Bool(b) => Answer::Value(b.to_string()),
            _ => {
                whatever!("Cannot use {:?} as the answer of {}", v, field_id)
            }
        };
        tracker
            .record_answer(field_id, answer)
            .context(TrackerSnafu {})?;
    }
    let p = tracker.progress();
    info!(
        "Scripted answers applied: {}/{} ({:.2}%)",
        p.answered, p.total, p.percentage
    );
    tracker.submit().context(TrackerSnafu {})
}

pub fn read_reference(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    // A full stored document is accepted as well as a bare answer object.
    match js.get("answers") {
        Some(answers) => Ok(answers.clone()),
        None => Ok(js),
    }
}

fn check_reference(record: &Record, reference_path: &str) -> SurveyResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_answers =
        serde_json::to_string_pretty(&answers_js(record)).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_answers {
        warn!("Found differences with the reference answers");
        print_diff(pretty_ref.as_str(), pretty_answers.as_str(), "\n");
        whatever!("Difference detected between the submitted answers and the reference answers")
    }
    Ok(())
}

fn build_tracker(args: &Args, config: &SurveyConfig, root: &Path) -> SurveyResult<SessionTracker> {
    let rules = config.rules()?;
    let questions = load_questions(args, config, root)?;
    let demographics = config.demographic_fields();
    SessionTracker::new(&questions, &demographics, &rules).context(TrackerSnafu {})
}

fn build_store(args: &Args, config: &SurveyConfig, root: &Path) -> JsonFileStore {
    let storage = config.storage.clone().unwrap_or_default();
    let collection = storage
        .collection
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
    let location = match (&args.out, storage.output_directory) {
        (Some(out), _) => out.clone(),
        (None, Some(dir)) => root.join(dir).display().to_string(),
        (None, None) => DEFAULT_OUTPUT_DIRECTORY.to_string(),
    };
    JsonFileStore::new(&location, &collection)
}

/// Hands a submitted record to the store under its control number.
///
/// The session is already locked at this point. If the store fails, the
/// document is printed so that the answers are not lost.
pub fn store_record<S: RecordStore>(
    store: &mut S,
    record_id: &str,
    started_at: &str,
    record: &Record,
) -> SurveyResult<()> {
    if let Err(e) = store.store(record_id, started_at, record) {
        warn!("Storing {} failed: {}", record_id, e);
        let doc = build_document_js(record_id, started_at, record);
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{}", doc),
        }
        return Err(e).context(StoringSnafu { record_id });
    }
    Ok(())
}

/// Runs one survey session from the command line arguments.
///
/// Returns the control number, which is also the id of the stored record.
pub fn run_survey(args: &Args) -> SurveyResult<String> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (SurveyConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);
    if let Some(name) = &config.survey_name {
        info!("Survey: {}", name);
    }

    let mut tracker = build_tracker(args, &config, &root)?;
    let mut store = build_store(args, &config, &root);

    let started = chrono::Local::now();
    let started_at = started.format("%Y-%m-%d %H:%M:%S").to_string();
    let seed = format!("{}:{}", std::process::id(), started.timestamp_subsec_nanos());
    let rid = control_number(&started.format("%Y%m%d%H%M%S").to_string(), &seed);
    info!("Session {} started at {}", rid, started_at);

    let record = if let Some(answers_path) = &args.answers {
        let answers = read_answers(answers_path)?;
        apply_answers(&mut tracker, &answers)?
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt::run_prompt(
            &mut tracker,
            &mut stdin.lock(),
            &mut stdout.lock(),
            &rid,
            &started_at,
        )?
    };

    // A record that does not match the reference is never stored.
    if let Some(reference_path) = &args.reference {
        check_reference(&record, reference_path)?;
    }

    store_record(&mut store, &rid, &started_at, &record)?;
    Ok(rid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use survey_tracker::store::MemoryStore;

    fn fixture(name: &str) -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
            .display()
            .to_string()
    }

    fn args_for(out: &Path) -> Args {
        Args {
            config: Some(fixture("doctoral_survey/config.json")),
            questions: None,
            input_type: None,
            excel_worksheet_name: None,
            answers: Some(fixture("doctoral_survey/answers.json")),
            out: Some(out.display().to_string()),
            reference: Some(fixture("doctoral_survey/expected_answers.json")),
            verbose: false,
        }
    }

    #[test]
    fn doctoral_survey_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let rid = run_survey(&args_for(dir.path())).unwrap();
        let doc_path = dir.path().join("encuestas").join(format!("{}.json", rid));
        let contents = fs::read_to_string(doc_path).unwrap();
        let doc: JSValue = serde_json::from_str(&contents).unwrap();
        assert_eq!(doc["ID"], JSValue::String(rid.clone()));
        assert!(rid.starts_with("ID_"));
        assert_eq!(doc["answers"]["AV1"], "De acuerdo");
        assert_eq!(doc["answers"]["ciudad"], "Valencia");
        assert_eq!(doc["answers"].as_object().unwrap().len(), 8);
    }

    #[test]
    fn incomplete_answers_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path());
        args.answers = Some(fixture("doctoral_survey/partial_answers.json"));
        args.reference = None;
        match run_survey(&args) {
            Err(SurveyError::Tracker {
                source: TrackerErrors::Incomplete { unanswered },
            }) => {
                assert_eq!(unanswered, vec!["nivel_prof".to_string(), "AV3".to_string()]);
            }
            x => panic!("unexpected result {:?}", x),
        }
        // Nothing was stored.
        assert!(!dir.path().join("encuestas").exists());
    }

    #[test]
    fn reference_mismatch_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path());
        args.reference = Some(fixture("doctoral_survey/answers_other.json"));
        assert!(matches!(
            run_survey(&args),
            Err(SurveyError::Whatever { .. })
        ));
        // The mismatching record was not stored.
        assert!(!dir.path().join("encuestas").exists());
    }

    #[test]
    fn questions_flag_overrides_the_sources() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            config: None,
            questions: Some(fixture("doctoral_survey/questions.csv")),
            input_type: None,
            excel_worksheet_name: None,
            answers: Some(fixture("doctoral_survey/questions_only_answers.json")),
            out: Some(dir.path().display().to_string()),
            reference: None,
            verbose: false,
        };
        let rid = run_survey(&args).unwrap();
        assert!(dir
            .path()
            .join(DEFAULT_COLLECTION)
            .join(format!("{}.json", rid))
            .exists());
    }

    #[test]
    fn unknown_answer_field() {
        let questions = vec![Question::likert("Q1", "?", &["Yes", "No"])];
        let mut tracker = initialize(&questions, &[]).unwrap();
        let mut answers = JSMap::new();
        answers.insert("Q7".to_string(), JSValue::String("Yes".to_string()));
        assert!(matches!(
            apply_answers(&mut tracker, &answers),
            Err(SurveyError::Tracker {
                source: TrackerErrors::UnknownField { .. }
            })
        ));
    }

    #[test]
    fn failed_store_keeps_the_error() {
        let questions = vec![Question::likert("Q1", "?", &["Yes", "No"])];
        let mut tracker = initialize(&questions, &[]).unwrap();
        tracker.record_answer("Q1", Answer::value("Yes")).unwrap();
        let record = tracker.submit().unwrap();
        let mut store = MemoryStore::new();
        let rid = control_number("20240101120000", "1:1");
        store_record(&mut store, &rid, "2024-01-01 12:00:00", &record).unwrap();
        assert_eq!(
            store.get(&rid).map(|d| d.submitted_at.as_str()),
            Some("2024-01-01 12:00:00")
        );
        // Reusing a control number: the store refuses it.
        let res = store_record(&mut store, &rid, "2024-01-01 12:00:00", &record);
        assert!(matches!(
            res,
            Err(SurveyError::Storing {
                source: StoreError::DuplicateRecord { .. },
                ..
            })
        ));
        assert_eq!(tracker.state(), SessionState::Submitted);
    }

    #[test]
    fn json_question_file() {
        let cfs = QuestionSource::from_file("questions.json", "json");
        let questions = read_question_data(Path::new(&fixture("doctoral_survey")), &cfs).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "AV1");
        assert_eq!(questions[0].scale, 5);
        assert_eq!(questions[1].options, vec!["No", "A veces", "Sí"]);
        assert_eq!(questions[1].scale, 3);

        let bad = QuestionSource::from_file("questions_malformed.json", "json");
        assert!(matches!(
            read_question_data(Path::new(&fixture("doctoral_survey")), &bad),
            Err(SurveyError::ParsingJson { .. })
        ));
    }

    #[test]
    fn provider_inference() {
        assert_eq!(infer_provider("a/b/q.CSV", &None), "csv");
        assert_eq!(infer_provider("q.json", &None), "json");
        assert_eq!(infer_provider("q.xlsx", &None), "xlsx");
        assert_eq!(infer_provider("q.csv", &Some("xlsx".to_string())), "xlsx");
    }
}
