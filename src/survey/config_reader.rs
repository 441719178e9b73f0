use crate::survey::*;

use serde::{Deserialize, Serialize};

// The collection used by the original survey deployments.
pub const DEFAULT_COLLECTION: &str = "encuestas";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "responses";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "idColumn")]
    pub id_column: Option<String>,
    #[serde(rename = "promptColumn")]
    pub prompt_column: Option<String>,
    #[serde(rename = "scaleColumn")]
    pub scale_column: Option<String>,
    #[serde(rename = "optionsColumn")]
    pub options_column: Option<String>,
    #[serde(rename = "optionDelimiter")]
    pub option_delimiter: Option<String>,
}

impl QuestionSource {
    pub fn from_file(path: &str, provider: &str) -> QuestionSource {
        QuestionSource {
            provider: provider.to_string(),
            file_path: path.to_string(),
            excel_worksheet_name: None,
            id_column: None,
            prompt_column: None,
            scale_column: None,
            options_column: None,
            option_delimiter: None,
        }
    }

    pub fn id_column(&self) -> &str {
        self.id_column.as_deref().unwrap_or("item")
    }

    pub fn prompt_column(&self) -> &str {
        self.prompt_column.as_deref().unwrap_or("pregunta")
    }

    pub fn scale_column(&self) -> &str {
        self.scale_column.as_deref().unwrap_or("escala")
    }

    pub fn options_column(&self) -> &str {
        self.options_column
            .as_deref()
            .unwrap_or("posibles_respuestas")
    }

    pub fn option_delimiter(&self) -> &str {
        self.option_delimiter.as_deref().unwrap_or(",")
    }
}

/// A question written directly in the configuration (or in a JSON question file).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InlineQuestion {
    pub id: String,
    pub prompt: String,
    pub scale: Option<u32>,
    pub options: Vec<String>,
}

impl InlineQuestion {
    pub fn to_question(&self) -> Question {
        Question {
            id: self.id.clone(),
            prompt: self.prompt.clone(),
            scale: self.scale.unwrap_or(self.options.len() as u32),
            options: self.options.clone(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DemographicEntry {
    pub id: String,
    pub label: Option<String>,
    pub options: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    pub collection: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "surveyName")]
    pub survey_name: Option<String>,
    #[serde(rename = "questionSources", default)]
    pub question_sources: Vec<QuestionSource>,
    #[serde(default)]
    pub questions: Vec<InlineQuestion>,
    #[serde(default)]
    pub demographics: Vec<DemographicEntry>,
    #[serde(rename = "demographicPlacement")]
    pub demographic_placement: Option<String>,
    pub storage: Option<StorageSettings>,
}

impl SurveyConfig {
    pub fn rules(&self) -> SurveyResult<TrackerRules> {
        let placement = match self.demographic_placement.as_deref() {
            None | Some("beforeQuestions") => DemographicPlacement::BeforeQuestions,
            Some("afterQuestions") => DemographicPlacement::AfterQuestions,
            Some(x) => {
                whatever!("unknown demographic placement: {}", x)
            }
        };
        Ok(TrackerRules {
            demographic_placement: placement,
        })
    }

    pub fn demographic_fields(&self) -> Vec<DemographicField> {
        self.demographics
            .iter()
            .map(|d| DemographicField {
                id: d.id.clone(),
                label: match d.label.clone() {
                    Some(x) if x.is_empty() => d.id.clone(),
                    Some(x) => x,
                    None => d.id.clone(),
                },
                options: d.options.clone(),
            })
            .collect()
    }

    pub fn inline_questions(&self) -> Vec<Question> {
        self.questions.iter().map(|q| q.to_question()).collect()
    }
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Reads a JSON array of questions.
pub fn read_json_questions(path: &str) -> SurveyResult<Vec<Question>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let questions: Vec<InlineQuestion> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(questions.iter().map(|q| q.to_question()).collect())
}
