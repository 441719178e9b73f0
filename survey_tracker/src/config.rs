// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A survey question, as produced by a question loader.
///
/// Questions are immutable once loaded. The `scale` is the response arity
/// announced by the source (for example 5 for a 5-point Likert question).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub scale: u32,
    pub options: Vec<String>,
}

impl Question {
    /// A question whose scale is the number of its options.
    pub fn likert(id: &str, prompt: &str, options: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            prompt: prompt.to_string(),
            scale: options.len() as u32,
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A demographic attribute collected next to the questions (age range, city, ...).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DemographicField {
    pub id: String,
    pub label: String,
    /// The allowed values. When absent, the field accepts free-form text.
    pub options: Option<Vec<String>>,
}

impl DemographicField {
    pub fn free_text(id: &str) -> DemographicField {
        DemographicField {
            id: id.to_string(),
            label: id.to_string(),
            options: None,
        }
    }

    pub fn enumerated(id: &str, label: &str, options: &[&str]) -> DemographicField {
        DemographicField {
            id: id.to_string(),
            label: label.to_string(),
            options: Some(options.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// The content of a slot.
///
/// `Unanswered` is never equal to any value, including a placeholder label
/// such as "Select an option" that a form may display by default.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Answer {
    Unanswered,
    Value(String),
}

impl Answer {
    pub fn value(s: &str) -> Answer {
        Answer::Value(s.to_string())
    }

    /// True for the sentinel and for blank text (free-form fields left empty).
    pub fn is_unanswered(&self) -> bool {
        match self {
            Answer::Unanswered => true,
            Answer::Value(s) => s.trim().is_empty(),
        }
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// Between 0 and 100.
    pub percentage: f64,
}

/// The complete set of answers of a session, in slot order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Record {
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SessionState {
    Open,
    /// Terminal: a complete record was handed out, answers are locked.
    Submitted,
}

/// Reasons for refusing to create a session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ConfigProblem {
    NoQuestions,
    DuplicateId(String),
    BlankId,
    NoOptions(String),
}

/// Errors returned by the tracker.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TrackerErrors {
    Config(ConfigProblem),
    UnknownField {
        field_id: String,
    },
    InvalidAnswer {
        field_id: String,
        value: String,
    },
    /// Not every field is answered. This is recoverable: the session stays open.
    Incomplete {
        unanswered: Vec<String>,
    },
    AlreadySubmitted,
}

impl Error for TrackerErrors {}

impl Display for TrackerErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerErrors::Config(ConfigProblem::NoQuestions) => {
                write!(f, "the survey does not contain any question")
            }
            TrackerErrors::Config(ConfigProblem::DuplicateId(id)) => {
                write!(f, "the field id {:?} is used more than once", id)
            }
            TrackerErrors::Config(ConfigProblem::BlankId) => {
                write!(f, "a field has an empty id")
            }
            TrackerErrors::Config(ConfigProblem::NoOptions(id)) => {
                write!(f, "question {:?} has no answer options", id)
            }
            TrackerErrors::UnknownField { field_id } => {
                write!(f, "unknown field {:?}", field_id)
            }
            TrackerErrors::InvalidAnswer { field_id, value } => {
                write!(f, "{:?} is not a valid answer for field {:?}", value, field_id)
            }
            TrackerErrors::Incomplete { unanswered } => {
                write!(
                    f,
                    "{} field(s) still unanswered: {}",
                    unanswered.len(),
                    unanswered.join(", ")
                )
            }
            TrackerErrors::AlreadySubmitted => {
                write!(f, "the survey was already submitted")
            }
        }
    }
}

// ********* Configuration **********

/// Where the demographic fields sit relative to the questions, both in the
/// record and in the list of unanswered fields.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DemographicPlacement {
    BeforeQuestions,
    AfterQuestions,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TrackerRules {
    pub demographic_placement: DemographicPlacement,
}

impl TrackerRules {
    pub const DEFAULT_RULES: TrackerRules = TrackerRules {
        demographic_placement: DemographicPlacement::BeforeQuestions,
    };
}

impl Default for TrackerRules {
    fn default() -> Self {
        TrackerRules::DEFAULT_RULES
    }
}
