/*!
Answer tracking for single-page survey forms.

A [`SessionTracker`] owns the answers of one survey being filled in by one
person: one slot per question and one slot per demographic field. The
calling layer (a form, a terminal prompt, ...) records answers as the user
interacts, asks for the progress to display a counter, and finally submits.
An incomplete submission returns the unanswered fields and leaves the
session open; a complete one locks the session and returns the [`Record`]
to hand over to a [`store::RecordStore`].

```
use survey_tracker::*;

let questions = vec![
    Question::likert("Q1", "I enjoy surveys", &["Disagree", "Neutral", "Agree"]),
    Question::likert("Q2", "I read the instructions", &["Disagree", "Neutral", "Agree"]),
];
let mut tracker = initialize(&questions, &[])?;
tracker.record_answer("Q1", Answer::value("Agree"))?;
assert_eq!(tracker.validate(), Err(vec!["Q2".to_string()]));

tracker.record_answer("Q2", Answer::value("Neutral"))?;
let record = tracker.submit()?;
assert_eq!(record.get("Q1"), Some("Agree"));
assert_eq!(tracker.state(), SessionState::Submitted);
# Ok::<(), TrackerErrors>(())
```
*/
mod config;
use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub mod builder;
pub mod manual;
pub mod store;

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum FieldKind {
    // Position in the question list
    Question(usize),
    // Position in the demographic list
    Demographic(usize),
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct Slot {
    id: String,
    kind: FieldKind,
    answer: Answer,
}

/// The state of one survey session.
///
/// The set of slots is fixed at construction. Slots are kept in the order
/// used for reporting: demographics first or last according to the rules,
/// then each group in definition order.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    questions: Vec<Question>,
    demographics: Vec<DemographicField>,
    rules: TrackerRules,
    slots: Vec<Slot>,
    slot_index: HashMap<String, usize>,
    state: SessionState,
}

/// Creates a tracker with the default rules.
///
/// Every demographic field given here accepts free-form text. Use
/// [`SessionTracker::new`] or the [`builder::Builder`] for enumerated fields.
pub fn initialize(
    questions: &[Question],
    demographic_field_ids: &[String],
) -> Result<SessionTracker, TrackerErrors> {
    let demographics: Vec<DemographicField> = demographic_field_ids
        .iter()
        .map(|id| DemographicField::free_text(id))
        .collect();
    SessionTracker::new(questions, &demographics, &TrackerRules::DEFAULT_RULES)
}

impl SessionTracker {
    pub fn new(
        questions: &[Question],
        demographics: &[DemographicField],
        rules: &TrackerRules,
    ) -> Result<SessionTracker, TrackerErrors> {
        checks(questions, demographics)?;

        let question_slots = questions.iter().enumerate().map(|(idx, q)| Slot {
            id: q.id.clone(),
            kind: FieldKind::Question(idx),
            answer: Answer::Unanswered,
        });
        let demographic_slots = demographics.iter().enumerate().map(|(idx, d)| Slot {
            id: d.id.clone(),
            kind: FieldKind::Demographic(idx),
            answer: Answer::Unanswered,
        });
        let slots: Vec<Slot> = match rules.demographic_placement {
            DemographicPlacement::BeforeQuestions => {
                demographic_slots.chain(question_slots).collect()
            }
            DemographicPlacement::AfterQuestions => {
                question_slots.chain(demographic_slots).collect()
            }
        };
        let slot_index: HashMap<String, usize> = slots
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id.clone(), idx))
            .collect();

        info!(
            "Survey session with {} questions and {} demographic fields",
            questions.len(),
            demographics.len()
        );
        debug!(
            "SessionTracker::new: slot order: {:?}",
            slots.iter().map(|s| s.id.as_str()).collect::<Vec<&str>>()
        );

        Ok(SessionTracker {
            questions: questions.to_vec(),
            demographics: demographics.to_vec(),
            rules: rules.clone(),
            slots,
            slot_index,
            state: SessionState::Open,
        })
    }

    /// Overwrites the answer of a field. Answers may change any number of
    /// times until the survey is submitted. Recording [`Answer::Unanswered`]
    /// clears the field.
    pub fn record_answer(&mut self, field_id: &str, value: Answer) -> Result<(), TrackerErrors> {
        if self.state == SessionState::Submitted {
            return Err(TrackerErrors::AlreadySubmitted);
        }
        let idx = self.find_slot(field_id)?;
        if let Answer::Value(s) = &value {
            if !self.accepts(self.slots[idx].kind, s) {
                return Err(TrackerErrors::InvalidAnswer {
                    field_id: field_id.to_string(),
                    value: s.clone(),
                });
            }
        }
        debug!("record_answer: {:?} -> {:?}", field_id, value);
        self.slots[idx].answer = value;
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        let total = self.slots.len();
        let answered = self
            .slots
            .iter()
            .filter(|s| !s.answer.is_unanswered())
            .count();
        let percentage = if total > 0 {
            100.0 * (answered as f64) / (total as f64)
        } else {
            0.0
        };
        Progress {
            answered,
            total,
            percentage,
        }
    }

    /// Returns the complete record, or the ids of the unanswered fields in slot order.
    pub fn validate(&self) -> Result<Record, Vec<String>> {
        let unanswered: Vec<String> = self
            .slots
            .iter()
            .filter(|s| s.answer.is_unanswered())
            .map(|s| s.id.clone())
            .collect();
        if !unanswered.is_empty() {
            debug!("validate: unanswered fields: {:?}", unanswered);
            return Err(unanswered);
        }
        let mut fields: Vec<(String, String)> = Vec::new();
        for s in self.slots.iter() {
            if let Answer::Value(v) = &s.answer {
                fields.push((s.id.clone(), v.clone()));
            }
        }
        Ok(Record { fields })
    }

    /// Validates and, when complete, locks the session.
    ///
    /// An incomplete submission keeps every answer and the session stays open.
    pub fn submit(&mut self) -> Result<Record, TrackerErrors> {
        if self.state == SessionState::Submitted {
            return Err(TrackerErrors::AlreadySubmitted);
        }
        match self.validate() {
            Ok(record) => {
                self.state = SessionState::Submitted;
                info!("Survey submitted with {} answers", record.len());
                Ok(record)
            }
            Err(unanswered) => {
                info!(
                    "Submission refused: {} of {} fields unanswered",
                    unanswered.len(),
                    self.slots.len()
                );
                Err(TrackerErrors::Incomplete { unanswered })
            }
        }
    }

    pub fn is_unanswered(&self, field_id: &str) -> Result<bool, TrackerErrors> {
        let idx = self.find_slot(field_id)?;
        Ok(self.slots[idx].answer.is_unanswered())
    }

    pub fn answer(&self, field_id: &str) -> Result<&Answer, TrackerErrors> {
        let idx = self.find_slot(field_id)?;
        Ok(&self.slots[idx].answer)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn rules(&self) -> &TrackerRules {
        &self.rules
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn demographics(&self) -> &[DemographicField] {
        &self.demographics
    }

    /// All the field ids, in slot order.
    pub fn field_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.id.as_str()).collect()
    }

    /// The allowed values of a field, or `None` for free-form text.
    pub fn options(&self, field_id: &str) -> Result<Option<&[String]>, TrackerErrors> {
        let idx = self.find_slot(field_id)?;
        let res = match self.slots[idx].kind {
            FieldKind::Question(q) => Some(self.questions[q].options.as_slice()),
            FieldKind::Demographic(d) => self.demographics[d].options.as_deref(),
        };
        Ok(res)
    }

    /// The name under which a field is shown to the user.
    ///
    /// Questions are numbered from 1 in definition order ("Question 01"),
    /// demographic fields use their label.
    pub fn display_label(&self, field_id: &str) -> Result<String, TrackerErrors> {
        let idx = self.find_slot(field_id)?;
        let res = match self.slots[idx].kind {
            FieldKind::Question(q) => format!("Question {:02}", q + 1),
            FieldKind::Demographic(d) => self.demographics[d].label.clone(),
        };
        Ok(res)
    }

    /// The text shown next to the field: the prompt of a question, the label otherwise.
    pub fn prompt(&self, field_id: &str) -> Result<&str, TrackerErrors> {
        let idx = self.find_slot(field_id)?;
        let res = match self.slots[idx].kind {
            FieldKind::Question(q) => self.questions[q].prompt.as_str(),
            FieldKind::Demographic(d) => self.demographics[d].label.as_str(),
        };
        Ok(res)
    }

    fn find_slot(&self, field_id: &str) -> Result<usize, TrackerErrors> {
        self.slot_index
            .get(field_id)
            .cloned()
            .ok_or_else(|| TrackerErrors::UnknownField {
                field_id: field_id.to_string(),
            })
    }

    fn accepts(&self, kind: FieldKind, value: &str) -> bool {
        match kind {
            FieldKind::Question(q) => self.questions[q].options.iter().any(|o| o == value),
            FieldKind::Demographic(d) => match &self.demographics[d].options {
                Some(options) => options.iter().any(|o| o == value),
                None => true,
            },
        }
    }
}

// Rejects the definitions that cannot make a session.
fn checks(
    questions: &[Question],
    demographics: &[DemographicField],
) -> Result<(), TrackerErrors> {
    if questions.is_empty() {
        return Err(TrackerErrors::Config(ConfigProblem::NoQuestions));
    }
    let all_ids = questions
        .iter()
        .map(|q| &q.id)
        .chain(demographics.iter().map(|d| &d.id));
    let mut seen: HashSet<&String> = HashSet::new();
    for id in all_ids {
        if id.trim().is_empty() {
            return Err(TrackerErrors::Config(ConfigProblem::BlankId));
        }
        if !seen.insert(id) {
            return Err(TrackerErrors::Config(ConfigProblem::DuplicateId(
                id.clone(),
            )));
        }
    }
    if let Some(q) = questions.iter().find(|q| q.options.is_empty()) {
        return Err(TrackerErrors::Config(ConfigProblem::NoOptions(q.id.clone())));
    }
    Ok(())
}
