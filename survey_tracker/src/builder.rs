pub use crate::config::*;
use crate::SessionTracker;

/// A builder for assembling the fields of a survey.
///
/// ```
/// pub use survey_tracker::builder::Builder;
/// pub use survey_tracker::TrackerRules;
/// # use survey_tracker::TrackerErrors;
///
/// let mut builder = Builder::new(&TrackerRules::DEFAULT_RULES)?;
/// builder.add_likert_question("AV1", "The course was useful", &["No", "Somewhat", "Yes"])?;
/// builder.add_free_text_field("ciudad")?;
///
/// let tracker = builder.build()?;
/// assert_eq!(tracker.progress().total, 2);
///
/// # Ok::<(), TrackerErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TrackerRules,
    pub(crate) _questions: Vec<Question>,
    pub(crate) _demographics: Vec<DemographicField>,
}

impl Builder {
    pub fn new(rules: &TrackerRules) -> Result<Builder, TrackerErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _questions: Vec::new(),
            _demographics: Vec::new(),
        })
    }

    /// Replaces the questions.
    pub fn questions(self, questions: &[Question]) -> Result<Builder, TrackerErrors> {
        Ok(Builder {
            _rules: self._rules,
            _questions: questions.to_vec(),
            _demographics: self._demographics,
        })
    }

    /// Replaces the demographic fields.
    pub fn demographics(self, fields: &[DemographicField]) -> Result<Builder, TrackerErrors> {
        Ok(Builder {
            _rules: self._rules,
            _questions: self._questions,
            _demographics: fields.to_vec(),
        })
    }

    pub fn add_question(&mut self, question: &Question) -> Result<(), TrackerErrors> {
        self._questions.push(question.clone());
        Ok(())
    }

    /// Adds a question whose scale is the number of labels.
    pub fn add_likert_question(
        &mut self,
        id: &str,
        prompt: &str,
        labels: &[&str],
    ) -> Result<(), TrackerErrors> {
        self.add_question(&Question::likert(id, prompt, labels))
    }

    pub fn add_demographic(&mut self, field: &DemographicField) -> Result<(), TrackerErrors> {
        self._demographics.push(field.clone());
        Ok(())
    }

    pub fn add_free_text_field(&mut self, id: &str) -> Result<(), TrackerErrors> {
        self.add_demographic(&DemographicField::free_text(id))
    }

    /// Checks the fields and creates the session.
    pub fn build(&self) -> Result<SessionTracker, TrackerErrors> {
        SessionTracker::new(&self._questions, &self._demographics, &self._rules)
    }
}
