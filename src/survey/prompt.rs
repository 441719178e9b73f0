//! The interactive terminal form.

use std::io::{BufRead, Write};

use crate::survey::*;

const INSTRUCTIONS: &str = "Thank you for taking part in this survey.
 - Read each question carefully.
 - Type the number of the option that fits best, or your answer for open fields.
 - Press enter to skip a question for now. You will be asked again before submitting.";

// None when the input is closed.
fn read_line<R: BufRead>(input: &mut R) -> SurveyResult<Option<String>> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context(TerminalSnafu {})?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Turns what the user typed into an answer.
///
/// For fields with options: the exact option text, or else an option number
/// (from 1). Returns `None` when the input is not acceptable.
pub fn interpret(options: Option<&[String]>, typed: &str) -> Option<Answer> {
    if typed.is_empty() || typed == "?" {
        return Some(Answer::Unanswered);
    }
    match options {
        None => Some(Answer::Value(typed.to_string())),
        Some(opts) => {
            if let Some(o) = opts.iter().find(|o| o.as_str() == typed) {
                return Some(Answer::Value(o.clone()));
            }
            match typed.parse::<usize>() {
                Ok(n) if n >= 1 && n <= opts.len() => Some(Answer::Value(opts[n - 1].clone())),
                _ => None,
            }
        }
    }
}

fn ask_field<R: BufRead, W: Write>(
    tracker: &mut SessionTracker,
    field_id: &str,
    input: &mut R,
    out: &mut W,
) -> SurveyResult<()> {
    let label = tracker.display_label(field_id).context(TrackerSnafu {})?;
    let text = tracker.prompt(field_id).context(TrackerSnafu {})?.to_string();
    let options: Option<Vec<String>> = tracker
        .options(field_id)
        .context(TrackerSnafu {})?
        .map(|o| o.to_vec());

    if label == text {
        writeln!(out, "\n{}", label).context(TerminalSnafu {})?;
    } else {
        writeln!(out, "\n{}: {}", label, text).context(TerminalSnafu {})?;
    }
    if let Some(opts) = &options {
        for (idx, o) in opts.iter().enumerate() {
            writeln!(out, "  {}) {}", idx + 1, o).context(TerminalSnafu {})?;
        }
    }

    loop {
        write!(out, "> ").context(TerminalSnafu {})?;
        out.flush().context(TerminalSnafu {})?;
        let typed = match read_line(input)? {
            Some(x) => x,
            None => return InputClosedSnafu {}.fail(),
        };
        match interpret(options.as_deref(), &typed) {
            Some(Answer::Unanswered) => {
                debug!("ask_field: {} skipped", field_id);
                return Ok(());
            }
            Some(answer) => {
                tracker
                    .record_answer(field_id, answer)
                    .context(TrackerSnafu {})?;
                let p = tracker.progress();
                writeln!(
                    out,
                    "Progress: {:.2}% ({}/{})",
                    p.percentage, p.answered, p.total
                )
                .context(TerminalSnafu {})?;
                return Ok(());
            }
            None => {
                let n = options.as_ref().map(|o| o.len()).unwrap_or(0);
                writeln!(out, "Please type a number between 1 and {}.", n)
                    .context(TerminalSnafu {})?;
            }
        }
    }
}

/// Asks every field, then submits. Fields left unanswered are listed and
/// asked again until the submission is complete or the input ends.
pub fn run_prompt<R: BufRead, W: Write>(
    tracker: &mut SessionTracker,
    input: &mut R,
    out: &mut W,
    control_number: &str,
    started_at: &str,
) -> SurveyResult<Record> {
    writeln!(out, "{}", INSTRUCTIONS).context(TerminalSnafu {})?;
    writeln!(out, "Control number: {}", control_number).context(TerminalSnafu {})?;
    writeln!(out, "Started at: {}", started_at).context(TerminalSnafu {})?;

    let mut pending: Vec<String> = tracker
        .field_ids()
        .iter()
        .map(|s| s.to_string())
        .collect();
    loop {
        for field_id in pending.iter() {
            ask_field(tracker, field_id, input, out)?;
        }
        match tracker.submit() {
            Ok(record) => {
                writeln!(out, "\nThank you for completing the survey!")
                    .context(TerminalSnafu {})?;
                return Ok(record);
            }
            Err(TrackerErrors::Incomplete { unanswered }) => {
                let mut labels: Vec<String> = Vec::new();
                for id in unanswered.iter() {
                    labels.push(tracker.display_label(id).context(TrackerSnafu {})?);
                }
                writeln!(
                    out,
                    "\nThe following questions have not been answered yet: {}",
                    labels.join(", ")
                )
                .context(TerminalSnafu {})?;
                pending = unanswered;
            }
            Err(e) => return Err(e).context(TrackerSnafu {}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tracker() -> SessionTracker {
        let questions = vec![
            Question::likert("AV1", "Pregunta 01", &["No", "Somewhat", "Yes"]),
            Question::likert("AV2", "Pregunta 02", &["No", "Somewhat", "Yes"]),
        ];
        let demographics = vec![DemographicField {
            id: "ciudad".to_string(),
            label: "City".to_string(),
            options: None,
        }];
        SessionTracker::new(&questions, &demographics, &TrackerRules::DEFAULT_RULES).unwrap()
    }

    #[test]
    fn interpret_input() {
        let opts = vec!["No".to_string(), "Yes".to_string()];
        assert_eq!(interpret(Some(opts.as_slice()), "2"), Some(Answer::value("Yes")));
        assert_eq!(interpret(Some(opts.as_slice()), "No"), Some(Answer::value("No")));
        assert_eq!(interpret(Some(opts.as_slice()), "3"), None);
        assert_eq!(interpret(Some(opts.as_slice()), "0"), None);
        assert_eq!(interpret(Some(opts.as_slice()), ""), Some(Answer::Unanswered));
        assert_eq!(interpret(None, "Caracas"), Some(Answer::value("Caracas")));
    }

    #[test]
    fn numeric_labels_match_before_positions() {
        let opts = vec!["0".to_string(), "1".to_string(), "2".to_string()];
        assert_eq!(interpret(Some(opts.as_slice()), "1"), Some(Answer::value("1")));
        assert_eq!(interpret(Some(opts.as_slice()), "0"), Some(Answer::value("0")));
        // Not a label: taken as a position.
        assert_eq!(interpret(Some(opts.as_slice()), "3"), Some(Answer::value("2")));
        assert_eq!(interpret(Some(opts.as_slice()), "4"), None);
    }

    #[test]
    fn full_pass() {
        let mut t = tracker();
        let mut input = Cursor::new("Valencia\n3\n1\n");
        let mut out: Vec<u8> = Vec::new();
        let record = run_prompt(
            &mut t,
            &mut input,
            &mut out,
            "ID_20240101120000_0badcafe",
            "2024-01-01 12:00:00",
        )
        .unwrap();
        assert_eq!(record.get("ciudad"), Some("Valencia"));
        assert_eq!(record.get("AV1"), Some("Yes"));
        assert_eq!(record.get("AV2"), Some("No"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Control number: ID_20240101120000_0badcafe"));
        assert!(text.contains("Started at: 2024-01-01 12:00:00"));
        assert!(text.contains("Progress: 100.00% (3/3)"));
        assert_eq!(t.state(), SessionState::Submitted);
    }

    #[test]
    fn skipped_fields_are_asked_again() {
        let mut t = tracker();
        // Skip the city and AV2, retry a wrong number, then fill the gaps.
        let mut input = Cursor::new("\n2\n\nCaracas\n7\n3\n");
        let mut out: Vec<u8> = Vec::new();
        let record = run_prompt(&mut t, &mut input, &mut out, "ID_1", "now").unwrap();
        assert_eq!(record.get("ciudad"), Some("Caracas"));
        assert_eq!(record.get("AV2"), Some("Yes"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("have not been answered yet: City, Question 02"));
        assert!(text.contains("Please type a number between 1 and 3."));
    }

    #[test]
    fn closed_input_leaves_the_session_open() {
        let mut t = tracker();
        let mut input = Cursor::new("Valencia\n");
        let mut out: Vec<u8> = Vec::new();
        assert!(matches!(
            run_prompt(&mut t, &mut input, &mut out, "ID_1", "now"),
            Err(SurveyError::InputClosed {})
        ));
        assert_eq!(t.state(), SessionState::Open);
        assert_eq!(t.progress().answered, 1);
    }
}
