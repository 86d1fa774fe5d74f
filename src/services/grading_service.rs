use crate::models::question::{AnswerLetter, Question, QuestionDetails};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedOutcome {
    pub is_correct: bool,
    pub marks_obtained: i32,
}

pub struct GradingService;

impl GradingService {
    /// Grades one question against a submitted answer. `None` means the
    /// question was skipped: incorrect, zero marks, no deduction. A wrong or
    /// malformed submission costs the question's negative marks.
    pub fn grade(question: &Question, answer_text: Option<&str>) -> GradedOutcome {
        let Some(raw) = answer_text else {
            return GradedOutcome {
                is_correct: false,
                marks_obtained: 0,
            };
        };

        let is_correct = match &question.details {
            QuestionDetails::Mcq(details) => raw
                .trim()
                .parse::<AnswerLetter>()
                .map(|letter| letter == details.correct_option)
                .unwrap_or(false),
            QuestionDetails::Maq(details) => Self::parse_letter_set(raw)
                .map(|submitted| submitted == details.correct_options)
                .unwrap_or(false),
            QuestionDetails::FillBlank(details) => {
                raw.trim() == details.correct_answer.trim()
            }
        };

        if is_correct {
            GradedOutcome {
                is_correct: true,
                marks_obtained: question.marks,
            }
        } else {
            GradedOutcome {
                is_correct: false,
                marks_obtained: -question.negative_marks,
            }
        }
    }

    /// Parses a comma-separated letter list into a set: empty entries are
    /// skipped, duplicates collapse, any token outside A-D makes the whole
    /// submission malformed (`None`).
    pub fn parse_letter_set(raw: &str) -> Option<BTreeSet<AnswerLetter>> {
        let mut letters = BTreeSet::new();
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            letters.insert(token.parse::<AnswerLetter>().ok()?);
        }
        Some(letters)
    }
}
