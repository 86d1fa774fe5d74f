use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    pub test_id: Uuid,
    pub question_text: String,
    /// Awarded when the answer is fully correct.
    pub marks: i32,
    /// Deducted for a wrong (but attempted) answer; never for a skip.
    pub negative_marks: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        self.details.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "MAQ")]
    Maq,
    #[serde(rename = "FILL_BLANK")]
    FillBlank,
}

/// Type-specific payload. The tag doubles as the question type, so a
/// variant can only ever carry the fields that are meaningful for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "question_type")]
pub enum QuestionDetails {
    #[serde(rename = "MCQ")]
    Mcq(McqDetails),
    #[serde(rename = "MAQ")]
    Maq(MaqDetails),
    #[serde(rename = "FILL_BLANK")]
    FillBlank(FillBlankDetails),
}

impl QuestionDetails {
    pub fn kind(&self) -> QuestionType {
        match self {
            QuestionDetails::Mcq(_) => QuestionType::Mcq,
            QuestionDetails::Maq(_) => QuestionType::Maq,
            QuestionDetails::FillBlank(_) => QuestionType::FillBlank,
        }
    }

    /// Option texts shown to the student, if the type has any.
    pub fn options(&self) -> Option<[&str; 4]> {
        match self {
            QuestionDetails::Mcq(d) => {
                Some([&d.option_a, &d.option_b, &d.option_c, &d.option_d])
            }
            QuestionDetails::Maq(d) => {
                Some([&d.option_a, &d.option_b, &d.option_c, &d.option_d])
            }
            QuestionDetails::FillBlank(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqDetails {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: AnswerLetter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaqDetails {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Set, not sequence: order irrelevant, letters unique.
    pub correct_options: BTreeSet<AnswerLetter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillBlankDetails {
    /// Compared trimmed and case-sensitively.
    pub correct_answer: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl FromStr for AnswerLetter {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "A" => Ok(AnswerLetter::A),
            "B" => Ok(AnswerLetter::B),
            "C" => Ok(AnswerLetter::C),
            "D" => Ok(AnswerLetter::D),
            _ => Err(()),
        }
    }
}
