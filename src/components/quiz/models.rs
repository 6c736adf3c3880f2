use serde::{Deserialize, Serialize};

/// Question kinds the quiz screen knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillInBlank,
    Essay,
    #[serde(other)]
    Other,
}

impl QuestionType {
    /// Whether the question is answered by picking one option
    pub fn uses_options(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }
}

/// One selectable option. Correctness is never sent before grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    #[serde(rename = "Optionid")]
    pub id: i64,
    #[serde(rename = "Optiontext")]
    pub text: String,
    #[serde(rename = "Optionorder", default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "Questionid")]
    pub id: i64,
    #[serde(rename = "Questiontext")]
    pub text: String,
    #[serde(rename = "Questiontype")]
    pub question_type: QuestionType,
    #[serde(rename = "Questionpoints", default = "default_points")]
    pub points: u32,
    #[serde(rename = "Questionorder", default)]
    pub order: i32,
    #[serde(default)]
    pub options: Vec<QuizOption>,
}

fn default_points() -> u32 {
    1
}

/// Quiz definition from `GET /quiz/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "quizid")]
    pub id: i64,
    #[serde(rename = "quizname")]
    pub name: String,
    #[serde(rename = "quizdescription", default)]
    pub description: Option<String>,
    #[serde(rename = "Courseid", default)]
    pub course_id: Option<i64>,
    #[serde(rename = "Timelimitminutes", default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn question(&self, question_id: i64) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Questions by order index, options by their order; ties keep server order
    pub fn sort_for_display(&mut self) {
        self.questions.sort_by_key(|q| q.order);
        for question in &mut self.questions {
            question.options.sort_by_key(|o| o.order);
        }
    }
}

/// Client-side answer state of one question
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerValue {
    #[default]
    Unanswered,
    Option(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question_id: i64,
    pub value: AnswerValue,
}

impl Answer {
    pub fn empty(question_id: i64) -> Self {
        Self {
            question_id,
            value: AnswerValue::Unanswered,
        }
    }

    /// An option is picked, or non-empty text is entered
    pub fn is_answered(&self) -> bool {
        match &self.value {
            AnswerValue::Unanswered => false,
            AnswerValue::Option(_) => true,
            AnswerValue::Text(text) => !text.is_empty(),
        }
    }

    pub fn selected_option(&self) -> Option<i64> {
        match self.value {
            AnswerValue::Option(id) => Some(id),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            AnswerValue::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn to_submission(&self) -> AnswerSubmission {
        AnswerSubmission {
            question_id: self.question_id,
            selected_option_id: self.selected_option(),
            answer_text: self.text().map(str::to_string),
        }
    }
}

/// One tuple of the submit payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    #[serde(rename = "Questionid")]
    pub question_id: i64,
    #[serde(rename = "Selectedoptionid", skip_serializing_if = "Option::is_none", default)]
    pub selected_option_id: Option<i64>,
    #[serde(rename = "Answertext", skip_serializing_if = "Option::is_none", default)]
    pub answer_text: Option<String>,
}

/// Body of `POST /quiz/{id}/submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    #[serde(rename = "Quizid")]
    pub quiz_id: i64,
    pub answers: Vec<AnswerSubmission>,
}

/// Grading result of a submitted attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttemptResult {
    #[serde(rename = "Attemptid")]
    pub attempt_id: i64,
    #[serde(rename = "Attemptscore", default)]
    pub score: Option<u32>,
    #[serde(rename = "Attemptmaxscore", default)]
    pub max_score: Option<u32>,
    #[serde(rename = "Attemptgraded", default)]
    pub graded: bool,
    #[serde(rename = "Attemptfeedback", default)]
    pub feedback: Option<String>,
}

impl QuizAttemptResult {
    /// Rounded percentage once graded; `None` while subjective answers await grading
    pub fn percent(&self) -> Option<u32> {
        if !self.graded {
            return None;
        }
        let score = self.score.unwrap_or(0) as f64;
        let max = self.max_score.filter(|m| *m > 0).unwrap_or(1) as f64;
        Some((score / max * 100.0).round() as u32)
    }
}

/// Remaining time as `m:ss`
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_quiz_without_correctness() {
        let quiz: Quiz = serde_json::from_value(json!({
            "quizid": 4,
            "quizname": "Week 1",
            "quizdescription": "Intro",
            "Courseid": 10,
            "Timelimitminutes": 15,
            "questions": [{
                "Questionid": 1,
                "Quizid": 4,
                "Questiontext": "2 + 2?",
                "Questiontype": "multiple_choice",
                "Questionpoints": 2,
                "Questionorder": 0,
                "options": [{ "Optionid": 11, "Optiontext": "4", "Optionorder": 0, "Iscorrect": true }]
            }, {
                "Questionid": 2,
                "Questiontext": "Explain",
                "Questiontype": "matching"
            }]
        }))
        .unwrap();
        assert_eq!(quiz.time_limit_minutes, Some(15));
        assert_eq!(quiz.questions[1].question_type, QuestionType::Other);
        assert_eq!(quiz.questions[1].points, 1);
        assert_eq!(quiz.total_points(), 3);
    }

    #[test]
    fn submission_omits_absent_fields() {
        let payload = QuizSubmission {
            quiz_id: 4,
            answers: vec![Answer::empty(1).to_submission()],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "Quizid": 4, "answers": [{ "Questionid": 1 }] }));
    }

    #[test]
    fn empty_text_is_unanswered() {
        let answer = Answer {
            question_id: 1,
            value: AnswerValue::Text(String::new()),
        };
        assert!(!answer.is_answered());
        assert_eq!(answer.to_submission().answer_text, None);
    }

    #[test]
    fn result_percent_and_time_format() {
        let result = QuizAttemptResult {
            attempt_id: 1,
            score: Some(7),
            max_score: Some(9),
            graded: true,
            feedback: None,
        };
        assert_eq!(result.percent(), Some(78));
        let pending = QuizAttemptResult { graded: false, ..result };
        assert_eq!(pending.percent(), None);

        assert_eq!(format_remaining(60), "1:00");
        assert_eq!(format_remaining(59), "0:59");
        assert_eq!(format_remaining(605), "10:05");
    }
}
