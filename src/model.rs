use serde::{Deserialize, Serialize};

/// One word/meaning pair from a loaded list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub meaning: String,
}

/// A single issued question. The full record, answer included, travels to the
/// client and comes back with the submission; grading holds no server state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub first_letter: String,
    pub meaning: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub answers: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub id: u32,
    pub user_answer: String,
    pub correct_answer: String,
    pub meaning: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub results: Vec<SubmissionResult>,
}
