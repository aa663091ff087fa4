use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::Deserialize;

use crate::error::QuizError;
use crate::model::{QuizQuestion, QuizSummary, SubmissionRequest, SubmissionResult, WordEntry};
use crate::store::WordStore;

pub const DEFAULT_QUESTION_COUNT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct QuizParams {
    pub count: Option<String>,
}

impl QuizParams {
    /// Requested question count; a missing, unparseable or zero value falls
    /// back to the default.
    pub fn effective_count(&self) -> usize {
        self.count
            .as_deref()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|&count| count > 0)
            .unwrap_or(DEFAULT_QUESTION_COUNT)
    }
}

/// Draws `count` questions from the list without replacement, in a uniformly
/// shuffled order. Requests for more questions than the list holds clamp to
/// the list size.
pub fn generate_quiz(words: &[WordEntry], count: usize) -> Result<Vec<QuizQuestion>, QuizError> {
    if words.is_empty() {
        return Err(QuizError::EmptyList);
    }

    let mut pool: Vec<&WordEntry> = words.iter().collect();
    pool.shuffle(&mut thread_rng());

    let quiz = pool
        .into_iter()
        .take(count.min(words.len()))
        .enumerate()
        .map(|(index, entry)| QuizQuestion {
            id: (index + 1) as u32,
            first_letter: entry
                .word
                .chars()
                .next()
                .map(|c| c.to_lowercase().to_string())
                .unwrap_or_default(),
            meaning: entry.meaning.clone(),
            answer: entry.word.to_lowercase(),
        })
        .collect();

    Ok(quiz)
}

/// Grades a submission against the quiz it was issued for. Pure function:
/// answers pair with questions by position, missing entries count as empty.
pub fn grade(quiz: &[QuizQuestion], answers: &[String]) -> Result<QuizSummary, QuizError> {
    if quiz.is_empty() {
        return Err(QuizError::EmptyQuiz);
    }

    let mut score = 0;
    let mut results = Vec::with_capacity(quiz.len());
    for (index, question) in quiz.iter().enumerate() {
        let user_answer = answers
            .get(index)
            .map(|answer| answer.trim().to_lowercase())
            .unwrap_or_default();
        let is_correct = user_answer == question.answer;
        if is_correct {
            score += 1;
        }
        results.push(SubmissionResult {
            id: question.id,
            user_answer,
            correct_answer: question.answer.clone(),
            meaning: question.meaning.clone(),
            is_correct,
        });
    }

    let total = quiz.len();
    let percentage = (100.0 * score as f64 / total as f64).round() as u32;
    Ok(QuizSummary {
        score,
        total,
        percentage,
        results,
    })
}

pub async fn get_quiz(
    State(store): State<Arc<WordStore>>,
    Path(list_name): Path<String>,
    Query(params): Query<QuizParams>,
) -> Result<Json<Vec<QuizQuestion>>, QuizError> {
    let words = store.get_list(&list_name)?;
    let quiz = generate_quiz(&words, params.effective_count())?;
    Ok(Json(quiz))
}

pub async fn submit_quiz(
    Json(payload): Json<SubmissionRequest>,
) -> Result<Json<QuizSummary>, QuizError> {
    let summary = grade(&payload.quiz, &payload.answers)?;
    Ok(Json(summary))
}
