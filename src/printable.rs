use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::response::Html;
use tera::{Context, Tera};

use crate::error::QuizError;
use crate::quiz::{self, QuizParams};
use crate::store::WordStore;
use crate::utils;

/// Renders a print-ready quiz sheet: question number, first-letter hint and
/// meaning, answers withheld. Each request draws a fresh randomized quiz.
pub async fn print_sheet(
    State(store): State<Arc<WordStore>>,
    Extension(templates): Extension<Arc<Tera>>,
    Path(list_name): Path<String>,
    Query(params): Query<QuizParams>,
) -> Result<Html<String>, QuizError> {
    let words = store.get_list(&list_name)?;
    let sheet = quiz::generate_quiz(&words, params.effective_count())?;

    let mut context = Context::new();
    context.insert("list_name", &list_name);
    context.insert("questions", &sheet);
    Ok(utils::render_template(&templates, "printable.html", context))
}
