use crate::models::{AnswerRecord, Question};

/// How an option is shown in the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    IncorrectPick,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedOption {
    pub id: String,
    pub text: String,
    pub mark: OptionMark,
    /// The user picked this option (correct or not).
    pub picked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub number: usize,
    pub text: String,
    pub is_correct: bool,
    pub user_answer: Option<String>,
    pub options: Vec<ReviewedOption>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub reviews: Vec<QuestionReview>,
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    u32::try_from((200 * part + whole) / (2 * whole)).unwrap_or(100)
}

pub fn score(questions: &[Question], answers: &AnswerRecord) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i).is_some_and(|a| q.is_correct(a)))
        .count()
}

pub fn review_question(index: usize, question: &Question, answer: Option<&str>) -> QuestionReview {
    let is_correct = answer.is_some_and(|a| question.is_correct(a));
    let options = question
        .options
        .iter()
        .map(|option| {
            let picked = answer == Some(option.id.as_str());
            let mark = if question.is_correct(&option.id) {
                OptionMark::Correct
            } else if picked {
                OptionMark::IncorrectPick
            } else {
                OptionMark::Neutral
            };
            ReviewedOption {
                id: option.id.clone(),
                text: option.text.clone(),
                mark,
                picked,
            }
        })
        .collect();

    QuestionReview {
        number: index + 1,
        text: question.text.clone(),
        is_correct,
        user_answer: answer.map(str::to_string),
        options,
        explanation: question.explanation.clone(),
    }
}

pub fn summarize(questions: &[Question], answers: &AnswerRecord) -> QuizSummary {
    let score = score(questions, answers);
    let reviews = questions
        .iter()
        .enumerate()
        .map(|(i, q)| review_question(i, q, answers.get(&i).map(String::as_str)))
        .collect();

    QuizSummary {
        score,
        total: questions.len(),
        percentage: percent(score, questions.len()),
        reviews,
    }
}
