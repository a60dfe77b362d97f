use std::collections::HashMap;

use serde::Serialize;

use crate::types::{calculate_progress, Lesson, StudyMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMistake {
    pub word_id: String,
    pub expected: String,
    pub given: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub percentage: u8,
    pub mistakes: Vec<QuizMistake>,
}

/// Answers chosen for one lesson quiz, keyed by word id.
#[derive(Debug, Clone)]
pub struct QuizSheet {
    mode: StudyMode,
    answers: HashMap<String, String>,
}

impl Default for QuizSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSheet {
    pub fn new() -> Self {
        Self {
            mode: StudyMode::Quiz,
            answers: HashMap::new(),
        }
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn answer(&mut self, word_id: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(word_id.into(), answer.into());
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// Scores the sheet against the lesson's native-language text and switches to review.
    pub fn submit(&mut self, lesson: &Lesson) -> QuizResult {
        let mut correct = 0;
        let mut mistakes = Vec::new();

        for word in &lesson.words {
            let given = self.answers.get(&word.id);
            if given.is_some_and(|g| *g == word.native) {
                correct += 1;
            } else {
                mistakes.push(QuizMistake {
                    word_id: word.id.clone(),
                    expected: word.native.clone(),
                    given: given.cloned(),
                });
            }
        }

        self.mode = StudyMode::Review;
        QuizResult {
            correct,
            total: lesson.words.len(),
            percentage: calculate_progress(correct, lesson.words.len()),
            mistakes,
        }
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.mode = StudyMode::Quiz;
    }
}
