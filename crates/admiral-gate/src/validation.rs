//! Rules an answer must satisfy before it is delivered to the asker.

use crate::error::ValidationError;
use crate::types::{AdmiralAnswer, AdmiralQuestion, AnswerResponse, SKIP_SENTINEL};

/// Check an answer against the question it responds to.
///
/// - A selected option must name one of the question's options
///   (case-insensitive) or the `skip` sentinel.
/// - Free text is accepted only when the question allows it, and must not be blank.
/// - Broadcast is accepted only when the question allows it.
/// - An explicit skip is always valid.
pub fn validate_answer(
    question: &AdmiralQuestion,
    answer: &AdmiralAnswer,
) -> Result<(), ValidationError> {
    let question_id = || question.id.clone();

    match &answer.response {
        AnswerResponse::Skip => {}
        AnswerResponse::Selected(option) => {
            let option = option.trim();
            if option.is_empty() {
                return Err(ValidationError::EmptySelection {
                    question_id: question_id(),
                });
            }
            let is_sentinel = option.eq_ignore_ascii_case(SKIP_SENTINEL);
            if !is_sentinel && question.find_option(option).is_none() {
                return Err(ValidationError::UnknownOption {
                    question_id: question_id(),
                    selected: option.to_string(),
                    options: question.options.join(", "),
                });
            }
        }
        AnswerResponse::FreeText(text) => {
            if !question.allow_free_text {
                return Err(ValidationError::FreeTextNotAllowed {
                    question_id: question_id(),
                });
            }
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyFreeText {
                    question_id: question_id(),
                });
            }
        }
    }

    if answer.broadcast && !question.allow_broadcast {
        return Err(ValidationError::BroadcastNotAllowed {
            question_id: question_id(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(free_text: bool, broadcast: bool) -> AdmiralQuestion {
        AdmiralQuestion::builder("Q-1", "Which cache backend?")
            .options(["Redis", "SQLite"])
            .allow_free_text(free_text)
            .allow_broadcast(broadcast)
            .build()
    }

    #[test]
    fn test_selected_option_matches_case_insensitively() {
        let q = question(false, false);
        assert!(validate_answer(&q, &AdmiralAnswer::selected("Q-1", "Redis")).is_ok());
        assert!(validate_answer(&q, &AdmiralAnswer::selected("Q-1", "sqlite")).is_ok());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let q = question(false, false);
        let err = validate_answer(&q, &AdmiralAnswer::selected("Q-1", "Postgres")).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownOption { .. }));
    }

    #[test]
    fn test_empty_selection_rejected() {
        let q = question(false, false);
        let err = validate_answer(&q, &AdmiralAnswer::selected("Q-1", "  ")).unwrap_err();
        assert!(matches!(err, ValidationError::EmptySelection { .. }));
    }

    #[test]
    fn test_skip_sentinel_always_accepted() {
        let q = question(false, false);
        assert!(validate_answer(&q, &AdmiralAnswer::selected("Q-1", "Skip")).is_ok());
        assert!(validate_answer(&q, &AdmiralAnswer::skip("Q-1")).is_ok());
    }

    #[test]
    fn test_skip_accepted_for_question_without_options() {
        let q = AdmiralQuestion::builder("Q-2", "Proceed?").build();
        assert!(validate_answer(&q, &AdmiralAnswer::skip("Q-2")).is_ok());
    }

    #[test]
    fn test_free_text_requires_permission() {
        let strict = question(false, false);
        let err = validate_answer(&strict, &AdmiralAnswer::free_text("Q-1", "both")).unwrap_err();
        assert!(matches!(err, ValidationError::FreeTextNotAllowed { .. }));

        let open = question(true, false);
        assert!(validate_answer(&open, &AdmiralAnswer::free_text("Q-1", "both")).is_ok());
    }

    #[test]
    fn test_blank_free_text_rejected() {
        let open = question(true, false);
        let err = validate_answer(&open, &AdmiralAnswer::free_text("Q-1", "\n ")).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyFreeText { .. }));
    }

    #[test]
    fn test_broadcast_requires_permission() {
        let local = question(false, false);
        let answer = AdmiralAnswer::selected("Q-1", "Redis").with_broadcast(true);
        let err = validate_answer(&local, &answer).unwrap_err();
        assert!(matches!(err, ValidationError::BroadcastNotAllowed { .. }));

        let fleet = question(false, true);
        assert!(validate_answer(&fleet, &answer).is_ok());
    }
}
