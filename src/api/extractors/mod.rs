//! Request extractors that turn rejections into the error envelope.

mod id_path;
mod validated_json;
mod validated_query;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;

/// Flatten validator errors, nested ones included, into one message.
pub(crate) fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    use validator::ValidationErrorsKind;

    let mut messages = Vec::new();
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                messages.extend(errs.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                }));
            }
            ValidationErrorsKind::Struct(inner) => {
                messages.push(format_validation_errors(inner));
            }
            ValidationErrorsKind::List(items) => {
                messages.extend(items.values().map(|inner| format_validation_errors(inner)));
            }
        }
    }
    messages.sort();
    messages.dedup();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LessonOrder, ReorderLessons};
    use validator::Validate;

    #[test]
    fn test_reorder_item_errors_are_reported() {
        let request = ReorderLessons(vec![LessonOrder {
            lesson_id: 1,
            sequence: 0,
        }]);
        let errors = request.validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "Sequence must be at least 1");
    }

    #[test]
    fn test_empty_reorder_is_rejected() {
        let errors = ReorderLessons(Vec::new()).validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "At least one lesson is required");
    }
}
