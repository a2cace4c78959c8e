//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::{AppError, FieldErrors};

/// Validated JSON extractor that automatically validates requests.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use posyandu_api::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct ChangeEmail {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn change_email(ValidatedJson(payload): ValidatedJson<ChangeEmail>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        value.validate().map_err(into_app_error)?;

        Ok(ValidatedJson(value))
    }
}

/// Malformed bodies are a 400; well-formed bodies with missing or mistyped
/// fields are reported against `body`.
fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::validation("body", e.body_text()),
        other => AppError::bad_request(other.body_text()),
    }
}

/// Flatten validator output into the field -> messages map.
pub fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields = FieldErrors::new();
    collect(&errors, None, &mut fields);
    AppError::Validation(fields)
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = out.entry(name.clone()).or_default();
                for e in errs {
                    messages.push(
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} tidak valid", name)),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&name), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}.{}", name, index)), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupForm {
        #[validate(length(min = 3, message = "Nama minimal 3 karakter"))]
        nama: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn errors_are_grouped_by_field() {
        let form = SignupForm {
            nama: "ab".into(),
            email: "not-an-email".into(),
        };
        match into_app_error(form.validate().unwrap_err()) {
            AppError::Validation(fields) => {
                assert_eq!(fields["nama"], vec!["Nama minimal 3 karakter".to_string()]);
                assert_eq!(fields["email"], vec!["email tidak valid".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
