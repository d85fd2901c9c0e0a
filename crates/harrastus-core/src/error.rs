//! Error types for the hobby catalog.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Key used for validation messages that concern the whole object
/// rather than a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by the offending field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when no messages were collected, otherwise a
    /// [`HarrastusError::Validation`] carrying all of them.
    pub fn into_result(self) -> HarrastusResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HarrastusError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum HarrastusError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Permission store error: {0}")]
    PermissionStore(String),

    #[error(
        "This address could not be geocoded. Please confirm your address is right, \
         or try again later. ({address})"
    )]
    Geocoding { address: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for HarrastusError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl HarrastusError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Field-keyed messages when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type HarrastusResult<T> = Result<T, HarrastusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn messages_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("near_latitude", "Must be a float.");
        errors.add("near_latitude", "Value must be within -180.0 and 180.0.");
        errors.add("near_longitude", "Must be a float.");

        assert_eq!(errors.get("near_latitude").unwrap().len(), 2);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["near_latitude", "near_longitude"]
        );

        let err = errors.into_result().unwrap_err();
        assert!(err.to_string().contains("near_longitude: Must be a float."));
    }
}
