use std::{io, result};

use crate::phrases;

pub type TemplateResult<T, E = TemplateError> = result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{}:\n{0}", phrases::LOAD_TEMPLATE_ERROR)]
    Load(Cause),
    #[error("{}:\n{0}", phrases::SAVE_TEMPLATE_ERROR)]
    Save(Cause),
}

impl TemplateError {
    pub fn cause(&self) -> &Cause {
        match self {
            TemplateError::Load(cause) | TemplateError::Save(cause) => cause,
        }
    }
}

/// Underlying reason a template could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Xml(String),
    #[error("attribute `{name}` is required")]
    MissingAttr { name: &'static str },
    #[error("attribute `{name}` has invalid value `{value}`")]
    InvalidAttr { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let err = TemplateError::Load(Cause::MissingAttr { name: "tableType" });
        assert_eq!(
            err.to_string(),
            "failed to load template:\nattribute `tableType` is required"
        );

        let err = TemplateError::Save(Cause::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert_eq!(err.to_string(), "failed to save template:\ndenied");
        assert!(matches!(err.cause(), Cause::Io(_)));
    }
}
