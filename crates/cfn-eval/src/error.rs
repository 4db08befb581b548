//! error types
//!
//! [EvaluationError] is the one error kind raised when an expression can not be resolved.
//! Everything else the evaluator runs into (a failing API call, mostly) is wrapped in
//! [Error::Client] and must not be mistaken for an unresolvable expression.

/// An expression could not be resolved against the template and the deployed stack
#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    #[error("CloudFormation function {0} is not supported")]
    UnsupportedIntrinsic(String),

    #[error("Parameter or resource '{0}' could not be found for evaluation")]
    UnresolvedRef(String),

    #[error("Trying to evaluate Fn::GetAtt of '{logical_id}.{attribute}' but not in hotswap-able state")]
    UnresolvedGetAtt {
        logical_id: String,
        attribute: String,
    },

    #[error("Export '{0}' could not be found for evaluation")]
    ExportNotFound(String),

    #[error("Export '{0}' exists without a value")]
    ExportWithoutValue(String),

    #[error("Attributes of the '{0}' resource are not supported for evaluation")]
    UnsupportedResourceType(String),

    #[error("The '{attribute}' attribute of the '{resource_type}' resource is not supported for evaluation")]
    UnsupportedAttribute {
        resource_type: String,
        attribute: String,
    },

    #[error("Invalid arguments for {function}: {reason}")]
    InvalidArguments {
        function: &'static str,
        reason: String,
    },
}

impl EvaluationError {
    pub(crate) fn invalid_arguments(function: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            function,
            reason: reason.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The CloudFormation API (or whatever stands in for it) failed
    #[error(transparent)]
    Client(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_export_and_export_without_value_differ() {
        let missing = EvaluationError::ExportNotFound("shared".into()).to_string();
        let no_value = EvaluationError::ExportWithoutValue("shared".into()).to_string();

        assert_ne!(missing, no_value);
        assert!(missing.contains("could not be found"));
        assert!(no_value.contains("without a value"));
    }

    #[test]
    fn evaluation_error_is_transparent() {
        let error: Error = EvaluationError::UnresolvedRef("Bucket".into()).into();
        assert_eq!(
            error.to_string(),
            "Parameter or resource 'Bucket' could not be found for evaluation"
        );
    }
}
