//! intrinsic function recognition
//!
//! A json object is an intrinsic function call when it has exactly one key and that key is `Ref`
//! or starts with `Fn::`. Which functions can be evaluated is a closed set, see [Function].
use crate::error::EvaluationError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Ref,
    GetAtt,
    Join,
    Split,
    Select,
    Sub,
    ImportValue,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Ref" => Function::Ref,
            "Fn::GetAtt" => Function::GetAtt,
            "Fn::Join" => Function::Join,
            "Fn::Split" => Function::Split,
            "Fn::Select" => Function::Select,
            "Fn::Sub" => Function::Sub,
            "Fn::ImportValue" => Function::ImportValue,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Ref => "Ref",
            Function::GetAtt => "Fn::GetAtt",
            Function::Join => "Fn::Join",
            Function::Split => "Fn::Split",
            Function::Select => "Fn::Select",
            Function::Sub => "Fn::Sub",
            Function::ImportValue => "Fn::ImportValue",
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_intrinsic_name(name: &str) -> bool {
    name == "Ref" || name.starts_with("Fn::")
}

/// A call of a supported intrinsic function, arguments still unevaluated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsic<'a> {
    pub function: Function,
    pub args: &'a Value,
}

impl<'a> Intrinsic<'a> {
    /// `None` for objects that are no intrinsic at all, an error for unsupported functions
    pub fn parse(object: &'a Map<String, Value>) -> Option<Result<Self, EvaluationError>> {
        if object.len() != 1 {
            return None;
        }

        let (name, args) = object.iter().next()?;
        if !is_intrinsic_name(name) {
            return None;
        }

        tracing::trace!(%name, "intrinsic found");
        Some(
            Function::from_name(name)
                .map(|function| Intrinsic { function, args })
                .ok_or_else(|| EvaluationError::UnsupportedIntrinsic(name.clone())),
        )
    }

    /// Arguments as a list: a single non-list argument is a list of one
    pub fn arg_list(&self) -> &'a [Value] {
        match self.args {
            Value::Array(args) => args.as_slice(),
            single => std::slice::from_ref(single),
        }
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> EvaluationError {
        EvaluationError::invalid_arguments(self.function.name(), reason)
    }
}
