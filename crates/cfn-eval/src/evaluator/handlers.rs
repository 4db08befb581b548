//! intrinsic function handlers
use super::Evaluator;
use crate::error::{EvaluationError, Result};
use crate::intrinsic::{Function, Intrinsic};
use crate::sub::{self, Reference, Segment};
use crate::value::{kind, to_cfn_string, to_index};
use serde_json::{Map, Value};

impl Evaluator {
    pub(super) async fn evaluate_intrinsic(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        match intrinsic.function {
            Function::Ref => self.fn_ref(intrinsic).await,
            Function::GetAtt => self.fn_get_att(intrinsic).await,
            Function::Join => self.fn_join(intrinsic).await,
            Function::Split => self.fn_split(intrinsic).await,
            Function::Select => self.fn_select(intrinsic).await,
            Function::Sub => self.fn_sub(intrinsic).await,
            Function::ImportValue => self.fn_import_value(intrinsic).await,
        }
    }

    async fn fn_ref(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let [Value::String(logical_id)] = intrinsic.arg_list() else {
            return Err(intrinsic.invalid("expected a logical id").into());
        };

        self.resolve_ref(logical_id).await
    }

    // The dotted `Resource.Attribute` string form is not split: it is taken as a logical id.
    async fn fn_get_att(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let (logical_id, attribute) = match intrinsic.arg_list() {
            [Value::String(logical_id)] => (logical_id, None),
            [Value::String(logical_id), attribute] => (
                logical_id,
                Some(self.evaluate_to_string(attribute, &intrinsic).await?),
            ),
            _ => return Err(intrinsic.invalid("expected [logicalId, attributeName]").into()),
        };

        self.resolve_get_att(logical_id, attribute.as_deref()).await
    }

    async fn fn_join(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let [Value::String(delimiter), list] = intrinsic.arg_list() else {
            return Err(intrinsic.invalid("expected [delimiter, list]").into());
        };

        let elements = self.evaluate_to_list(list, &intrinsic).await?;
        let parts = elements
            .iter()
            .map(|element| {
                to_cfn_string(element)
                    .ok_or_else(|| intrinsic.invalid(format!("can't join {}", kind(element))))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Value::String(parts.join(delimiter.as_str())))
    }

    async fn fn_split(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let [Value::String(delimiter), input] = intrinsic.arg_list() else {
            return Err(intrinsic.invalid("expected [delimiter, string]").into());
        };

        let input = self.evaluate_to_string(input, &intrinsic).await?;

        // an empty delimiter splits into characters
        let parts: Vec<Value> = if delimiter.is_empty() {
            input.chars().map(|c| Value::String(c.to_string())).collect()
        } else {
            input.split(delimiter.as_str()).map(Value::from).collect()
        };

        Ok(Value::Array(parts))
    }

    async fn fn_select(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let [index, list] = intrinsic.arg_list() else {
            return Err(intrinsic.invalid("expected [index, list]").into());
        };

        let index = self.evaluate_value(index).await?;
        let index = to_index(&index).ok_or_else(|| {
            intrinsic.invalid(format!("index must be a non-negative integer, got {index}"))
        })?;

        let elements = self.evaluate_to_list(list, &intrinsic).await?;
        let length = elements.len();
        elements.into_iter().nth(index).ok_or_else(|| {
            intrinsic
                .invalid(format!("index {index} out of range for list of {length}"))
                .into()
        })
    }

    /// Placeholders are resolved one after the other, in the order they appear
    async fn fn_sub(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let (template, variables) = match intrinsic.arg_list() {
            [Value::String(template)] => (template, None),
            [Value::String(template), variables] => (template, Some(variables)),
            _ => {
                return Err(intrinsic
                    .invalid("expected a template string or [template, variables]")
                    .into())
            }
        };

        let variables = match variables {
            None => Map::new(),
            Some(variables) => match self.evaluate_value(variables).await? {
                Value::Object(variables) => variables,
                other => {
                    return Err(intrinsic
                        .invalid(format!("variables must be an object, got {}", kind(&other)))
                        .into())
                }
            },
        };

        let mut substituted = String::with_capacity(template.len());
        for segment in sub::parse(template) {
            let placeholder = match segment {
                Segment::Literal(text) => {
                    substituted.push_str(&text);
                    continue;
                }
                Segment::Placeholder(placeholder) => placeholder,
            };

            let value = match variables.get(&placeholder) {
                Some(value) => value.clone(),
                None => match Reference::from_placeholder(&placeholder) {
                    Reference::Ref(logical_id) => self.resolve_ref(logical_id).await?,
                    Reference::GetAtt(logical_id, attribute) => {
                        self.resolve_get_att(logical_id, Some(attribute)).await?
                    }
                },
            };

            let text = to_cfn_string(&value).ok_or_else(|| {
                intrinsic.invalid(format!(
                    "can't substitute ${{{placeholder}}} with {}",
                    kind(&value)
                ))
            })?;
            substituted.push_str(&text);
        }

        Ok(Value::String(substituted))
    }

    async fn fn_import_value(&self, intrinsic: Intrinsic<'_>) -> Result<Value> {
        let [name] = intrinsic.arg_list() else {
            return Err(intrinsic.invalid("expected an export name").into());
        };

        let name = self.evaluate_to_string(name, &intrinsic).await?;
        let Some(export) = self.exports.lookup_export(&name).await? else {
            return Err(EvaluationError::ExportNotFound(name).into());
        };

        match export.value {
            Some(value) => Ok(Value::String(value)),
            None => Err(EvaluationError::ExportWithoutValue(name).into()),
        }
    }

    async fn evaluate_to_string(
        &self,
        expression: &Value,
        intrinsic: &Intrinsic<'_>,
    ) -> Result<String> {
        let evaluated = self.evaluate_value(expression).await?;
        match evaluated {
            Value::String(s) => Ok(s),
            other => Err(intrinsic
                .invalid(format!("expected a string, got {}", kind(&other)))
                .into()),
        }
    }

    async fn evaluate_to_list(
        &self,
        expression: &Value,
        intrinsic: &Intrinsic<'_>,
    ) -> Result<Vec<Value>> {
        match self.evaluate_value(expression).await? {
            Value::Array(elements) => Ok(elements),
            other => Err(intrinsic
                .invalid(format!("expected a list, got {}", kind(&other)))
                .into()),
        }
    }
}
