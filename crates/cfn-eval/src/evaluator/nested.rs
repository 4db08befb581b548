//! nested stack outputs
//!
//! `Fn::GetAtt` of `Outputs.<Name>` on an `AWS::CloudFormation::Stack` resource is answered by an
//! evaluator for the nested stack. That evaluator is a fresh instance with its own caches.
use super::{Evaluator, EvaluatorProps};
use crate::error::{EvaluationError, Result};
use crate::template::find_nested_stack;
use indexmap::IndexMap;
use serde_json::{json, Value};

impl Evaluator {
    /// Evaluator for the nested stack declared under `logical_id`
    ///
    /// `None` when there is no such nested stack or it has not been deployed yet. The parameters
    /// of the nested stack are evaluated in this evaluator, the child gets the results.
    #[tracing::instrument(level = "trace", skip(self), fields(stack = %self.stack_name))]
    pub async fn nested_evaluator(&self, logical_id: &str) -> Result<Option<Evaluator>> {
        let Some(nested_stack) = find_nested_stack(logical_id, &self.nested_stacks) else {
            return Ok(None);
        };

        let Some(physical_name) = &nested_stack.physical_name else {
            tracing::debug!(%logical_id, "nested stack is not deployed yet");
            return Ok(None);
        };

        let parameters = match self.get_resource_property(logical_id, "Parameters") {
            None => IndexMap::new(),
            Some(parameters) => match self.evaluate_value(parameters).await? {
                Value::Object(parameters) => parameters.into_iter().collect(),
                _ => {
                    return Err(EvaluationError::invalid_arguments(
                        super::NESTED_STACK_TYPE,
                        format!("Parameters of {logical_id} must be an object"),
                    )
                    .into())
                }
            },
        };

        tracing::debug!(%logical_id, %physical_name, "evaluating in nested stack");
        Ok(Some(Evaluator::new(EvaluatorProps {
            stack_name: physical_name.clone(),
            template: nested_stack.generated_template.clone(),
            context: self.context.scoped(parameters),
            nested_stacks: nested_stack.nested_stack_templates.clone(),
            client: self.client.clone(),
        })))
    }

    pub(super) async fn nested_stack_output(
        &self,
        logical_id: &str,
        output_name: &str,
    ) -> Result<Option<Value>> {
        let Some(nested) = self.nested_evaluator(logical_id).await? else {
            // a new nested stack: nothing to evaluate against
            return Ok(None);
        };

        nested
            .evaluate(&json!({ "Fn::GetAtt": ["Outputs", output_name] }))
            .await
            .map(Some)
    }
}
