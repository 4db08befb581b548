//! expression evaluation
//!
//! An [Evaluator] is bound to one stack: its template, the context it is deployed in and the
//! deployed resources (fetched lazily, once). [Evaluator::evaluate] walks a json tree and replaces
//! every intrinsic function call by its value.
//!
//! - arrays: elements are evaluated concurrently, results keep their order
//! - intrinsic objects: dispatched to the handler of the function
//! - other objects: values are evaluated one key after the other, keys keep their order
//! - everything else is returned unchanged
mod handlers;
mod nested;

use crate::arn::{self, ArnScope};
use crate::cache::{LazyListStackResources, LazyLookupExport};
use crate::client::CloudFormationClient;
use crate::context::{EvaluationContext, URL_SUFFIX};
use crate::error::{Error, EvaluationError, Result};
use crate::intrinsic::Intrinsic;
use crate::template::{LogicalResource, NestedStackTemplates, Template};
use crate::value::to_cfn_string;
use crate::visit::VisitStrings;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const NESTED_STACK_TYPE: &str = "AWS::CloudFormation::Stack";

/// Everything an [Evaluator] is bound to
pub struct EvaluatorProps {
    pub stack_name: String,
    pub template: Template,
    pub context: EvaluationContext,
    /// nested stacks of this stack, by logical id
    pub nested_stacks: IndexMap<String, NestedStackTemplates>,
    pub client: Arc<dyn CloudFormationClient>,
}

pub struct Evaluator {
    stack_name: String,
    template: Template,
    context: EvaluationContext,
    /// pseudo parameters and user parameters
    bindings: IndexMap<String, Value>,
    nested_stacks: IndexMap<String, NestedStackTemplates>,
    client: Arc<dyn CloudFormationClient>,

    stack_resources: LazyListStackResources,
    exports: LazyLookupExport,
    url_suffix: OnceCell<String>,
}

impl Evaluator {
    pub fn new(props: EvaluatorProps) -> Self {
        let EvaluatorProps {
            stack_name,
            template,
            context,
            nested_stacks,
            client,
        } = props;

        Self {
            bindings: context.bindings(&stack_name),
            stack_resources: LazyListStackResources::new(client.clone(), stack_name.clone()),
            exports: LazyLookupExport::new(client.clone()),
            url_suffix: OnceCell::new(),
            stack_name,
            template,
            context,
            nested_stacks,
            client,
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    /// Resolve every intrinsic function in `expression`
    pub async fn evaluate(&self, expression: &Value) -> Result<Value> {
        self.evaluate_value(expression).await
    }

    fn evaluate_value<'a>(&'a self, expression: &'a Value) -> BoxFuture<'a, Result<Value>> {
        async move {
            match expression {
                Value::Array(elements) => {
                    let evaluated = futures::future::try_join_all(
                        elements.iter().map(|element| self.evaluate_value(element)),
                    )
                    .await?;
                    Ok(Value::Array(evaluated))
                }
                Value::Object(object) => {
                    if let Some(intrinsic) = Intrinsic::parse(object) {
                        return self.evaluate_intrinsic(intrinsic?).await;
                    }

                    let mut evaluated = Map::with_capacity(object.len());
                    for (key, value) in object {
                        evaluated.insert(key.clone(), self.evaluate_value(value).await?);
                    }
                    Ok(Value::Object(evaluated))
                }
                scalar => Ok(scalar.clone()),
            }
        }
        .boxed()
    }

    /// Best effort physical name of a resource
    ///
    /// Evaluates the name given in the template if there is one. When that can't be evaluated the
    /// physical id of the deployed resource is used instead. Only evaluation errors cause the
    /// fallback, API errors are returned.
    pub async fn establish_resource_physical_name(
        &self,
        logical_id: &str,
        physical_name_in_template: Option<&Value>,
    ) -> Result<Option<String>> {
        if let Some(expression) = physical_name_in_template {
            match self.evaluate(expression).await {
                Ok(Value::Null) => {}
                Ok(value) => {
                    if let Some(name) = to_cfn_string(&value) {
                        return Ok(Some(name));
                    }
                }
                Err(Error::Evaluation(error)) => {
                    tracing::debug!(%logical_id, %error, "physical name not evaluable, using deployed resource");
                }
                Err(error) => return Err(error),
            }
        }

        self.find_physical_name_for(logical_id).await
    }

    pub async fn find_physical_name_for(&self, logical_id: &str) -> Result<Option<String>> {
        Ok(self
            .stack_resources
            .find(logical_id)
            .await?
            .and_then(|resource| resource.physical_resource_id.clone()))
    }

    pub async fn find_logical_id_for_physical_name(
        &self,
        physical_name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .stack_resources
            .list_stack_resources()
            .await?
            .iter()
            .find(|resource| resource.physical_resource_id.as_deref() == Some(physical_name))
            .map(|resource| resource.logical_resource_id.clone()))
    }

    /// All other resources of the template that mention `logical_id` anywhere in their definition
    pub fn find_references_to(&self, logical_id: &str) -> Vec<LogicalResource> {
        self.template
            .resources
            .iter()
            .filter(|(resource_logical_id, _)| resource_logical_id.as_str() != logical_id)
            .filter(|(_, definition)| {
                let mut found = false;
                definition.visit_strings(&mut |s: &str| found |= s == logical_id);
                found
            })
            .map(|(resource_logical_id, definition)| LogicalResource {
                logical_id: resource_logical_id.clone(),
                definition: definition.clone(),
            })
            .collect()
    }

    /// Unevaluated property of a template resource
    pub fn get_resource_property(&self, logical_id: &str, property: &str) -> Option<&Value> {
        self.template
            .resource(logical_id)
            .and_then(|resource| resource.properties.get(property))
    }

    async fn find_ref_target(&self, logical_id: &str) -> Result<Option<Value>> {
        if logical_id == URL_SUFFIX {
            return Ok(Some(Value::String(self.url_suffix().await?.to_string())));
        }

        if let Some(value) = self.bindings.get(logical_id) {
            return Ok(Some(value.clone()));
        }

        if let Some(default) = self.template.parameter_default(logical_id) {
            return Ok(Some(default.clone()));
        }

        self.find_get_att_target(logical_id, None).await
    }

    /// Value of an attribute of a resource, `None` when it can't be determined (yet)
    ///
    /// Without an attribute this is the physical id of the resource. `Outputs` as logical id
    /// refers to this stack's outputs, as nested stacks do to hand values to their parent.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn find_get_att_target(
        &self,
        logical_id: &str,
        attribute: Option<&str>,
    ) -> Result<Option<Value>> {
        if let ("Outputs", Some(output_name)) = (logical_id, attribute) {
            let Some(output) = self.template.output_value(output_name) else {
                return Ok(None);
            };
            return self.evaluate_value(output).await.map(Some);
        }

        let Some(resource) = self.stack_resources.find(logical_id).await? else {
            tracing::trace!(%logical_id, "resource not deployed");
            return Ok(None);
        };

        if resource.resource_type == NESTED_STACK_TYPE {
            if let Some(output_name) = attribute.and_then(|a| a.strip_prefix("Outputs.")) {
                return self.nested_stack_output(logical_id, output_name).await;
            }
        }

        let Some(physical_id) = &resource.physical_resource_id else {
            return Ok(None);
        };

        let formatted = arn::format_resource_attribute(
            self.arn_scope(),
            &resource.resource_type,
            physical_id,
            attribute,
        )?;

        Ok(formatted.map(Value::String))
    }

    async fn resolve_ref(&self, logical_id: &str) -> Result<Value> {
        self.find_ref_target(logical_id)
            .await?
            .ok_or_else(|| EvaluationError::UnresolvedRef(logical_id.to_string()).into())
    }

    async fn resolve_get_att(&self, logical_id: &str, attribute: Option<&str>) -> Result<Value> {
        self.find_get_att_target(logical_id, attribute)
            .await?
            .ok_or_else(|| {
                EvaluationError::UnresolvedGetAtt {
                    logical_id: logical_id.to_string(),
                    attribute: attribute.unwrap_or_default().to_string(),
                }
                .into()
            })
    }

    async fn url_suffix(&self) -> Result<&str> {
        let url_suffix = self
            .url_suffix
            .get_or_try_init(|| async {
                tracing::debug!(region = %self.context.region, "looking up url suffix");
                self.client
                    .url_suffix(&self.context.region)
                    .await
                    .map_err(Error::Client)
            })
            .await?;

        Ok(url_suffix.as_str())
    }

    fn arn_scope(&self) -> ArnScope<'_> {
        ArnScope::new(
            &self.context.partition,
            &self.context.region,
            &self.context.account,
        )
    }
}
