//! # cfn-eval - CloudFormation expression evaluation
//!
//! Answers the question "what would CloudFormation resolve this expression to?" for a stack that
//! is already deployed, without deploying anything. Hotswap deployments need this to find the
//! physical resources they are about to update directly.
//!
//! ## Introduction for developers
//!
//! ### Intrinsic functions
//!
//! Values in a CloudFormation template may be computed by intrinsic functions. In json an
//! intrinsic is an object with exactly one key, `Ref` or a key starting with `Fn::`:
//!
//! ```json
//! {
//!   "BucketArn": { "Fn::GetAtt": ["Bucket", "Arn"] },
//!   "Url": { "Fn::Sub": "https://${Api}.execute-api.${AWS::Region}.${AWS::URLSuffix}/" },
//!   "Plain": { "Key": "not an intrinsic, two keys", "Other": 1 }
//! }
//! ```
//!
//! Supported are `Ref`, `Fn::GetAtt`, `Fn::Join`, `Fn::Split`, `Fn::Select`, `Fn::Sub` and
//! `Fn::ImportValue` (see [intrinsic::Function]). Any other `Fn::` function is an error.
//!
//! ### Where values come from
//!
//! | **expression**                  | **resolved from**                                        |
//! |---------------------------------|----------------------------------------------------------|
//! | `Ref` of a pseudo parameter     | [context::EvaluationContext] (`AWS::URLSuffix`: the API) |
//! | `Ref` of a parameter            | context parameters, then the template's `Default`        |
//! | `Ref` of a resource             | physical id of the deployed resource                     |
//! | `Fn::GetAtt` of a resource      | physical id, formatted by [arn]                          |
//! | `Fn::GetAtt` of `Outputs.*`     | an evaluator for the nested stack                        |
//! | `Fn::ImportValue`               | account-wide exports                                     |
//!
//! Deployed resources and exports are read through [client::CloudFormationClient]. Each
//! [evaluator::Evaluator] fetches them at most once, see [cache].
//!
//! ### Errors
//!
//! An expression that can't be resolved fails with [error::EvaluationError]. Callers that only
//! want a best-effort answer catch exactly that one and fall back to something else (see
//! [evaluator::Evaluator::establish_resource_physical_name]). API failures are a different error
//! and always propagate.
//!
//! ### Example
//!
//! ```
//! use cfn_eval::client::{InMemoryClient, StackResourceSummary};
//! use cfn_eval::context::EvaluationContext;
//! use cfn_eval::evaluator::{Evaluator, EvaluatorProps};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), cfn_eval::error::Error> {
//! let client = InMemoryClient::default().with_stack(
//!     "my-stack",
//!     vec![StackResourceSummary::new(
//!         "Bucket".into(),
//!         Some("my-bucket".into()),
//!         "AWS::S3::Bucket".into(),
//!     )],
//! );
//!
//! let evaluator = Evaluator::new(EvaluatorProps {
//!     stack_name: "my-stack".into(),
//!     template: cfn_eval::template!({ "Resources": { "Bucket": { "Type": "AWS::S3::Bucket" } } }),
//!     context: EvaluationContext::new("111111111111", "us-east-1"),
//!     nested_stacks: Default::default(),
//!     client: Arc::new(client),
//! });
//!
//! let arn = evaluator.evaluate(&json!({ "Fn::GetAtt": ["Bucket", "Arn"] })).await?;
//! assert_eq!(arn, json!("arn:aws:s3:::my-bucket"));
//! # Ok(())
//! # }
//! ```
pub mod arn;
pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod intrinsic;
pub mod sub;
pub mod template;
pub mod value;
mod visit;
