//! CloudFormation API surface consumed by the evaluator
//!
//! The evaluator only ever reads: the resource inventory of a deployed stack, the account-wide
//! exports and the URL suffix of a region. [CloudFormationClient] is that capability.
//! [InMemoryClient] serves a static cloud state and is used by the `cfn-eval` binary and tests.
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One deployed resource of a stack
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_new::new)]
#[serde(rename_all = "PascalCase")]
pub struct StackResourceSummary {
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    pub resource_type: String,
}

/// An account-wide CloudFormation export
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_new::new)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportsPage {
    pub exports: Vec<Export>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait CloudFormationClient: Send + Sync {
    async fn list_stack_resources(
        &self,
        stack_name: &str,
    ) -> anyhow::Result<Vec<StackResourceSummary>>;

    async fn list_exports(&self, next_token: Option<&str>) -> anyhow::Result<ExportsPage>;

    async fn url_suffix(&self, region: &str) -> anyhow::Result<String>;
}

/// Static cloud state
///
/// Exports are served in pages, the `next_token` of a page is the index of the page that follows.
/// Every request is counted.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InMemoryClient {
    #[serde(default)]
    pub stack_resources: IndexMap<String, Vec<StackResourceSummary>>,
    #[serde(default)]
    pub export_pages: Vec<Vec<Export>>,
    #[serde(default)]
    pub url_suffix: Option<String>,

    #[serde(skip)]
    stack_resource_requests: AtomicUsize,
    #[serde(skip)]
    export_requests: AtomicUsize,
    #[serde(skip)]
    url_suffix_requests: AtomicUsize,
}

impl InMemoryClient {
    pub fn with_stack(
        mut self,
        stack_name: impl Into<String>,
        resources: Vec<StackResourceSummary>,
    ) -> Self {
        self.stack_resources.insert(stack_name.into(), resources);
        self
    }

    pub fn with_export_page(mut self, exports: Vec<Export>) -> Self {
        self.export_pages.push(exports);
        self
    }

    pub fn with_url_suffix(mut self, url_suffix: impl Into<String>) -> Self {
        self.url_suffix = Some(url_suffix.into());
        self
    }

    pub fn stack_resource_requests(&self) -> usize {
        self.stack_resource_requests.load(Ordering::SeqCst)
    }

    pub fn export_requests(&self) -> usize {
        self.export_requests.load(Ordering::SeqCst)
    }

    pub fn url_suffix_requests(&self) -> usize {
        self.url_suffix_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudFormationClient for InMemoryClient {
    async fn list_stack_resources(
        &self,
        stack_name: &str,
    ) -> anyhow::Result<Vec<StackResourceSummary>> {
        self.stack_resource_requests.fetch_add(1, Ordering::SeqCst);
        // behave like a network call: give concurrent callers a chance to run
        tokio::task::yield_now().await;

        match self.stack_resources.get(stack_name) {
            Some(resources) => Ok(resources.clone()),
            None => anyhow::bail!("Stack with id {stack_name} does not exist"),
        }
    }

    async fn list_exports(&self, next_token: Option<&str>) -> anyhow::Result<ExportsPage> {
        self.export_requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let index = match next_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                anyhow::anyhow!("Invalid NextToken {token:?}")
            })?,
        };

        let exports = self.export_pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.export_pages.len()).then(|| (index + 1).to_string());

        Ok(ExportsPage {
            exports,
            next_token,
        })
    }

    async fn url_suffix(&self, region: &str) -> anyhow::Result<String> {
        self.url_suffix_requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some(url_suffix) = &self.url_suffix {
            return Ok(url_suffix.clone());
        }

        Ok(if region.starts_with("cn-") {
            "amazonaws.com.cn".to_string()
        } else {
            "amazonaws.com".to_string()
        })
    }
}
