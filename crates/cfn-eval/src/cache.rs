//! lazily fetched cloud state
//!
//! Both caches are single-flight: the first caller performs the fetch, callers arriving while it
//! is in progress wait for that same fetch instead of issuing their own. A failed fetch is not
//! cached, the next caller tries again.
use crate::client::{CloudFormationClient, Export, StackResourceSummary};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Resource inventory of one stack, fetched on first use
pub struct LazyListStackResources {
    client: Arc<dyn CloudFormationClient>,
    stack_name: String,
    resources: OnceCell<Vec<StackResourceSummary>>,
}

impl LazyListStackResources {
    pub fn new(client: Arc<dyn CloudFormationClient>, stack_name: impl Into<String>) -> Self {
        Self {
            client,
            stack_name: stack_name.into(),
            resources: OnceCell::new(),
        }
    }

    pub async fn list_stack_resources(&self) -> Result<&[StackResourceSummary]> {
        let resources = self
            .resources
            .get_or_try_init(|| async {
                tracing::debug!(stack = %self.stack_name, "listing stack resources");
                self.client
                    .list_stack_resources(&self.stack_name)
                    .await
                    .map_err(Error::Client)
            })
            .await?;

        Ok(resources.as_slice())
    }

    pub async fn find(&self, logical_id: &str) -> Result<Option<&StackResourceSummary>> {
        Ok(self
            .list_stack_resources()
            .await?
            .iter()
            .find(|resource| resource.logical_resource_id == logical_id))
    }
}

/// Account-wide exports, scanned page by page as lookups need them
///
/// Every export seen on a page is remembered, not just the one that was searched for. A lookup
/// stops after the page containing its match; the next lookup for an unknown name continues
/// with the page after that. Once all pages were read, misses are answered without a request.
pub struct LazyLookupExport {
    client: Arc<dyn CloudFormationClient>,
    scan: Mutex<ExportScan>,
}

#[derive(Default)]
struct ExportScan {
    exports: IndexMap<String, Export>,
    cursor: Cursor,
}

#[derive(Default, Debug, PartialEq)]
enum Cursor {
    #[default]
    Start,
    Next(String),
    Exhausted,
}

impl LazyLookupExport {
    pub fn new(client: Arc<dyn CloudFormationClient>) -> Self {
        Self {
            client,
            scan: Mutex::new(ExportScan::default()),
        }
    }

    /// Find the export called `name`, `None` when no page contains it
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn lookup_export(&self, name: &str) -> Result<Option<Export>> {
        // held across page fetches: concurrent lookups queue up behind the scan in progress
        let mut scan = self.scan.lock().await;

        if let Some(export) = scan.exports.get(name) {
            return Ok(Some(export.clone()));
        }

        loop {
            let next_token = match &scan.cursor {
                Cursor::Exhausted => return Ok(None),
                Cursor::Start => None,
                Cursor::Next(token) => Some(token.as_str()),
            };

            tracing::debug!(?next_token, "listing exports");
            let page = self
                .client
                .list_exports(next_token)
                .await
                .map_err(Error::Client)?;

            scan.cursor = match page.next_token {
                Some(token) => Cursor::Next(token),
                None => Cursor::Exhausted,
            };

            // exports without a name can't be imported
            for export in page.exports {
                if let Some(export_name) = export.name.clone() {
                    scan.exports.insert(export_name, export);
                }
            }

            if let Some(export) = scan.exports.get(name) {
                return Ok(Some(export.clone()));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::InMemoryClient;
    use pretty_assertions::assert_eq;

    fn export(name: &str, value: &str) -> Export {
        Export::new(Some(name.into()), Some(value.into()))
    }

    fn paged_exports() -> Arc<InMemoryClient> {
        Arc::new(
            InMemoryClient::default()
                .with_export_page(vec![export("one", "1"), export("two", "2")])
                .with_export_page(vec![Export::new(None, Some("anonymous".into()))])
                .with_export_page(vec![export("three", "3")]),
        )
    }

    fn stack() -> Arc<InMemoryClient> {
        Arc::new(InMemoryClient::default().with_stack(
            "my-stack",
            vec![StackResourceSummary::new(
                "Bucket".into(),
                Some("my-bucket".into()),
                "AWS::S3::Bucket".into(),
            )],
        ))
    }

    #[tokio::test]
    async fn stack_resources_are_fetched_once() {
        let client = stack();
        let cache = LazyListStackResources::new(client.clone(), "my-stack");

        assert_eq!(cache.list_stack_resources().await.unwrap().len(), 1);
        assert_eq!(cache.list_stack_resources().await.unwrap().len(), 1);
        assert!(cache.find("Bucket").await.unwrap().is_some());
        assert!(cache.find("Other").await.unwrap().is_none());

        assert_eq!(client.stack_resource_requests(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_fetch() {
        let client = stack();
        let cache = LazyListStackResources::new(client.clone(), "my-stack");

        let (first, second) =
            tokio::join!(cache.list_stack_resources(), cache.list_stack_resources());
        assert_eq!(first.unwrap(), second.unwrap());

        assert_eq!(client.stack_resource_requests(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let client = Arc::new(InMemoryClient::default());
        let cache = LazyListStackResources::new(client.clone(), "missing");

        assert!(matches!(
            cache.list_stack_resources().await,
            Err(Error::Client(_))
        ));
        assert!(cache.list_stack_resources().await.is_err());
        assert_eq!(client.stack_resource_requests(), 2);
    }

    #[tokio::test]
    async fn lookup_stops_at_the_matching_page() {
        let client = paged_exports();
        let cache = LazyLookupExport::new(client.clone());

        assert_eq!(cache.lookup_export("two").await.unwrap(), Some(export("two", "2")));
        assert_eq!(client.export_requests(), 1);

        // seen on the first page while searching for "two"
        assert_eq!(cache.lookup_export("one").await.unwrap(), Some(export("one", "1")));
        assert_eq!(client.export_requests(), 1);
    }

    #[tokio::test]
    async fn lookup_resumes_where_the_last_scan_stopped() {
        let client = paged_exports();
        let cache = LazyLookupExport::new(client.clone());

        cache.lookup_export("one").await.unwrap();
        assert_eq!(
            cache.lookup_export("three").await.unwrap(),
            Some(export("three", "3"))
        );

        assert_eq!(client.export_requests(), 3);
    }

    #[tokio::test]
    async fn missing_export_scans_all_pages_once() {
        let client = paged_exports();
        let cache = LazyLookupExport::new(client.clone());

        assert_eq!(cache.lookup_export("missing").await.unwrap(), None);
        assert_eq!(client.export_requests(), 3);

        assert_eq!(cache.lookup_export("missing").await.unwrap(), None);
        assert_eq!(cache.lookup_export("three").await.unwrap(), Some(export("three", "3")));
        assert_eq!(client.export_requests(), 3);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_the_scan() {
        let client = paged_exports();
        let cache = LazyLookupExport::new(client.clone());

        let (three, one) = tokio::join!(cache.lookup_export("three"), cache.lookup_export("one"));
        assert_eq!(three.unwrap(), Some(export("three", "3")));
        assert_eq!(one.unwrap(), Some(export("one", "1")));

        assert_eq!(client.export_requests(), 3);
    }
}
