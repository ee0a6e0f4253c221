use std::path::Path;

use futures::stream::{self, BoxStream, StreamExt};
use portal_api_client::{Envelope, RequestMethod, RowsData};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::template::{render_file, SnippetPolicy, TemplateContext};

/// Rows requested per page when the caller has no preference.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

impl super::PortalClient {
    /// Run a paginated search and return the rows of every page in order.
    ///
    /// Each page renders `template` with the caller's values plus
    /// `rows_per_page` and `num_page` (1-based), and the next page is
    /// requested only while a page comes back exactly full. A result count
    /// that is an exact multiple of `page_size` therefore costs one extra
    /// request for the empty page that follows. `ClientConfig::max_pages`
    /// caps the number of pages.
    ///
    /// An API-reported failure that still carries `Rows` is logged and the
    /// rows are kept; one without `Rows` ends the call with `ApiReported`.
    #[instrument(skip(self, template, values), fields(template = %template.as_ref().display()))]
    pub async fn fetch_paged<V: Serialize + ?Sized>(
        &self,
        method: RequestMethod,
        path: &str,
        template: impl AsRef<Path>,
        values: &V,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        let base = search_context(values, page_size)?;
        let mut rows = Vec::new();
        let mut num_page = 1;

        loop {
            let page = self
                .fetch_page(method, path, template.as_ref(), &base, page_size, num_page)
                .await?;
            let full = page.len() == page_size as usize;
            rows.extend(page);

            if !full || self.page_limit_reached(num_page) {
                break;
            }
            num_page += 1;
        }

        debug!(pages = num_page, rows = rows.len(), "Search complete");
        Ok(rows)
    }

    /// Stream the pages of a paginated search lazily.
    ///
    /// Pages are requested one at a time as the stream is polled. The
    /// stream ends after the first short page, after the page limit, or
    /// after yielding an error.
    pub fn pages<'a, V: Serialize + ?Sized>(
        &'a self,
        method: RequestMethod,
        path: &'a str,
        template: impl AsRef<Path>,
        values: &V,
        page_size: u32,
    ) -> BoxStream<'a, Result<Vec<Value>>> {
        let base = match search_context(values, page_size) {
            Ok(base) => base,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };
        let template = template.as_ref().to_path_buf();

        stream::try_unfold(Some(1u32), move |next| {
            let base = base.clone();
            let template = template.clone();
            async move {
                let Some(num_page) = next else {
                    return Ok(None);
                };
                let page = self
                    .fetch_page(method, path, &template, &base, page_size, num_page)
                    .await?;
                let more = page.len() == page_size as usize && !self.page_limit_reached(num_page);
                Ok(Some((page, more.then_some(num_page + 1))))
            }
        })
        .boxed()
    }

    /// Request one page.
    async fn fetch_page(
        &self,
        method: RequestMethod,
        path: &str,
        template: &Path,
        base: &TemplateContext,
        page_size: u32,
        num_page: u32,
    ) -> Result<Vec<Value>> {
        let context = base
            .clone()
            .with("rows_per_page", page_size)
            .with("num_page", num_page);
        let body = render_file(self.renderer(), template, &context, SnippetPolicy::READ).await?;

        let request = self.authorized(method, path)?.json_text(body);
        let response = self.inner().execute(request).await?;

        let envelope: Envelope<RowsData> = Envelope::decode(response.text())?;
        if let Some(failure) = envelope.failure() {
            super::log_api_failure(&failure);
            if envelope.result_data.rows.is_none() {
                return Err(failure.into());
            }
        }

        let rows = envelope.result_data.rows.unwrap_or_default();
        debug!(num_page, rows = rows.len(), "Page received");
        Ok(rows)
    }

    fn page_limit_reached(&self, num_page: u32) -> bool {
        match self.inner().config().max_pages {
            Some(max) if num_page >= max => {
                warn!(max_pages = max, "Page limit reached, remaining pages not requested");
                true
            }
            _ => false,
        }
    }
}

fn search_context<V: Serialize + ?Sized>(values: &V, page_size: u32) -> Result<TemplateContext> {
    if page_size == 0 {
        return Err(Error::new(ErrorKind::InvalidInput(
            "page size must be at least 1".to_string(),
        )));
    }
    TemplateContext::from_values(values)
}
