use portal_api_client::{FileId, RequestMethod};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;

use super::DEFAULT_PAGE_SIZE;

/// Search endpoint for companies.
pub const COMPANIES_SEARCH_PATH: &str = "Search/Companies";

/// Insert/update endpoint for one company.
pub const COMPANY_PATH: &str = "CUD/Company";

const COMPANIES_TEMPLATE: &str = "api_get_companies.mustache";
const COMPANY_TEMPLATE: &str = "api_%OPERATION%_company.mustache";

impl super::PortalClient {
    /// List every company, 50 rows per page.
    #[instrument(skip(self))]
    pub async fn list_companies(&self) -> Result<Vec<Value>> {
        self.fetch_paged(
            RequestMethod::Post,
            COMPANIES_SEARCH_PATH,
            self.template_path(COMPANIES_TEMPLATE),
            &Value::Null,
            DEFAULT_PAGE_SIZE,
        )
        .await
    }

    /// Create a company, or update the one identified by `id`.
    #[instrument(skip(self, company))]
    pub async fn upsert_company<C: Serialize + ?Sized>(
        &self,
        company: &C,
        id: Option<&str>,
    ) -> Result<FileId> {
        self.upsert(
            RequestMethod::Post,
            COMPANY_PATH,
            self.template_path(COMPANY_TEMPLATE),
            company,
            id,
        )
        .await
    }
}
