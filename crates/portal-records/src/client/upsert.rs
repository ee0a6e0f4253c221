use std::fmt;
use std::path::{Path, PathBuf};

use portal_api_client::{Envelope, FileId, FileIdData, RequestMethod};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::template::{render_file, SnippetPolicy, TemplateContext};

/// Marker in write-path template names replaced by the operation name.
pub const OPERATION_MARKER: &str = "%OPERATION%";

/// Which write an upsert performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOperation {
    Insert,
    Update,
}

impl UpsertOperation {
    /// Pick the operation from an optional identifier.
    ///
    /// A present, non-empty identifier means update.
    pub fn for_id(id: Option<&str>) -> Self {
        match id {
            Some(id) if !id.is_empty() => UpsertOperation::Update,
            _ => UpsertOperation::Insert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOperation::Insert => "insert",
            UpsertOperation::Update => "update",
        }
    }

    /// Substitute the operation into a template path.
    pub fn template_path(&self, template: &Path) -> PathBuf {
        PathBuf::from(
            template
                .to_string_lossy()
                .replace(OPERATION_MARKER, self.as_str()),
        )
    }
}

impl fmt::Display for UpsertOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl super::PortalClient {
    /// Insert or update one resource.
    ///
    /// With a non-empty `id` the request goes to `path/id` using the
    /// `update` template; otherwise to `path` using the `insert` template.
    /// Returns the `FileId` the API assigned or confirmed. A `Success=false`
    /// envelope is logged and returned as `ApiReported`.
    #[instrument(skip(self, template, values), fields(operation = tracing::field::Empty))]
    pub async fn upsert<V: Serialize + ?Sized>(
        &self,
        method: RequestMethod,
        path: &str,
        template: impl AsRef<Path>,
        values: &V,
        id: Option<&str>,
    ) -> Result<FileId> {
        let operation = UpsertOperation::for_id(id);
        tracing::Span::current().record("operation", operation.as_str());

        let path = match (operation, id) {
            (UpsertOperation::Update, Some(id)) => format!("{path}/{id}"),
            _ => path.to_string(),
        };
        let template = operation.template_path(template.as_ref());

        let context = TemplateContext::from_values(values)?;
        let body = render_file(self.renderer(), &template, &context, SnippetPolicy::WRITE).await?;

        let request = self.authorized(method, &path)?.json_text(body);
        let response = self.inner().execute(request).await?;

        let envelope: Envelope<FileIdData> = Envelope::decode(response.text())?;
        if let Some(failure) = envelope.failure() {
            super::log_api_failure(&failure);
            return Err(failure.into());
        }

        let file_id = envelope.result_data.file_id.ok_or_else(|| {
            Error::new(ErrorKind::Json(
                "successful response is missing ResultData.FileId".to_string(),
            ))
        })?;
        debug!(%file_id, "Upsert complete");
        Ok(file_id)
    }
}
