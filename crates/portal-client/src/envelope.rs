//! The JSON envelope wrapped around every portal response.
//!
//! ```json
//! {
//!   "ResultInfos": { "Success": true, "ErrorNumber": 0, "ErrorMessage": "" },
//!   "ResultData":  { "Rows": [ ... ] }
//! }
//! ```
//!
//! `ResultData` holds different members depending on the call kind, so the
//! payload type is chosen by the calling operation: [`RowsData`] for
//! searches, [`FileIdData`] for insert/update, [`TokenData`] for
//! authentication.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// A decoded response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de> + Default"))]
pub struct Envelope<D> {
    /// Success flag and error details.
    #[serde(rename = "ResultInfos")]
    pub result_infos: ResultInfos,

    /// Call-specific payload. Absent or `null` decodes as `D::default()`.
    #[serde(rename = "ResultData", default, deserialize_with = "null_as_default")]
    pub result_data: D,
}

impl<D> Envelope<D>
where
    D: for<'de> Deserialize<'de> + Default,
{
    /// Decode an envelope from a response body.
    pub fn decode(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            Error::with_source(
                ErrorKind::Json(format!("response is not a valid envelope: {e}")),
                e,
            )
        })
    }
}

impl<D> Envelope<D> {
    /// Returns true if the API reported success.
    pub fn is_success(&self) -> bool {
        self.result_infos.success
    }

    /// The reported failure, if any.
    pub fn failure(&self) -> Option<ApiFailure> {
        self.result_infos.failure()
    }
}

/// The `ResultInfos` member of an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultInfos {
    #[serde(rename = "Success", default)]
    pub success: bool,

    #[serde(rename = "ErrorNumber", default)]
    pub error_number: Value,

    #[serde(rename = "ErrorMessage", default)]
    pub error_message: Value,
}

impl ResultInfos {
    /// The reported failure, if `Success` is false.
    pub fn failure(&self) -> Option<ApiFailure> {
        if self.success {
            return None;
        }

        Some(ApiFailure {
            error_number: scalar_text(&self.error_number),
            error_message: scalar_text(&self.error_message),
        })
    }

    /// `Ok(())` on success, `ApiReported` otherwise.
    pub fn into_result(self) -> Result<()> {
        match self.failure() {
            None => Ok(()),
            Some(failure) => Err(failure.into()),
        }
    }
}

/// An API-reported failure (`Success=false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub error_number: String,
    pub error_message: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.error_number, self.error_message)
    }
}

impl From<ApiFailure> for Error {
    fn from(failure: ApiFailure) -> Self {
        Error::new(ErrorKind::ApiReported {
            error_number: failure.error_number,
            error_message: failure.error_message,
        })
    }
}

/// `ResultData` of a search call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowsData {
    #[serde(rename = "Rows", default)]
    pub rows: Option<Vec<Value>>,
}

/// `ResultData` of an insert/update call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileIdData {
    #[serde(rename = "FileId", default)]
    pub file_id: Option<FileId>,
}

/// `ResultData` of the authentication call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenData {
    #[serde(rename = "Token", default)]
    pub token: Option<String>,
}

/// Identifier of a created or updated resource.
///
/// The API sends it as either a JSON string or a number; both are kept as
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    /// Create an identifier from text.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> std::result::Result<Self, De::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(FileId(s)),
            Value::Number(n) => Ok(FileId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "FileId must be a string or number, got {other}"
            ))),
        }
    }
}

fn null_as_default<'de, De, T>(deserializer: De) -> std::result::Result<T, De::Error>
where
    De: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render an `ErrorNumber`/`ErrorMessage` value the way it reads in a log line.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rows() {
        let body = r#"{
            "ResultInfos": {"Success": true, "ErrorNumber": 0, "ErrorMessage": null},
            "ResultData": {"Rows": [{"Name": "Acme"}, {"Name": "Globex"}]}
        }"#;
        let env: Envelope<RowsData> = Envelope::decode(body).unwrap();
        assert!(env.is_success());
        assert!(env.failure().is_none());
        assert_eq!(env.result_data.rows.unwrap().len(), 2);
    }

    #[test]
    fn test_decode_failure_with_numeric_code() {
        let body = r#"{
            "ResultInfos": {"Success": false, "ErrorNumber": 401, "ErrorMessage": "Invalid token"},
            "ResultData": null
        }"#;
        let env: Envelope<RowsData> = Envelope::decode(body).unwrap();
        let failure = env.failure().unwrap();
        assert_eq!(failure.error_number, "401");
        assert_eq!(failure.error_message, "Invalid token");
        assert_eq!(failure.to_string(), "401 : Invalid token");
        assert!(env.result_data.rows.is_none());
    }

    #[test]
    fn test_missing_result_data() {
        let body = r#"{"ResultInfos": {"Success": false, "ErrorNumber": "E12"}}"#;
        let env: Envelope<FileIdData> = Envelope::decode(body).unwrap();
        assert!(env.result_data.file_id.is_none());
        let failure = env.failure().unwrap();
        assert_eq!(failure.error_number, "E12");
        assert_eq!(failure.error_message, "");
    }

    #[test]
    fn test_file_id_string_or_number() {
        let env: Envelope<FileIdData> = Envelope::decode(
            r#"{"ResultInfos": {"Success": true}, "ResultData": {"FileId": 1234}}"#,
        )
        .unwrap();
        assert_eq!(env.result_data.file_id, Some(FileId::new("1234")));

        let env: Envelope<FileIdData> = Envelope::decode(
            r#"{"ResultInfos": {"Success": true}, "ResultData": {"FileId": "C-77"}}"#,
        )
        .unwrap();
        assert_eq!(env.result_data.file_id.unwrap().as_str(), "C-77");
    }

    #[test]
    fn test_file_id_rejects_objects() {
        let err = Envelope::<FileIdData>::decode(
            r#"{"ResultInfos": {"Success": true}, "ResultData": {"FileId": {"id": 1}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
    }

    #[test]
    fn test_token() {
        let env: Envelope<TokenData> = Envelope::decode(
            r#"{"ResultInfos": {"Success": true}, "ResultData": {"Token": "t-1"}}"#,
        )
        .unwrap();
        assert_eq!(env.result_data.token.as_deref(), Some("t-1"));
    }

    #[test]
    fn test_not_an_envelope() {
        let err = Envelope::<RowsData>::decode("<html>502</html>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));

        let err = Envelope::<RowsData>::decode(r#"{"Rows": []}"#).unwrap_err();
        assert!(err.to_string().contains("not a valid envelope"));
    }

    #[test]
    fn test_failure_into_error() {
        let err: Error = ApiFailure {
            error_number: "7".into(),
            error_message: "Duplicate".into(),
        }
        .into();
        assert_eq!(err.api_failure(), Some(("7", "Duplicate")));
    }

    #[test]
    fn test_into_result() {
        let env: Envelope<RowsData> =
            Envelope::decode(r#"{"ResultInfos": {"Success": true}}"#).unwrap();
        assert!(env.result_infos.into_result().is_ok());

        let env: Envelope<RowsData> = Envelope::decode(
            r#"{"ResultInfos": {"Success": false, "ErrorNumber": 3, "ErrorMessage": "Locked"}}"#,
        )
        .unwrap();
        let err = env.result_infos.into_result().unwrap_err();
        assert!(err.is_api_reported());
        assert_eq!(err.to_string(), "API error: 3 : Locked");
    }
}
