//! Uniform success/failure wrapper returned by every public operation.
//!
//! Serializes to `{ "ok": bool, "data"?: T, "error"?: { "message", "detail" } }`.
//! The fields are private so that `ok == true` always comes with data and
//! `ok == false` always comes with an error. Deserialization rejects any
//! other combination.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Error half of a failed envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind name, e.g. `"UserRejected"`.
    pub message: String,
    /// Structured detail, always containing a human-readable `reason`.
    pub detail: Value,
}

impl ErrorBody {
    pub fn reason(&self) -> &str {
        self.detail
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        Self {
            message: err.kind().to_string(),
            detail: err.detail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope<T> {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl<T> ResultEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &CoreError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    /// Kind of the carried error, if this is a failure.
    pub fn error_kind(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message.clone())
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            ok: self.ok,
            data: self.data.map(f),
            error: self.error,
        }
    }
}

/// Wire form read before the envelope invariant is checked.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RawEnvelope<T> {
    ok: bool,
    #[serde(default, deserialize_with = "present")]
    data: Option<T>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// A present `data` field is `Some` even when it holds `null`, so unit
/// payloads survive a round trip.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ResultEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::<T>::deserialize(deserializer)?;
        match (raw.ok, raw.data, raw.error) {
            (true, Some(data), None) => Ok(Self::success(data)),
            (false, None, Some(error)) => Ok(Self {
                ok: false,
                data: None,
                error: Some(error),
            }),
            (true, _, _) => Err(D::Error::custom(
                "successful envelope must carry data and no error",
            )),
            (false, _, _) => Err(D::Error::custom(
                "failed envelope must carry an error and no data",
            )),
        }
    }
}

impl<T> From<CoreResult<T>> for ResultEnvelope<T> {
    fn from(result: CoreResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => {
                crate::observability::metrics::record_failure(err.kind());
                tracing::debug!(kind = %err.kind(), error = %err, "Operation failed");
                Self::failure(&err)
            }
        }
    }
}
