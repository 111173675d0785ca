//! Query parameters shared by several route modules.
//!
//! Values arrive as raw strings and are parsed by the `wire` helpers, so a
//! malformed value is a 400 validation error rather than an extractor
//! rejection.

use cloudcms_core::{wire, ValidationError, Timestamp};
use serde::Deserialize;

use crate::constants::{DATE_FROM_PARAM, NEW_STATUS_PARAM};

/// `?dateFrom=` lower bound on the change timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase", default)]
pub struct DateFromParams {
    /// `%Y-%m-%dT%H:%M:%SZ`; absent or empty lists from the beginning.
    pub date_from: Option<String>,
}

impl DateFromParams {
    pub fn lower_bound(&self) -> Result<Option<Timestamp>, ValidationError> {
        wire::parse_lower_bound(DATE_FROM_PARAM, self.date_from.as_deref())
    }
}

/// `?newStatus=` flag of a deletion or curation transition.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase", default)]
pub struct NewStatusParams {
    /// Literal `true` or `false`.
    pub new_status: Option<String>,
}

impl NewStatusParams {
    pub fn flag(&self) -> Result<bool, ValidationError> {
        wire::parse_flag(NEW_STATUS_PARAM, self.new_status.as_deref())
    }
}
