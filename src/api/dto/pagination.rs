//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// `?limit=&offset=` query parameters.
///
/// Values are passed through unclamped; the account service applies the
/// default page size, the upper bound and the non-negative offset.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListParams {
    /// Returns `(limit, offset)`, with `0` standing in for absent values.
    pub fn limit_offset(&self) -> (i64, i64) {
        (self.limit.unwrap_or(0), self.offset.unwrap_or(0))
    }
}
