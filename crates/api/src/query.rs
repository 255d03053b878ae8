//! Shared query parameter types for API handlers.

use ims_core::listing::ListOrder;
use serde::Deserialize;

/// Ordering for list endpoints (`?order=newest|oldest`, also accepted as
/// `?ordering=`).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, alias = "ordering")]
    pub order: ListOrder,
}
