//! Response normalization: turns whatever JSON the analysis service returned
//! into one canonical [`AnalysisResult`](crate::models::AnalysisResult).
//!
//! - [`payload`] — [`RawPayload`](payload::RawPayload), the unvalidated response object.
//! - [`classifier`] — score → risk level and color tag.
//! - [`entities`] — trim, drop blanks, and deduplicate entity lists.
//! - [`risk_items`] — bare labels and structured risk objects merged into one item type.
//! - [`builder`] — the only place that knows which field names the service has used;
//!   everything downstream reads the canonical model.

pub mod builder;
pub mod classifier;
pub mod entities;
pub mod payload;
pub mod risk_items;
