//! Report renderers for a normalized [`AnalysisResult`](crate::models::AnalysisResult).
//!
//! - [`terminal`] — colored summary, score gauge, category/entity tables and risk cards;
//!   respects `--verbose` / `--quiet`.
//! - [`json`] — the canonical model as pretty-printed JSON.
//!
//! Renderers only ever see the canonical model, never the raw service payload.

pub mod json;
pub mod terminal;
