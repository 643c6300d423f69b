//! Small shared helpers.
//!
//! - [`urls`] - Base URL normalization and manifest URL construction

pub mod urls;

pub use urls::{manifest_url, normalize_base_url};
