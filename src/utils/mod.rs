//! Helper functions used across the application.
//!
//! - [`url_validator`] - Extraction and syntax check of submitted URLs

pub mod url_validator;
