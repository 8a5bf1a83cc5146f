#![forbid(unsafe_code)]

//! PRISMA 2020 flow diagram data model + CSV template reader (headless).
//!
//! Design goals:
//! - one explicit, immutable input record ([`FlowData`]) instead of loosely attached values
//! - absent optional counts are data, not errors; required-count checks are opt-in
//! - malformed template content is reported with the offending field named

pub mod data;
pub mod error;
pub mod exclusions;
pub mod field;
pub mod options;
pub mod template;
pub mod utils;

pub use data::{BoxText, FlowCounts, FlowData, TOOLTIP_COUNT, Tooltips, UrlTable, Wings};
pub use error::{Error, Result};
pub use exclusions::{ExclusionReason, Exclusions};
pub use field::Field;
pub use options::{ArrowShape, DiagramOptions};
pub use template::{
    BOX_NAMES, ReadOptions, read_template, read_template_path, read_template_str, template_csv,
};

#[cfg(test)]
mod tests;
