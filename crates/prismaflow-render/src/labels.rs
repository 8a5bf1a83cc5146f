//! Box label composition.
//!
//! Absent optional counts suppress their line; absent required counts render as `NA`. Labels
//! are wrapped here, before they reach the DOT model.

use crate::wrap::{line_count, wrap, wrap_with_unit};
use prismaflow_core::{Exclusions, Field, FlowData};

/// Wrap width for the previous-studies box (box 2).
pub const PREVIOUS_WRAP: usize = 40;
/// Wrap width for every other count box.
pub const BOX_WRAP: usize = 33;
/// Wrap width for a single exclusion reason line.
pub const REASON_WRAP: usize = 35;

pub const NA: &str = "NA";

fn n_text(n: Option<u64>) -> String {
    match n {
        Some(n) => n.to_string(),
        None => NA.to_string(),
    }
}

/// `(n = N)`, kept on one line by the wrap.
fn n_literal(n: Option<u64>) -> String {
    format!("(n = {})", n_text(n))
}

/// `"<text> (n = N)"` wrapped, or `None` when the count is absent.
pub fn optional_line(data: &FlowData, field: Field, width: usize) -> Option<String> {
    let n = data.counts.get(field)?;
    Some(wrap_with_unit(data.text.get(field), &n_literal(Some(n)), width))
}

/// `"<text> (n = N)"` wrapped, with `NA` standing in for an absent count.
pub fn inline_required_line(data: &FlowData, field: Field, width: usize) -> String {
    wrap_with_unit(data.text.get(field), &n_literal(data.counts.get(field)), width)
}

/// Single-count box: wrapped text over `(n = N)` on its own line.
pub fn count_box(data: &FlowData, field: Field) -> String {
    format!(
        "{}\n(n = {})",
        wrap(data.text.get(field), BOX_WRAP),
        n_text(data.counts.get(field))
    )
}

/// Body lines of an exclusion box (without the header).
pub fn exclusion_lines(exclusions: &Exclusions) -> String {
    match exclusions {
        Exclusions::Missing => format!("(n = {NA})"),
        Exclusions::Total(n) => format!("(n = {n})"),
        Exclusions::Reasons(reasons) => reasons
            .iter()
            .map(|r| wrap_with_unit(&format!("• {}", r.reason), &n_literal(r.count), REASON_WRAP))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Header plus reason list; also returns the reason-list line count used for the nudge.
pub fn exclusion_box(data: &FlowData, field: Field) -> (String, usize) {
    let body = match data.exclusions(field) {
        Some(ex) => exclusion_lines(ex),
        None => format!("(n = {NA})"),
    };
    let lines = match data.exclusions(field) {
        Some(Exclusions::Reasons(_)) => line_count(&body),
        _ => 0,
    };
    (
        format!("{}\n{body}", wrap(data.text.get(field), BOX_WRAP)),
        lines,
    )
}

fn header_with_lines(data: &FlowData, header: Field, fields: &[Field], width: usize) -> String {
    let mut out = wrap(data.text.get(header), width);
    for line in fields.iter().filter_map(|f| optional_line(data, *f, width)) {
        out.push('\n');
        out.push_str(&line);
    }
    out
}

/// Box 2: previous studies and reports, each line optional.
pub fn previous_box(data: &FlowData) -> String {
    [Field::PreviousStudies, Field::PreviousReports]
        .into_iter()
        .filter_map(|f| optional_line(data, f, PREVIOUS_WRAP))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Box 4: records identified from databases and registers.
pub fn identified_box(data: &FlowData) -> String {
    header_with_lines(
        data,
        Field::IdentifiedFrom,
        &[Field::DatabaseResults, Field::RegisterResults],
        BOX_WRAP,
    )
}

/// Box 5: records removed before screening. With no removal count at all the box still states
/// an explicit zero.
pub fn removed_box(data: &FlowData) -> String {
    let fields = [
        Field::Duplicates,
        Field::ExcludedAutomatic,
        Field::ExcludedOther,
    ];
    if fields.iter().all(|f| data.counts.get(*f).is_none()) {
        return format!(
            "{}\n(n = 0)",
            wrap(data.text.get(Field::RemovedBeforeScreening), BOX_WRAP)
        );
    }
    header_with_lines(data, Field::RemovedBeforeScreening, &fields, BOX_WRAP)
}

/// Box 14: records identified from other sources.
pub fn other_identified_box(data: &FlowData) -> String {
    header_with_lines(
        data,
        Field::IdentifiedFrom,
        &[
            Field::WebsiteResults,
            Field::OrganisationResults,
            Field::CitationsResults,
        ],
        BOX_WRAP,
    )
}

/// Two required lines stacked (boxes 12 and 19).
pub fn paired_box(data: &FlowData, first: Field, second: Field) -> String {
    format!(
        "{}\n{}",
        inline_required_line(data, first, BOX_WRAP),
        inline_required_line(data, second, BOX_WRAP)
    )
}
