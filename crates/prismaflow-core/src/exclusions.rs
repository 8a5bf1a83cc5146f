//! Exclusion-reason tables (`dbr_excluded`, `other_excluded`).
//!
//! A review can exclude reports for several distinct reasons, so these fields hold an ordered
//! `(reason, count)` table. Older templates supply a single bare count instead; that shape is
//! detected by checking whether the table's first column is numeric-only.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::utils::strip_thousands;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionReason {
    pub reason: String,
    /// `None` when the template spelled the count as `NA`.
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Exclusions {
    #[default]
    Missing,
    Total(u64),
    Reasons(Vec<ExclusionReason>),
}

fn is_numeric_only(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `reason,1,024`: the shortest reason followed by a count with `,` group separators.
fn grouped_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*,\s*(\d{1,3}(?:,\d{3})+)$").expect("valid regex"))
}

fn is_na(s: &str) -> bool {
    s.eq_ignore_ascii_case("na")
}

impl Exclusions {
    /// Parses the template encoding: `reason,count` pairs joined by `; `.
    ///
    /// `""` and `NA` are [`Exclusions::Missing`]; a bare integer is [`Exclusions::Total`].
    /// Counts may use `,` group separators (`Wrong population,1,024`); the reason then ends at
    /// the first comma that starts a well-formed grouped count.
    pub fn parse(field: Field, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || is_na(raw) {
            return Ok(Self::Missing);
        }
        let bare = strip_thousands(raw);
        if is_numeric_only(&bare) {
            return Ok(Self::Total(parse_u64(field, &bare)?));
        }

        let raw = raw.strip_suffix(';').unwrap_or(raw);
        let mut rows: Vec<(String, Option<String>)> = Vec::new();
        for entry in raw.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(Error::MalformedExclusions {
                    field,
                    message: "empty entry between `;` separators".to_string(),
                });
            }
            if let Some(caps) = grouped_count_regex().captures(entry) {
                rows.push((caps[1].to_string(), Some(caps[2].to_string())));
                continue;
            }
            // Reasons may themselves contain commas; the count is after the last one.
            match entry.rsplit_once(',') {
                Some((reason, count)) => {
                    rows.push((reason.trim().to_string(), Some(count.trim().to_string())))
                }
                None => rows.push((entry.to_string(), None)),
            }
        }
        Self::from_rows(field, rows)
    }

    /// Builds a table from `(reason, count)` rows, collapsing the single-count shape.
    pub fn from_rows<R, C>(field: Field, rows: impl IntoIterator<Item = (R, Option<C>)>) -> Result<Self>
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let rows: Vec<(String, Option<String>)> = rows
            .into_iter()
            .map(|(r, c)| {
                (
                    r.as_ref().trim().to_string(),
                    c.map(|c| c.as_ref().trim().to_string()),
                )
            })
            .collect();

        if rows.is_empty() {
            return Ok(Self::Missing);
        }

        if let [(first, count)] = rows.as_slice() {
            if is_numeric_only(first) {
                let total = parse_u64(field, first)?;
                // `35` and `35,35` both name a bare total; `35,12` is ambiguous.
                if let Some(count) = count.as_deref() {
                    if !(count.is_empty() || count == first.as_str()) {
                        return Err(Error::MalformedExclusions {
                            field,
                            message: format!("numeric reason {first:?} with count {count:?}"),
                        });
                    }
                }
                return Ok(Self::Total(total));
            }
        }

        let mut reasons = Vec::with_capacity(rows.len());
        for (reason, count) in rows {
            if reason.is_empty() {
                return Err(Error::MalformedExclusions {
                    field,
                    message: "exclusion reason without a label".to_string(),
                });
            }
            let Some(count) = count else {
                return Err(Error::MalformedExclusions {
                    field,
                    message: format!("reason {reason:?} has no count"),
                });
            };
            let digits = strip_thousands(&count);
            let count = if is_na(&count) {
                None
            } else if is_numeric_only(&digits) {
                Some(parse_u64(field, &digits)?)
            } else {
                return Err(Error::MalformedExclusions {
                    field,
                    message: format!("reason {reason:?} has non-numeric count {count:?}"),
                });
            };
            reasons.push(ExclusionReason { reason, count });
        }
        Ok(Self::Reasons(reasons))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

fn parse_u64(field: Field, s: &str) -> Result<u64> {
    s.parse::<u64>().map_err(|_| Error::MalformedExclusions {
        field,
        message: format!("count {s:?} is out of range"),
    })
}
