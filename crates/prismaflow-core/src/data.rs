//! The structured input of a flow diagram.

use crate::error::{Error, Result};
use crate::exclusions::Exclusions;
use crate::field::Field;
use crate::options::DiagramOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Number of index-addressed tooltips, one per numbered box.
pub const TOOLTIP_COUNT: usize = 19;

/// Scalar counts. `None` suppresses the corresponding text line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowCounts {
    pub previous_studies: Option<u64>,
    pub previous_reports: Option<u64>,
    pub database_results: Option<u64>,
    pub register_results: Option<u64>,
    pub website_results: Option<u64>,
    pub organisation_results: Option<u64>,
    pub citations_results: Option<u64>,
    pub duplicates: Option<u64>,
    pub excluded_automatic: Option<u64>,
    pub excluded_other: Option<u64>,
    pub records_screened: Option<u64>,
    pub records_excluded: Option<u64>,
    pub dbr_sought_reports: Option<u64>,
    pub dbr_notretrieved_reports: Option<u64>,
    pub other_sought_reports: Option<u64>,
    pub other_notretrieved_reports: Option<u64>,
    pub dbr_assessed: Option<u64>,
    pub other_assessed: Option<u64>,
    pub new_studies: Option<u64>,
    pub new_reports: Option<u64>,
    pub total_studies: Option<u64>,
    pub total_reports: Option<u64>,
}

macro_rules! count_slots {
    ($($variant:ident => $name:ident),* $(,)?) => {
        impl FlowCounts {
            /// Scalar count for `field`; `None` when absent or when `field` is not a scalar count.
            pub fn get(&self, field: Field) -> Option<u64> {
                match field {
                    $(Field::$variant => self.$name,)*
                    _ => None,
                }
            }

            /// Mutable slot for a scalar count field; `None` for exclusion tables and text-only
            /// fields.
            pub fn slot_mut(&mut self, field: Field) -> Option<&mut Option<u64>> {
                match field {
                    $(Field::$variant => Some(&mut self.$name),)*
                    _ => None,
                }
            }
        }
    };
}

count_slots! {
    PreviousStudies => previous_studies,
    PreviousReports => previous_reports,
    DatabaseResults => database_results,
    RegisterResults => register_results,
    WebsiteResults => website_results,
    OrganisationResults => organisation_results,
    CitationsResults => citations_results,
    Duplicates => duplicates,
    ExcludedAutomatic => excluded_automatic,
    ExcludedOther => excluded_other,
    RecordsScreened => records_screened,
    RecordsExcluded => records_excluded,
    DbrSoughtReports => dbr_sought_reports,
    DbrNotretrievedReports => dbr_notretrieved_reports,
    OtherSoughtReports => other_sought_reports,
    OtherNotretrievedReports => other_notretrieved_reports,
    DbrAssessed => dbr_assessed,
    OtherAssessed => other_assessed,
    NewStudies => new_studies,
    NewReports => new_reports,
    TotalStudies => total_studies,
    TotalReports => total_reports,
}

/// Box text overrides keyed by field. Lookups fall back to [`Field::default_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxText(IndexMap<Field, String>);

impl BoxText {
    pub fn get(&self, field: Field) -> &str {
        self.0
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_text())
    }

    pub fn set(&mut self, field: Field, text: impl Into<String>) {
        self.0.insert(field, text.into());
    }
}

/// Tooltip strings addressed by box number (`1..=19`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tooltips(Vec<String>);

impl Default for Tooltips {
    fn default() -> Self {
        Self(
            DEFAULT_TOOLTIPS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        )
    }
}

const DEFAULT_TOOLTIPS: [&str; TOOLTIP_COUNT] = [
    "Previous studies",
    "Studies included in previous version of review",
    "Identification of new studies via databases and registers",
    "Records identified from databases and registers",
    "Records removed before screening",
    "Records screened",
    "Records excluded",
    "Reports sought for retrieval",
    "Reports not retrieved",
    "Reports assessed for eligibility",
    "Reports excluded",
    "New studies included in review",
    "Identification of new studies via other methods",
    "Records identified from other methods",
    "Reports sought for retrieval (other methods)",
    "Reports not retrieved (other methods)",
    "Reports assessed for eligibility (other methods)",
    "Reports excluded (other methods)",
    "Total studies included in review",
];

impl Tooltips {
    /// Fills slots in order; entries beyond the supplied list keep their defaults.
    pub fn from_list<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.len() > TOOLTIP_COUNT {
            return Err(Error::TooManyTooltips {
                count: items.len(),
                max: TOOLTIP_COUNT,
            });
        }
        let mut out = Self::default();
        for (slot, item) in out.0.iter_mut().zip(items) {
            *slot = item;
        }
        Ok(out)
    }

    /// Tooltip for box `number` (1-based). Out-of-range numbers yield an empty string.
    pub fn get(&self, number: u8) -> &str {
        usize::from(number)
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Logical box name → hyperlink target. First entry for a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTable(IndexMap<String, String>);

impl UrlTable {
    /// Returns `false` when the name was already present (the existing URL is kept).
    pub fn insert_first(&mut self, name: impl Into<String>, url: impl Into<String>) -> bool {
        let name = name.into();
        if self.0.contains_key(&name) {
            return false;
        }
        self.0.insert(name, url.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a flow diagram shows, collected into one explicit record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowData {
    pub counts: FlowCounts,
    pub dbr_excluded: Exclusions,
    pub other_excluded: Exclusions,
    pub text: BoxText,
    pub tooltips: Tooltips,
    pub urls: UrlTable,
}

/// Which optional wings of the diagram are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wings {
    pub previous: bool,
    pub other: bool,
}

impl Wings {
    pub const BOTH: Wings = Wings {
        previous: true,
        other: true,
    };
    pub const NEITHER: Wings = Wings {
        previous: false,
        other: false,
    };

    /// A wing is shown iff the caller asked for it and at least one of its counts is present.
    pub fn resolve(data: &FlowData, options: &DiagramOptions) -> Self {
        let c = &data.counts;
        let previous_data = c.previous_studies.is_some() || c.previous_reports.is_some();
        let other_data = c.website_results.is_some()
            || c.organisation_results.is_some()
            || c.citations_results.is_some();
        let wings = Self {
            previous: options.previous && previous_data,
            other: options.other && other_data,
        };
        if options.previous && !previous_data {
            tracing::debug!("previous-studies wing dropped: no previous counts");
        }
        if options.other && !other_data {
            tracing::debug!("other-sources wing dropped: no other-source counts");
        }
        wings
    }
}

impl FlowData {
    pub fn exclusions(&self, field: Field) -> Option<&Exclusions> {
        match field {
            Field::DbrExcluded => Some(&self.dbr_excluded),
            Field::OtherExcluded => Some(&self.other_excluded),
            _ => None,
        }
    }

    /// Whether a count field holds a value (exclusion tables count when not missing).
    pub fn has(&self, field: Field) -> bool {
        match self.exclusions(field) {
            Some(ex) => !ex.is_missing(),
            None => self.counts.get(field).is_some(),
        }
    }

    /// Count fields that must be present for the given wing combination.
    pub fn required_fields(wings: Wings) -> Vec<Field> {
        let mut out = vec![
            Field::RecordsScreened,
            Field::RecordsExcluded,
            Field::DbrSoughtReports,
            Field::DbrNotretrievedReports,
            Field::DbrAssessed,
            Field::DbrExcluded,
            Field::NewStudies,
            Field::NewReports,
        ];
        if wings.previous {
            out.extend([Field::TotalStudies, Field::TotalReports]);
        }
        if wings.other {
            out.extend([
                Field::OtherSoughtReports,
                Field::OtherNotretrievedReports,
                Field::OtherAssessed,
                Field::OtherExcluded,
            ]);
        }
        out
    }

    /// Reports the first required count that is absent.
    ///
    /// Rendering never calls this: absent required counts render as `NA`. Callers that want a
    /// hard failure opt in here.
    pub fn validate(&self, wings: Wings) -> Result<()> {
        match Self::required_fields(wings)
            .into_iter()
            .find(|f| !self.has(*f))
        {
            Some(field) => Err(Error::RequiredCountMissing { field }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_text_falls_back_to_defaults() {
        let mut text = BoxText::default();
        assert_eq!(text.get(Field::RecordsScreened), "Records screened");
        text.set(Field::RecordsScreened, "Titles and abstracts screened");
        assert_eq!(
            text.get(Field::RecordsScreened),
            "Titles and abstracts screened"
        );
        assert_eq!(text.get(Field::RecordsExcluded), "Records excluded");
    }

    #[test]
    fn tooltips_are_one_based() {
        let tips = Tooltips::from_list(["first", "second"]).unwrap();
        assert_eq!(tips.get(1), "first");
        assert_eq!(tips.get(2), "second");
        assert_eq!(tips.get(19), "Total studies included in review");
        assert_eq!(tips.get(0), "");
        assert_eq!(tips.get(20), "");
        assert!(Tooltips::from_list(vec!["x"; 20]).is_err());
    }

    #[test]
    fn url_table_keeps_first_entry_and_hides_blank_urls() {
        let mut urls = UrlTable::default();
        assert!(urls.insert_first("box6", "https://example.org/a"));
        assert!(!urls.insert_first("box6", "https://example.org/b"));
        urls.insert_first("box7", "  ");
        assert_eq!(urls.get("box6"), Some("https://example.org/a"));
        assert_eq!(urls.get("box7"), None);
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn counts_slot_table_covers_every_scalar_field() {
        let mut counts = FlowCounts::default();
        for field in Field::counts().filter(|f| !f.is_exclusions()) {
            *counts.slot_mut(field).unwrap() = Some(7);
            assert_eq!(counts.get(field), Some(7), "{field}");
        }
        assert!(counts.slot_mut(Field::DbrExcluded).is_none());
        assert!(counts.slot_mut(Field::PrevStud).is_none());
    }
}
