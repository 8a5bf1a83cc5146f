//! Row keys of the PRISMA 2020 data template.
//!
//! The vocabulary is closed: the CSV template, the text overrides and the validation rules all
//! key off [`Field`]. Keys are part of the template contract and must not be renamed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PreviousStudies,
    PreviousReports,
    DatabaseResults,
    RegisterResults,
    WebsiteResults,
    OrganisationResults,
    CitationsResults,
    Duplicates,
    ExcludedAutomatic,
    ExcludedOther,
    RecordsScreened,
    RecordsExcluded,
    DbrSoughtReports,
    DbrNotretrievedReports,
    OtherSoughtReports,
    OtherNotretrievedReports,
    DbrAssessed,
    DbrExcluded,
    OtherAssessed,
    OtherExcluded,
    NewStudies,
    NewReports,
    TotalStudies,
    TotalReports,
    #[serde(rename = "prevstud")]
    PrevStud,
    #[serde(rename = "newstud")]
    NewStud,
    #[serde(rename = "othstud")]
    OthStud,
    IdentifiedFrom,
    RemovedBeforeScreening,
    Identification,
    Screening,
    Included,
}

impl Field {
    /// Every field, in template order.
    pub const ALL: [Field; 32] = [
        Field::PrevStud,
        Field::PreviousStudies,
        Field::PreviousReports,
        Field::NewStud,
        Field::IdentifiedFrom,
        Field::DatabaseResults,
        Field::RegisterResults,
        Field::RemovedBeforeScreening,
        Field::Duplicates,
        Field::ExcludedAutomatic,
        Field::ExcludedOther,
        Field::RecordsScreened,
        Field::RecordsExcluded,
        Field::DbrSoughtReports,
        Field::DbrNotretrievedReports,
        Field::DbrAssessed,
        Field::DbrExcluded,
        Field::NewStudies,
        Field::NewReports,
        Field::OthStud,
        Field::WebsiteResults,
        Field::OrganisationResults,
        Field::CitationsResults,
        Field::OtherSoughtReports,
        Field::OtherNotretrievedReports,
        Field::OtherAssessed,
        Field::OtherExcluded,
        Field::TotalStudies,
        Field::TotalReports,
        Field::Identification,
        Field::Screening,
        Field::Included,
    ];

    /// The CSV `data` column value identifying this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::PreviousStudies => "previous_studies",
            Field::PreviousReports => "previous_reports",
            Field::DatabaseResults => "database_results",
            Field::RegisterResults => "register_results",
            Field::WebsiteResults => "website_results",
            Field::OrganisationResults => "organisation_results",
            Field::CitationsResults => "citations_results",
            Field::Duplicates => "duplicates",
            Field::ExcludedAutomatic => "excluded_automatic",
            Field::ExcludedOther => "excluded_other",
            Field::RecordsScreened => "records_screened",
            Field::RecordsExcluded => "records_excluded",
            Field::DbrSoughtReports => "dbr_sought_reports",
            Field::DbrNotretrievedReports => "dbr_notretrieved_reports",
            Field::OtherSoughtReports => "other_sought_reports",
            Field::OtherNotretrievedReports => "other_notretrieved_reports",
            Field::DbrAssessed => "dbr_assessed",
            Field::DbrExcluded => "dbr_excluded",
            Field::OtherAssessed => "other_assessed",
            Field::OtherExcluded => "other_excluded",
            Field::NewStudies => "new_studies",
            Field::NewReports => "new_reports",
            Field::TotalStudies => "total_studies",
            Field::TotalReports => "total_reports",
            Field::PrevStud => "prevstud",
            Field::NewStud => "newstud",
            Field::OthStud => "othstud",
            Field::IdentifiedFrom => "identified_from",
            Field::RemovedBeforeScreening => "removed_before_screening",
            Field::Identification => "identification",
            Field::Screening => "screening",
            Field::Included => "included",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim();
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Box text used when the template leaves `boxtext` empty.
    pub fn default_text(self) -> &'static str {
        match self {
            Field::PreviousStudies => "Studies included in previous version of review",
            Field::PreviousReports => "Reports of studies included in previous version of review",
            Field::DatabaseResults => "Databases",
            Field::RegisterResults => "Registers",
            Field::WebsiteResults => "Websites",
            Field::OrganisationResults => "Organisations",
            Field::CitationsResults => "Citation searching",
            Field::Duplicates => "Duplicate records removed",
            Field::ExcludedAutomatic => "Records marked as ineligible by automation tools",
            Field::ExcludedOther => "Records removed for other reasons",
            Field::RecordsScreened => "Records screened",
            Field::RecordsExcluded => "Records excluded",
            Field::DbrSoughtReports | Field::OtherSoughtReports => "Reports sought for retrieval",
            Field::DbrNotretrievedReports | Field::OtherNotretrievedReports => {
                "Reports not retrieved"
            }
            Field::DbrAssessed | Field::OtherAssessed => "Reports assessed for eligibility",
            Field::DbrExcluded | Field::OtherExcluded => "Reports excluded:",
            Field::NewStudies => "New studies included in review",
            Field::NewReports => "Reports of new included studies",
            Field::TotalStudies => "Total studies included in review",
            Field::TotalReports => "Reports of total included studies",
            Field::PrevStud => "Previous studies",
            Field::NewStud => "Identification of new studies via databases and registers",
            Field::OthStud => "Identification of new studies via other methods",
            Field::IdentifiedFrom => "Records identified from:",
            Field::RemovedBeforeScreening => "Records removed before screening:",
            Field::Identification => "Identification",
            Field::Screening => "Screening",
            Field::Included => "Included",
        }
    }

    /// Whether the template `n` column is meaningful for this field.
    pub fn is_count(self) -> bool {
        !matches!(
            self,
            Field::PrevStud
                | Field::NewStud
                | Field::OthStud
                | Field::IdentifiedFrom
                | Field::RemovedBeforeScreening
                | Field::Identification
                | Field::Screening
                | Field::Included
        )
    }

    /// Exclusion-reason fields carry a `reason,count; ...` table instead of a scalar.
    pub fn is_exclusions(self) -> bool {
        matches!(self, Field::DbrExcluded | Field::OtherExcluded)
    }

    pub fn counts() -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(|f| f.is_count())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
