//! Reader for the fixed-schema CSV data template.
//!
//! The template is row oriented: column `data` names a [`Field`], `n` holds its count (or the
//! `reason,count; ...` encoding for exclusion fields) and `boxtext` optionally overrides the
//! text shown next to it. Two auxiliary columns run independently of the `data` key:
//! `tooltips` (one per numbered box, in order) and `box`/`url` (the hyperlink table).

use crate::data::{FlowData, Tooltips, Wings};
use crate::error::{Error, Result};
use crate::exclusions::Exclusions;
use crate::field::Field;
use crate::options::DiagramOptions;
use crate::utils::strip_thousands;
use std::collections::HashSet;
use std::path::Path;

/// Logical names the decoration pass understands. Other names are kept but never match.
pub const BOX_NAMES: [&str; 24] = [
    "box1",
    "box2",
    "box3",
    "box4",
    "box5",
    "box6",
    "box7",
    "box8",
    "box9",
    "box10",
    "box11",
    "box12",
    "box13",
    "box14",
    "box15",
    "box16",
    "box17",
    "box18",
    "box19",
    "A",
    "B",
    "identification",
    "screening",
    "included",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Also fail when a required count is absent (see [`FlowData::validate`]).
    pub strict: bool,
    /// Wings the caller intends to render; strict reading only requires their counts.
    pub previous: bool,
    pub other: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ReadOptions {
    /// Strict reading with both wings requested.
    pub fn strict() -> Self {
        Self {
            strict: true,
            previous: true,
            other: true,
        }
    }

    /// Strict reading for the wings `options` requests.
    pub fn strict_for(options: &DiagramOptions) -> Self {
        Self {
            strict: true,
            previous: options.previous,
            other: options.other,
        }
    }

    /// Lenient reading: absent required counts are kept and render as `NA`.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            previous: true,
            other: true,
        }
    }

    fn wings(self, data: &FlowData) -> Wings {
        let requested = DiagramOptions {
            previous: self.previous,
            other: self.other,
            ..DiagramOptions::default()
        };
        Wings::resolve(data, &requested)
    }
}

/// The bundled blank template.
pub fn template_csv() -> &'static str {
    include_str!("../assets/template.csv")
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    data: usize,
    n: usize,
    boxtext: Option<usize>,
    tooltips: Option<usize>,
    box_name: Option<usize>,
    url: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            data: find("data").ok_or(Error::MissingColumn { column: "data" })?,
            n: find("n").ok_or(Error::MissingColumn { column: "n" })?,
            boxtext: find("boxtext"),
            tooltips: find("tooltips"),
            box_name: find("box"),
            url: find("url"),
        })
    }
}

/// Parses a scalar `n` cell. Empty and `NA` are absent; `1,024` style separators are accepted.
pub fn parse_count(field: Field, raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    let digits = strip_thousands(raw);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidCount {
            field,
            value: raw.to_string(),
        });
    }
    digits.parse::<u64>().map(Some).map_err(|_| Error::InvalidCount {
        field,
        value: raw.to_string(),
    })
}

pub fn read_template<R: std::io::Read>(reader: R, options: ReadOptions) -> Result<FlowData> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut data = FlowData::default();
    let mut seen: HashSet<Field> = HashSet::new();
    let mut tooltips: Vec<String> = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let tooltip = cell(columns.tooltips);
        if !tooltip.is_empty() && !tooltip.eq_ignore_ascii_case("na") {
            tooltips.push(tooltip.to_string());
        }

        let box_name = cell(columns.box_name);
        let url = cell(columns.url);
        if !box_name.is_empty() && !url.is_empty() && !url.eq_ignore_ascii_case("na") {
            if !BOX_NAMES.contains(&box_name) {
                tracing::warn!(box_name, "url table names an unknown box");
            }
            if !data.urls.insert_first(box_name, url) {
                tracing::debug!(box_name, "duplicate url table entry ignored");
            }
        }

        let key = cell(Some(columns.data));
        if key.is_empty() {
            continue;
        }
        let Some(field) = Field::from_key(key) else {
            tracing::debug!(key, "skipping unknown template row");
            continue;
        };
        seen.insert(field);

        let boxtext = cell(columns.boxtext);
        if !boxtext.is_empty() {
            data.text.set(field, boxtext);
        }

        let n = cell(Some(columns.n));
        match field {
            Field::DbrExcluded => data.dbr_excluded = Exclusions::parse(field, n)?,
            Field::OtherExcluded => data.other_excluded = Exclusions::parse(field, n)?,
            _ => {
                if let Some(slot) = data.counts.slot_mut(field) {
                    *slot = parse_count(field, n)?;
                }
            }
        }
    }

    if let Some(field) = Field::counts().find(|f| !seen.contains(f)) {
        return Err(Error::MissingField { field });
    }

    data.tooltips = Tooltips::from_list(tooltips)?;

    if options.strict {
        data.validate(options.wings(&data))?;
    }
    Ok(data)
}

pub fn read_template_str(text: &str, options: ReadOptions) -> Result<FlowData> {
    read_template(text.as_bytes(), options)
}

pub fn read_template_path(path: impl AsRef<Path>, options: ReadOptions) -> Result<FlowData> {
    let file = std::fs::File::open(path)?;
    read_template(std::io::BufReader::new(file), options)
}
