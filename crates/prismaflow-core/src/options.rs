//! Rendering parameters for a flow diagram.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Graphviz primitive arrow shapes accepted for heads and tails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowShape {
    #[default]
    Normal,
    Inv,
    Dot,
    Invdot,
    Odot,
    Invodot,
    None,
    Tee,
    Empty,
    Invempty,
    Diamond,
    Odiamond,
    Ediamond,
    Crow,
    Box,
    Obox,
    Open,
    Halfopen,
    Vee,
}

impl ArrowShape {
    const ALL: [ArrowShape; 19] = [
        ArrowShape::Normal,
        ArrowShape::Inv,
        ArrowShape::Dot,
        ArrowShape::Invdot,
        ArrowShape::Odot,
        ArrowShape::Invodot,
        ArrowShape::None,
        ArrowShape::Tee,
        ArrowShape::Empty,
        ArrowShape::Invempty,
        ArrowShape::Diamond,
        ArrowShape::Odiamond,
        ArrowShape::Ediamond,
        ArrowShape::Crow,
        ArrowShape::Box,
        ArrowShape::Obox,
        ArrowShape::Open,
        ArrowShape::Halfopen,
        ArrowShape::Vee,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArrowShape::Normal => "normal",
            ArrowShape::Inv => "inv",
            ArrowShape::Dot => "dot",
            ArrowShape::Invdot => "invdot",
            ArrowShape::Odot => "odot",
            ArrowShape::Invodot => "invodot",
            ArrowShape::None => "none",
            ArrowShape::Tee => "tee",
            ArrowShape::Empty => "empty",
            ArrowShape::Invempty => "invempty",
            ArrowShape::Diamond => "diamond",
            ArrowShape::Odiamond => "odiamond",
            ArrowShape::Ediamond => "ediamond",
            ArrowShape::Crow => "crow",
            ArrowShape::Box => "box",
            ArrowShape::Obox => "obox",
            ArrowShape::Open => "open",
            ArrowShape::Halfopen => "halfopen",
            ArrowShape::Vee => "vee",
        }
    }
}

impl fmt::Display for ArrowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrowShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        ArrowShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == lower)
            .ok_or_else(|| Error::InvalidOption {
                name: "arrow shape",
                message: format!("unknown arrow shape {s:?}"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    pub font: String,
    pub font_size: f64,
    /// Fill of the databases/registers header box.
    pub title_colour: String,
    /// Fill of both wings and their headers.
    pub greybox_colour: String,
    /// Border of the core boxes.
    pub main_colour: String,
    pub arrow_colour: String,
    pub arrow_head: ArrowShape,
    pub arrow_tail: ArrowShape,
    /// Hyperlink the boxes when the rendered SVG is decorated.
    pub interactive: bool,
    /// Draw the "previous studies" wing when its counts are present.
    pub previous: bool,
    /// Draw the "other sources" wing when its counts are present.
    pub other: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            font: "Helvetica".to_string(),
            font_size: 7.0,
            title_colour: "Goldenrod1".to_string(),
            greybox_colour: "Gainsboro".to_string(),
            main_colour: "Black".to_string(),
            arrow_colour: "Black".to_string(),
            arrow_head: ArrowShape::Normal,
            arrow_tail: ArrowShape::None,
            interactive: false,
            previous: true,
            other: true,
        }
    }
}

impl DiagramOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::InvalidOption {
                name: "font_size",
                message: format!("expected a positive number, got {}", self.font_size),
            });
        }
        for (name, value) in [
            ("font", &self.font),
            ("title_colour", &self.title_colour),
            ("greybox_colour", &self.greybox_colour),
            ("main_colour", &self.main_colour),
            ("arrow_colour", &self.arrow_colour),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidOption {
                    name,
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text).map_err(|err| Error::Config {
            message: err.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(text).map_err(|err| Error::Config {
            message: err.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a `.json`, `.yaml` or `.yml` file. Unknown extensions are read as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }
}
