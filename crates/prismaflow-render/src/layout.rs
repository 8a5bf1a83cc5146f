//! Fixed box identities and the hard-coded placement table.
//!
//! Coordinates are Graphviz inches with `y` growing upwards; every node is pinned (`pos="x,y!"`)
//! so the layout engine only routes edges.

use prismaflow_core::{Field, Wings};
use std::fmt;

/// Horizontal shift applied to every box when the previous-studies wing is absent.
pub const PREVIOUS_WING_SHIFT: f64 = -4.0;

pub const BOX_WIDTH: f64 = 3.5;
pub const BOX_HEIGHT: f64 = 0.5;
pub const HEADER_WIDTH: f64 = 7.5;
pub const PHASE_WIDTH: f64 = 0.4;

const PREVIOUS_X: f64 = 1.0;
const MAIN_X: f64 = 5.0;
const MAIN_SIDE_X: f64 = 9.0;
const OTHER_X: f64 = 13.0;
const OTHER_SIDE_X: f64 = 17.0;
const PHASE_X: f64 = -1.4;

const HEADER_Y: f64 = 9.25;
const IDENTIFIED_Y: f64 = 7.5;
const SCREENED_Y: f64 = 5.5;
const SOUGHT_Y: f64 = 4.5;
const ASSESSED_Y: f64 = 3.5;
const INCLUDED_Y: f64 = 1.5;
const TOTAL_Y: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Identification,
    Screening,
    Included,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Identification, Phase::Screening, Phase::Included];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Identification => "identification",
            Phase::Screening => "screening",
            Phase::Included => "included",
        }
    }

    pub fn field(self) -> Field {
        match self {
            Phase::Identification => Field::Identification,
            Phase::Screening => Field::Screening,
            Phase::Included => Field::Included,
        }
    }
}

/// Stable identity of a diagram node. Numbering is part of the URL/tooltip contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxId {
    /// Boxes `1..=19`.
    Numbered(u8),
    /// Invisible routing anchor under the previous-studies wing.
    AnchorA,
    /// Invisible routing anchor under the other-sources wing.
    AnchorB,
    Phase(Phase),
}

impl BoxId {
    /// Identifier used in the DOT document.
    pub fn node_id(self) -> String {
        match self {
            BoxId::Numbered(n) => n.to_string(),
            BoxId::AnchorA => "A".to_string(),
            BoxId::AnchorB => "B".to_string(),
            BoxId::Phase(p) => p.name().to_string(),
        }
    }

    /// Name used by the URL table and the decoration pass.
    pub fn logical_name(self) -> String {
        match self {
            BoxId::Numbered(n) => format!("box{n}"),
            other => other.node_id(),
        }
    }

    pub fn from_node_id(id: &str) -> Option<Self> {
        match id {
            "A" => Some(BoxId::AnchorA),
            "B" => Some(BoxId::AnchorB),
            _ => {
                if let Some(phase) = Phase::ALL.into_iter().find(|p| p.name() == id) {
                    return Some(BoxId::Phase(phase));
                }
                let n = id.parse::<u8>().ok()?;
                (1..=19).contains(&n).then_some(BoxId::Numbered(n))
            }
        }
    }

    /// Whether the node belongs to the diagram for this wing combination.
    pub fn is_active(self, wings: Wings) -> bool {
        match self {
            BoxId::Numbered(1 | 2 | 19) | BoxId::AnchorA => wings.previous,
            BoxId::Numbered(13..=18) | BoxId::AnchorB => wings.other,
            BoxId::Numbered(n) => (3..=12).contains(&n),
            BoxId::Phase(_) => true,
        }
    }

    /// All node identities in emission order (which fixes the renderer's generated ids).
    pub fn emission_order() -> Vec<BoxId> {
        let mut out = vec![BoxId::Numbered(1), BoxId::Numbered(2), BoxId::AnchorA];
        out.extend((3..=18).map(BoxId::Numbered));
        out.push(BoxId::AnchorB);
        out.push(BoxId::Numbered(19));
        out.extend(Phase::ALL.into_iter().map(BoxId::Phase));
        out
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.logical_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn boxed(x: f64, y: f64) -> Self {
        Self::new(x, y, BOX_WIDTH, BOX_HEIGHT)
    }
}

/// Row of an exclusion box, nudged down as its reason list grows past three lines.
pub fn excluded_box_y(reason_lines: usize) -> f64 {
    if reason_lines <= 3 {
        ASSESSED_Y
    } else {
        ASSESSED_Y - (reason_lines - 3) as f64 / 9.0
    }
}

/// Geometry inputs that depend on the data rather than on the wing combination.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutInputs {
    pub dbr_reason_lines: usize,
    pub other_reason_lines: usize,
}

/// Absolute placement of `id` for the given wings.
pub fn placement(id: BoxId, wings: Wings, inputs: LayoutInputs) -> Placement {
    let dx = if wings.previous {
        0.0
    } else {
        PREVIOUS_WING_SHIFT
    };
    let p = match id {
        BoxId::Numbered(1) => Placement::boxed(PREVIOUS_X, HEADER_Y),
        BoxId::Numbered(2) => Placement::boxed(PREVIOUS_X, IDENTIFIED_Y),
        BoxId::Numbered(3) => {
            Placement::new((MAIN_X + MAIN_SIDE_X) / 2.0, HEADER_Y, HEADER_WIDTH, BOX_HEIGHT)
        }
        BoxId::Numbered(4) => Placement::boxed(MAIN_X, IDENTIFIED_Y),
        BoxId::Numbered(5) => Placement::boxed(MAIN_SIDE_X, IDENTIFIED_Y),
        BoxId::Numbered(6) => Placement::boxed(MAIN_X, SCREENED_Y),
        BoxId::Numbered(7) => Placement::boxed(MAIN_SIDE_X, SCREENED_Y),
        BoxId::Numbered(8) => Placement::boxed(MAIN_X, SOUGHT_Y),
        BoxId::Numbered(9) => Placement::boxed(MAIN_SIDE_X, SOUGHT_Y),
        BoxId::Numbered(10) => Placement::boxed(MAIN_X, ASSESSED_Y),
        BoxId::Numbered(11) => {
            Placement::boxed(MAIN_SIDE_X, excluded_box_y(inputs.dbr_reason_lines))
        }
        BoxId::Numbered(12) => Placement::boxed(MAIN_X, INCLUDED_Y),
        BoxId::Numbered(13) => Placement::new(
            (OTHER_X + OTHER_SIDE_X) / 2.0,
            HEADER_Y,
            HEADER_WIDTH,
            BOX_HEIGHT,
        ),
        BoxId::Numbered(14) => Placement::boxed(OTHER_X, IDENTIFIED_Y),
        BoxId::Numbered(15) => Placement::boxed(OTHER_X, SOUGHT_Y),
        BoxId::Numbered(16) => Placement::boxed(OTHER_SIDE_X, SOUGHT_Y),
        BoxId::Numbered(17) => Placement::boxed(OTHER_X, ASSESSED_Y),
        BoxId::Numbered(18) => {
            Placement::boxed(OTHER_SIDE_X, excluded_box_y(inputs.other_reason_lines))
        }
        BoxId::Numbered(_) => Placement::boxed(MAIN_X, TOTAL_Y),
        BoxId::AnchorA => Placement::new(PREVIOUS_X, TOTAL_Y, 0.0, 0.0),
        BoxId::AnchorB => Placement::new(OTHER_X, INCLUDED_Y, 0.0, 0.0),
        // Phase labels sit left of the first column and never shift.
        BoxId::Phase(phase) => return phase_placement(phase, wings),
    };
    Placement { x: p.x + dx, ..p }
}

fn phase_placement(phase: Phase, wings: Wings) -> Placement {
    match phase {
        Phase::Identification => Placement::new(PHASE_X, IDENTIFIED_Y, PHASE_WIDTH, 1.5),
        Phase::Screening => Placement::new(
            PHASE_X,
            (SCREENED_Y + ASSESSED_Y) / 2.0,
            PHASE_WIDTH,
            SCREENED_Y - ASSESSED_Y + 0.5,
        ),
        Phase::Included if wings.previous => Placement::new(
            PHASE_X,
            (INCLUDED_Y + TOTAL_Y) / 2.0,
            PHASE_WIDTH,
            INCLUDED_Y - TOTAL_Y + 0.5,
        ),
        Phase::Included => Placement::new(PHASE_X, INCLUDED_Y, PHASE_WIDTH, 0.8),
    }
}
