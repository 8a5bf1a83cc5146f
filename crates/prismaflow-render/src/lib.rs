#![forbid(unsafe_code)]

//! PRISMA 2020 flow diagram rendering (headless).
//!
//! Pipeline:
//! - [`build_flow_diagram`]: `FlowData` -> pinned DOT model ([`FlowDiagram`])
//! - [`Graphviz::render_svg`]: DOT -> SVG via an external `dot -Kneato`
//! - [`decorate_svg`]: hyperlinks + rotated phase labels, keyed by [`NodeIdMap`]

pub mod builder;
pub mod decorate;
pub mod dot;
pub mod error;
pub mod graphviz;
pub mod labels;
pub mod layout;
pub mod node_ids;
pub mod wrap;

pub use builder::{FlowDiagram, build_flow_diagram};
pub use decorate::{
    DecorateOptions, Decoration, apply_decorations, decorate_svg, decoration_plan,
    render_widget_html,
};
pub use error::{Error, Result};
pub use graphviz::Graphviz;
pub use layout::{BoxId, Phase};
pub use node_ids::{NodeIdEntry, NodeIdMap};

use prismaflow_core::{DiagramOptions, FlowData};

/// Build, lay out and decorate in one call.
pub fn render_flow_svg(
    data: &FlowData,
    options: &DiagramOptions,
    graphviz: &Graphviz,
) -> Result<String> {
    let diagram = build_flow_diagram(data, options);
    let svg = graphviz.render_svg(&diagram.to_dot())?;
    decorate_svg(
        &svg,
        &diagram,
        data,
        &DecorateOptions::from_diagram_options(options),
    )
}
