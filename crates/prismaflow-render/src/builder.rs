//! `FlowData` + `DiagramOptions` -> pinned Graphviz graph.
//!
//! The topology is fixed; only labels, colours, wing membership and the exclusion-box nudge
//! depend on the input. Building is infallible: absent required counts render as `NA`.

use crate::dot::{Attrs, Cluster, Edge, Graph, Label, Node, RankGroup, Value};
use crate::labels;
use crate::layout::{BoxId, LayoutInputs, Phase, placement};
use crate::node_ids::NodeIdMap;
use prismaflow_core::{ArrowShape, DiagramOptions, Field, FlowData, Wings};

const PHASE_FILL: &str = "LightSteelBlue2";
const CORE_FILL: &str = "White";

/// Same-row groups; members are filtered to the active nodes before emission.
const RANK_GROUPS: [&[&str]; 7] = [
    &["1", "3", "13"],
    &["2", "4", "5", "14"],
    &["6", "7"],
    &["8", "9", "15", "16"],
    &["10", "11", "17", "18"],
    &["12", "B"],
    &["19", "A"],
];

/// A built diagram: the DOT model plus the identity contract for later decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDiagram {
    pub graph: Graph,
    pub wings: Wings,
    pub node_ids: NodeIdMap,
}

impl FlowDiagram {
    pub fn to_dot(&self) -> String {
        self.graph.to_dot()
    }
}

#[derive(Debug, Clone, Copy)]
enum BoxStyle {
    /// Grey rounded wing header (boxes 1 and 13).
    GreyHeader,
    /// Coloured rounded header over the databases column (box 3).
    TitleHeader,
    /// Grey wing box.
    Grey,
    /// White core box with a `main_colour` border.
    Core,
    Phase,
}

struct Builder<'a> {
    data: &'a FlowData,
    options: &'a DiagramOptions,
    wings: Wings,
    inputs: LayoutInputs,
}

impl Builder<'_> {
    fn label_for(&self, n: u8) -> (Label, LayoutInputs) {
        let d = self.data;
        let mut inputs = LayoutInputs::default();
        let label = match n {
            1 => Label::center(d.text.get(Field::PrevStud)),
            2 => Label::left(labels::previous_box(d)),
            3 => Label::center(d.text.get(Field::NewStud)),
            4 => Label::left(labels::identified_box(d)),
            5 => Label::left(labels::removed_box(d)),
            6 => Label::center(labels::count_box(d, Field::RecordsScreened)),
            7 => Label::center(labels::count_box(d, Field::RecordsExcluded)),
            8 => Label::center(labels::count_box(d, Field::DbrSoughtReports)),
            9 => Label::center(labels::count_box(d, Field::DbrNotretrievedReports)),
            10 => Label::center(labels::count_box(d, Field::DbrAssessed)),
            11 => {
                let (text, lines) = labels::exclusion_box(d, Field::DbrExcluded);
                inputs.dbr_reason_lines = lines;
                Label::left(text)
            }
            12 => Label::center(labels::paired_box(d, Field::NewStudies, Field::NewReports)),
            13 => Label::center(d.text.get(Field::OthStud)),
            14 => Label::left(labels::other_identified_box(d)),
            15 => Label::center(labels::count_box(d, Field::OtherSoughtReports)),
            16 => Label::center(labels::count_box(d, Field::OtherNotretrievedReports)),
            17 => Label::center(labels::count_box(d, Field::OtherAssessed)),
            18 => {
                let (text, lines) = labels::exclusion_box(d, Field::OtherExcluded);
                inputs.other_reason_lines = lines;
                Label::left(text)
            }
            _ => Label::center(labels::paired_box(
                d,
                Field::TotalStudies,
                Field::TotalReports,
            )),
        };
        (label, inputs)
    }

    fn style_for(n: u8) -> BoxStyle {
        match n {
            1 | 13 => BoxStyle::GreyHeader,
            3 => BoxStyle::TitleHeader,
            2 | 14..=19 => BoxStyle::Grey,
            _ => BoxStyle::Core,
        }
    }

    fn styled(&self, attrs: Attrs, style: BoxStyle) -> Attrs {
        let o = self.options;
        let (keyword, fill, border): (&str, &str, &str) = match style {
            BoxStyle::GreyHeader => ("rounded,filled", o.greybox_colour.as_str(), o.greybox_colour.as_str()),
            BoxStyle::TitleHeader => ("rounded,filled", o.title_colour.as_str(), o.title_colour.as_str()),
            BoxStyle::Grey => ("filled", o.greybox_colour.as_str(), o.greybox_colour.as_str()),
            BoxStyle::Core => ("filled", CORE_FILL, o.main_colour.as_str()),
            BoxStyle::Phase => ("rounded,filled", PHASE_FILL, PHASE_FILL),
        };
        attrs
            .with("style", keyword)
            .with("fillcolor", fill)
            .with("color", border)
    }

    fn geometry(&self, attrs: Attrs, id: BoxId) -> Attrs {
        let p = placement(id, self.wings, self.inputs);
        attrs
            .with("width", p.width)
            .with("height", p.height)
            .with("pos", format!("{},{}!", crate::dot::fmt_number(p.x), crate::dot::fmt_number(p.y)))
    }

    fn numbered(&self, n: u8) -> Node {
        let id = BoxId::Numbered(n);
        let (label, _) = self.label_for(n);
        let attrs = self.styled(Attrs::new().with("label", label), Self::style_for(n));
        let attrs = self
            .geometry(attrs, id)
            .with("tooltip", self.data.tooltips.get(n));
        Node::new(id.node_id(), attrs)
    }

    fn anchor(&self, id: BoxId) -> Node {
        let attrs = Attrs::new()
            .with("label", "")
            .keyword("shape", "point")
            .keyword("style", "invis");
        let attrs = self.geometry(attrs, id).with("tooltip", "");
        Node::new(id.node_id(), attrs)
    }

    fn phase(&self, phase: Phase) -> Node {
        let id = BoxId::Phase(phase);
        let text = self.data.text.get(phase.field());
        let attrs = self.styled(Attrs::new().with("label", ""), BoxStyle::Phase);
        let attrs = self.geometry(attrs, id).with("tooltip", text);
        Node::new(id.node_id(), attrs)
    }
}

fn invisible(from: &str, to: &str) -> Edge {
    Edge::new(from, to).with_attrs(Attrs::new().keyword("style", "invis"))
}

fn headless(from: &str, to: &str) -> Edge {
    Edge::new(from, to).with_attrs(Attrs::new().keyword("arrowhead", "none"))
}

fn edge_defaults(options: &DiagramOptions) -> Attrs {
    let mut attrs = Attrs::new()
        .with("color", options.arrow_colour.as_str())
        .keyword("arrowhead", options.arrow_head.as_str())
        .keyword("arrowtail", options.arrow_tail.as_str());
    if options.arrow_tail != ArrowShape::None {
        attrs.set("dir", Value::Keyword("both"));
    }
    attrs
}

/// Builds the pinned flow diagram for `data`.
///
/// A wing appears only when `options` enables it and at least one of its counts is present.
pub fn build_flow_diagram(data: &FlowData, options: &DiagramOptions) -> FlowDiagram {
    let wings = Wings::resolve(data, options);
    let mut b = Builder {
        data,
        options,
        wings,
        inputs: LayoutInputs::default(),
    };
    b.inputs = LayoutInputs {
        dbr_reason_lines: b.label_for(11).1.dbr_reason_lines,
        other_reason_lines: b.label_for(18).1.other_reason_lines,
    };

    let mut graph = Graph::new("prisma2020");
    graph.attrs = Attrs::new()
        .keyword("layout", "neato")
        .keyword("splines", "ortho")
        .keyword("overlap", "true")
        .with("fontname", options.font.as_str())
        .with("fontsize", options.font_size);
    graph.node_defaults = Attrs::new()
        .keyword("shape", "box")
        .with("fontname", options.font.as_str())
        .with("fontsize", options.font_size);
    graph.edge_defaults = edge_defaults(options);

    if wings.previous {
        let mut c = Cluster::new("previous");
        c.attrs.set("peripheries", 0.0);
        c.nodes.extend([b.numbered(1), b.numbered(2), b.anchor(BoxId::AnchorA)]);
        c.edges.push(invisible("1", "2"));
        c.edges.push(headless("2", "A"));
        graph.clusters.push(c);
    }

    let mut main = Cluster::new("main");
    main.attrs.set("peripheries", 0.0);
    main.nodes.extend((3..=12).map(|n| b.numbered(n)));
    main.edges.push(invisible("3", "4"));
    for (from, to) in [
        ("4", "5"),
        ("4", "6"),
        ("6", "7"),
        ("6", "8"),
        ("8", "9"),
        ("8", "10"),
        ("10", "11"),
        ("10", "12"),
    ] {
        main.edges.push(Edge::new(from, to));
    }
    graph.clusters.push(main);

    if wings.other {
        let mut c = Cluster::new("other");
        c.attrs.set("peripheries", 0.0);
        c.nodes.extend((13..=18).map(|n| b.numbered(n)));
        c.nodes.push(b.anchor(BoxId::AnchorB));
        c.edges.push(invisible("13", "14"));
        for (from, to) in [("14", "15"), ("15", "16"), ("15", "17"), ("17", "18")] {
            c.edges.push(Edge::new(from, to));
        }
        c.edges.push(headless("17", "B"));
        graph.clusters.push(c);
    }

    // Cross-cluster edges are emitted after every node so no node is implicitly declared early.
    if wings.previous {
        graph.nodes.push(b.numbered(19));
    }
    graph
        .nodes
        .extend(Phase::ALL.into_iter().map(|p| b.phase(p)));

    if wings.previous {
        graph.edges.push(Edge::new("A", "19"));
        graph.edges.push(Edge::new("12", "19"));
    }
    if wings.other {
        graph.edges.push(Edge::new("B", "12"));
    }

    graph.ranks = RANK_GROUPS
        .iter()
        .map(|group| RankGroup {
            members: group
                .iter()
                .filter(|id| BoxId::from_node_id(id).is_some_and(|b| b.is_active(wings)))
                .map(|id| id.to_string())
                .collect(),
        })
        .filter(|g| g.members.len() >= 2)
        .collect();

    let node_ids = NodeIdMap::from_graph(&graph);
    debug_assert!(graph.undeclared_references().is_empty());
    tracing::debug!(
        previous = wings.previous,
        other = wings.other,
        nodes = node_ids.len(),
        "built flow diagram"
    );

    FlowDiagram {
        graph,
        wings,
        node_ids,
    }
}
