use prismaflow_core::{
    ArrowShape, DiagramOptions, ExclusionReason, Exclusions, FlowData, ReadOptions, Wings,
    read_template_path,
};
use prismaflow_render::dot::Value;
use prismaflow_render::{FlowDiagram, build_flow_diagram};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

fn full_data() -> FlowData {
    read_template_path(fixture("prisma_full.csv"), ReadOptions::strict()).expect("fixture reads")
}

fn core_data() -> FlowData {
    read_template_path(fixture("prisma_core.csv"), ReadOptions::strict()).expect("fixture reads")
}

fn wings(previous: bool, other: bool) -> DiagramOptions {
    DiagramOptions {
        previous,
        other,
        ..DiagramOptions::default()
    }
}

fn str_attr<'a>(diagram: &'a FlowDiagram, node: &str, key: &str) -> &'a str {
    match diagram.graph.node(node).and_then(|n| n.attrs.get(key)) {
        Some(Value::Str(s)) => s.as_str(),
        other => panic!("node {node} attribute {key}: {other:?}"),
    }
}

fn label<'a>(diagram: &'a FlowDiagram, node: &str) -> &'a str {
    diagram
        .graph
        .node(node)
        .and_then(|n| n.label_text())
        .unwrap_or_else(|| panic!("node {node} has no label"))
}

#[test]
fn node_sets_follow_the_active_wings() {
    let data = full_data();
    let cases = [
        ((true, true), 24, Wings::BOTH),
        ((true, false), 17, Wings { previous: true, other: false }),
        ((false, true), 20, Wings { previous: false, other: true }),
        ((false, false), 13, Wings::NEITHER),
    ];
    for ((previous, other), count, expected) in cases {
        let diagram = build_flow_diagram(&data, &wings(previous, other));
        assert_eq!(diagram.wings, expected);
        assert_eq!(diagram.graph.node_order().len(), count);
        assert_eq!(diagram.node_ids.len(), count);
        assert!(diagram.graph.undeclared_references().is_empty());
        assert_eq!(diagram.graph.node("19").is_some(), previous);
        assert_eq!(diagram.graph.node("A").is_some(), previous);
        assert_eq!(diagram.graph.node("B").is_some(), other);
        assert_eq!(diagram.graph.node("14").is_some(), other);
        for phase in ["identification", "screening", "included"] {
            assert!(diagram.graph.node(phase).is_some());
        }
    }
}

#[test]
fn wings_without_data_are_dropped_even_when_requested() {
    let diagram = build_flow_diagram(&core_data(), &DiagramOptions::default());
    assert_eq!(diagram.wings, Wings::NEITHER);
    assert_eq!(diagram.node_ids.len(), 13);
}

#[test]
fn node_ids_follow_emission_order() {
    let diagram = build_flow_diagram(&full_data(), &DiagramOptions::default());
    assert_eq!(diagram.node_ids.svg_id("box1"), Some("node1"));
    assert_eq!(diagram.node_ids.svg_id("A"), Some("node3"));
    assert_eq!(diagram.node_ids.svg_id("box3"), Some("node4"));
    assert_eq!(diagram.node_ids.svg_id("B"), Some("node20"));
    assert_eq!(diagram.node_ids.svg_id("box19"), Some("node21"));
    assert_eq!(diagram.node_ids.svg_id("identification"), Some("node22"));
    assert_eq!(diagram.node_ids.svg_id("included"), Some("node24"));
    for (name, entry) in diagram.node_ids.iter() {
        assert!(entry.svg_id.starts_with("node"), "{name}");
    }

    let diagram = build_flow_diagram(&full_data(), &wings(false, false));
    assert_eq!(diagram.node_ids.svg_id("box3"), Some("node1"));
    assert_eq!(diagram.node_ids.svg_id("identification"), Some("node11"));
    assert_eq!(diagram.node_ids.svg_id("box1"), None);
}

#[test]
fn building_is_deterministic() {
    let data = full_data();
    let options = DiagramOptions::default();
    assert_eq!(
        build_flow_diagram(&data, &options).to_dot(),
        build_flow_diagram(&data, &options).to_dot()
    );
}

#[test]
fn dot_document_is_well_formed() {
    let dot = build_flow_diagram(&full_data(), &DiagramOptions::default()).to_dot();
    assert!(dot.starts_with("digraph \"prisma2020\" {\n"));
    assert!(dot.ends_with("}\n"));
    assert!(dot.contains("layout=neato"));
    assert!(dot.contains("splines=ortho"));
    for cluster in ["cluster_previous", "cluster_main", "cluster_other"] {
        assert!(dot.contains(&format!("subgraph \"{cluster}\" {{")), "{cluster}");
    }
    assert!(dot.contains("\"1\" -> \"2\" [style=invis];"));
    assert!(dot.contains("\"2\" -> \"A\" [arrowhead=none];"));
    assert!(dot.contains("\"17\" -> \"B\" [arrowhead=none];"));
    assert!(dot.contains("\"B\" -> \"12\";"));
    assert!(dot.contains("\"A\" -> \"19\";"));
    assert!(dot.contains("{rank = same; \"1\"; \"3\"; \"13\";}"));
}

#[test]
fn rank_groups_drop_inactive_members() {
    let diagram = build_flow_diagram(&full_data(), &DiagramOptions::default());
    assert_eq!(diagram.graph.ranks.len(), 7);

    let diagram = build_flow_diagram(&full_data(), &wings(false, false));
    let ranks: Vec<Vec<&str>> = diagram
        .graph
        .ranks
        .iter()
        .map(|r| r.members.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(
        ranks,
        vec![
            vec!["4", "5"],
            vec!["6", "7"],
            vec!["8", "9"],
            vec!["10", "11"]
        ]
    );
}

#[test]
fn labels_render_counts_and_reasons() {
    let diagram = build_flow_diagram(&full_data(), &DiagramOptions::default());
    assert_eq!(
        label(&diagram, "4"),
        "Records identified from:\nDatabases (n = 1024)\nRegisters (n = 35)"
    );
    assert_eq!(label(&diagram, "6"), "Records screened\n(n = 900)");
    assert_eq!(
        label(&diagram, "11"),
        "Reports excluded:\n• Wrong population (n = 40)\n• Wrong intervention (n = 22)\n• Wrong outcome measured at the\nwrong follow-up time point (n = 18)"
    );
    assert_eq!(
        label(&diagram, "18"),
        "Reports excluded:\n• Wrong population (n = 10)\n• Not peer reviewed (n = 6)"
    );
    assert_eq!(label(&diagram, "identification"), "");
    assert_eq!(str_attr(&diagram, "identification", "tooltip"), "Identification");
    assert_eq!(str_attr(&diagram, "1", "tooltip"), "Previous studies");

    let diagram = build_flow_diagram(&core_data(), &DiagramOptions::default());
    assert_eq!(label(&diagram, "11"), "Reports excluded:\n(n = 15)");
}

#[test]
fn removal_box_shows_an_explicit_zero() {
    let mut data = core_data();
    data.counts.duplicates = None;
    data.counts.excluded_automatic = None;
    data.counts.excluded_other = None;
    let diagram = build_flow_diagram(&data, &DiagramOptions::default());
    assert_eq!(
        label(&diagram, "5"),
        "Records removed before screening:\n(n = 0)"
    );
    assert!(
        diagram
            .to_dot()
            .contains(r#""Records removed before screening:\l(n = 0)\l""#)
    );
}

#[test]
fn absent_required_counts_render_na() {
    let mut data = core_data();
    data.counts.records_screened = None;
    data.dbr_excluded = Exclusions::Missing;
    let diagram = build_flow_diagram(&data, &DiagramOptions::default());
    assert_eq!(label(&diagram, "6"), "Records screened\n(n = NA)");
    assert_eq!(label(&diagram, "11"), "Reports excluded:\n(n = NA)");
}

#[test]
fn long_reason_lists_nudge_the_exclusion_box_down() {
    let diagram = build_flow_diagram(&full_data(), &DiagramOptions::default());
    assert_eq!(str_attr(&diagram, "11", "pos"), "9,3.3889!");
    assert_eq!(str_attr(&diagram, "18", "pos"), "17,3.5!");
    assert_eq!(str_attr(&diagram, "10", "pos"), "5,3.5!");

    let mut data = core_data();
    data.dbr_excluded = Exclusions::Reasons(
        ["a", "b", "c"]
            .into_iter()
            .map(|r| ExclusionReason {
                reason: r.to_string(),
                count: Some(1),
            })
            .collect(),
    );
    let diagram = build_flow_diagram(&data, &DiagramOptions::default());
    assert_eq!(str_attr(&diagram, "11", "pos"), "5,3.5!");
}

#[test]
fn other_wing_reason_list_nudges_box_18_independently() {
    let mut data = full_data();
    data.other_excluded = Exclusions::Reasons(
        ["Wrong population", "Wrong design", "Not peer reviewed", "Duplicate report", "No full text"]
            .into_iter()
            .map(|r| ExclusionReason {
                reason: r.to_string(),
                count: Some(2),
            })
            .collect(),
    );
    let diagram = build_flow_diagram(&data, &DiagramOptions::default());
    assert_eq!(str_attr(&diagram, "18", "pos"), "17,3.2778!");
    assert_eq!(str_attr(&diagram, "11", "pos"), "9,3.3889!");
    assert_eq!(str_attr(&diagram, "17", "pos"), "13,3.5!");

    let shifted = build_flow_diagram(&data, &wings(false, true));
    assert_eq!(str_attr(&shifted, "18", "pos"), "13,3.2778!");
}

#[test]
fn missing_previous_wing_shifts_columns_left() {
    let data = full_data();
    let with = build_flow_diagram(&data, &DiagramOptions::default());
    let without = build_flow_diagram(&data, &wings(false, true));
    assert_eq!(str_attr(&with, "6", "pos"), "5,5.5!");
    assert_eq!(str_attr(&without, "6", "pos"), "1,5.5!");
    assert_eq!(str_attr(&without, "15", "pos"), "9,4.5!");
    assert_eq!(
        str_attr(&with, "screening", "pos"),
        str_attr(&without, "screening", "pos")
    );
}

#[test]
fn styling_follows_options() {
    let options = DiagramOptions {
        title_colour: "Red".to_string(),
        greybox_colour: "Grey80".to_string(),
        main_colour: "Navy".to_string(),
        arrow_colour: "Blue".to_string(),
        arrow_tail: ArrowShape::Box,
        ..DiagramOptions::default()
    };
    let diagram = build_flow_diagram(&full_data(), &options);
    assert_eq!(str_attr(&diagram, "3", "fillcolor"), "Red");
    assert_eq!(str_attr(&diagram, "1", "fillcolor"), "Grey80");
    assert_eq!(str_attr(&diagram, "14", "fillcolor"), "Grey80");
    assert_eq!(str_attr(&diagram, "6", "color"), "Navy");
    assert_eq!(str_attr(&diagram, "6", "fillcolor"), "White");
    assert_eq!(str_attr(&diagram, "screening", "fillcolor"), "LightSteelBlue2");

    let dot = diagram.to_dot();
    assert!(dot.contains(r#"edge [color="Blue", arrowhead=normal, arrowtail=box, dir=both];"#));

    let dot = build_flow_diagram(&full_data(), &DiagramOptions::default()).to_dot();
    assert!(!dot.contains("dir=both"));
}

#[test]
fn every_node_carries_the_required_attributes() {
    let diagram = build_flow_diagram(&full_data(), &DiagramOptions::default());
    for id in diagram.graph.node_order() {
        let node = diagram.graph.node(id).unwrap();
        for key in ["label", "style", "width", "height", "pos", "tooltip"] {
            assert!(node.attrs.get(key).is_some(), "node {id} lacks {key}");
        }
    }
}
