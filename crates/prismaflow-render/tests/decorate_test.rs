use prismaflow_core::{DiagramOptions, FlowData, ReadOptions, read_template_path};
use prismaflow_render::{
    DecorateOptions, build_flow_diagram, decorate_svg, decoration_plan,
    render_widget_html,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

fn full_data() -> FlowData {
    read_template_path(fixture("prisma_full.csv"), ReadOptions::strict()).expect("fixture reads")
}

fn sample_svg() -> String {
    std::fs::read_to_string(fixture("graphviz_sample.svg")).expect("sample svg")
}

fn interactive() -> DiagramOptions {
    DiagramOptions {
        interactive: true,
        ..DiagramOptions::default()
    }
}

#[test]
fn plan_covers_every_node_with_a_generated_id() {
    let data = full_data();
    let options = interactive();
    let diagram = build_flow_diagram(&data, &options);
    let plan = decoration_plan(&diagram, &data, &DecorateOptions::from_diagram_options(&options));
    assert_eq!(plan.len(), 24);
    assert!(plan.iter().all(|d| !d.svg_id.is_empty()));

    let box7 = plan.iter().find(|d| d.logical_name == "box7").unwrap();
    assert_eq!(box7.href, None);
    let box3 = plan.iter().find(|d| d.logical_name == "box3").unwrap();
    assert_eq!(
        box3.href.as_deref(),
        Some("https://example.org/prisma/box3.html")
    );
    assert_eq!(plan.iter().filter(|d| d.phase_label.is_some()).count(), 3);
}

#[test]
fn interactive_svg_links_boxes_that_have_urls() {
    let data = full_data();
    let options = interactive();
    let diagram = build_flow_diagram(&data, &options);
    let out = decorate_svg(
        &sample_svg(),
        &diagram,
        &data,
        &DecorateOptions::from_diagram_options(&options),
    )
    .unwrap();

    assert_eq!(out.matches(r#"target="_blank""#).count(), 21);
    assert!(out.contains(
        r#"<a href="https://example.org/prisma/box3.html" xlink:href="https://example.org/prisma/box3.html" target="_blank"><g id="node4" class="node">"#
    ));
    // box7 has no URL, so its group is not wrapped.
    assert!(out.contains("-->\n<g id=\"node8\" class=\"node\">"));
    assert!(out.starts_with("<?xml"));
}

#[test]
fn static_svg_gets_phase_labels_but_no_links() {
    let data = full_data();
    let options = DiagramOptions::default();
    let diagram = build_flow_diagram(&data, &options);
    let out = decorate_svg(
        &sample_svg(),
        &diagram,
        &data,
        &DecorateOptions::from_diagram_options(&options),
    )
    .unwrap();

    assert!(!out.contains(r#"target="_blank""#));
    assert!(out.contains(r#"transform="rotate(-90 1020.00 -340.00)""#), "{out}");
    for label in [">Identification</text>", ">Screening</text>", ">Included</text>"] {
        assert_eq!(out.matches(label).count(), 1, "{label}");
    }
}

#[test]
fn widget_embeds_the_decorated_svg() {
    let html = render_widget_html(&sample_svg(), "PRISMA 2020 flow diagram");
    assert!(html.contains("<title>PRISMA 2020 flow diagram</title>"));
    assert!(html.contains("<svg width=\"1414pt\""));
    assert!(!html.contains("<!DOCTYPE svg"));
}
