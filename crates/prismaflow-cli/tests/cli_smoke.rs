use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("prismaflow-cli"));
    cmd.current_dir(repo_root());
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run cli");
    assert!(
        output.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 stdout")
}

#[test]
fn template_prints_the_bundled_csv() {
    let out = stdout_of(cli().arg("template"));
    assert!(out.starts_with("data,node,box,description,boxtext,tooltips,url,n"));
    assert!(out.contains("dbr_excluded"));
}

#[test]
fn dot_renders_all_wings_for_the_full_fixture() {
    let out = stdout_of(cli().args(["dot", fixture("prisma_full.csv").to_string_lossy().as_ref()]));
    assert!(out.starts_with("digraph \"prisma2020\" {"));
    assert!(out.contains("subgraph \"cluster_previous\""));
    assert!(out.contains("subgraph \"cluster_other\""));
    assert!(out.contains("Databases (n = 1024)"));
}

#[test]
fn dot_honours_wing_flags_and_colours() {
    let out = stdout_of(cli().args([
        "dot",
        "--no-previous",
        "--no-other",
        "--main-colour",
        "Navy",
        "--arrow-tail",
        "BOX",
        fixture("prisma_full.csv").to_string_lossy().as_ref(),
    ]));
    assert!(!out.contains("cluster_previous"));
    assert!(!out.contains("cluster_other"));
    assert!(out.contains(r#"color="Navy""#));
    assert!(out.contains("dir=both"));
}

#[test]
fn dot_reads_stdin() {
    let csv = fs::read(fixture("prisma_core.csv")).unwrap();
    assert_cmd::Command::from_std(cli())
        .arg("dot")
        .write_stdin(csv)
        .assert()
        .success();
}

#[test]
fn dot_applies_a_yaml_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("options.yaml");
    fs::write(&config, "title_colour: Tomato\nfont_size: 9\n").unwrap();
    let out = stdout_of(cli().args([
        "dot",
        "--config",
        config.to_string_lossy().as_ref(),
        fixture("prisma_core.csv").to_string_lossy().as_ref(),
    ]));
    assert!(out.contains(r#"fillcolor="Tomato""#));
    assert!(out.contains("fontsize=9"));
}

#[test]
fn check_prints_the_parsed_data_as_json() {
    let out = stdout_of(cli().args(["check", fixture("prisma_full.csv").to_string_lossy().as_ref()]));
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value["counts"]["database_results"], 1024);
    assert_eq!(value["dbr_excluded"]["kind"], "reasons");
    assert_eq!(value["urls"]["box3"], "https://example.org/prisma/box3.html");
}

#[test]
fn strict_check_names_the_missing_count() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let csv = tmp.path().join("broken.csv");
    let text = fs::read_to_string(fixture("prisma_core.csv"))
        .unwrap()
        .lines()
        .map(|line| {
            if line.starts_with("records_screened,") {
                let mut cells: Vec<&str> = line.split(',').collect();
                let last = cells.len() - 1;
                cells[last] = "";
                cells.join(",")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&csv, text).unwrap();

    cli()
        .args(["check", csv.to_string_lossy().as_ref()])
        .assert()
        .success();
    let output = cli()
        .args(["check", "--strict", csv.to_string_lossy().as_ref()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("records_screened"));
}

#[test]
fn decorate_adds_links_and_phase_labels() {
    let svg = fixture("graphviz_sample.svg");
    let out = stdout_of(cli().args([
        "decorate",
        "--interactive",
        "--svg",
        svg.to_string_lossy().as_ref(),
        fixture("prisma_full.csv").to_string_lossy().as_ref(),
    ]));
    assert_eq!(out.matches(r#"target="_blank""#).count(), 21);
    assert!(out.contains(">Screening</text>"));
}

#[test]
fn decorate_can_emit_a_widget_page() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("flow.html");
    cli()
        .args([
            "decorate",
            "--svg",
            fixture("graphviz_sample.svg").to_string_lossy().as_ref(),
            "--format",
            "html",
            "--title",
            "Review <2026>",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("prisma_full.csv").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<title>Review &lt;2026&gt;</title>"));
    assert!(html.contains(">Included</text>"));
}

#[test]
fn convert_renders_png_next_to_the_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let svg = tmp.path().join("flow.svg");
    fs::copy(fixture("graphviz_sample.svg"), &svg).unwrap();

    cli()
        .args(["convert", "--format", "png", "--scale", "0.5", svg.to_string_lossy().as_ref()])
        .assert()
        .success();

    let bytes = fs::read(svg.with_extension("png")).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
    let decoder = png::Decoder::new(bytes.as_slice());
    let reader = decoder.read_info().expect("png header");
    // 1414x706 pt at half scale; usvg resolves `pt` to CSS pixels first.
    let info = reader.info();
    assert!((700..=950).contains(&info.width), "width {}", info.width);
    assert_eq!(info.width / info.height, 2);
}

#[test]
fn convert_renders_pdf() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("flow.pdf");
    cli()
        .args([
            "convert",
            "--format",
            "pdf",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("graphviz_sample.svg").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn usage_errors_exit_with_code_2() {
    let output = cli().args(["dot", "--bogus"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = cli().args(["decorate", "x.csv"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = cli().args(["convert", "--format", "svg", "x.svg"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_graphviz_is_reported() {
    let output = cli()
        .env("PRISMAFLOW_DOT", "prismaflow-definitely-not-a-graphviz-binary")
        .args(["render", fixture("prisma_core.csv").to_string_lossy().as_ref()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to start Graphviz"));
}
