//! Post-render SVG decoration: hyperlinks around boxes and rotated phase labels.
//!
//! Graphviz cannot rotate text or attach our own link targets, so the rendered SVG is rewritten
//! once with `lol_html`. Node groups are located through the [`NodeIdMap`] produced at build
//! time, never by guessing element order.

use crate::builder::FlowDiagram;
use crate::error::{Error, Result};
use crate::layout::BoxId;
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use prismaflow_core::utils::{BLANK_URL, sanitize_url};
use prismaflow_core::{DiagramOptions, FlowData};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// Phase labels are drawn a little larger than box text.
const PHASE_FONT_SCALE: f64 = 1.4;

#[derive(Debug, Clone, PartialEq)]
pub struct DecorateOptions {
    /// Wrap boxes with a URL in `<a target="_blank">`.
    pub hyperlinks: bool,
    pub font: String,
    pub font_size: f64,
}

impl DecorateOptions {
    pub fn from_diagram_options(options: &DiagramOptions) -> Self {
        Self {
            hyperlinks: options.interactive,
            font: options.font.clone(),
            font_size: options.font_size,
        }
    }
}

/// What happens to one node group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub logical_name: String,
    pub svg_id: String,
    pub href: Option<String>,
    pub phase_label: Option<String>,
}

/// One entry per emitted node, in emission order.
pub fn decoration_plan(
    diagram: &FlowDiagram,
    data: &FlowData,
    options: &DecorateOptions,
) -> Vec<Decoration> {
    diagram
        .node_ids
        .iter()
        .map(|(name, entry)| {
            let href = if options.hyperlinks {
                data.urls
                    .get(name)
                    .map(sanitize_url)
                    .filter(|url| *url != BLANK_URL)
            } else {
                None
            };
            let phase_label = match entry.box_id {
                BoxId::Phase(phase) => Some(data.text.get(phase.field()).to_string()),
                _ => None,
            };
            Decoration {
                logical_name: name.to_string(),
                svg_id: entry.svg_id.clone(),
                href,
                phase_label,
            }
        })
        .collect()
}

fn number_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").expect("number pair regex must compile")
    })
}

/// Center of the bounding box of every `x,y` pair in `points` / `d`.
pub(crate) fn outline_center(geometry: &str) -> Option<(f64, f64)> {
    let mut min = (f64::INFINITY, f64::INFINITY);
    let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut any = false;
    for caps in number_pair_re().captures_iter(geometry) {
        let (Ok(x), Ok(y)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            continue;
        };
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
        any = true;
    }
    any.then(|| ((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0))
}

fn phase_text(label: &str, center: (f64, f64), options: &DecorateOptions) -> String {
    let (cx, cy) = center;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<text text-anchor="middle" dominant-baseline="central" x="{cx:.2}" y="{cy:.2}" transform="rotate(-90 {cx:.2} {cy:.2})" font-family="{}" font-size="{:.2}" font-weight="bold">{}</text>"#,
        htmlize::escape_attribute(options.font.as_str()),
        options.font_size * PHASE_FONT_SCALE,
        htmlize::escape_text(label),
    );
    out
}

/// Applies `plan` to Graphviz SVG output.
pub fn apply_decorations(svg: &str, plan: &[Decoration], options: &DecorateOptions) -> Result<String> {
    let mut handlers = Vec::new();

    for deco in plan {
        let group = format!(r#"g[id="{}"]"#, deco.svg_id);

        if let Some(href) = &deco.href {
            let href = htmlize::escape_attribute(href.as_str()).into_owned();
            let open = format!(r#"<a href="{href}" xlink:href="{href}" target="_blank">"#);
            handlers.push(element!(group.as_str(), move |el| {
                el.before(&open, ContentType::Html);
                el.after("</a>", ContentType::Html);
                Ok(())
            }));
        }

        if let Some(label) = &deco.phase_label {
            let label = label.clone();
            let options = options.clone();
            let selector = format!("{group} polygon, {group} path");
            handlers.push(element!(selector.as_str(), move |el| {
                let geometry = el
                    .get_attribute("points")
                    .or_else(|| el.get_attribute("d"))
                    .unwrap_or_default();
                match outline_center(&geometry) {
                    Some(center) => {
                        el.after(&phase_text(&label, center, &options), ContentType::Html)
                    }
                    None => tracing::warn!(label = %label, "phase outline without coordinates"),
                }
                Ok(())
            }));
        }
    }

    if handlers.is_empty() {
        return Ok(svg.to_string());
    }

    rewrite_str(
        svg,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| Error::Rewrite {
        message: err.to_string(),
    })
}

/// Builds the plan from `diagram` and decorates `svg` in one step.
pub fn decorate_svg(
    svg: &str,
    diagram: &FlowDiagram,
    data: &FlowData,
    options: &DecorateOptions,
) -> Result<String> {
    let plan = decoration_plan(diagram, data, options);
    let linked = plan.iter().filter(|d| d.href.is_some()).count();
    tracing::debug!(nodes = plan.len(), linked, "decorating svg");
    apply_decorations(svg, &plan, options)
}

/// Wraps decorated SVG in a self-contained HTML page.
pub fn render_widget_html(svg: &str, title: &str) -> String {
    // The XML prolog and doctype are not valid inside an HTML body.
    let body = svg.find("<svg").map(|idx| &svg[idx..]).unwrap_or(svg);
    let title = htmlize::escape_text(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ margin: 0; padding: 1rem; background: #fff; }}
.prisma-flow svg {{ max-width: 100%; height: auto; }}
.prisma-flow a:hover path, .prisma-flow a:hover polygon {{ opacity: 0.85; }}
</style>
</head>
<body>
<div class="prisma-flow">
{body}
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g id="node1" class="node"><title>1</title>
<polygon fill="white" stroke="black" points="10,-10 10,-50 110,-50 110,-10 10,-10"/>
<text x="60" y="-26">Box</text>
</g>
<g id="node2" class="node"><title>identification</title>
<path fill="lightsteelblue2" d="M0,-100C0,-100 20,-100 20,-100 20,-100 20,0 20,0 20,0 0,0 0,0 0,0 0,-100 0,-100"/>
</g>
</svg>"#;

    fn plan(href: Option<&str>, phase: Option<&str>) -> Vec<Decoration> {
        vec![
            Decoration {
                logical_name: "box1".to_string(),
                svg_id: "node1".to_string(),
                href: href.map(str::to_string),
                phase_label: None,
            },
            Decoration {
                logical_name: "identification".to_string(),
                svg_id: "node2".to_string(),
                href: None,
                phase_label: phase.map(str::to_string),
            },
        ]
    }

    fn options() -> DecorateOptions {
        DecorateOptions::from_diagram_options(&DiagramOptions::default())
    }

    #[test]
    fn outline_center_uses_the_bounding_box() {
        assert_eq!(
            outline_center("10,-10 10,-50 110,-50 110,-10 10,-10"),
            Some((60.0, -30.0))
        );
        assert_eq!(outline_center("M0,-100C0,-100 20,0 20,0"), Some((10.0, -50.0)));
        assert_eq!(outline_center(""), None);
    }

    #[test]
    fn hyperlink_wraps_the_node_group() {
        let out = apply_decorations(SVG, &plan(Some("https://example.org/a?b=1&c=2"), None), &options())
            .unwrap();
        assert!(out.contains(
            r#"<a href="https://example.org/a?b=1&amp;c=2" xlink:href="https://example.org/a?b=1&amp;c=2" target="_blank"><g id="node1" class="node">"#
        ));
        assert_eq!(out.matches("</a>").count(), 1);
        assert!(out.contains("</g></a>"));
    }

    #[test]
    fn phase_label_is_rotated_about_the_outline_center() {
        let out = apply_decorations(SVG, &plan(None, Some("Identification")), &options()).unwrap();
        assert!(out.contains(r#"transform="rotate(-90 10.00 -50.00)""#), "{out}");
        assert!(out.contains(">Identification</text>"));
        assert!(!out.contains("<a "));
    }

    #[test]
    fn empty_plan_returns_input_unchanged() {
        assert_eq!(apply_decorations(SVG, &plan(None, None), &options()).unwrap(), SVG);
    }

    #[test]
    fn widget_page_strips_the_prolog_and_escapes_the_title() {
        let svg = format!("<?xml version=\"1.0\"?>\n<!DOCTYPE svg>\n{SVG}");
        let html = render_widget_html(&svg, "A & B <review>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &amp; B &lt;review&gt;</title>"));
        assert!(!html.contains("<?xml"));
        assert!(html.contains(r#"<g id="node1" class="node">"#));
    }
}
