//! In-memory Graphviz DOT model and its writer.
//!
//! The builder never splices DOT text by hand: it assembles a [`Graph`] and [`Graph::to_dot`]
//! serializes it. Every identifier is written quoted, clusters are always `cluster_`-prefixed
//! and properly closed, and labels are escaped in one place.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Center,
    Left,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
    pub text: String,
    pub justify: Justify,
}

impl Label {
    pub fn center(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            justify: Justify::Center,
        }
    }

    pub fn left(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            justify: Justify::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Written as a quoted, escaped string.
    Str(String),
    /// Written verbatim; only for Graphviz keywords (`box`, `invis`, `same`, ...).
    Keyword(&'static str),
    Number(f64),
    Label(Label),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Label> for Value {
    fn from(value: Label) -> Self {
        Self::Label(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attrs(Vec<(&'static str, Value)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value while keeping its position.
    pub fn set(&mut self, key: &'static str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn keyword(self, key: &'static str, value: &'static str) -> Self {
        self.with(key, Value::Keyword(value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub attrs: Attrs,
}

impl Node {
    pub fn new(id: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            id: id.into(),
            attrs,
        }
    }

    pub fn label_text(&self) -> Option<&str> {
        match self.attrs.get("label")? {
            Value::Label(label) => Some(label.text.as_str()),
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub attrs: Attrs,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    name: String,
    pub attrs: Attrs,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Cluster {
    /// `name` is prefixed with `cluster_` so Graphviz treats the subgraph as a cluster.
    pub fn new(name: &str) -> Self {
        Self {
            name: format!("cluster_{name}"),
            attrs: Attrs::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Nodes forced onto the same visual row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroup {
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub name: String,
    pub attrs: Attrs,
    pub node_defaults: Attrs,
    pub edge_defaults: Attrs,
    pub clusters: Vec<Cluster>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub ranks: Vec<RankGroup>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Node ids in the order they are first declared in the serialized document.
    ///
    /// Graphviz numbers its SVG node groups (`node1`, `node2`, ...) in this order.
    pub fn node_order(&self) -> Vec<&str> {
        self.clusters
            .iter()
            .flat_map(|c| c.nodes.iter())
            .chain(self.nodes.iter())
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.clusters
            .iter()
            .flat_map(|c| c.nodes.iter())
            .chain(self.nodes.iter())
            .find(|n| n.id == id)
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.clusters
            .iter()
            .flat_map(|c| c.edges.iter())
            .chain(self.edges.iter())
    }

    /// Ids referenced by edges or rank groups that no node declares. Empty for a sound graph.
    pub fn undeclared_references(&self) -> Vec<String> {
        let declared = self.node_order();
        let mut out: Vec<String> = Vec::new();
        let referenced = self
            .all_edges()
            .flat_map(|e| [e.from.as_str(), e.to.as_str()])
            .chain(self.ranks.iter().flat_map(|r| r.members.iter().map(String::as_str)));
        for id in referenced {
            if !declared.contains(&id) && !out.iter().any(|o| o == id) {
                out.push(id.to_string());
            }
        }
        out
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::with_capacity(4096);
        let _ = writeln!(out, "digraph {} {{", quote(&self.name));
        write_attr_stmt(&mut out, 1, "graph", &self.attrs);
        write_attr_stmt(&mut out, 1, "node", &self.node_defaults);
        write_attr_stmt(&mut out, 1, "edge", &self.edge_defaults);

        for cluster in &self.clusters {
            out.push('\n');
            let _ = writeln!(out, "  subgraph {} {{", quote(&cluster.name));
            write_attr_stmt(&mut out, 2, "graph", &cluster.attrs);
            for node in &cluster.nodes {
                write_node(&mut out, 2, node);
            }
            for edge in &cluster.edges {
                write_edge(&mut out, 2, edge);
            }
            out.push_str("  }\n");
        }

        if !self.nodes.is_empty() {
            out.push('\n');
        }
        for node in &self.nodes {
            write_node(&mut out, 1, node);
        }

        if !self.edges.is_empty() {
            out.push('\n');
        }
        for edge in &self.edges {
            write_edge(&mut out, 1, edge);
        }

        if !self.ranks.is_empty() {
            out.push('\n');
        }
        for rank in &self.ranks {
            out.push_str("  {rank = same;");
            for member in &rank.members {
                let _ = write!(out, " {};", quote(member));
            }
            out.push_str("}\n");
        }

        out.push_str("}\n");
        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_attr_stmt(out: &mut String, depth: usize, kind: &str, attrs: &Attrs) {
    if attrs.is_empty() {
        return;
    }
    indent(out, depth);
    out.push_str(kind);
    out.push(' ');
    write_attr_list(out, attrs);
    out.push_str(";\n");
}

fn write_node(out: &mut String, depth: usize, node: &Node) {
    indent(out, depth);
    out.push_str(&quote(&node.id));
    if !node.attrs.is_empty() {
        out.push(' ');
        write_attr_list(out, &node.attrs);
    }
    out.push_str(";\n");
}

fn write_edge(out: &mut String, depth: usize, edge: &Edge) {
    indent(out, depth);
    let _ = write!(out, "{} -> {}", quote(&edge.from), quote(&edge.to));
    if !edge.attrs.is_empty() {
        out.push(' ');
        write_attr_list(out, &edge.attrs);
    }
    out.push_str(";\n");
}

fn write_attr_list(out: &mut String, attrs: &Attrs) {
    out.push('[');
    for (idx, (key, value)) in attrs.0.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push('=');
        write_value(out, value);
    }
    out.push(']');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Str(s) => out.push_str(&quote(s)),
        Value::Keyword(k) => out.push_str(k),
        Value::Number(v) => fmt_number_into(out, *v),
        Value::Label(label) => out.push_str(&quote_label(label)),
    }
}

/// Quotes a DOT string. Newlines become centered line breaks.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn quote_label(label: &Label) -> String {
    match label.justify {
        Justify::Center => quote(&label.text),
        Justify::Left => {
            // Each line ends in `\l`, including the last, or Graphviz centers it.
            let mut out = String::with_capacity(label.text.len() + 8);
            out.push('"');
            for line in label.text.split('\n') {
                let quoted = quote(line);
                out.push_str(&quoted[1..quoted.len() - 1]);
                out.push_str("\\l");
            }
            out.push('"');
            out
        }
    }
}

/// Formats with at most four decimals and no trailing zeros (`3.5`, `9.25`, `1`, `0`).
pub fn fmt_number(v: f64) -> String {
    let mut out = String::new();
    fmt_number_into(&mut out, v);
    out
}

fn fmt_number_into(out: &mut String, v: f64) {
    let start = out.len();
    let _ = write!(out, "{:.4}", v);
    if out[start..].contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if &out[start..] == "-0" {
        out.truncate(start);
        out.push('0');
    }
}
