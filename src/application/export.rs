//! Renderings of a read-only document snapshot.
//!
//! DOT output is meant for Graphviz (`dot -Tsvg`, `dot -Tpdf`), the CSV table
//! is the node overview, JSON is the document itself.

use itertools::Itertools;

use crate::application::services::render_document;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{group_of, groups_of, probability, Edge, Node, NodeId};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Dot,
}

impl ExportFormat {
    /// Default file name inside the export directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "attack_tree_data.json",
            ExportFormat::Csv => "nodes_overview.csv",
            ExportFormat::Dot => "attack_tree.dot",
        }
    }
}

/// Render `nodes`/`edges` in `format`.
pub fn render(format: ExportFormat, nodes: &[Node], edges: &[Edge]) -> ApplicationResult<String> {
    match format {
        ExportFormat::Json => to_json(nodes, edges),
        ExportFormat::Csv => to_csv(nodes),
        ExportFormat::Dot => Ok(to_dot(nodes, edges)),
    }
}

pub fn to_json(nodes: &[Node], edges: &[Edge]) -> ApplicationResult<String> {
    let document = crate::domain::Document {
        nodes: nodes.to_vec(),
        edges: edges.to_vec(),
    };
    render_document(&document).map_err(|e| ApplicationError::Export {
        format: "json",
        message: e.to_string(),
    })
}

/// Node overview: one row per node with its attributes.
pub fn to_csv(nodes: &[Node]) -> ApplicationResult<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(["Name", "Attribute"])
        .map_err(csv_err)?;
    for node in nodes {
        let attributes = node
            .attributes
            .iter()
            .map(|(key, attr)| {
                format!(
                    "{}: {} (visible in tree: {})",
                    key, attr.value, attr.display_in_tree
                )
            })
            .join("; ");
        writer
            .write_record([node.name.as_str(), attributes.as_str()])
            .map_err(csv_err)?;
    }
    let bytes = writer.into_inner().map_err(csv_err)?;
    String::from_utf8(bytes).map_err(csv_err)
}

/// Graphviz description with one dashed cluster per AND-group.
pub fn to_dot(nodes: &[Node], edges: &[Edge]) -> String {
    let groups = groups_of(nodes);
    let mut out = String::from("digraph {\n");

    for node in nodes {
        let mut label = format!("<b>{}</b>", html_escape(&node.name));
        for (key, attr) in node.visible_attributes() {
            label.push_str(&format!("<br/>{}: {}", html_escape(key), html_escape(&attr.value)));
        }
        out.push_str(&format!("\t{} [label=<{}> shape=box]\n", quote(node.id.as_str()), label));
    }

    // junction point per group whose members have children of their own
    let mut junctions: Vec<(&str, String)> = Vec::new();
    for (index, (group, members)) in groups.iter().enumerate() {
        let total: f64 = edges
            .iter()
            .filter(|e| members.contains(&e.child))
            .filter_map(|e| probability::parse(&e.probability).ok())
            .sum();

        out.push_str(&format!("\tsubgraph cluster_{index} {{\n"));
        out.push_str(&format!(
            "\t\tfontsize=12 label={} labeljust=l labelloc=t style=dashed\n",
            quote(&format!("AND Group: {group} (Total Prob.: {total:.2})"))
        ));
        if edges.iter().any(|e| members.contains(&e.parent)) {
            let junction = format!("dummy_{index}");
            out.push_str(&format!("\t\t{junction} [height=0.01 shape=point width=0.01]\n"));
            for member in members {
                out.push_str(&format!("\t\t{} -> {junction} [minlen=1]\n", quote(member.as_str())));
            }
            junctions.push((group.as_str(), junction));
        }
        for member in members {
            out.push_str(&format!("\t\t{}\n", quote(member.as_str())));
        }
        out.push_str("\t}\n");
    }

    for edge in edges {
        let label = if edge.probability.is_empty() {
            "N/A"
        } else {
            edge.probability.as_str()
        };
        let start = junction_for(&groups, &junctions, &edge.parent)
            .map(str::to_string)
            .unwrap_or_else(|| quote(edge.parent.as_str()));
        out.push_str(&format!(
            "\t{} -> {} [label={} color={}]\n",
            start,
            quote(edge.child.as_str()),
            quote(label),
            quote(&edge.color)
        ));
    }

    out.push_str("}\n");
    out
}

fn csv_err(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Export {
        format: "csv",
        message: e.to_string(),
    }
}

fn junction_for<'a>(
    groups: &[(String, Vec<NodeId>)],
    junctions: &'a [(&str, String)],
    parent: &NodeId,
) -> Option<&'a str> {
    let group = group_of(groups, parent)?;
    junctions
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, junction)| junction.as_str())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
