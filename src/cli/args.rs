//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::export::ExportFormat;
use crate::domain::EdgeMode;

/// Attack tree editor: nodes, weighted edges, AND-groups, exports
#[derive(Parser, Debug)]
#[command(name = "atree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Attack tree document (overrides `document_path` from config)
    #[arg(short = 'f', long = "file", global = true, value_hint = ValueHint::FilePath)]
    pub document: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new document with a single root node
    Init {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Show the tree with probabilities and AND-groups
    Show,

    /// Report diagnostics; exit 1 if there are any
    Check,

    /// Edit nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Edit edges
    Edge {
        #[command(subcommand)]
        command: EdgeCommands,
    },

    /// Write the document as JSON, CSV overview or Graphviz DOT
    Export {
        #[arg(value_enum)]
        format: ExportArg,
        /// Output file (default: <export_dir>/<standard name>, "-" for stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Replace the document with a JSON file
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Add a node below a parent
    Add {
        /// Node name (unique)
        name: String,
        /// Parent node (id or name)
        #[arg(short, long)]
        parent: String,
        /// Probability of the edge from the parent
        #[arg(short = 'P', long)]
        probability: String,
        /// AND-group label
        #[arg(short, long)]
        group: Option<String>,
        /// Edge mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::And)]
        mode: ModeArg,
        /// Attribute as key=value, append ":show" to display it in the tree
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attrs: Vec<AttributeArg>,
    },

    /// Rename a node
    Rename { node: String, new_name: String },

    /// Delete a node; its children move to its parent
    Delete { node: String },

    /// Move a node below another parent
    Move { node: String, new_parent: String },

    /// Set the AND-group label (blank leaves it unchanged)
    Group { node: String, group: String },

    /// Replace all attributes of a node
    Attrs {
        node: String,
        /// Attribute as key=value[:show]; none clears all attributes
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attrs: Vec<AttributeArg>,
    },

    /// Change several properties at once
    Edit {
        node: String,
        #[arg(long)]
        name: Option<String>,
        /// New parent (id or name)
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        group: Option<String>,
        /// Replace attributes with these
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attrs: Vec<AttributeArg>,
        /// Remove all attributes
        #[arg(long, conflicts_with = "attrs")]
        clear_attrs: bool,
    },

    /// Show one node with its edges
    Show { node: String },

    /// List all nodes
    List,
}

#[derive(Subcommand, Debug)]
pub enum EdgeCommands {
    /// Connect parent to child
    Add {
        parent: String,
        child: String,
        #[arg(short = 'P', long)]
        probability: String,
        /// Edge color (default: edge_color from config)
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove an edge; the child must keep another parent
    Delete { parent: String, child: String },

    /// Change the probability of an edge
    Probability {
        parent: String,
        child: String,
        probability: String,
    },

    /// Switch the edge into a node between AND and OR
    Mode {
        node: String,
        #[arg(value_enum)]
        mode: ModeArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    And,
    Or,
}

impl From<ModeArg> for EdgeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::And => EdgeMode::And,
            ModeArg::Or => EdgeMode::Or,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportArg {
    Json,
    Csv,
    Dot,
}

impl From<ExportArg> for ExportFormat {
    fn from(format: ExportArg) -> Self {
        match format {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Csv => ExportFormat::Csv,
            ExportArg::Dot => ExportFormat::Dot,
        }
    }
}

/// One `-a key=value[:show]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeArg {
    pub name: String,
    pub value: String,
    pub display_in_tree: bool,
}

/// Parse `key=value`, `key=value:show` or `key=value:hide`.
pub fn parse_attribute(raw: &str) -> Result<AttributeArg, String> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let (value, display_in_tree) = match rest.rsplit_once(':') {
        Some((value, "show")) => (value, true),
        Some((value, "hide")) => (value, false),
        _ => (rest, false),
    };
    if name.trim().is_empty() {
        return Err(format!("attribute name missing in '{raw}'"));
    }
    Ok(AttributeArg {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        display_in_tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_show_suffix_when_parsing_attribute_then_is_visible() {
        let attr = parse_attribute("cost=high:show").expect("parse");
        assert_eq!(attr.name, "cost");
        assert_eq!(attr.value, "high");
        assert!(attr.display_in_tree);
    }

    #[test]
    fn given_colon_in_value_when_parsing_attribute_then_keeps_value() {
        let attr = parse_attribute("url=http://host:8080").expect("parse");
        assert_eq!(attr.value, "http://host:8080");
        assert!(!attr.display_in_tree);
    }

    #[test]
    fn given_no_equals_sign_when_parsing_attribute_then_fails() {
        assert!(parse_attribute("cost").is_err());
        assert!(parse_attribute("=high").is_err());
    }
}
