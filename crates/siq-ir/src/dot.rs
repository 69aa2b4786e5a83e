//! Graphviz rendering of IR trees.
//!
//! Walks a tree purely through the child-iteration protocol, so it needs no
//! per-kind code and keeps working for any node a future pass produces.

use crate::iter::NodeRef;

/// Renders `node` and its subtree as a graphviz `digraph`.
///
/// Each vertex is labelled with the node name, plus its content when there
/// is one. Vertex ids are assigned in visit order, so output is
/// deterministic for a given tree.
pub fn dump_dot(node: NodeRef<'_>) -> String {
    let mut out = String::from("digraph {\n");
    let mut counter = 0;
    write_node(&mut out, node, &mut counter);
    out.push_str("}\n");
    out
}

/// Writes one vertex and its outgoing edges, returning the vertex id.
fn write_node(out: &mut String, node: NodeRef<'_>, counter: &mut usize) -> usize {
    let id = *counter;
    *counter += 1;

    out.push_str(&format!("  n{id} [ label = \"{}\" ]\n", label(node)));

    for child in node.children() {
        let child_id = write_node(out, child, counter);
        out.push_str(&format!("  n{id} -> n{child_id}\n"));
    }

    id
}

/// Builds a vertex label, escaped for the DOT quoted-string form.
fn label(node: NodeRef<'_>) -> String {
    let content = node.content();
    let text = if content.is_empty() {
        node.name().to_string()
    } else {
        format!("{} ({})", node.name(), content)
    };
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_query, sql::parse_sql};

    /// Finds the vertex id carrying `label` in rendered output.
    fn id_of(dot: &str, label: &str) -> String {
        let needle = format!(" [ label = \"{label}\" ]");
        let line = dot
            .lines()
            .find(|line| line.ends_with(&needle))
            .unwrap_or_else(|| panic!("no vertex labelled {label:?}"));
        line.trim_start().split(' ').next().unwrap().to_string()
    }

    #[test]
    fn statement_edges() {
        let stmt = parse_sql(
            "select a from b where c = 1 or d hastag \"x\" and 2 <= e order by e asc limit 0, 10",
        )
        .unwrap();
        let dot = dump_dot(NodeRef::SearchStmt(&stmt));

        let search_stmt = id_of(&dot, "SearchStmt");
        let or_expr = id_of(&dot, "OrExpr");
        let and_expr = id_of(&dot, "AndExpr");

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains(&format!("{search_stmt} -> {or_expr}")));
        assert!(dot.contains(&format!("{or_expr} -> {and_expr}")));
    }

    #[test]
    fn leaf_labels_carry_content() {
        let expr = parse_query("@a:[1 2]").unwrap();
        let dot = dump_dot(NodeRef::from(&expr));

        assert!(dot.contains("[ label = \"FieldRef (a)\" ]"));
        assert!(dot.contains("[ label = \"NumericLiteral (1)\" ]"));
        assert!(dot.contains("[ label = \"NumericCompareExpr (>=)\" ]"));
    }

    #[test]
    fn string_content_is_escaped() {
        let expr = parse_query("@a:{x}").unwrap();
        let dot = dump_dot(NodeRef::from(&expr));

        // the literal's own quotes must not terminate the DOT label
        assert!(dot.contains("[ label = \"StringLiteral (\\\"x\\\")\" ]"));
    }
}
