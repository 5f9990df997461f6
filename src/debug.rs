//! Concrete syntax tree dump for `gopretty debug`

use std::io::{self, Write};

use tree_sitter::Node;

/// Writes `node` and its descendants, one per line, indented by depth. Leaves
/// show their source text; multi-line text is quoted.
pub fn dump_tree<W: Write>(out: &mut W, node: Node, source: &str, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let start = node.start_position();
    let end = node.end_position();
    let span = format!(
        "{}:{}-{}:{}",
        start.row + 1,
        start.column + 1,
        end.row + 1,
        end.column + 1
    );
    let kind = if node.is_missing() {
        format!("MISSING {}", node.kind())
    } else {
        node.kind().to_string()
    };

    if node.child_count() == 0 {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("<error>");
        if text.contains('\n') {
            writeln!(out, "{indent}{kind}@{span} {text:?}")?;
        } else {
            writeln!(out, "{indent}{kind}@{span} '{text}'")?;
        }
        return Ok(());
    }

    writeln!(out, "{indent}{kind}@{span}")?;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        dump_tree(out, child, source, depth + 1)?;
    }
    Ok(())
}
