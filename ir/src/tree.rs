//! ASCII tree rendering of statements, for log fields and debugging.

use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use ptree::{Style, TreeItem};

use crate::stmt::Stmt;

#[derive(Clone)]
struct StmtTree(Arc<Stmt>);

impl TreeItem for StmtTree {
    type Child = StmtTree;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", format_node(&self.0))
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Owned(self.0.children().into_iter().map(|c| StmtTree(c.clone())).collect())
    }
}

/// One-line summary of a node, without its children.
fn format_node(stmt: &Stmt) -> String {
    match stmt {
        Stmt::For { loop_var, min, extent, kind, .. } => format!("For {loop_var} in {kind}({min}, {extent})"),
        Stmt::Allocate { buffer, .. } => {
            let shape: Vec<String> = buffer.shape().iter().map(ToString::to_string).collect();
            format!("Allocate {buffer}: {}[{}] @{}", buffer.dtype(), shape.join(", "), buffer.scope())
        }
        Stmt::BufferStore { buffer, indices, value } => {
            let indices: Vec<String> = indices.iter().map(ToString::to_string).collect();
            format!("BufferStore {buffer}[{}] = {value}", indices.join(", "))
        }
        Stmt::Seq(items) => format!("Seq(len={})", items.len()),
        Stmt::Attr { key, value, .. } => format!("Attr {key} = {value}"),
        Stmt::Let { var, value, .. } => format!("Let {var} = {value}"),
        Stmt::IfThenElse { cond, .. } => format!("IfThenElse {cond}"),
        Stmt::Evaluate(value) => format!("Evaluate {value}"),
    }
}

/// Render a statement tree with one line per node.
pub fn render_tree(stmt: &Arc<Stmt>) -> String {
    let mut buf = Vec::new();
    if let Err(err) = ptree::write_tree(&StmtTree(stmt.clone()), &mut buf) {
        return format!("<tree rendering failed: {err}>");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

impl Stmt {
    /// Render this statement and its children as an ASCII tree.
    pub fn tree(self: &Arc<Self>) -> String {
        render_tree(self)
    }
}
