//! Pass 1: install each node's parent link.
//!
//! The only pass that descends into template bodies: clones made during
//! expansion locate their enclosing template context through these links.

use anodec_ast::NodeId;

use crate::walk::{Pass, PassContext};

pub struct ParentLinks {
    stack: Vec<NodeId>,
}

impl ParentLinks {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }
}

impl Default for ParentLinks {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ParentLinks {
    fn name(&self) -> &'static str {
        "parent-links"
    }

    fn visits_template_bodies(&self) -> bool {
        true
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        if let Some(&parent) = self.stack.last() {
            pcx.cx.set_parent(node, parent);
        }
        self.stack.push(node);
        true
    }

    fn leave(&mut self, _pcx: &mut PassContext<'_>, node: NodeId) {
        let popped = self.stack.pop();
        debug_assert_eq!(popped, Some(node));
    }
}
