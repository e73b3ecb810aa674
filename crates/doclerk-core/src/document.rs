/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document trees.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`], with the
//! root at index 0. Parent links and child lists are indices, so the tree
//! has no ownership cycles. The document also owns the [`Context`] every
//! node's fields are evaluated in.
//!
//! Nodes are read through [`NodeRef`], a copyable handle pairing a document
//! with a node id. Text fields are stored as compiled expressions and
//! evaluated on every access.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

use doclerk_expr::{Binding, Context, ExprResult, Expression, FunctionRef, Scope};

use crate::parts::PartSet;
use crate::reference::{StepTarget, undefined_section};
use crate::root::{DocRoot, Titled};

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every document.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Section,
    Scenario,
    Step,
    StepReference,
}

/// The text fields of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepField {
    Title,
    Description,
    PreCondition,
    RequiredData,
    ExpectedResult,
    Comment,
}

impl StepField {
    pub const ALL: [StepField; 6] = [
        StepField::Title,
        StepField::Description,
        StepField::PreCondition,
        StepField::RequiredData,
        StepField::ExpectedResult,
        StepField::Comment,
    ];

    /// The field's name in source data.
    pub fn key(self) -> &'static str {
        match self {
            StepField::Title => "title",
            StepField::Description => "description",
            StepField::PreCondition => "preCondition",
            StepField::RequiredData => "requiredData",
            StepField::ExpectedResult => "expectedResult",
            StepField::Comment => "comment",
        }
    }
}

impl fmt::Display for StepField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-kind content of a node.
#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Root {
        title: Expression,
    },
    Section {
        title: Expression,
    },
    Scenario {
        title: Expression,
        goal: Expression,
        context: Expression,
    },
    /// Indexed by `StepField as usize`.
    Step {
        fields: [Expression; 6],
    },
    StepReference {
        target: StepTarget,
    },
}

impl NodeData {
    fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root { .. } => NodeKind::Root,
            NodeData::Section { .. } => NodeKind::Section,
            NodeData::Scenario { .. } => NodeKind::Scenario,
            NodeData::Step { .. } => NodeKind::Step,
            NodeData::StepReference { .. } => NodeKind::StepReference,
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A built document tree. Immutable once built.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    context: Context,
}

impl Document {
    pub(crate) fn new(id: Option<String>, title: Expression, context: Context) -> Self {
        Self {
            nodes: vec![Node {
                id,
                parent: None,
                children: Vec::new(),
                data: NodeData::Root { title },
            }],
            context,
        }
    }

    /// An empty document: no id, no title, no parts and an empty context.
    pub fn blank() -> Self {
        Self::new(None, Expression::null(), Context::new())
    }

    /// Append a node under `parent` and return its id.
    pub(crate) fn push(&mut self, parent: NodeId, id: Option<String>, data: NodeData) -> NodeId {
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(node_id);
        node_id
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            document: self,
            id: NodeId::ROOT,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { document: self, id })
    }

    /// Every node, in the order it was added.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |i| NodeRef {
            document: self,
            id: NodeId(i),
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The context every node of this document is evaluated in.
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Scope for Document {
    fn get_var(&self, name: &str) -> ExprResult<Binding<'_>> {
        self.context.get_var(name)
    }

    fn get_function(&self, name: &str) -> ExprResult<FunctionRef<'_>> {
        self.context.get_function(name)
    }
}

impl Titled for Document {
    fn title(&self) -> ExprResult<Option<String>> {
        self.root().title()
    }
}

impl DocRoot for Document {
    fn id(&self) -> Option<String> {
        self.root().id().map(str::to_string)
    }

    fn parts(&self) -> PartSet<'_> {
        self.root().children().collect()
    }
}

/// A node of a specific document.
///
/// Two handles are equal when they name the same node of the same document
/// instance, whatever their content.
#[derive(Clone, Copy)]
pub struct NodeRef<'d> {
    document: &'d Document,
    id: NodeId,
}

impl<'d> NodeRef<'d> {
    fn node(self) -> &'d Node {
        &self.document.nodes[self.id.0]
    }

    fn handle(self, id: NodeId) -> NodeRef<'d> {
        NodeRef {
            document: self.document,
            id,
        }
    }

    fn evaluate(self, expr: &Expression) -> ExprResult<String> {
        expr.evaluate_string(&self.document.context)
    }

    pub fn document(self) -> &'d Document {
        self.document
    }

    pub fn node_id(self) -> NodeId {
        self.id
    }

    pub fn kind(self) -> NodeKind {
        self.node().kind()
    }

    /// The node's identifier; absent for roots without one, unnamed steps
    /// and step references.
    pub fn id(self) -> Option<&'d str> {
        self.node().id()
    }

    pub fn parent(self) -> Option<NodeRef<'d>> {
        self.node().parent.map(|id| self.handle(id))
    }

    pub fn root(self) -> NodeRef<'d> {
        self.handle(NodeId::ROOT)
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'d>> {
        self.node().children.iter().map(move |&id| self.handle(id))
    }

    /// The first child with the given identifier.
    pub fn child(self, id: &str) -> Option<NodeRef<'d>> {
        self.children().find(|child| child.id() == Some(id))
    }

    /// Evaluate one step field.
    ///
    /// Step references compute their title and description from the target
    /// and leave every other field empty. Other kinds only have a title.
    pub fn step_field(self, field: StepField) -> ExprResult<String> {
        match (&self.node().data, field) {
            (NodeData::Step { fields }, _) => self.evaluate(&fields[field as usize]),
            (NodeData::StepReference { target }, StepField::Title) => {
                Ok(target.title(&self.section_title(&target.section)?))
            }
            (NodeData::StepReference { target }, StepField::Description) => {
                Ok(target.description(&self.section_title(&target.section)?))
            }
            (_, StepField::Title) => Ok(self.title()?.unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }

    /// A scenario's goal; empty for other kinds.
    pub fn goal(self) -> ExprResult<String> {
        match &self.node().data {
            NodeData::Scenario { goal, .. } => self.evaluate(goal),
            _ => Ok(String::new()),
        }
    }

    /// A scenario's context text; empty for other kinds.
    pub fn scenario_context(self) -> ExprResult<String> {
        match &self.node().data {
            NodeData::Scenario { context, .. } => self.evaluate(context),
            _ => Ok(String::new()),
        }
    }

    /// Title of the root part named `id`, or a placeholder when no part
    /// matches.
    fn section_title(self, id: &str) -> ExprResult<String> {
        match self.root().child(id) {
            Some(section) => Ok(section.title()?.unwrap_or_default()),
            None => Ok(undefined_section(id)),
        }
    }
}

impl Titled for NodeRef<'_> {
    fn title(&self) -> ExprResult<Option<String>> {
        let expr = match &self.node().data {
            NodeData::Root { title }
            | NodeData::Section { title }
            | NodeData::Scenario { title, .. } => title,
            NodeData::Step { fields } => &fields[StepField::Title as usize],
            NodeData::StepReference { target } => {
                return Ok(Some(target.title(&self.section_title(&target.section)?)));
            }
        };
        Ok(expr.evaluate(&self.document.context)?.into_option())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.document, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .field("node", &self.id.0)
            .finish()
    }
}
