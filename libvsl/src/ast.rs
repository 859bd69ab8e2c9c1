use std::fmt;
use std::ops::{Index, IndexMut};
use super::symbol::SymbolRef;

/// Stable handle to a node owned by a `Tree`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    Program,
    GlobalList,
    Declaration,
    Function,
    VariableList,
    Block,
    DeclarationList,
    StatementList,
    Assignment,
    Return,
    Print,
    PrintList,
    Null,
    If,
    While,
    Relation,
    Expression,
    ArgumentList,
    Identifier,
    Number,
    StringLiteral,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match *self {
            NodeKind::Program => "PROGRAM",
            NodeKind::GlobalList => "GLOBAL_LIST",
            NodeKind::Declaration => "DECLARATION",
            NodeKind::Function => "FUNCTION",
            NodeKind::VariableList => "VARIABLE_LIST",
            NodeKind::Block => "BLOCK",
            NodeKind::DeclarationList => "DECLARATION_LIST",
            NodeKind::StatementList => "STATEMENT_LIST",
            NodeKind::Assignment => "ASSIGNMENT_STATEMENT",
            NodeKind::Return => "RETURN_STATEMENT",
            NodeKind::Print => "PRINT_STATEMENT",
            NodeKind::PrintList => "PRINT_LIST",
            NodeKind::Null => "NULL_STATEMENT",
            NodeKind::If => "IF_STATEMENT",
            NodeKind::While => "WHILE_STATEMENT",
            NodeKind::Relation => "RELATION",
            NodeKind::Expression => "EXPRESSION",
            NodeKind::ArgumentList => "ARGUMENT_LIST",
            NodeKind::Identifier => "IDENTIFIER_DATA",
            NodeKind::Number => "NUMBER_DATA",
            NodeKind::StringLiteral => "STRING_DATA",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    Or,
    Xor,
    And,
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Not,
    Equal,
    Less,
    Greater,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match *self {
            Operator::Or => "|",
            Operator::Xor => "^",
            Operator::And => "&",
            Operator::Add => "+",
            Operator::Subtract | Operator::Negate => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Not => "~",
            Operator::Equal => "=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeData {
    None,
    Name(String),
    Number(i64),
    /// String literal text, until the symbol table builder moves it into
    /// the string pool.
    Text(String),
    StringIndex(usize),
    Operator(Operator),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub data: NodeData,
    /// Symbol this node declares or refers to, filled in by name binding.
    pub entry: Option<SymbolRef>,
}

impl Node {
    pub fn new(kind: NodeKind, data: NodeData, children: Vec<NodeId>) -> Self {
        Self {
            kind: kind,
            children: children,
            data: data,
            entry: None,
        }
    }

    pub fn leaf(kind: NodeKind, data: NodeData) -> Self {
        Self::new(kind, data, Vec::new())
    }

    pub fn name(&self) -> Option<&str> {
        match self.data {
            NodeData::Name(ref name) => Some(name),
            _ => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).cloned()
    }
}

/// Arena owning every node of one program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Indented listing of the tree below the root, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.dump_node(root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self[id];
        out.push_str(&" ".repeat(depth));
        out.push_str(node.kind.name());
        match node.data {
            NodeData::None => {},
            NodeData::Name(ref name) => out.push_str(&format!("({})", name)),
            NodeData::Number(n) => out.push_str(&format!("({})", n)),
            NodeData::Text(ref text) => out.push_str(&format!("(\"{}\")", text)),
            NodeData::StringIndex(index) => out.push_str(&format!("(#{})", index)),
            NodeData::Operator(op) => out.push_str(&format!("({})", op.symbol())),
        }
        out.push('\n');
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[test]
fn test_push_returns_sequential_ids() {
    let mut tree = Tree::new();
    let a = tree.push(Node::leaf(NodeKind::Identifier, NodeData::Name("a".to_string())));
    let b = tree.push(Node::leaf(NodeKind::Number, NodeData::Number(1)));
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(tree[a].name(), Some("a"));
    assert_eq!(tree[b].name(), None);
}

#[test]
fn test_dump_indents_children() {
    let mut tree = Tree::new();
    let x = tree.push(Node::leaf(NodeKind::Identifier, NodeData::Name("x".to_string())));
    let text = tree.push(Node::leaf(NodeKind::StringLiteral, NodeData::Text("hi".to_string())));
    let list = tree.push(Node::new(NodeKind::PrintList, NodeData::None, vec![x, text]));
    tree.set_root(list);
    assert_eq!(tree.dump(), "PRINT_LIST\n IDENTIFIER_DATA(x)\n STRING_DATA(\"hi\")\n");
}
