use std::fmt;
use super::ast::NodeId;
use super::scope::ScopedTable;

/// Permanent home of symbols, keyed by sequence number.
pub type StorageTable = ScopedTable<'static, usize, Symbol>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SymbolKind {
    GlobalVariable,
    Function,
    Parameter,
    LocalVariable,
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match *self {
            SymbolKind::GlobalVariable => "Global Variable",
            SymbolKind::Function => "Function",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::LocalVariable => "Local Variable",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Address of a symbol inside the storage tables.
///
/// Globals are found by their sequence number in the global table; locals
/// by the sequence number of the function that owns them, then their own.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SymbolRef {
    Global(usize),
    Local { function: usize, seq: usize },
}

#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub seq: usize,
    /// Declaring node.
    pub node: NodeId,
    /// Parameters and locals; only functions have one.
    pub locals: Option<StorageTable>,
    pub parameter_count: usize,
}

impl Symbol {
    pub fn new(name: String, kind: SymbolKind, seq: usize, node: NodeId) -> Self {
        Self {
            name: name,
            kind: kind,
            seq: seq,
            node: node,
            locals: None,
            parameter_count: 0,
        }
    }

    pub fn is_function(&self) -> bool {
        self.kind == SymbolKind::Function
    }

    pub fn locals(&self) -> Option<&StorageTable> {
        self.locals.as_ref()
    }
}

impl ScopedTable<'static, usize, Symbol> {
    /// Stores a new symbol under the next value of `seq` and returns the
    /// sequence number it was given.
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        node: NodeId,
        seq: &mut usize,
    ) -> usize {
        let assigned = *seq;
        *seq += 1;
        trace!("declare {} `{}` as [{}]", kind, name, assigned);
        self.insert(assigned, Symbol::new(name.to_string(), kind, assigned, node));
        assigned
    }

    /// Symbols in sequence order.
    pub fn by_seq(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.values().collect();
        symbols.sort_by_key(|symbol| symbol.seq);
        symbols
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Symbol> {
        self.values().find(|symbol| symbol.name == name)
    }
}

#[test]
fn test_declare_consumes_counter() {
    let mut table = StorageTable::new(16);
    let mut seq = 0;
    assert_eq!(table.declare("x", SymbolKind::GlobalVariable, NodeId::from_index(0), &mut seq), 0);
    assert_eq!(table.declare("main", SymbolKind::Function, NodeId::from_index(1), &mut seq), 1);
    assert_eq!(seq, 2);
    assert_eq!(table.lookup_local(&1usize).map(|s| s.name.as_str()), Some("main"));
    assert_eq!(table.lookup_local(&0usize).map(|s| s.kind), Some(SymbolKind::GlobalVariable));
}

#[test]
fn test_by_seq_sorts_regardless_of_buckets() {
    let mut table = StorageTable::new(3);
    let mut seq = 0;
    for name in &["a", "b", "c", "d", "e"] {
        table.declare(name, SymbolKind::LocalVariable, NodeId::from_index(0), &mut seq);
    }
    let names: Vec<&str> = table.by_seq().into_iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(table.find_by_name("d").map(|s| s.seq), Some(3));
}

#[test]
fn test_kind_descriptions() {
    assert_eq!(SymbolKind::GlobalVariable.to_string(), "Global Variable");
    assert_eq!(SymbolKind::LocalVariable.to_string(), "Local Variable");
}
