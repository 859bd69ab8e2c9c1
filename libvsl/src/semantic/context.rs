use super::super::ast::{NodeId, Tree};
use super::super::symbol::{StorageTable, Symbol, SymbolRef};
use super::string_pool::StringPool;

/// Bucket counts for the tables built during analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnalysisOptions {
    /// The global storage table and the global name table.
    pub global_buckets: usize,
    /// Every function's locals table and every scope's name table.
    pub scope_buckets: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            global_buckets: 64,
            scope_buckets: 16,
        }
    }
}

/// Everything one compilation produces: the tree, annotated in place, the
/// global storage table that owns every symbol, and the string pool.
#[derive(Debug)]
pub struct CompilationContext {
    pub tree: Tree,
    pub globals: StorageTable,
    pub strings: StringPool,
    pub options: AnalysisOptions,
}

impl CompilationContext {
    pub fn new(tree: Tree) -> Self {
        Self::with_options(tree, AnalysisOptions::default())
    }

    pub fn with_options(tree: Tree, options: AnalysisOptions) -> Self {
        Self {
            tree: tree,
            globals: StorageTable::new(options.global_buckets),
            strings: StringPool::new(),
            options: options,
        }
    }

    pub fn symbol(&self, symbol: SymbolRef) -> Option<&Symbol> {
        match symbol {
            SymbolRef::Global(seq) => self.globals.lookup_local(&seq),
            SymbolRef::Local { function, seq } => {
                self.globals.lookup_local(&function)
                    .and_then(|function| function.locals())
                    .and_then(|locals| locals.lookup_local(&seq))
            },
        }
    }

    /// Symbol bound to `node`, if binding reached it.
    pub fn resolved(&self, node: NodeId) -> Option<&Symbol> {
        self.tree.get(node)
            .and_then(|node| node.entry)
            .and_then(|symbol| self.symbol(symbol))
    }

    pub fn global(&self, name: &str) -> Option<&Symbol> {
        self.globals.find_by_name(name)
    }

    pub fn functions(&self) -> Vec<&Symbol> {
        self.globals.by_seq()
            .into_iter()
            .filter(|symbol| symbol.is_function())
            .collect()
    }
}
