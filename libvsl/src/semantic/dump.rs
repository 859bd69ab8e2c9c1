use itertools::Itertools;
use std::fmt;
use super::super::symbol::{StorageTable, Symbol, SymbolKind};
use super::context::CompilationContext;

/// Every symbol reachable from `table`, each function followed by its
/// locals.
pub fn enumerate(table: &StorageTable) -> Vec<&Symbol> {
    let mut out = Vec::new();
    enumerate_into(table, &mut out);
    out
}

fn enumerate_into<'t>(table: &'t StorageTable, out: &mut Vec<&'t Symbol>) {
    for symbol in table.by_seq() {
        out.push(symbol);
        if let Some(locals) = symbol.locals() {
            enumerate_into(locals, out);
        }
    }
}

/// Human-readable listing of the symbol tables and the string pool.
pub struct SymbolTableDump<'a> {
    context: &'a CompilationContext,
}

impl<'a> SymbolTableDump<'a> {
    pub fn new(context: &'a CompilationContext) -> Self {
        Self { context: context }
    }
}

impl<'a> fmt::Display for SymbolTableDump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Global Symbol Table")?;
        write_table(f, &self.context.globals)?;
        writeln!(f)?;
        writeln!(f, "String List")?;
        for (index, text) in self.context.strings.iter() {
            writeln!(f, "{} - {}", index, text)?;
        }
        Ok(())
    }
}

fn write_table(f: &mut fmt::Formatter, table: &StorageTable) -> fmt::Result {
    let symbols = table.by_seq();
    for symbol in &symbols {
        writeln!(f, "{} [{}] = {}", symbol.kind, symbol.seq, symbol.name)?;
    }
    for symbol in &symbols {
        if let Some(locals) = symbol.locals() {
            writeln!(f)?;
            writeln!(f, "{} \"{}\" Symbol Table", symbol.kind, symbol.name)?;
            write_table(f, locals)?;
        }
    }
    Ok(())
}

/// A symbol as it was when teardown released it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Released {
    /// Sequence number of the owning function, `None` for globals.
    pub owner: Option<usize>,
    pub kind: SymbolKind,
    pub seq: usize,
    pub name: String,
}

/// Record of one teardown, in release order.
#[derive(Debug, Default)]
pub struct Teardown {
    pub released: Vec<Released>,
}

impl Teardown {
    pub fn len(&self) -> usize {
        self.released.len()
    }

    pub fn is_empty(&self) -> bool {
        self.released.is_empty()
    }

    pub fn summary(&self) -> String {
        self.released
            .iter()
            .map(|symbol| symbol.kind)
            .counts()
            .into_iter()
            .sorted_by_key(|&(kind, _)| kind.describe())
            .map(|(kind, count)| format!("{} {}", count, kind))
            .join(", ")
    }
}

/// Releases every symbol owned by `table`: locals of a function go before
/// the function itself, and the table's own storage goes last.
pub fn destroy_recursive(table: StorageTable, owner: Option<usize>, teardown: &mut Teardown) {
    for (_, symbol) in table.into_entries() {
        let Symbol { name, kind, seq, locals, .. } = symbol;
        if let Some(locals) = locals {
            destroy_recursive(locals, Some(seq), teardown);
        }
        trace!("release {} [{}] = {}", kind, seq, name);
        teardown.released.push(Released {
            owner: owner,
            kind: kind,
            seq: seq,
            name: name,
        });
    }
}

impl CompilationContext {
    /// Ends the compilation. Name tables are gone by now; only the storage
    /// tables still own symbols.
    pub fn destroy(self) -> Teardown {
        let mut teardown = Teardown::default();
        destroy_recursive(self.globals, None, &mut teardown);
        debug!("teardown released {} symbols", teardown.len());
        teardown
    }
}
