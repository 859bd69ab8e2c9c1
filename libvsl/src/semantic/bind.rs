use std::mem;
use super::super::ast::*;
use super::super::error::{SemanticError, SemanticResult};
use super::super::symbol::{StorageTable, SymbolKind, SymbolRef};
use super::context::CompilationContext;
use super::environment::{bind_name, Environment};
use super::scan::{declared_identifiers, identifier_name, FunctionParts};
use super::string_pool::StringPool;

/// Second phase: resolves every identifier inside function bodies and
/// interns string literals. Requires the global scan to have run.
pub trait NameBinder {
    fn bind_names(&mut self) -> SemanticResult<()>;
}

impl NameBinder for CompilationContext {

    fn bind_names(&mut self) -> SemanticResult<()> {
        let CompilationContext { ref mut tree, ref mut globals, ref mut strings, options } = *self;

        let mut global_scope = Environment::new(options.global_buckets);
        for symbol in globals.by_seq() {
            bind_name(&mut global_scope, &symbol.name, SymbolRef::Global(symbol.seq))?;
        }

        // Sequence order keeps string pool indices in source order.
        let functions: Vec<usize> = globals.by_seq()
            .into_iter()
            .filter(|symbol| symbol.is_function())
            .map(|symbol| symbol.seq)
            .collect();
        for seq in functions {
            let function = match globals.lookup_local_mut(&seq) {
                Some(function) => function,
                None => continue,
            };
            debug!("binding names in `{}`", function.name);
            let body = FunctionParts::of(tree, function.node)?.body;
            let locals = function.locals
                .get_or_insert_with(|| StorageTable::new(options.scope_buckets));
            let mut binder = FunctionBinder {
                tree: &mut *tree,
                strings: &mut *strings,
                function: seq,
                next_seq: locals.len(),
                locals: locals,
                buckets: options.scope_buckets,
            };
            binder.bind(body, &global_scope)?;
        }
        Ok(())
    }

}

/// Walks one function body. Scopes are pushed by building a table whose
/// parent is the enclosing one and popped by dropping it.
struct FunctionBinder<'a> {
    tree: &'a mut Tree,
    strings: &'a mut StringPool,
    locals: &'a mut StorageTable,
    function: usize,
    next_seq: usize,
    buckets: usize,
}

impl<'a> FunctionBinder<'a> {

    fn bind(&mut self, body: NodeId, globals: &Environment) -> SemanticResult<()> {
        let mut parameters = Environment::with_parent(self.buckets, Some(globals));
        for parameter in self.locals.by_seq() {
            if parameter.kind == SymbolKind::Parameter {
                bind_name(&mut parameters, &parameter.name, self.local_ref(parameter.seq))?;
            }
        }
        self.bind_block(body, &parameters)
    }

    fn bind_block(&mut self, block: NodeId, parent: &Environment) -> SemanticResult<()> {
        let mut scope = Environment::with_parent(self.buckets, Some(parent));
        trace!("enter block at depth {}", scope.depth());
        self.bind_children(block, &mut scope)?;
        trace!("leave block at depth {}", scope.depth());
        Ok(())
    }

    fn bind_children(&mut self, node: NodeId, scope: &mut Environment) -> SemanticResult<()> {
        for index in 0..self.tree[node].children.len() {
            let child = self.tree[node].children[index];
            self.bind_node(child, scope)?;
        }
        Ok(())
    }

    fn bind_node(&mut self, node: NodeId, scope: &mut Environment) -> SemanticResult<()> {
        match self.tree[node].kind {
            NodeKind::Block => self.bind_block(node, scope),
            NodeKind::Declaration => self.declare_locals(node, scope),
            NodeKind::Identifier => self.resolve(node, scope),
            NodeKind::StringLiteral => self.intern(node),
            NodeKind::Program |
            NodeKind::GlobalList |
            NodeKind::Function |
            NodeKind::VariableList |
            NodeKind::DeclarationList |
            NodeKind::StatementList |
            NodeKind::Assignment |
            NodeKind::Return |
            NodeKind::Print |
            NodeKind::PrintList |
            NodeKind::Null |
            NodeKind::If |
            NodeKind::While |
            NodeKind::Relation |
            NodeKind::Expression |
            NodeKind::ArgumentList |
            NodeKind::Number => self.bind_children(node, scope),
        }
    }

    fn declare_locals(&mut self, declaration: NodeId, scope: &mut Environment) -> SemanticResult<()> {
        for identifier in declared_identifiers(self.tree, declaration)? {
            let name = identifier_name(self.tree, identifier)?.to_string();
            let seq = self.locals.declare(
                &name,
                SymbolKind::LocalVariable,
                identifier,
                &mut self.next_seq,
            );
            let symbol = self.local_ref(seq);
            debug!("local `{}` [{}] at depth {}", name, seq, scope.depth());
            bind_name(scope, &name, symbol)?;
            self.tree[identifier].entry = Some(symbol);
        }
        Ok(())
    }

    fn resolve(&mut self, identifier: NodeId, scope: &Environment) -> SemanticResult<()> {
        let symbol = {
            let name = identifier_name(self.tree, identifier)?;
            match scope.lookup_chain(name) {
                Some(symbol) => *symbol,
                None => {
                    return Err(SemanticError::UnknownIdentifier { name: name.to_string() });
                },
            }
        };
        trace!("resolved {:?} -> {:?}", self.tree[identifier].name(), symbol);
        self.tree[identifier].entry = Some(symbol);
        Ok(())
    }

    fn intern(&mut self, literal: NodeId) -> SemanticResult<()> {
        let text = match mem::replace(&mut self.tree[literal].data, NodeData::None) {
            NodeData::Text(text) => text,
            other => {
                self.tree[literal].data = other;
                return Err(SemanticError::malformed("string literal without text"));
            },
        };
        let index = self.strings.append(text);
        self.tree[literal].data = NodeData::StringIndex(index);
        Ok(())
    }

    fn local_ref(&self, seq: usize) -> SymbolRef {
        SymbolRef::Local {
            function: self.function,
            seq: seq,
        }
    }

}
