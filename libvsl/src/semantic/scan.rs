use super::super::ast::*;
use super::super::error::{SemanticError, SemanticResult};
use super::super::symbol::{StorageTable, SymbolKind, SymbolRef};
use super::context::CompilationContext;

/// First phase: every top-level declaration becomes a symbol in the global
/// storage table before any function body is looked at.
pub trait GlobalScanner {
    fn scan_globals(&mut self) -> SemanticResult<()>;
}

impl GlobalScanner for CompilationContext {

    fn scan_globals(&mut self) -> SemanticResult<()> {
        let global_list = global_list(&self.tree)?;
        let mut seq = 0;
        for index in 0..self.tree[global_list].children.len() {
            let global = self.tree[global_list].children[index];
            match self.tree[global].kind {
                NodeKind::Declaration => self.scan_declaration(global, &mut seq)?,
                NodeKind::Function => self.scan_function(global, &mut seq)?,
                kind => debug!("ignoring top-level {}", kind),
            }
        }
        info!("collected {} globals", self.globals.len());
        Ok(())
    }

}

impl CompilationContext {

    fn scan_declaration(&mut self, declaration: NodeId, seq: &mut usize) -> SemanticResult<()> {
        for identifier in declared_identifiers(&self.tree, declaration)? {
            let name = identifier_name(&self.tree, identifier)?.to_string();
            let assigned = self.globals.declare(&name, SymbolKind::GlobalVariable, identifier, seq);
            self.tree[identifier].entry = Some(SymbolRef::Global(assigned));
            debug!("global variable `{}` [{}]", name, assigned);
        }
        Ok(())
    }

    fn scan_function(&mut self, function: NodeId, seq: &mut usize) -> SemanticResult<()> {
        let parts = FunctionParts::of(&self.tree, function)?;
        let name = identifier_name(&self.tree, parts.name)?.to_string();
        let assigned = self.globals.declare(&name, SymbolKind::Function, function, seq);
        self.tree[parts.name].entry = Some(SymbolRef::Global(assigned));

        let mut locals = StorageTable::new(self.options.scope_buckets);
        let mut local_seq = 0;
        for parameter in &parts.parameters {
            let parameter_name = identifier_name(&self.tree, *parameter)?;
            let parameter_seq = locals.declare(
                parameter_name,
                SymbolKind::Parameter,
                *parameter,
                &mut local_seq,
            );
            self.tree[*parameter].entry = Some(SymbolRef::Local {
                function: assigned,
                seq: parameter_seq,
            });
        }
        debug!("function `{}` [{}] with {} parameters", name, assigned, parts.parameters.len());

        if let Some(symbol) = self.globals.lookup_local_mut(&assigned) {
            symbol.parameter_count = parts.parameters.len();
            symbol.locals = Some(locals);
        }
        Ok(())
    }

}

/// The pieces of a function node: `[identifier, parameters?, block]`.
pub struct FunctionParts {
    pub name: NodeId,
    pub parameters: Vec<NodeId>,
    pub body: NodeId,
}

impl FunctionParts {
    pub fn of(tree: &Tree, function: NodeId) -> SemanticResult<FunctionParts> {
        let node = &tree[function];
        let (name, parameters, body) = match node.children.len() {
            3 => (node.children[0], Some(node.children[1]), node.children[2]),
            2 => (node.children[0], None, node.children[1]),
            n => {
                return Err(SemanticError::malformed(format!(
                    "function with {} children, expected identifier, parameters and block",
                    n
                )))
            },
        };
        if tree[name].kind != NodeKind::Identifier {
            return Err(SemanticError::malformed("function without an identifier"));
        }
        if tree[body].kind != NodeKind::Block {
            return Err(SemanticError::malformed(format!(
                "body of function `{}` is not a block",
                tree[name].name().unwrap_or("?")
            )));
        }
        let parameters = match parameters {
            Some(list) if tree[list].kind == NodeKind::VariableList => identifiers_in(tree, list),
            Some(_) => {
                return Err(SemanticError::malformed(format!(
                    "parameters of function `{}` are not a variable list",
                    tree[name].name().unwrap_or("?")
                )))
            },
            None => Vec::new(),
        };
        Ok(FunctionParts {
            name: name,
            parameters: parameters,
            body: body,
        })
    }
}

pub fn global_list(tree: &Tree) -> SemanticResult<NodeId> {
    let root = tree.root()
        .ok_or_else(|| SemanticError::malformed("syntax tree has no root"))?;
    tree[root].child(0)
        .ok_or_else(|| SemanticError::malformed("program without a global list"))
}

/// Identifiers named by a declaration node, whose first child lists them.
pub fn declared_identifiers(tree: &Tree, declaration: NodeId) -> SemanticResult<Vec<NodeId>> {
    let list = tree[declaration].child(0)
        .ok_or_else(|| SemanticError::malformed("declaration without an identifier list"))?;
    Ok(identifiers_in(tree, list))
}

pub fn identifier_name(tree: &Tree, identifier: NodeId) -> SemanticResult<&str> {
    tree[identifier].name()
        .ok_or_else(|| SemanticError::malformed("identifier without a name"))
}

fn identifiers_in(tree: &Tree, list: NodeId) -> Vec<NodeId> {
    tree[list].children
        .iter()
        .cloned()
        .filter(|child| tree[*child].kind == NodeKind::Identifier)
        .collect()
}
