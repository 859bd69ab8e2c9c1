use super::super::error::{SemanticError, SemanticResult};
use super::super::scope::ScopedTable;
use super::super::symbol::SymbolRef;

/// Name-keyed lookup table. Lives only while its scope is being bound and
/// holds handles into the storage tables, never the symbols themselves.
pub type Environment<'p> = ScopedTable<'p, String, SymbolRef>;

/// Makes `name` visible in the innermost scope of `env`. A name already
/// declared in that same scope is rejected; outer declarations are shadowed.
pub fn bind_name(env: &mut Environment, name: &str, symbol: SymbolRef) -> SemanticResult<()> {
    if env.lookup_local(name).is_some() {
        return Err(SemanticError::DuplicateDeclaration { name: name.to_string() });
    }
    trace!("bind `{}` -> {:?} at depth {}", name, symbol, env.depth());
    env.insert(name.to_string(), symbol);
    Ok(())
}

#[test]
fn test_bind_name_shadows_outer_scope() {
    let mut outer = Environment::new(4);
    bind_name(&mut outer, "a", SymbolRef::Global(0)).unwrap();
    let mut inner = Environment::with_parent(4, Some(&outer));
    bind_name(&mut inner, "a", SymbolRef::Local { function: 1, seq: 0 }).unwrap();

    assert_eq!(inner.lookup_chain("a"), Some(&SymbolRef::Local { function: 1, seq: 0 }));
    assert_eq!(outer.lookup_chain("a"), Some(&SymbolRef::Global(0)));
}

#[test]
fn test_bind_name_rejects_same_scope_duplicate() {
    let mut env = Environment::new(4);
    bind_name(&mut env, "a", SymbolRef::Global(0)).unwrap();
    assert_eq!(
        bind_name(&mut env, "a", SymbolRef::Global(1)),
        Err(SemanticError::DuplicateDeclaration { name: "a".to_string() })
    );
    assert_eq!(env.len(), 1);
}
