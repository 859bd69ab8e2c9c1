use self::bind::NameBinder;
use self::scan::GlobalScanner;
use super::ast::Tree;
use super::error::SemanticResult;

mod bind;
mod context;
mod dump;
mod environment;
mod scan;
mod string_pool;

pub use self::context::{AnalysisOptions, CompilationContext};
pub use self::dump::{destroy_recursive, enumerate, Released, SymbolTableDump, Teardown};
pub use self::environment::{bind_name, Environment};
pub use self::string_pool::StringPool;

/// Builds the symbol table for `ctx.tree`: globals first, then the names
/// used inside each function. Stops at the first error.
pub fn create_symbol_table(ctx: &mut CompilationContext) -> SemanticResult<()> {
    info!("collecting globals");
    ctx.scan_globals()?;
    info!("binding names");
    ctx.bind_names()?;
    info!("{} strings interned", ctx.strings.len());
    Ok(())
}

pub fn analyze(tree: Tree, options: AnalysisOptions) -> SemanticResult<CompilationContext> {
    let mut ctx = CompilationContext::with_options(tree, options);
    create_symbol_table(&mut ctx)?;
    Ok(ctx)
}

#[cfg(test)]
use super::ast::{Node, NodeData, NodeId, NodeKind};
#[cfg(test)]
use super::error::SemanticError;
#[cfg(test)]
use super::parser;
#[cfg(test)]
use super::symbol::{SymbolKind, SymbolRef};

#[cfg(test)]
fn parse_str(input: &str) -> Tree {
    let (_, tokens) = parser::lex(input).unwrap();
    parser::parse(tokens).unwrap()
}

#[cfg(test)]
fn analyze_str(input: &str) -> SemanticResult<CompilationContext> {
    analyze(parse_str(input), AnalysisOptions::default())
}

/// Identifier nodes called `name`, in source order.
#[cfg(test)]
fn identifiers(ctx: &CompilationContext, name: &str) -> Vec<NodeId> {
    ctx.tree.iter()
        .filter(|&(_, node)| node.kind == NodeKind::Identifier && node.name() == Some(name))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
fn entries(ctx: &CompilationContext, name: &str) -> Vec<Option<SymbolRef>> {
    identifiers(ctx, name)
        .into_iter()
        .map(|id| ctx.tree[id].entry)
        .collect()
}

#[test]
fn test_global_variable_and_local_binding() {
    let ctx = analyze_str("
        var x
        func main()
        begin
            var y
            y := x
        end
    ").unwrap();

    let x = ctx.global("x").unwrap();
    assert_eq!((x.kind, x.seq), (SymbolKind::GlobalVariable, 0));
    let main = ctx.global("main").unwrap();
    assert_eq!((main.kind, main.seq), (SymbolKind::Function, 1));
    assert_eq!(main.parameter_count, 0);

    let locals = main.locals().unwrap();
    assert_eq!(locals.len(), 1);
    let y = locals.lookup_local(&0usize).unwrap();
    assert_eq!((y.kind, y.name.as_str()), (SymbolKind::LocalVariable, "y"));

    let local_y = Some(SymbolRef::Local { function: 1, seq: 0 });
    assert_eq!(entries(&ctx, "y"), vec![local_y, local_y]);
    assert_eq!(entries(&ctx, "x"), vec![Some(SymbolRef::Global(0)), Some(SymbolRef::Global(0))]);

    let reference = identifiers(&ctx, "x")[1];
    assert_eq!(ctx.resolved(reference).map(|s| s.name.as_str()), Some("x"));
}

#[test]
fn test_inner_block_shadows_parameter() {
    let ctx = analyze_str("
        func f(a)
        begin
            begin
                var a
                a := 1
            end
            a := 2
        end
    ").unwrap();

    let parameter = Some(SymbolRef::Local { function: 0, seq: 0 });
    let inner = Some(SymbolRef::Local { function: 0, seq: 1 });
    assert_eq!(entries(&ctx, "a"), vec![parameter, inner, inner, parameter]);

    let f = ctx.global("f").unwrap();
    assert_eq!(f.parameter_count, 1);
    let kinds: Vec<SymbolKind> = f.locals().unwrap().by_seq().into_iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SymbolKind::Parameter, SymbolKind::LocalVariable]);
}

#[test]
fn test_block_local_visible_only_inside_block() {
    let ctx = analyze_str("
        var a
        func f()
        begin
            a := 1
            begin
                var a
                a := 2
                begin
                    a := 3
                end
            end
            a := 4
        end
    ").unwrap();

    let global = Some(SymbolRef::Global(0));
    let local = Some(SymbolRef::Local { function: 1, seq: 0 });
    assert_eq!(entries(&ctx, "a"), vec![global, global, local, local, local, global]);
}

#[test]
fn test_function_body_may_redeclare_parameter() {
    let ctx = analyze_str("func f(a) begin var a a := a end").unwrap();
    let local = Some(SymbolRef::Local { function: 0, seq: 1 });
    assert_eq!(entries(&ctx, "a")[2..], [local, local]);
}

#[test]
fn test_identical_string_literals_get_distinct_indices() {
    let ctx = analyze_str("
        func main()
        begin
            print \"hi\"
            print \"hi\"
        end
    ").unwrap();

    assert_eq!(ctx.strings.len(), 2);
    assert_eq!(ctx.strings.get(0), Some("hi"));
    assert_eq!(ctx.strings.get(1), Some("hi"));

    let literals: Vec<&NodeData> = ctx.tree.iter()
        .filter(|&(_, node)| node.kind == NodeKind::StringLiteral)
        .map(|(_, node)| &node.data)
        .collect();
    assert_eq!(literals, vec![&NodeData::StringIndex(0), &NodeData::StringIndex(1)]);
}

#[test]
fn test_string_indices_follow_source_order_across_functions() {
    let ctx = analyze_str("
        func a() begin print \"one\", \"two\" end
        func b() begin print \"three\" end
        func c() begin if 1 = 1 then print \"four\" else print \"five\" end
    ").unwrap();

    let pool: Vec<&str> = ctx.strings.iter().map(|(_, text)| text).collect();
    assert_eq!(pool, vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn test_unknown_identifier_aborts() {
    let result = analyze_str("func main() begin print z end");
    assert_eq!(result.err(), Some(SemanticError::UnknownIdentifier { name: "z".to_string() }));
}

#[test]
fn test_unknown_identifier_stops_binding() {
    let mut ctx = CompilationContext::new(parse_str("
        var x
        func main()
        begin
            x := z
            x := 2
        end
    "));
    assert!(create_symbol_table(&mut ctx).is_err());

    let x = entries(&ctx, "x");
    assert_eq!(x[1], Some(SymbolRef::Global(0)));
    assert_eq!(x[2], None);
}

#[test]
fn test_function_without_block_is_malformed() {
    let mut ctx = CompilationContext::new(parse_str("
        var y
        func main() return y
    "));
    match create_symbol_table(&mut ctx) {
        Err(SemanticError::MalformedTree { .. }) => {},
        other => panic!("expected malformed tree, got {:?}", other),
    }
    assert_eq!(entries(&ctx, "y")[1], None);
}

#[test]
fn test_function_missing_children_is_malformed() {
    let mut tree = Tree::new();
    let name = tree.push(Node::leaf(NodeKind::Identifier, NodeData::Name("main".to_string())));
    let function = tree.push(Node::new(NodeKind::Function, NodeData::None, vec![name]));
    let globals = tree.push(Node::new(NodeKind::GlobalList, NodeData::None, vec![function]));
    let program = tree.push(Node::new(NodeKind::Program, NodeData::None, vec![globals]));
    tree.set_root(program);

    match analyze(tree, AnalysisOptions::default()) {
        Err(SemanticError::MalformedTree { .. }) => {},
        other => panic!("expected malformed tree, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_declaration_without_list_is_malformed() {
    let mut tree = Tree::new();
    let declaration = tree.push(Node::leaf(NodeKind::Declaration, NodeData::None));
    let globals = tree.push(Node::new(NodeKind::GlobalList, NodeData::None, vec![declaration]));
    let program = tree.push(Node::new(NodeKind::Program, NodeData::None, vec![globals]));
    tree.set_root(program);

    assert_eq!(
        analyze(tree, AnalysisOptions::default()).err(),
        Some(SemanticError::malformed("declaration without an identifier list"))
    );
}

#[test]
fn test_empty_tree_is_malformed() {
    assert!(analyze(Tree::new(), AnalysisOptions::default()).is_err());
}

#[test]
fn test_function_with_omitted_parameter_list() {
    let mut tree = Tree::new();
    let name = tree.push(Node::leaf(NodeKind::Identifier, NodeData::Name("main".to_string())));
    let statements = tree.push(Node::new(NodeKind::StatementList, NodeData::None, vec![]));
    let body = tree.push(Node::new(NodeKind::Block, NodeData::None, vec![statements]));
    let function = tree.push(Node::new(NodeKind::Function, NodeData::None, vec![name, body]));
    let globals = tree.push(Node::new(NodeKind::GlobalList, NodeData::None, vec![function]));
    let program = tree.push(Node::new(NodeKind::Program, NodeData::None, vec![globals]));
    tree.set_root(program);

    let ctx = analyze(tree, AnalysisOptions::default()).unwrap();
    let main = ctx.global("main").unwrap();
    assert_eq!(main.parameter_count, 0);
    assert!(main.locals().unwrap().is_empty());
}

#[test]
fn test_global_sequence_numbers_follow_declaration_order() {
    let ctx = analyze_str("
        var a, b
        func f() begin return 0 end
        var c
        func g() begin return 0 end
        var d
    ").unwrap();

    let globals: Vec<(usize, &str, SymbolKind)> = ctx.globals.by_seq()
        .into_iter()
        .map(|s| (s.seq, s.name.as_str(), s.kind))
        .collect();
    assert_eq!(globals, vec![
        (0, "a", SymbolKind::GlobalVariable),
        (1, "b", SymbolKind::GlobalVariable),
        (2, "f", SymbolKind::Function),
        (3, "c", SymbolKind::GlobalVariable),
        (4, "g", SymbolKind::Function),
        (5, "d", SymbolKind::GlobalVariable),
    ]);
    assert_eq!(ctx.functions().len(), 2);
}

#[test]
fn test_locals_continue_after_parameters() {
    let ctx = analyze_str("
        func f(p, q, r)
        begin
            var x
            begin
                var y, z
                y := p
            end
            begin
                var w
                w := q
            end
        end
    ").unwrap();

    let f = ctx.global("f").unwrap();
    assert_eq!(f.parameter_count, 3);
    let locals: Vec<(usize, &str, SymbolKind)> = f.locals().unwrap().by_seq()
        .into_iter()
        .map(|s| (s.seq, s.name.as_str(), s.kind))
        .collect();
    assert_eq!(locals, vec![
        (0, "p", SymbolKind::Parameter),
        (1, "q", SymbolKind::Parameter),
        (2, "r", SymbolKind::Parameter),
        (3, "x", SymbolKind::LocalVariable),
        (4, "y", SymbolKind::LocalVariable),
        (5, "z", SymbolKind::LocalVariable),
        (6, "w", SymbolKind::LocalVariable),
    ]);
}

#[test]
fn test_calls_resolve_to_later_functions() {
    let ctx = analyze_str("
        func main() begin return helper(1) end
        func helper(n) begin return n end
    ").unwrap();

    let helper = Some(SymbolRef::Global(1));
    assert_eq!(entries(&ctx, "helper"), vec![helper, helper]);
    assert_eq!(entries(&ctx, "n"), vec![
        Some(SymbolRef::Local { function: 1, seq: 0 }),
        Some(SymbolRef::Local { function: 1, seq: 0 }),
    ]);
}

#[test]
fn test_duplicate_declarations_rejected() {
    let duplicate = |name: &str| Some(SemanticError::DuplicateDeclaration { name: name.to_string() });
    assert_eq!(analyze_str("var x, x").err(), duplicate("x"));
    assert_eq!(analyze_str("var f func f() begin end").err(), duplicate("f"));
    assert_eq!(analyze_str("func f(a, a) begin end").err(), duplicate("a"));
    assert_eq!(analyze_str("func f() begin var b var b end").err(), duplicate("b"));
    assert!(analyze_str("func f() begin var b begin var b end end").is_ok());
}

#[test]
fn test_parameters_are_scoped_to_their_function() {
    let result = analyze_str("
        func f(a) begin return a end
        func g() begin return a end
    ");
    assert_eq!(result.err(), Some(SemanticError::UnknownIdentifier { name: "a".to_string() }));
}

#[test]
fn test_single_bucket_tables_give_same_bindings() {
    let source = "
        var a
        func f(b) begin var c begin var a c := a + b end a := c end
    ";
    let options = AnalysisOptions { global_buckets: 1, scope_buckets: 1 };
    let narrow = analyze(parse_str(source), options).unwrap();
    let wide = analyze_str(source).unwrap();
    for name in &["a", "b", "c"] {
        assert_eq!(entries(&narrow, name), entries(&wide, name));
    }
}

#[test]
fn test_symbol_table_dump() {
    let ctx = analyze_str("
        var x
        func main()
        begin
            var y
            y := x
            print \"hi\"
        end
    ").unwrap();

    assert_eq!(
        SymbolTableDump::new(&ctx).to_string(),
        "Global Symbol Table\n\
         Global Variable [0] = x\n\
         Function [1] = main\n\
         \n\
         Function \"main\" Symbol Table\n\
         Local Variable [0] = y\n\
         \n\
         String List\n\
         0 - hi\n"
    );
}

#[test]
fn test_enumerate_lists_nested_locals() {
    let ctx = analyze_str("
        var g
        func f(a) begin var b end
        func h() begin var c end
    ").unwrap();
    let names: Vec<&str> = enumerate(&ctx.globals).into_iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["g", "f", "a", "b", "h", "c"]);
}

#[test]
fn test_teardown_releases_every_symbol_once() {
    let ctx = analyze_str("
        var g, k
        func f(a, b) begin var c begin var d end end
        func h() begin var e end
    ").unwrap();

    let mut created: Vec<(SymbolKind, usize, String)> = enumerate(&ctx.globals)
        .into_iter()
        .map(|s| (s.kind, s.seq, s.name.clone()))
        .collect();
    let teardown = ctx.destroy();
    let mut released: Vec<(SymbolKind, usize, String)> = teardown.released
        .iter()
        .map(|r| (r.kind, r.seq, r.name.clone()))
        .collect();

    created.sort_by(|a, b| a.2.cmp(&b.2));
    released.sort_by(|a, b| a.2.cmp(&b.2));
    assert_eq!(created, released);
    assert_eq!(teardown.len(), 9);

    let unique: std::collections::HashSet<(Option<usize>, usize)> = teardown.released
        .iter()
        .map(|r| (r.owner, r.seq))
        .collect();
    assert_eq!(unique.len(), 9);
    assert_eq!(teardown.summary(), "2 Function, 2 Global Variable, 3 Local Variable, 2 Parameter");
}

#[test]
fn test_teardown_releases_locals_before_their_function() {
    let ctx = analyze_str("func f(a) begin var b end").unwrap();
    let teardown = ctx.destroy();
    let order: Vec<&str> = teardown.released.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order.last(), Some(&"f"));
    assert_eq!(teardown.released[2].owner, None);
    assert!(teardown.released[..2].iter().all(|r| r.owner == Some(0)));
}
