use super::error::CompileError;
use super::parser;
use super::semantic::{self, AnalysisOptions, CompilationContext};
use super::source_file::SourceFile;

/// Front end driver: source text in, analysed compilation out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compiler {
    options: AnalysisOptions,
}

pub type CompilerResult = Result<CompilationContext, CompileError>;

impl Compiler {

    pub fn new() -> Compiler {
        Compiler::default()
    }

    pub fn with_options(options: AnalysisOptions) -> Compiler {
        Compiler {
            options: options,
        }
    }

    pub fn compile(&self, path: &str) -> CompilerResult {
        let source = SourceFile::load(path).map_err(|err| CompileError::Io {
            path: path.to_string(),
            source: err,
        })?;
        info!("compiling {} ({} lines)", source.path, source.line_count());
        self.compile_str(&source.body)
    }

    pub fn compile_str(&self, body: &str) -> CompilerResult {
        let tokens = lex(body)?;
        let tree = parser::parse(tokens).map_err(CompileError::Parse)?;
        Ok(semantic::analyze(tree, self.options)?)
    }

}

fn lex(body: &str) -> Result<Vec<parser::Token>, CompileError> {
    parser::lex(body)
        .map(|(_, tokens)| tokens)
        .map_err(|err| CompileError::Lex(describe_lex_error(err)))
}

fn describe_lex_error(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let line: String = e.input.chars().take_while(|c| *c != '\n').take(40).collect();
            format!("`{}`", line.trim())
        },
        nom::Err::Incomplete(_) => "unexpected end of input".to_string(),
    }
}

#[test]
fn test_simple_compile() {
    use std::io::{Seek, SeekFrom, Write};

    let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
    write!(tmpfile, "var x func main() begin x := 1 end").unwrap();
    tmpfile.seek(SeekFrom::Start(0)).unwrap();

    let ctx = Compiler::new().compile(tmpfile.path().to_str().unwrap()).unwrap();
    assert_eq!(ctx.globals.len(), 2);
}

#[test]
fn test_compile_reports_each_stage() {
    let compiler = Compiler::new();
    match compiler.compile_str("var x ; ") {
        Err(CompileError::Lex(_)) => {},
        other => panic!("expected lex error, got {:?}", other.map(|_| ())),
    }
    match compiler.compile_str("func f( end") {
        Err(CompileError::Parse(_)) => {},
        other => panic!("expected parse error, got {:?}", other.map(|_| ())),
    }
    match compiler.compile_str("func f() begin y := 1 end") {
        Err(CompileError::Semantic(_)) => {},
        other => panic!("expected semantic error, got {:?}", other.map(|_| ())),
    }
    match compiler.compile("/nonexistent/program.vsl") {
        Err(CompileError::Io { .. }) => {},
        other => panic!("expected io error, got {:?}", other.map(|_| ())),
    }
}
