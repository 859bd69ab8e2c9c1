use libvsl::compiler::Compiler;
use std::fs;
use super::test_case::{TestCase, TestResult};

const EXPECT_PREFIX: &str = "// expect:";

pub struct CompileFail {
    path: String
}

impl CompileFail {
    pub fn new(path: String) -> Box<dyn TestCase> {
        Box::new(CompileFail {
            path: path
        })
    }

    /// Text the error message must contain, taken from a leading
    /// `// expect: ...` line.
    fn expectation(&self) -> Option<String> {
        let body = fs::read_to_string(&self.path).ok()?;
        let first = body.lines().next()?;
        first.strip_prefix(EXPECT_PREFIX).map(|text| text.trim().to_string())
    }
}

impl TestCase for CompileFail {
    fn name(&self) -> &str {
        &self.path
    }

    fn kind(&self) -> &'static str {
        "compile-fail"
    }

    fn execute(&self) -> TestResult {
        let compiler = Compiler::new();
        match compiler.compile(&self.path) {
            Ok(_) => Err("Expected compilation failure".to_string()),
            Err(err) => {
                let message = err.to_string();
                match self.expectation() {
                    Some(ref expected) if !message.contains(expected.as_str()) => {
                        Err(format!("Expected error containing `{}`, got `{}`", expected, message))
                    },
                    _ => Ok(()),
                }
            },
        }
    }
}
