use libvsl::compiler::Compiler;
use libvsl::semantic::enumerate;
use super::test_case::{TestCase, TestResult};

pub struct CompilePass {
    path: String
}

impl CompilePass {
    pub fn new(path: String) -> Box<dyn TestCase> {
        Box::new(CompilePass {
            path: path
        })
    }
}

impl TestCase for CompilePass {
    fn name(&self) -> &str {
        &self.path
    }

    fn kind(&self) -> &'static str {
        "compile-pass"
    }

    fn execute(&self) -> TestResult {
        let compiler = Compiler::new();
        let ctx = compiler.compile(&self.path).map_err(|err| err.to_string())?;
        let symbols = enumerate(&ctx.globals).len();
        let teardown = ctx.destroy();
        if teardown.len() != symbols {
            return Err(format!("teardown released {} of {} symbols", teardown.len(), symbols));
        }
        Ok(())
    }
}
