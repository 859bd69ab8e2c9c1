use std::fs::read_dir;
use std::io;
use std::path::Path;
use super::test_case::TestCase;
use super::compile_pass::CompilePass;
use super::compile_fail::CompileFail;

type TestCaseCollection = Vec<Box<dyn TestCase>>;

fn collect_test_case_from_subdirectory<F>(root: &str, subdir: &str, loader: F)
    -> io::Result<TestCaseCollection>
    where F: Fn(String) -> Box<dyn TestCase>
{
    let fullpath = Path::new(root).join(subdir);
    if !fullpath.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for dir_entry in read_dir(fullpath)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("vsl") {
            paths.push(path.to_string_lossy().into_owned());
        }
    }
    paths.sort();
    Ok(paths.into_iter().map(loader).collect())
}

pub fn collect_test_cases(path: &str) -> io::Result<TestCaseCollection> {
    let mut v = Vec::new();
    v.extend(collect_test_case_from_subdirectory(path, "compile-pass", CompilePass::new)?);
    v.extend(collect_test_case_from_subdirectory(path, "compile-fail", CompileFail::new)?);
    Ok(v)
}
