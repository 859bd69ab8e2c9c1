use std::fs;
use std::io::Result as IoResult;

/// A VSL program read from disk.
pub struct SourceFile {
    pub path: String,
    pub body: String,
}

impl SourceFile {

    pub fn load(path: &str) -> IoResult<SourceFile> {
        let body = fs::read_to_string(path)?;
        debug!("read {} bytes from {}", body.len(), path);
        Ok(SourceFile {
            path: path.to_string(),
            body: body,
        })
    }

    pub fn line_count(&self) -> usize {
        self.body.lines().count()
    }
}

#[test]
fn test_load_source_file() {
    use std::io::{Seek, SeekFrom, Write};

    let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
    write!(tmpfile, "var x\nfunc main() begin x := 1 end").unwrap();
    tmpfile.seek(SeekFrom::Start(0)).unwrap();

    let sf = SourceFile::load(tmpfile.path().to_str().unwrap()).unwrap();
    assert_eq!(sf.path, tmpfile.path().to_str().unwrap());
    assert_eq!(sf.body, "var x\nfunc main() begin x := 1 end");
    assert_eq!(sf.line_count(), 2);
}

#[test]
fn test_load_missing_file() {
    assert!(SourceFile::load("/nonexistent/program.vsl").is_err());
}
