//! Writes generated files, leaving unchanged ones untouched so Xcode does
//! not rebuild them.

use std::fs;
use std::io;
use std::path::Path;

/// What happened to a destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Unchanged,
}

/// Writes `content` to `path` unless the file already holds exactly that.
///
/// Missing parent directories are created.
pub fn write_if_changed(path: &Path, content: &str) -> io::Result<Outcome> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(Outcome::Unchanged),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(Outcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Generated").join("Default.generated.swift");

        assert_eq!(write_if_changed(&path, "a").unwrap(), Outcome::Written);
        assert_eq!(write_if_changed(&path, "a").unwrap(), Outcome::Unchanged);
        assert_eq!(write_if_changed(&path, "b").unwrap(), Outcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }
}
