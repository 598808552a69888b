//! Declaration file parsing
//!
//! One declaration per line: `name [:|=] dep1, dep2 ...`. Tokens are split on
//! any run of whitespace, commas, `:` or `=`. A line containing `:` declares
//! a file target, any other line declares a task.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::domain::{Declarations, TargetKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read declaration file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    fn unreadable(path: &Path, source: io::Error) -> Self {
        ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationLine<'a> {
    pub name: &'a str,
    pub kind: TargetKind,
    pub dependencies: Vec<&'a str>,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ':' | '=')
}

/// Splits a line into non-empty tokens
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_separator).filter(|token| !token.is_empty())
}

/// Parses one line; `None` for lines without any token
pub fn parse_line(line: &str) -> Option<DeclarationLine<'_>> {
    let mut tokens = tokenize(line);
    let name = tokens.next()?;

    // The colon rule applies to the raw line, whatever else it contains.
    let kind = if line.contains(':') {
        TargetKind::File
    } else {
        TargetKind::Task
    };

    Some(DeclarationLine {
        name,
        kind,
        dependencies: tokens.collect(),
    })
}

/// Parses declarations from an in-memory string
pub fn parse_str(input: &str) -> Declarations {
    let mut declarations = Declarations::new();
    for line in input.lines() {
        apply_line(&mut declarations, line);
    }
    declarations
}

fn apply_line(declarations: &mut Declarations, line: &str) {
    if let Some(parsed) = parse_line(line) {
        declarations.declare(parsed.name, parsed.kind, parsed.dependencies);
    }
}

/// A declaration file on disk
pub struct DeclarationFile {
    path: PathBuf,
}

impl DeclarationFile {
    /// Creates a handle for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the handle for a project's configured build file
    pub fn for_project(project_root: &Path, file_name: &str) -> Self {
        Self::new(project_root.join(file_name))
    }

    /// Returns the path to the declaration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole file
    pub fn read(&self) -> Result<Declarations, ParseError> {
        let file = File::open(&self.path).map_err(|e| ParseError::unreadable(&self.path, e))?;

        // Shared lock so a concurrent writer cannot hand us half a file
        FileExt::lock_shared(&file).map_err(|e| ParseError::unreadable(&self.path, e))?;

        let declarations = read_declarations(&file);
        FileExt::unlock(&file).map_err(|e| ParseError::unreadable(&self.path, e))?;

        declarations.map_err(|e| ParseError::unreadable(&self.path, e))
    }
}

fn read_declarations(file: &File) -> io::Result<Declarations> {
    let mut declarations = Declarations::new();
    for line in BufReader::new(file).lines() {
        apply_line(&mut declarations, &line?);
    }
    Ok(declarations)
}

/// Reads and parses the declaration file at `path`
pub fn parse_file(path: impl AsRef<Path>) -> Result<Declarations, ParseError> {
    DeclarationFile::new(path.as_ref()).read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    const BIGGER: &str = "\
main = t, f.java, f.cpp
t = f.py, f.go, f.h, f.cpp
f.cpp : f.go, f.h, f.py
f.go : f.asm
t2
";

    fn dep_names(decls: &Declarations, name: &str) -> HashSet<String> {
        decls
            .dependencies_of(name)
            .unwrap()
            .into_iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenize_splits_on_all_separators() {
        let tokens: Vec<_> = tokenize("  a=b, c :d\t e,,f ").collect();
        assert_eq!(tokens, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn tokenize_keeps_dots_and_dashes() {
        let tokens: Vec<_> = tokenize("lib-core.o = src/lib.c").collect();
        assert_eq!(tokens, vec!["lib-core.o", "src/lib.c"]);
    }

    #[test]
    fn colon_line_is_file() {
        let parsed = parse_line("f2 : f1").unwrap();
        assert_eq!(parsed.name, "f2");
        assert_eq!(parsed.kind, TargetKind::File);
        assert_eq!(parsed.dependencies, vec!["f1"]);
    }

    #[test]
    fn equals_line_is_task() {
        let parsed = parse_line("main = f1, f2").unwrap();
        assert_eq!(parsed.kind, TargetKind::Task);
        assert_eq!(parsed.dependencies, vec!["f1", "f2"]);
    }

    #[test]
    fn mixed_separators_follow_colon_rule() {
        assert_eq!(parse_line("x = a : b").unwrap().kind, TargetKind::File);
    }

    #[test]
    fn bare_name_is_task_without_dependencies() {
        let parsed = parse_line("t2").unwrap();
        assert_eq!(parsed.kind, TargetKind::Task);
        assert!(parsed.dependencies.is_empty());
    }

    #[test]
    fn blank_and_separator_only_lines_are_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t ").is_none());
        assert!(parse_line(" = , ").is_none());
    }

    #[test]
    fn small_declarations() {
        let decls = parse_str("f1:\nmain = f1\n");

        assert_eq!(decls.len(), 2);
        assert_eq!(decls.target("f1").unwrap().kind(), TargetKind::File);
        assert_eq!(decls.target("main").unwrap().kind(), TargetKind::Task);
        assert!(dep_names(&decls, "f1").is_empty());
        assert_eq!(dep_names(&decls, "main"), set(&["f1"]));
    }

    #[test]
    fn dependency_declared_after_use() {
        let decls = parse_str("main = f2\nf2 : f1\n");

        assert_eq!(decls.len(), 3);
        assert_eq!(decls.target("f2").unwrap().kind(), TargetKind::File);
        assert_eq!(dep_names(&decls, "f2"), set(&["f1"]));
        assert_eq!(dep_names(&decls, "main"), set(&["f2"]));
    }

    #[test]
    fn bigger_declarations() {
        let decls = parse_str(BIGGER);

        let all: HashSet<_> = decls
            .targets()
            .iter()
            .map(|(_, t)| t.name().to_string())
            .collect();
        assert_eq!(
            all,
            set(&["main", "t", "t2", "f.py", "f.cpp", "f.java", "f.h", "f.go", "f.asm"])
        );

        assert_eq!(dep_names(&decls, "main"), set(&["t", "f.java", "f.cpp"]));
        assert_eq!(dep_names(&decls, "t"), set(&["f.py", "f.go", "f.h", "f.cpp"]));
        assert_eq!(dep_names(&decls, "f.cpp"), set(&["f.go", "f.h", "f.py"]));
        assert_eq!(dep_names(&decls, "f.go"), set(&["f.asm"]));
        for leaf in ["f.py", "f.java", "f.h", "f.asm", "t2"] {
            assert!(dep_names(&decls, leaf).is_empty(), "{} has dependencies", leaf);
        }
    }

    #[test]
    fn bigger_kinds() {
        let decls = parse_str(BIGGER);

        let of_kind = |kind: TargetKind| -> HashSet<String> {
            decls
                .targets()
                .iter()
                .filter(|(_, t)| t.kind() == kind)
                .map(|(_, t)| t.name().to_string())
                .collect()
        };

        assert_eq!(
            of_kind(TargetKind::File),
            set(&["f.py", "f.cpp", "f.java", "f.h", "f.go", "f.asm"])
        );
        assert_eq!(of_kind(TargetKind::Task), set(&["main", "t", "t2"]));
    }

    #[test]
    fn empty_input() {
        let decls = parse_str("");
        assert!(decls.is_empty());

        let decls = parse_str("\n   \n\n");
        assert!(decls.is_empty());
    }

    #[test]
    fn read_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.txt");
        fs::write(&path, "f1:\n\nmain = f1\n").unwrap();

        let decls = parse_file(&path).unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(dep_names(&decls, "main"), set(&["f1"]));
    }

    #[test]
    fn read_shares_lock_and_releases_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.txt");
        fs::write(&path, "f1:\nmain = f1\n").unwrap();

        // Another reader holding a shared lock does not block us
        let other = File::open(&path).unwrap();
        FileExt::lock_shared(&other).unwrap();
        assert_eq!(parse_file(&path).unwrap().len(), 2);
        FileExt::unlock(&other).unwrap();

        // Once read returns, a writer can take the file exclusively
        let writer = File::open(&path).unwrap();
        FileExt::try_lock_exclusive(&writer).unwrap();
        FileExt::unlock(&writer).unwrap();
    }

    #[test]
    fn for_project_joins_file_name() {
        let file = DeclarationFile::for_project(Path::new("/work"), "deps.txt");
        assert_eq!(file.path(), Path::new("/work/deps.txt"));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        let err = parse_file(&path).unwrap_err();
        match err {
            ParseError::Unreadable { path: p, .. } => assert_eq!(p, path),
        }
    }
}
