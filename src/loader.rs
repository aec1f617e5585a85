//! This module provides the `ProgramLoader` struct, responsible for reading and writing
//! program text files and compiling them.

use crate::compiler::{compile, Compilation};
use crate::types::{MachineError, MAX_PROGRAM_SIZE};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of program files.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading and saving programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads and compiles a single program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the program file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Compilation)` if the file was read. Malformed lines are reported in the
    ///   compilation's diagnostics, not as an error.
    /// * `Err(MachineError::FileError)` if the file cannot be read or is too large.
    pub fn load_program(path: &Path) -> Result<Compilation, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("loading program from {}", path.display());
        Self::load_program_from_string(&content)
    }

    /// Compiles a program from the provided string content.
    ///
    /// This is useful for programs that are not stored in files, e.g., from an editor buffer.
    pub fn load_program_from_string(content: &str) -> Result<Compilation, MachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::FileError(format!(
                "Program is {} bytes, larger than the {} byte limit",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        Ok(compile(content))
    }

    /// Writes program text to `path`, replacing any existing file.
    pub fn save_program(path: &Path, content: &str) -> Result<(), MachineError> {
        fs::write(path, content).map_err(|e| {
            MachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })
    }

    /// Loads all program files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Compilation), MachineError>>` - one entry per program file,
    ///   either its path and compilation or the error met while reading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Compilation), MachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|compilation| (path, compilation)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID_PROGRAM: &str = "# copy\nq0,a, , ->q0,a,a, ,R,R,S\nq0, , , ->q1, , , ,S,S,S\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("copy.tm");
        write_file(&file_path, VALID_PROGRAM);

        let compilation = ProgramLoader::load_program(&file_path).unwrap();
        assert!(compilation.is_clean());
        assert_eq!(compilation.transitions.len(), 2);
    }

    #[test]
    fn test_load_program_with_bad_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.tm");
        write_file(&file_path, "This is not a valid program\nq0, , , ->q1, , , ,S,S,S");

        let compilation = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(compilation.transitions.len(), 1);
        assert_eq!(compilation.error_report(), "Line 1: Invalid format");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_program_size_limit() {
        let content = "#".repeat(MAX_PROGRAM_SIZE + 1);
        let result = ProgramLoader::load_program_from_string(&content);

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("saved.tm");

        ProgramLoader::save_program(&file_path, VALID_PROGRAM).unwrap();
        let compilation = ProgramLoader::load_program(&file_path).unwrap();

        assert_eq!(compilation, compile(VALID_PROGRAM));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), VALID_PROGRAM);
        write_file(&dir.path().join("invalid.tm"), "BADLINE");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());

        // Both .tm files are read; the invalid one only carries diagnostics.
        assert_eq!(results.len(), 2);
        let clean = results
            .iter()
            .filter(|r| r.as_ref().is_ok_and(|(_, c)| c.is_clean()))
            .count();
        assert_eq!(clean, 1);
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
