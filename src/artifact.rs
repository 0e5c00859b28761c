// src/artifact.rs

//! Reading and writing the on-disk artifacts between stages.
//!
//! Every error names the path involved.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub const JSON_EXTENSION: &str = "json";

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            Error::io(path, e.into())
        } else {
            Error::json(path, e)
        }
    })?;
    trace!("Read {}", path.display());
    Ok(value)
}

/// Writes `value` as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        if e.is_io() {
            Error::io(path, e.into())
        } else {
            Error::json(path, e)
        }
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io(path, e))?;
    trace!("Wrote {}", path.display());
    Ok(())
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// File name for the artifact derived from `input`.
///
/// Names already ending in `.json` are kept. An extension equal to `strip`
/// is replaced by `.json`; any other name gets `.json` appended, so
/// `adder.v1` and `adder.v2` stay distinct.
pub fn json_file_name(input: &Path, strip: Option<&str>) -> PathBuf {
    let name = input.file_name().map(PathBuf::from).unwrap_or_default();
    match name.extension() {
        Some(ext) if ext == JSON_EXTENSION => name,
        Some(ext) if strip.is_some_and(|strip| ext == strip) => name.with_extension(JSON_EXTENSION),
        _ => {
            let mut appended = name.into_os_string();
            appended.push(".");
            appended.push(JSON_EXTENSION);
            PathBuf::from(appended)
        }
    }
}

/// Regular files directly inside `dir`, sorted by name. With `extension`
/// set, only files carrying that extension are listed.
pub fn list_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(wanted) = extension {
            if path.extension().map_or(true, |ext| ext != wanted) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test_log::test]
    fn test_json_file_name() {
        assert_eq!(json_file_name(Path::new("out/run1"), None), PathBuf::from("run1.json"));
        assert_eq!(json_file_name(Path::new("b.json"), None), PathBuf::from("b.json"));
        assert_eq!(
            json_file_name(Path::new("mul32_map.dag"), None),
            PathBuf::from("mul32_map.dag.json")
        );
        assert_eq!(json_file_name(Path::new("a/b.sol"), Some("sol")), PathBuf::from("b.json"));
        assert_eq!(json_file_name(Path::new("b.json"), Some("sol")), PathBuf::from("b.json"));
    }

    #[test_log::test]
    fn test_dotted_sample_names_stay_distinct() {
        let v1 = json_file_name(Path::new("raw/adder.v1"), None);
        let v2 = json_file_name(Path::new("raw/adder.v2"), None);
        assert_eq!(v1, PathBuf::from("adder.v1.json"));
        assert_eq!(v2, PathBuf::from("adder.v2.json"));
        assert_ne!(v1, v2);
    }

    #[test_log::test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let value = json!({"nodes": {"1.0": {"children": []}}});
        write_json(&path, &value).unwrap();
        let back: Value = read_json(&path).unwrap();
        assert_eq!(back, value);
    }

    #[test_log::test]
    fn test_read_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_json::<Value>(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"), "{err}");

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        match read_json::<Value>(&broken).unwrap_err() {
            Error::Json { path, .. } => assert_eq!(path, broken),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test_log::test]
    fn test_list_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.sol"), "").unwrap();
        fs::write(dir.path().join("a.sol"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.sol")).unwrap();

        let all = list_files(dir.path(), None).unwrap();
        assert_eq!(all.len(), 3);

        let sol = list_files(dir.path(), Some("sol")).unwrap();
        let names: Vec<_> = sol.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["a.sol", "b.sol"]);
    }
}
