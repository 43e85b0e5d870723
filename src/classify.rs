//! Recognizing Logos source files among the formatter arguments
//!
//! Every argument is either a Logos file we rewrite (existing regular file
//! with a Logos extension) or something we hand to clang-format untouched.

use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::LogosFormatError;

/// Logos extensions and the Objective-C extension clang-format expects instead
pub const LOGOS_EXTENSIONS: &[(&str, &str)] =
    &[("x", "m"), ("xi", "m"), ("xm", "mm"), ("xmi", "mm")];

/// Map a Logos extension (without the dot) to its clang-format-legal one
#[must_use]
pub fn normal_extension(logos_ext: &str) -> Option<&'static str> {
    LOGOS_EXTENSIONS
        .iter()
        .find(|(logos, _)| *logos == logos_ext)
        .map(|(_, normal)| *normal)
}

/// A Logos file found on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceClassification {
    pub path: PathBuf,
    /// Logos extension, without the dot
    pub logos_ext: &'static str,
    /// Extension clang-format will see, without the dot
    pub normal_ext: &'static str,
}

impl SourceClassification {
    /// Classify a path by extension only, without touching the filesystem
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        LOGOS_EXTENSIONS
            .iter()
            .find(|(logos, _)| *logos == ext)
            .map(|&(logos_ext, normal_ext)| SourceClassification {
                path: path.to_path_buf(),
                logos_ext,
                normal_ext,
            })
    }

    /// File stem used to name intermediates, `file` if there is none
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map_or_else(|| "file".to_string(), |s| s.to_string_lossy().into_owned())
    }
}

/// One formatter argument after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputArg {
    Source(SourceClassification),
    PassThrough(OsString),
}

/// Classify a single argument
///
/// Returns `Ok(None)` for anything that isn't an existing Logos file. A Logos
/// file we can't both read and write is an error.
pub fn classify_arg(arg: &OsStr) -> Result<Option<SourceClassification>, LogosFormatError> {
    let path = Path::new(arg);
    if !path.is_file() {
        return Ok(None);
    }
    let Some(source) = SourceClassification::from_path(path) else {
        return Ok(None);
    };
    check_access(&source.path)?;
    Ok(Some(source))
}

/// Classify every argument, preserving order
pub fn partition_args(args: &[OsString]) -> Result<Vec<InputArg>, LogosFormatError> {
    args.iter()
        .map(|arg| {
            Ok(match classify_arg(arg)? {
                Some(source) => InputArg::Source(source),
                None => InputArg::PassThrough(arg.clone()),
            })
        })
        .collect()
}

/// Make sure a Logos file can be read and later overwritten.
///
/// Opening for write without truncation leaves the contents alone.
fn check_access(path: &Path) -> Result<(), LogosFormatError> {
    File::open(path).map_err(|source| LogosFormatError::Precondition {
        path: path.to_path_buf(),
        access: "read",
        source,
    })?;
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| LogosFormatError::Precondition {
            path: path.to_path_buf(),
            access: "write",
            source,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_table_total() {
        for (logos, normal) in LOGOS_EXTENSIONS {
            assert_eq!(normal_extension(logos), Some(*normal));
            assert!(*normal == "m" || *normal == "mm");
        }
        assert_eq!(normal_extension("x"), Some("m"));
        assert_eq!(normal_extension("xi"), Some("m"));
        assert_eq!(normal_extension("xm"), Some("mm"));
        assert_eq!(normal_extension("xmi"), Some("mm"));
    }

    #[test]
    fn test_unrecognized_extensions() {
        assert_eq!(normal_extension("m"), None);
        assert_eq!(normal_extension("X"), None);
        assert!(SourceClassification::from_path(Path::new("Tweak.m")).is_none());
        assert!(SourceClassification::from_path(Path::new("Makefile")).is_none());
        assert!(SourceClassification::from_path(Path::new("Tweak.XM")).is_none());
    }

    #[test]
    fn test_from_path() {
        let source = SourceClassification::from_path(Path::new("src/Tweak.xm")).unwrap();
        assert_eq!(source.logos_ext, "xm");
        assert_eq!(source.normal_ext, "mm");
        assert_eq!(source.stem(), "Tweak");
    }

    #[test]
    fn test_flags_and_missing_files_pass_through() {
        let args: Vec<OsString> = ["--style=file", "-n", "/nonexistent/Tweak.x"]
            .iter()
            .map(OsString::from)
            .collect();
        let parts = partition_args(&args).unwrap();
        assert!(parts.iter().all(|p| matches!(p, InputArg::PassThrough(_))));
    }

    #[test]
    fn test_existing_logos_file_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let tweak = dir.path().join("Tweak.x");
        let header = dir.path().join("Tweak.h");
        std::fs::write(&tweak, "%hook Foo\n%end\n").unwrap();
        std::fs::write(&header, "@interface Foo\n@end\n").unwrap();

        let args = vec![
            OsString::from("--style=file"),
            tweak.clone().into_os_string(),
            header.clone().into_os_string(),
        ];
        let parts = partition_args(&args).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], InputArg::PassThrough(OsString::from("--style=file")));
        match &parts[1] {
            InputArg::Source(source) => {
                assert_eq!(source.path, tweak);
                assert_eq!(source.normal_ext, "m");
            }
            InputArg::PassThrough(_) => panic!("Tweak.x should be recognized"),
        }
        assert_eq!(parts[2], InputArg::PassThrough(header.into_os_string()));
    }

    #[test]
    fn test_directory_with_logos_extension_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let weird = dir.path().join("dir.x");
        std::fs::create_dir(&weird).unwrap();
        assert_eq!(classify_arg(weird.as_os_str()).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_file_is_precondition_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tweak = dir.path().join("Tweak.xm");
        std::fs::write(&tweak, "%end\n").unwrap();
        std::fs::set_permissions(&tweak, std::fs::Permissions::from_mode(0o444)).unwrap();

        // root ignores permission bits
        if OpenOptions::new().write(true).open(&tweak).is_ok() {
            return;
        }
        let err = classify_arg(tweak.as_os_str()).unwrap_err();
        assert!(matches!(
            err,
            LogosFormatError::Precondition { access: "write", .. }
        ));
    }
}
