//! Classify → forward transform → format → commit pipeline
//!
//! Implements one logos-format invocation:
//! - Classify: split formatter arguments into Logos files and pass-through
//! - Forward transform: de-Logos each file into the workspace
//! - Invoke formatter: a single clang-format run over every intermediate
//! - Commit: re-Logos and either print (stream mode) or replace the
//!   originals (in-place mode)
//! - Cleanup: release the workspace, whatever happened above

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{error, info, warn};

use crate::classify::{partition_args, InputArg, SourceClassification};
use crate::error::LogosFormatError;
use crate::formatter::{Formatter, RunResult, IN_PLACE_FLAG};
use crate::interrupt;
use crate::mapper::TokenMapper;
use crate::session::TransformSession;
use crate::workspace::Workspace;
use crate::Result;

/// Prefix of the temp file written beside an original before it is renamed over it
const COMMIT_TEMP_PREFIX: &str = ".logos-format-";

/// Switches for one run
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Replace the Logos files instead of printing the result
    pub in_place: bool,
    /// Keep the workspace after the run
    pub save_temps: bool,
    /// Extra diagnostics were requested
    pub verbose: bool,
    /// Abandon the run after the formatter if SIGINT arrived
    pub watch_interrupts: bool,
}

/// How a run that didn't fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Completed,
    Interrupted,
}

/// One logos-format invocation
///
/// `W` receives what clang-format would have printed: the re-Logos'ed code in
/// stream mode, the formatter's own standard output in in-place mode.
pub struct Pipeline<'f, W: Write> {
    formatter: &'f Formatter,
    mapper: TokenMapper<'static>,
    options: PipelineOptions,
    base_dir: PathBuf,
    out: W,
}

impl<'f, W: Write> Pipeline<'f, W> {
    /// `base_dir` is where the workspace goes; normally the current directory
    pub fn new(
        formatter: &'f Formatter,
        options: PipelineOptions,
        base_dir: impl Into<PathBuf>,
        out: W,
    ) -> Self {
        Pipeline {
            formatter,
            mapper: TokenMapper::default(),
            options,
            base_dir: base_dir.into(),
            out,
        }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the whole pipeline over the formatter arguments
    pub fn run(&mut self, args: &[OsString]) -> Result<PipelineStatus> {
        if self.options.in_place {
            info!("Operating in in-place mode");
        } else {
            info!("Formatted code will be written to stdout");
        }

        // Unreadable or unwritable Logos files stop us before anything is created
        let inputs = partition_args(args)?;

        let workspace = Workspace::create(&self.base_dir)?;
        if self.options.save_temps || self.options.verbose {
            warn!(
                "Saving temporary files in '{}'",
                workspace.path().display()
            );
            if self.options.save_temps {
                info!("The directory will not be deleted on exit");
            }
        }

        let result = self.run_in_workspace(&workspace, inputs);
        workspace.release(self.options.save_temps);
        result
    }

    fn run_in_workspace(
        &mut self,
        workspace: &Workspace,
        inputs: Vec<InputArg>,
    ) -> Result<PipelineStatus> {
        let mut session = TransformSession::new();
        let mut formatter_args = Vec::with_capacity(inputs.len() + 1);

        for input in inputs {
            match input {
                InputArg::PassThrough(arg) => formatter_args.push(arg),
                InputArg::Source(source) => {
                    if let Some(intermediate) =
                        self.forward_transform(workspace, &source, &mut session)?
                    {
                        formatter_args.push(intermediate.into_os_string());
                    }
                }
            }
        }

        if self.options.in_place {
            formatter_args.insert(0, OsString::from(IN_PLACE_FLAG));
        }

        let run = self.invoke_formatter(&formatter_args)?;
        if self.options.watch_interrupts && interrupt::interrupted() {
            warn!("Interrupted, leaving all files untouched");
            return Ok(PipelineStatus::Interrupted);
        }
        if !run.is_success() {
            error!(
                "{} output:\n{}",
                self.formatter.program().display(),
                run.combined_output()
            );
            return Err(anyhow::Error::new(run.to_error()).context(format!(
                "while running '{}'",
                self.formatter.command_line(&formatter_args)
            )));
        }

        if self.options.in_place {
            self.commit_in_place(&session, &run)?;
        } else {
            self.commit_stream(&run)?;
        }
        Ok(PipelineStatus::Completed)
    }

    /// De-Logos one file into the workspace and record it
    ///
    /// Returns the intermediate the formatter should see, or `None` when the
    /// file was already queued earlier in the argument list.
    fn forward_transform(
        &self,
        workspace: &Workspace,
        source: &SourceClassification,
        session: &mut TransformSession,
    ) -> Result<Option<PathBuf>> {
        // Canonical so duplicates are caught and the commit replaces a symlink's target
        let original = fs::canonicalize(&source.path)
            .with_context(|| format!("failed to resolve '{}'", source.path.display()))?;
        if session.contains_original(&original) {
            info!(
                "'{}' was already given, formatting it once",
                source.path.display()
            );
            return Ok(None);
        }
        info!("Found a Logos file to format: '{}'", source.path.display());

        let prefix = format!("{}-", source.stem());
        let intermediate =
            workspace.new_temp_file(&prefix, &format!(".{}", source.normal_ext))?;
        info!(
            "Transforming '{}' to temporary normalized '{}'",
            source.path.display(),
            intermediate.display()
        );
        transform_file(&original, &intermediate, |input, output| {
            self.mapper.forward_stream(input, output)
        })?;
        session.record(original, intermediate.clone());

        if self.options.in_place {
            // Re-Logos'ed output lands here first so a failure never half-writes the original
            let post_format =
                workspace.new_temp_file(&prefix, &format!(".{}", source.logos_ext))?;
            session.record_post_format(&intermediate, post_format);
        } else if self.options.save_temps {
            let unformatted = unformatted_copy_path(&intermediate, source.normal_ext);
            info!(
                "Saving additional copy of clang-format protected version of '{}' at '{}'",
                source.path.display(),
                unformatted.display()
            );
            fs::copy(&intermediate, &unformatted)
                .with_context(|| format!("failed to write '{}'", unformatted.display()))?;
        }
        Ok(Some(intermediate))
    }

    fn invoke_formatter(&self, args: &[OsString]) -> Result<RunResult> {
        self.formatter.run(args).map_err(|e| {
            error!("Received an unexpected error when running the formatter: {e}");
            anyhow::Error::new(e)
        })
    }

    /// Re-Logos captured standard output and print it
    fn commit_stream(&mut self, run: &RunResult) -> Result<()> {
        report_stderr(run);
        info!("Re-Logos'ing the formatter output");
        let text = self
            .mapper
            .reverse_text(&run.stdout)
            .context("failed to re-Logos the formatter output")?;
        self.out
            .write_all(&text)
            .and_then(|()| self.out.flush())
            .context("failed to write formatted output")?;
        Ok(())
    }

    /// Re-Logos every formatted intermediate, then replace the originals
    fn commit_in_place(&mut self, session: &TransformSession, run: &RunResult) -> Result<()> {
        info!("Performing in-place post-processing");
        self.out
            .write_all(&run.stdout)
            .and_then(|()| self.out.flush())
            .context("failed to write formatter output")?;
        report_stderr(run);

        // Every original stays untouched until all re-Logos'ed files exist
        for entry in session.iter() {
            let post_format = entry.post_format.as_ref().ok_or_else(|| {
                anyhow!(
                    "no re-Logos file was prepared for '{}'",
                    entry.original.display()
                )
            })?;
            info!(
                "Transforming temporary normalized '{}' to temporary Logos '{}'",
                entry.intermediate.display(),
                post_format.display()
            );
            transform_file(&entry.intermediate, post_format, |input, output| {
                self.mapper.reverse_stream(input, output)
            })?;
        }

        let mut failures = Vec::new();
        for entry in session.iter() {
            let Some(post_format) = &entry.post_format else {
                continue;
            };
            info!(
                "Overwriting '{}' with content from '{}'",
                entry.original.display(),
                post_format.display()
            );
            if let Err(source) = replace_file(post_format, &entry.original) {
                error!(
                    "Failed to overwrite '{}': {source}",
                    entry.original.display()
                );
                failures.push(LogosFormatError::Commit {
                    path: entry.original.clone(),
                    source,
                });
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(anyhow::Error::new(first).context(format!(
                "{failed} of {} Logos files could not be written",
                session.len()
            ))),
        }
    }
}

/// Stream `input_path` through `map` into `output_path`
fn transform_file<F>(input_path: &Path, output_path: &Path, map: F) -> Result<()>
where
    F: FnOnce(&mut BufReader<File>, &mut BufWriter<File>) -> io::Result<()>,
{
    let input = File::open(input_path)
        .with_context(|| format!("failed to open '{}'", input_path.display()))?;
    let output = File::create(output_path)
        .with_context(|| format!("failed to create '{}'", output_path.display()))?;
    map(&mut BufReader::new(input), &mut BufWriter::new(output)).with_context(|| {
        format!(
            "failed to transform '{}' into '{}'",
            input_path.display(),
            output_path.display()
        )
    })
}

/// `<dir>/<stem>-unformatted.<ext>` beside an intermediate
fn unformatted_copy_path(intermediate: &Path, ext: &str) -> PathBuf {
    let stem = intermediate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    intermediate.with_file_name(format!("{stem}-unformatted.{ext}"))
}

fn report_stderr(run: &RunResult) {
    if !run.stderr.is_empty() {
        warn!("Formatter reported:\n{}", run.stderr.trim_end());
    }
}

/// Replace `dest` with the contents of `src`
///
/// The new contents go to a temp file in `dest`'s directory, which takes
/// over `dest`'s permissions and is then renamed over it. Readers see either
/// the old file or the new one, never a partial write.
fn replace_file(src: &Path, dest: &Path) -> io::Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(COMMIT_TEMP_PREFIX)
        .tempfile_in(dir)?;
    io::copy(&mut File::open(src)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    let permissions = fs::metadata(dest)?.permissions();
    fs::set_permissions(staged.path(), permissions)?;
    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unformatted_copy_path() {
        let path = unformatted_copy_path(Path::new("/work/logos-format-tmp-a/Tweak-x1.mm"), "mm");
        assert_eq!(
            path,
            PathBuf::from("/work/logos-format-tmp-a/Tweak-x1-unformatted.mm")
        );
    }

    #[test]
    fn test_replace_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("staged.x");
        let dest = dir.path().join("Tweak.x");
        fs::write(&src, "%hook Foo\n%end\n").unwrap();
        fs::write(&dest, "%hook   Foo\n%end\n").unwrap();

        replace_file(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "%hook Foo\n%end\n");

        // No staging leftovers beside the original
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(COMMIT_TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("staged.xm");
        let dest = dir.path().join("Tweak.xm");
        fs::write(&src, "new\n").unwrap();
        fs::write(&dest, "old\n").unwrap();
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o640)).unwrap();

        replace_file(&src, &dest).unwrap();
        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_replace_file_missing_source_leaves_dest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Tweak.x");
        fs::write(&dest, "original\n").unwrap();
        assert!(replace_file(&dir.path().join("missing.x"), &dest).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "original\n");
    }
}
