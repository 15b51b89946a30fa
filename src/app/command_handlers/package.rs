use crate::app::command_handlers::CommandError;
use crate::app::command_support::{flag_value, parse_flags};
use crate::config::{deliverables_path, Settings, UNNAMED_PROJECT};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn cmd_package(settings: &Settings, args: &[String]) -> Result<String, CommandError> {
    let flags = parse_flags(args, &["--project", "--output"], &[])?;
    let project = flag_value(&flags, "--project").unwrap_or_else(|| UNNAMED_PROJECT.to_string());
    crate::shared::ids::validate_identifier_value("project", &project)
        .map_err(CommandError::failure)?;

    let deliverables_root = settings.deliverables_root();
    let source = deliverables_path(&deliverables_root, &project);
    if !source.is_dir() {
        return Err(CommandError::not_configured(format!(
            "No deliverables for project '{project}' at {}",
            source.display()
        )));
    }
    let output = flag_value(&flags, "--output")
        .map(|path| settings.resolve(Path::new(&path)))
        .unwrap_or_else(|| settings.workspace_root.join(format!("package-{project}.zip")));

    let count = write_archive(&deliverables_root, &source, &output)?;
    Ok(format!("Wrote {} ({count} files)", output.display()))
}

/// Zips every file under `source`, naming entries relative to `base`.
pub fn write_archive(base: &Path, source: &Path, output: &Path) -> Result<usize, CommandError> {
    let mut files = Vec::new();
    collect_files(source, &mut files)?;
    files.sort();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_failure(parent, err))?;
    }
    let file = fs::File::create(output).map_err(|err| io_failure(output, err))?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for path in &files {
        let name = entry_name(base, path)?;
        let bytes = fs::read(path).map_err(|err| io_failure(path, err))?;
        archive
            .start_file(name, options)
            .map_err(|err| CommandError::failure(format!("zip: {err}")))?;
        archive
            .write_all(&bytes)
            .map_err(|err| io_failure(output, err))?;
    }
    archive
        .finish()
        .map_err(|err| CommandError::failure(format!("zip: {err}")))?;
    Ok(files.len())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CommandError> {
    let entries = fs::read_dir(dir).map_err(|err| io_failure(dir, err))?;
    for entry in entries {
        let path = entry.map_err(|err| io_failure(dir, err))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

fn entry_name(base: &Path, path: &Path) -> Result<String, CommandError> {
    let relative = path.strip_prefix(base).map_err(|_| {
        CommandError::failure(format!("{} is outside {}", path.display(), base.display()))
    })?;
    Ok(relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn io_failure(path: &Path, err: std::io::Error) -> CommandError {
    CommandError::failure(format!("io error at {}: {err}", path.display()))
}
