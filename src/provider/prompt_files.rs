use crate::provider::{io_error, PromptFiles, ProviderError};
use std::fs;
use std::path::Path;

pub const PROMPT_FILES_DIR: &str = "prompts";

/// Writes `<work_dir>/prompts/<request_id>.system.md` and `.context.md`.
pub fn write_prompt_files(
    work_dir: &Path,
    request_id: &str,
    system_prompt: &str,
    context: &str,
) -> Result<PromptFiles, ProviderError> {
    let dir = work_dir.join(PROMPT_FILES_DIR);
    fs::create_dir_all(&dir).map_err(|err| io_error(&dir, err))?;

    let files = PromptFiles {
        system_prompt: dir.join(format!("{request_id}.system.md")),
        context: dir.join(format!("{request_id}.context.md")),
    };
    for (path, body) in [(&files.system_prompt, system_prompt), (&files.context, context)] {
        fs::write(path, body).map_err(|err| io_error(path, err))?;
    }
    Ok(files)
}

pub fn read_prompt(path: &Path) -> Result<String, ProviderError> {
    fs::read_to_string(path).map_err(|err| io_error(path, err))
}
