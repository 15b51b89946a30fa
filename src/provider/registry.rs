use crate::provider::{read_prompt, ProviderError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps agent identifiers to their system prompt files (`<dir>/<agent>.md`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRegistry {
    prompts: BTreeMap<String, PathBuf>,
}

impl AgentRegistry {
    /// Scans `prompt_dirs` in order; when two directories define the same agent the
    /// earlier directory wins. Missing directories are skipped.
    pub fn discover(prompt_dirs: &[PathBuf]) -> Self {
        let mut prompts = BTreeMap::new();
        for dir in prompt_dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            let mut found = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("md"))
                .collect::<Vec<_>>();
            found.sort();
            for path in found {
                let Some(agent) = path.file_stem().and_then(|stem| stem.to_str()) else {
                    continue;
                };
                prompts.entry(agent.to_string()).or_insert(path.clone());
            }
        }
        Self { prompts }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            prompts: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.prompts.contains_key(agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn prompt_path(&self, agent: &str) -> Result<&Path, ProviderError> {
        self.prompts
            .get(agent)
            .map(PathBuf::as_path)
            .ok_or_else(|| ProviderError::MissingResource {
                agent: agent.to_string(),
            })
    }

    pub fn load_prompt(&self, agent: &str) -> Result<String, ProviderError> {
        read_prompt(self.prompt_path(agent)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn earlier_prompt_directories_shadow_later_ones() {
        let dir = tempdir().expect("tempdir");
        let fused = dir.path().join("agents/fused");
        let core = dir.path().join("agents/core");
        fs::create_dir_all(&fused).expect("fused");
        fs::create_dir_all(&core).expect("core");
        fs::write(fused.join("Writer.md"), "fused writer").expect("write");
        fs::write(core.join("Writer.md"), "core writer").expect("write");
        fs::write(core.join("Reviewer.md"), "core reviewer").expect("write");
        fs::write(core.join("notes.txt"), "ignored").expect("write");

        let registry = AgentRegistry::discover(&[
            fused,
            dir.path().join("agents/missing"),
            core,
        ]);

        assert_eq!(registry.agents().collect::<Vec<_>>(), vec!["Reviewer", "Writer"]);
        assert_eq!(registry.load_prompt("Writer").expect("prompt"), "fused writer");
        assert!(!registry.contains("notes"));
        assert!(matches!(
            registry.load_prompt("Ghost"),
            Err(ProviderError::MissingResource { agent }) if agent == "Ghost"
        ));
    }
}
