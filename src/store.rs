use std::fs;
use std::path::{Path, PathBuf};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::{debug, info};

use crate::error::StoreError;
use crate::models::{ConfigFile, Project, Settings, TerminalApp};

/// Minimum skim score before a near-miss name is offered as a suggestion.
pub const FUZZY_SUGGEST_THRESHOLD: i64 = 40;

/// Result of looking up a project by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Exact(usize),
    /// No exact match, but a close enough name worth confirming with the
    /// user.
    Suggestion { name: String, score: i64 },
    NotFound,
}

/// Owned view of the config file. Every mutation persists immediately; the
/// single-user desktop app never mutates the file concurrently.
pub struct Store {
    path: PathBuf,
    config: ConfigFile,
}

impl Store {
    /// All persistent state lives under `~/.kickoff/`.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kickoff")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn load() -> Result<Self, StoreError> {
        Self::open_at(Self::config_path())
    }

    /// Open the store at an explicit path. A missing file produces the
    /// default config, written to disk so the file exists from first run.
    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            info!("no config at {}, writing defaults", path.display());
            let store = Store {
                path,
                config: ConfigFile::default(),
            };
            store.save()?;
            return Ok(store);
        }

        let text = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let config: ConfigFile =
            serde_yaml::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(
            "loaded {} projects from {}",
            config.projects.len(),
            path.display()
        );
        Ok(Store { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[Project] {
        &self.config.projects
    }

    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    /// Write the config atomically: serialize, write a temp file next to
    /// the target, then rename over it so a crash never truncates the file.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let yaml = serde_yaml::to_string(&self.config)
            .map_err(|source| StoreError::Serialize { source })?;

        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved config to {}", self.path.display());
        Ok(())
    }

    pub fn add_project(&mut self, project: Project) -> Result<(), StoreError> {
        if self
            .config
            .projects
            .iter()
            .any(|p| p.name == project.name)
        {
            return Err(StoreError::DuplicateProject { name: project.name });
        }
        self.config.projects.push(project);
        self.save()
    }

    pub fn update_project(&mut self, name: &str, project: Project) -> Result<(), StoreError> {
        let index = self
            .config
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| StoreError::UnknownProject {
                name: name.to_string(),
            })?;
        if project.name != name
            && self.config.projects.iter().any(|p| p.name == project.name)
        {
            return Err(StoreError::DuplicateProject { name: project.name });
        }
        self.config.projects[index] = project;
        self.save()
    }

    pub fn remove_project(&mut self, name: &str) -> Result<Project, StoreError> {
        let index = self
            .config
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| StoreError::UnknownProject {
                name: name.to_string(),
            })?;
        let removed = self.config.projects.remove(index);
        self.save()?;
        Ok(removed)
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.config.projects.iter().find(|p| p.name == name)
    }

    /// Exact match first, then the best fuzzy candidate above the
    /// suggestion threshold so the CLI can ask "did you mean".
    pub fn resolve_project(&self, input: &str) -> Resolution {
        if let Some(index) = self.config.projects.iter().position(|p| p.name == input) {
            return Resolution::Exact(index);
        }

        let matcher = SkimMatcherV2::default();
        let mut best: Option<(i64, &str)> = None;
        for project in &self.config.projects {
            if let Some(score) = matcher.fuzzy_match(&project.name, input) {
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, &project.name));
                }
            }
        }

        match best {
            Some((score, name)) if score >= FUZZY_SUGGEST_THRESHOLD => Resolution::Suggestion {
                name: name.to_string(),
                score,
            },
            _ => Resolution::NotFound,
        }
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match key {
            "terminal" => {
                let terminal: TerminalApp =
                    serde_yaml::from_str(value).map_err(|_| StoreError::InvalidSetting {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                self.config.settings.terminal = terminal;
            }
            "show_on_startup" => {
                let flag: bool = value.parse().map_err(|_| StoreError::InvalidSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                self.config.settings.show_on_startup = flag;
            }
            _ => {
                return Err(StoreError::UnknownSetting {
                    key: key.to_string(),
                })
            }
        }
        self.save()
    }

    pub fn get_setting(&self, key: &str) -> Result<String, StoreError> {
        match key {
            "terminal" => Ok(self.config.settings.terminal.config_name().to_string()),
            "show_on_startup" => Ok(self.config.settings.show_on_startup.to_string()),
            _ => Err(StoreError::UnknownSetting {
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, AiTool, Ide};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            path: PathBuf::from("/tmp/dev").join(name),
            terminal: None,
            actions: vec![
                Action::Ide { ide: Ide::Vscode },
                Action::AiTool {
                    tool: AiTool::Aider,
                },
            ],
        }
    }

    fn store_in(dir: &TempDir) -> Store {
        Store::open_at(dir.path().join("config.yaml")).unwrap()
    }

    #[test]
    fn missing_file_produces_default_config_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.path().exists());
        assert!(store.projects().is_empty());
        assert!(store.settings().show_on_startup);
    }

    #[test]
    fn save_load_save_round_trips_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_project(sample_project("alpha")).unwrap();
        store.add_project(sample_project("beta")).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        let reloaded = Store::open_at(store.path().to_path_buf()).unwrap();
        reloaded.save().unwrap();
        let second = fs::read_to_string(reloaded.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_project_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_project(sample_project("alpha")).unwrap();
        let err = store.add_project(sample_project("alpha")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateProject { .. }));
        assert_eq!(store.projects().len(), 1);
    }

    #[test]
    fn update_renames_but_rejects_name_collisions() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_project(sample_project("alpha")).unwrap();
        store.add_project(sample_project("beta")).unwrap();

        let mut renamed = sample_project("gamma");
        renamed.terminal = Some(TerminalApp::Konsole);
        store.update_project("alpha", renamed).unwrap();
        let reloaded = Store::open_at(store.path().to_path_buf()).unwrap();
        assert!(reloaded.project("alpha").is_none());
        assert_eq!(
            reloaded.project("gamma").unwrap().terminal,
            Some(TerminalApp::Konsole)
        );

        let err = store
            .update_project("beta", sample_project("gamma"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateProject { .. }));
    }

    #[test]
    fn remove_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_project(sample_project("alpha")).unwrap();
        store.remove_project("alpha").unwrap();

        let reloaded = Store::open_at(store.path().to_path_buf()).unwrap();
        assert!(reloaded.projects().is_empty());
    }

    #[test]
    fn resolve_prefers_exact_then_suggests() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_project(sample_project("my-website")).unwrap();
        store.add_project(sample_project("backend-api")).unwrap();

        assert_eq!(store.resolve_project("my-website"), Resolution::Exact(0));
        match store.resolve_project("mywebsite") {
            Resolution::Suggestion { name, .. } => assert_eq!(name, "my-website"),
            other => panic!("expected suggestion, got {other:?}"),
        }
        assert_eq!(store.resolve_project("zzz"), Resolution::NotFound);
    }

    #[test]
    fn settings_round_trip_through_set_get() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_setting("terminal", "konsole").unwrap();
        assert_eq!(store.get_setting("terminal").unwrap(), "konsole");
        store.set_setting("show_on_startup", "false").unwrap();
        assert_eq!(store.get_setting("show_on_startup").unwrap(), "false");

        let err = store.set_setting("theme", "dark").unwrap_err();
        assert!(matches!(err, StoreError::UnknownSetting { .. }));
        let err = store.set_setting("show_on_startup", "maybe").unwrap_err();
        assert!(matches!(err, StoreError::InvalidSetting { .. }));
    }
}
