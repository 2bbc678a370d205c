// Persistence for tournaments. The engine only calls into this at two points:
// after a tournament is created, and after a finished match has been recorded.

use crate::error::{LeagueError, Result};
use crate::tournament::{slugify, Tournament};
use std::fs;
use std::path::{Path, PathBuf};

pub trait TournamentStore {
    fn save(&self, tournament: &Tournament) -> Result<()>;
    fn load(&self, slug: &str) -> Result<Tournament>;
}

/// One pretty-printed JSON file per tournament, named by slug
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonFileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slugify(slug)))
    }

    /// Slugs of every stored tournament, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut slugs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slugs.push(stem.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }
}

impl TournamentStore for JsonFileStore {
    fn save(&self, tournament: &Tournament) -> Result<()> {
        let path = self.path_for(&tournament.slug());
        let json = serde_json::to_string_pretty(tournament)?;
        // write then rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "tournament saved");
        Ok(())
    }

    fn load(&self, slug: &str) -> Result<Tournament> {
        let path = self.path_for(slug);
        if !path.exists() {
            return Err(LeagueError::TournamentNotFound(slug.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        let tournament = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "tournament loaded");
        Ok(tournament)
    }
}
