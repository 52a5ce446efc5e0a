use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::Date;

use super::constants::{DEFAULT_DIR_NAME, LOCAL_MAP_FILE};
use super::error::ConfigError;
use super::trigger_bits::TriggerCut;

/// Structure representing the decoder configuration. Contains the mapping-file pathing,
/// the variable prefix and the trigger cut.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecDataConfig {
    pub prefix: String,
    pub map_file: PathBuf,
    pub db_dir: Option<PathBuf>,
    pub db_name: String,
    pub trigger_cut: TriggerCut,
    pub histogram_path: Option<PathBuf>,
}

impl Default for DecDataConfig {
    /// Look for decdata.map in the current directory only, publish as D.<name>
    fn default() -> Self {
        Self {
            prefix: String::from("D."),
            map_file: PathBuf::from(LOCAL_MAP_FILE),
            db_dir: None,
            db_name: String::from("D"),
            trigger_cut: TriggerCut::default(),
            histogram_path: None,
        }
    }
}

impl DecDataConfig {
    /// Read the configuration in a YAML file
    /// Returns a DecDataConfig if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Name of the database file inside a database directory
    pub fn db_file_name(&self) -> String {
        format!("db_{}.dat", self.db_name)
    }

    /// Mapping files to try, in order, for a run taken on `run_date`.
    ///
    /// The local map file always comes first. If a database directory is configured, it is
    /// followed by the file in the latest YYYYMMDD subdirectory not after the run date, then
    /// the DEFAULT subdirectory, then the database directory itself.
    pub fn candidate_files(&self, run_date: Date) -> Vec<PathBuf> {
        let mut candidates = vec![self.map_file.clone()];
        if let Some(db_dir) = &self.db_dir {
            let file_name = self.db_file_name();
            if let Some(dated) = Self::get_validity_directory(db_dir, run_date) {
                candidates.push(dated.join(&file_name));
            }
            candidates.push(db_dir.join(DEFAULT_DIR_NAME).join(&file_name));
            candidates.push(db_dir.join(&file_name));
        }
        candidates
    }

    /// Find the most recent YYYYMMDD directory which is valid for run_date
    fn get_validity_directory(db_dir: &Path, run_date: Date) -> Option<PathBuf> {
        let format = format_description!("[year][month][day]");
        let entries = match db_dir.read_dir() {
            Ok(entries) => entries,
            Err(e) => {
                spdlog::debug!("Could not read database directory {db_dir:?}: {e}");
                return None;
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name();
                let date = Date::parse(name.to_str()?, &format).ok()?;
                Some((date, entry.path()))
            })
            .filter(|(date, _)| *date <= run_date)
            .max_by_key(|(date, _)| *date)
            .map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_candidates_without_db() {
        let config = DecDataConfig::default();
        assert_eq!(
            config.candidate_files(date!(2004 - 04 - 01)),
            vec![PathBuf::from("decdata.map")]
        );
    }

    #[test]
    fn test_candidates_with_db() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["20030101", "20040301", "20050101", "DEFAULT", "notadate"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let config = DecDataConfig {
            db_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let candidates = config.candidate_files(date!(2004 - 04 - 01));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("decdata.map"),
                dir.path().join("20040301").join("db_D.dat"),
                dir.path().join("DEFAULT").join("db_D.dat"),
                dir.path().join("db_D.dat"),
            ]
        );

        // Before any validity window
        let candidates = config.candidate_files(date!(2002 - 01 - 01));
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "prefix: 'X.'\ntrigger_cut:\n  low: 10\n  high: 20\n",
        )
        .unwrap();
        let config = DecDataConfig::read_config_file(&path).unwrap();
        assert_eq!(config.prefix, "X.");
        assert_eq!(config.trigger_cut, TriggerCut { low: 10, high: 20 });
        assert_eq!(config.db_name, "D");

        assert!(matches!(
            DecDataConfig::read_config_file(&dir.path().join("missing.yml")),
            Err(ConfigError::BadFilePath(_))
        ));
    }
}
