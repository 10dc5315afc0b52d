use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::board::Marks;
use crate::error::ConfigError;

/// How to choose between several origins that all reach their goal edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The win from the earliest origin in scan order. Deterministic.
    #[default]
    ScanOrder,
    /// Whichever win reaches the coordinator first.
    FirstReported,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "scan-order" => Ok(TieBreak::ScanOrder),
            "first-reported" => Ok(TieBreak::FirstReported),
            other => Err(format!("unknown tie-break policy '{}'", other)),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::ScanOrder => write!(f, "scan-order"),
            TieBreak::FirstReported => write!(f, "first-reported"),
        }
    }
}

/// Resolver configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Worker threads; 0 means one per logical CPU.
    pub threads: usize,
    pub tie_break: TieBreak,
    /// Stack size of each worker thread, in MiB. Search paths live on the
    /// heap, so this does not limit board size.
    pub stack_size_mib: usize,
    pub marks: Marks,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            threads: 0,
            tie_break: TieBreak::default(),
            stack_size_mib: 8,
            marks: Marks::default(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: ResolverConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Number of worker threads to start.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads > 1024 {
            return Err(ConfigError::Validation("threads must be <= 1024".into()));
        }
        if self.stack_size_mib == 0 || self.stack_size_mib > 1024 {
            return Err(ConfigError::Validation(
                "stack_size_mib must be in [1, 1024]".into(),
            ));
        }
        let Marks {
            owner_a,
            owner_b,
            empty,
        } = self.marks;
        if owner_a == owner_b || owner_a == empty || owner_b == empty {
            return Err(ConfigError::Validation(
                "marks.owner_a, marks.owner_b and marks.empty must differ".into(),
            ));
        }
        if [owner_a, owner_b, empty].iter().any(|c| c.is_whitespace()) {
            return Err(ConfigError::Validation(
                "marks must not be whitespace".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tie_break, TieBreak::ScanOrder);
        assert!(config.effective_threads() >= 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ResolverConfig = toml::from_str(
            r#"
            threads = 2
            tie_break = "first-reported"

            [marks]
            owner_a = "R"
            "#,
        )
        .unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.effective_threads(), 2);
        assert_eq!(config.tie_break, TieBreak::FirstReported);
        assert_eq!(config.stack_size_mib, 8);
        assert_eq!(config.marks.owner_a, 'R');
        assert_eq!(config.marks.owner_b, 'O');
    }

    #[test]
    fn test_duplicate_marks_rejected() {
        let mut config = ResolverConfig::default();
        config.marks.owner_b = 'X';
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_whitespace_mark_rejected() {
        let mut config = ResolverConfig::default();
        config.marks.empty = ' ';
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_stack_rejected() {
        let config = ResolverConfig {
            stack_size_mib: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tie_break_parse() {
        assert_eq!("scan-order".parse::<TieBreak>(), Ok(TieBreak::ScanOrder));
        assert_eq!(
            "first-reported".parse::<TieBreak>(),
            Ok(TieBreak::FirstReported)
        );
        assert!("random".parse::<TieBreak>().is_err());
        assert_eq!(TieBreak::FirstReported.to_string(), "first-reported");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "connect-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "threads = 3\nstack_size_mib = 16\n").unwrap();
        let config = ResolverConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.threads, 3);
        assert_eq!(config.stack_size_mib, 16);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let path = Path::new("/definitely/not/here/connect.toml");
        assert!(matches!(
            ResolverConfig::load(path),
            Err(ConfigError::FileRead { .. })
        ));
        assert_eq!(
            ResolverConfig::load_or_default(path).unwrap(),
            ResolverConfig::default()
        );
    }
}
