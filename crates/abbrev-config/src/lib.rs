use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the custom snippets file looked up inside `extensions_path`.
pub const SNIPPETS_FILE: &str = "snippets.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How void elements are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfClosingStyle {
    /// `<br>`
    #[default]
    Html,
    /// `<br />`
    Xhtml,
    /// `<br/>`
    Xml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeQuotes {
    #[default]
    Double,
    Single,
}

/// Per-language output preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxProfile {
    pub self_closing_style: SelfClosingStyle,
    pub attribute_quotes: AttributeQuotes,
    /// Number of inline siblings from which each one goes on its own line.
    pub inline_break: usize,
    /// Filters applied to every expansion in this language.
    pub filters: Vec<String>,
}

impl Default for SyntaxProfile {
    fn default() -> Self {
        Self {
            self_closing_style: SelfClosingStyle::Html,
            attribute_quotes: AttributeQuotes::Double,
            inline_break: 3,
            filters: Vec::new(),
        }
    }
}

/// Values substituted into document snippets such as `!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variables {
    pub lang: String,
    pub charset: String,
}

impl Default for Variables {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            charset: "UTF-8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Languages in which both commands are no-ops.
    pub exclude_languages: Vec<String>,
    /// Extra languages mapped onto a supported syntax, e.g. `javascript = "html"`.
    pub include_languages: BTreeMap<String, String>,
    /// Directory holding a custom `snippets.toml`.
    pub extensions_path: Option<PathBuf>,
    pub syntax_profiles: BTreeMap<String, SyntaxProfile>,
    pub variables: Variables,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_languages: vec!["markdown".to_string()],
            include_languages: BTreeMap::new(),
            extensions_path: None,
            syntax_profiles: BTreeMap::new(),
            variables: Variables::default(),
        }
    }
}

/// Custom snippet tables keyed by language (`html`, `css`, ...).
pub type SnippetOverrides = BTreeMap<String, BTreeMap<String, String>>;

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the extensions directory
        config.extensions_path = config
            .extensions_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/abbrev");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Read `<extensions_path>/snippets.toml`.
    ///
    /// Returns `Ok(None)` when no extensions path is configured or the file
    /// does not exist.
    pub fn load_snippets(&self) -> Result<Option<SnippetOverrides>, ConfigError> {
        let Some(dir) = &self.extensions_path else {
            return Ok(None);
        };
        let path = dir.join(SNIPPETS_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::ConfigReadError {
                config_path: path.clone(),
                source,
            })?;
        let snippets = toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: path,
            source,
        })?;
        Ok(Some(snippets))
    }

    pub fn is_excluded(&self, language: &str) -> bool {
        self.exclude_languages.iter().any(|l| l == language)
    }

    /// The syntax a language is expanded as: its `include_languages`
    /// mapping when present, otherwise the language itself.
    pub fn syntax_for<'a>(&'a self, language: &'a str) -> &'a str {
        self.include_languages
            .get(language)
            .map(String::as_str)
            .unwrap_or(language)
    }

    /// Output profile for a language, falling back to its mapped syntax
    /// and then to the defaults.
    pub fn profile_for(&self, language: &str) -> SyntaxProfile {
        self.syntax_profiles
            .get(language)
            .or_else(|| self.syntax_profiles.get(self.syntax_for(language)))
            .cloned()
            .unwrap_or_default()
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/abbrev/config.toml"));
    }

    #[test]
    fn test_default_excludes_markdown() {
        let config = Config::default();
        assert!(config.is_excluded("markdown"));
        assert!(!config.is_excluded("html"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut original = Config::default();
        original
            .include_languages
            .insert("javascript".into(), "html".into());
        original.syntax_profiles.insert(
            "xml".into(),
            SyntaxProfile {
                self_closing_style: SelfClosingStyle::Xml,
                ..SyntaxProfile::default()
            },
        );

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("exclude_languages = []\n").unwrap();
        assert!(config.exclude_languages.is_empty());
        assert_eq!(config.variables.lang, "en");
        assert_eq!(config.profile_for("html"), SyntaxProfile::default());
    }

    #[test]
    fn test_syntax_profiles_from_toml() {
        let content = r#"
[syntax_profiles.xhtml]
self_closing_style = "xhtml"
attribute_quotes = "single"
filters = ["c"]
"#;
        let config: Config = toml::from_str(content).unwrap();
        let profile = config.profile_for("xhtml");
        assert_eq!(profile.self_closing_style, SelfClosingStyle::Xhtml);
        assert_eq!(profile.attribute_quotes, AttributeQuotes::Single);
        assert_eq!(profile.filters, vec!["c"]);
        assert_eq!(profile.inline_break, 3);
    }

    #[test]
    fn test_include_languages_mapping() {
        let mut config = Config::default();
        config
            .include_languages
            .insert("javascript".into(), "html".into());
        config.syntax_profiles.insert(
            "html".into(),
            SyntaxProfile {
                inline_break: 5,
                ..SyntaxProfile::default()
            },
        );

        assert_eq!(config.syntax_for("javascript"), "html");
        assert_eq!(config.syntax_for("css"), "css");
        assert_eq!(config.profile_for("javascript").inline_break, 5);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("ABBREV_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$ABBREV_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("ABBREV_TEST_VAR");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "exclude_languages = 3").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::default();
        test_config.exclude_languages.push("plaintext".into());

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_load_snippets_from_extensions_path() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(SNIPPETS_FILE),
            "[html]\ncard = \"div.card>h2+p\"\n\n[css]\nbrs = \"border-radius:|\"\n",
        )
        .unwrap();

        let config = Config {
            extensions_path: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };
        let snippets = config.load_snippets().unwrap().unwrap();

        assert_eq!(snippets["html"]["card"], "div.card>h2+p");
        assert_eq!(snippets["css"]["brs"], "border-radius:|");
    }

    #[test]
    fn test_load_snippets_without_path() {
        assert!(Config::default().load_snippets().unwrap().is_none());
    }

    #[test]
    fn test_extensions_path_is_expanded_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "extensions_path = \"~/abbrev-snippets\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        let path = config.extensions_path.unwrap();

        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("abbrev-snippets"));
    }
}
