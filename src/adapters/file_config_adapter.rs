//! INI file configuration adapter.

use crate::domain::error::MactraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MactraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| MactraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, MactraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| MactraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = ./data
symbol = ETH/USD

[strategy]
short_window = 25
long_window = 70
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".to_string()));
        assert_eq!(
            adapter.get_string("data", "symbol"),
            Some("ETH/USD".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "long_window"),
            Some("70".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_cash = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn values_are_trimmed() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ncommission =   0.002  \n").unwrap();
        assert_eq!(
            adapter.get_string("backtest", "commission"),
            Some("0.002".to_string())
        );
    }

    #[test]
    fn blank_values_read_as_missing() {
        let adapter = FileConfigAdapter::from_string("[data]\nsymbol =   \n").unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[sentiment]\nmode = fixed\nscore = -0.7\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("sentiment", "mode"),
            Some("fixed".to_string())
        );
        assert_eq!(
            adapter.get_string("sentiment", "score"),
            Some("-0.7".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(MactraderError::ConfigParse { .. })));
    }
}
