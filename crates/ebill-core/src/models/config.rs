//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the ebill pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EbillConfig {
    /// Input discovery configuration.
    pub input: InputConfig,

    /// CSV output configuration.
    pub output: OutputConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Which files in the input directory are treated as bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File extension to scan for, without the dot.
    pub extension: String,

    /// Match the extension case-sensitively.
    pub case_sensitive: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
            case_sensitive: false,
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Bill table file name, written into the input directory.
    pub file_name: String,

    /// Pivot table file name, written next to the bill table.
    pub pivot_file_name: String,

    /// Field delimiter.
    pub delimiter: char,

    /// Prefix the file with a UTF-8 byte order mark so spreadsheets
    /// detect the encoding.
    pub bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "账单.csv".to_string(),
            pivot_file_name: "账单透视表.csv".to_string(),
            delimiter: ',',
            bom: true,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Reject documents that lack the utility's bill header.
    pub require_signature: bool,

    /// Name of the bill layout (rule set) to apply.
    pub layout: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            require_signature: true,
            layout: "csg".to_string(),
        }
    }
}

impl EbillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// The delimiter as a single byte, if it is ASCII.
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.output.delimiter).ok().filter(u8::is_ascii)
    }
}
