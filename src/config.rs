// Configuration module for the PNL summary
// Contains the variant enum and the path/summary configuration structs

use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::error::SummaryError;

pub const DEFAULT_INPUT_FILE: &str = "S1-11-27-SUMMARY.xlsx";
pub const DEFAULT_SHEET: &str = "Portfolios";
pub const DEFAULT_OUTPUT_FILE: &str = "portfolio_summary.xlsx";

/// Environment variable naming the directory relative file names resolve against
pub const BASE_DIR_ENV: &str = "PNL_SUMMARY_DIR";

/// Which flavour of the report to build.
///
/// The upload flavour reads per-lot PNL and collapses `_REX` copies of a
/// portfolio; the batch flavour sums raw PNL as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Interactive,
    Batch,
}

impl FromStr for Variant {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interactive" => Ok(Self::Interactive),
            "batch" => Ok(Self::Batch),
            _ => Err(SummaryError::InvalidVariant(s.to_string())),
        }
    }
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Batch => "batch",
        }
    }

    /// Header of the PNL column this variant reads
    pub fn pnl_column(&self) -> &'static str {
        match self {
            Self::Interactive => "PNL Per Lot",
            Self::Batch => "PNL",
        }
    }

    pub fn deduplicates(&self) -> bool {
        matches!(self, Self::Interactive)
    }

    /// Whether a missing input sheet falls back to the first sheet
    pub fn sheet_fallback(&self) -> bool {
        matches!(self, Self::Interactive)
    }

    pub fn output_sheet(&self) -> &'static str {
        match self {
            Self::Interactive => "Summary",
            Self::Batch => "Sheet1",
        }
    }
}

/// Settings for one summary run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub pnl_column: String,
    pub deduplicate: bool,
    pub sheet_name: String,
    pub sheet_fallback: bool,
    pub output_sheet: String,
}

impl SummaryConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            pnl_column: variant.pnl_column().to_string(),
            deduplicate: variant.deduplicates(),
            sheet_name: DEFAULT_SHEET.to_string(),
            sheet_fallback: variant.sheet_fallback(),
            output_sheet: variant.output_sheet().to_string(),
        }
    }
}

/// File locations, resolved against a base directory
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub base: PathBuf,
    pub input_file: String,
    pub output_file: String,
}

impl PathConfig {
    /// Base directory comes from the argument, then `PNL_SUMMARY_DIR`, then
    /// the working directory.
    pub fn new(base: Option<PathBuf>, input_file: Option<String>, output_file: Option<String>) -> Self {
        let base = base
            .or_else(|| env::var(BASE_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            base,
            input_file: input_file.unwrap_or_else(|| DEFAULT_INPUT_FILE.to_string()),
            output_file: output_file.unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
        }
    }

    /// Absolute paths are returned unchanged
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.base.join(file)
    }

    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.input_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!("batch".parse::<Variant>().unwrap(), Variant::Batch);
        assert_eq!("interactive".parse::<Variant>().unwrap(), Variant::Interactive);
        assert!(matches!(
            "Batch".parse::<Variant>(),
            Err(SummaryError::InvalidVariant(_))
        ));
        for variant in [Variant::Interactive, Variant::Batch] {
            assert_eq!(variant.name().parse::<Variant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_variant_settings() {
        let upload = SummaryConfig::for_variant(Variant::Interactive);
        assert_eq!(upload.pnl_column, "PNL Per Lot");
        assert!(upload.deduplicate);
        assert!(upload.sheet_fallback);
        assert_eq!(upload.output_sheet, "Summary");

        let batch = SummaryConfig::for_variant(Variant::Batch);
        assert_eq!(batch.pnl_column, "PNL");
        assert!(!batch.deduplicate);
        assert!(!batch.sheet_fallback);
        assert_eq!(batch.sheet_name, DEFAULT_SHEET);
        assert_eq!(batch.output_sheet, "Sheet1");
    }

    #[test]
    fn test_path_config() {
        let paths = PathConfig::new(Some(PathBuf::from("/data")), None, Some("out.xlsx".to_string()));
        assert_eq!(paths.input_path(), PathBuf::from("/data/S1-11-27-SUMMARY.xlsx"));
        assert_eq!(paths.output_path(), PathBuf::from("/data/out.xlsx"));
        assert_eq!(paths.resolve("/tmp/x.csv"), PathBuf::from("/tmp/x.csv"));
    }
}
