use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A solc release and the optimizer settings used with it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub version: Version,
    pub optimizer_enabled: bool,
    pub optimizer_runs: usize,
}

impl CompilerSettings {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            optimizer_enabled: true,
            optimizer_runs: 200,
        }
    }
}

/// The compilers available to a build and where the contract sources live.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    pub compilers: Vec<CompilerSettings>,
    pub sources: PathBuf,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            compilers: [(0, 8, 11), (0, 8, 4), (0, 8, 2), (0, 6, 12), (0, 5, 5)]
                .into_iter()
                .map(|(major, minor, patch)| {
                    CompilerSettings::new(Version::new(major, minor, patch))
                })
                .collect(),
            sources: PathBuf::from("contracts/YieldHub"),
        }
    }
}

impl CompilerConfig {
    /// Picks the newest configured compiler that satisfies every version
    /// requirement of a source file and the files it imports.
    pub fn select<'a, I>(
        &self,
        source_file: &Path,
        requirements: I,
    ) -> Result<&CompilerSettings, ConfigError>
    where
        I: IntoIterator<Item = &'a VersionReq>,
    {
        let requirements = requirements.into_iter().collect::<Vec<_>>();
        self.compilers
            .iter()
            .filter(|settings| {
                requirements
                    .iter()
                    .all(|requirement| requirement.matches(&settings.version))
            })
            .max_by(|a, b| a.version.cmp(&b.version))
            .ok_or_else(|| ConfigError::NoCompiler {
                source_file: source_file.to_path_buf(),
                requirement: requirements
                    .iter()
                    .map(|requirement| requirement.to_string())
                    .collect::<Vec<_>>()
                    .join(" and "),
            })
    }
}
