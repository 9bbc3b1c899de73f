/// This module compiles the YieldHub contract sources. Every source file is
/// built by the newest configured solc release that satisfies its own version
/// pragma and those of its imports, using that release's optimizer settings.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use ethers::{
    abi::Abi,
    contract::ContractFactory,
    providers::Middleware,
    types::Bytes,
};
use ethers_solc::{
    artifacts::{Optimizer, Settings, Source, Sources},
    Artifact, Graph, Project, ProjectPathsConfig, Solc, SolcConfig,
};
use eyre::{eyre, Result};
use semver::Version;
use tracing::info;
use yieldhub_config::{CompilerConfig, CompilerSettings, ConfigError};

/// The ABI and creation bytecode of every compiled contract, by name.
#[derive(Clone, Debug, Default)]
pub struct CompiledContracts {
    artifacts: BTreeMap<String, (Abi, Bytes)>,
}

impl CompiledContracts {
    pub fn from_artifacts<I>(artifacts: I) -> Self
    where
        I: IntoIterator<Item = (String, Abi, Bytes)>,
    {
        Self {
            artifacts: artifacts
                .into_iter()
                .map(|(name, abi, bytecode)| (name, (abi, bytecode)))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// A factory that deploys the named contract through `client`.
    pub fn factory<M: Middleware>(&self, name: &str, client: Arc<M>) -> Result<ContractFactory<M>> {
        let (abi, bytecode) = self
            .artifacts
            .get(name)
            .ok_or_else(|| eyre!("no compiled artifact for contract {}", name))?;
        Ok(ContractFactory::new(abi.clone(), bytecode.clone(), client))
    }
}

/// Groups the sources by the compiler that will build them. A source is
/// compiled together with everything it imports, so the compiler is picked
/// against the pragmas of the whole import closure.
fn group_sources(
    paths: &ProjectPathsConfig,
    config: &CompilerConfig,
    sources: Sources,
) -> Result<BTreeMap<Version, (CompilerSettings, Sources)>> {
    let graph = Graph::resolve_sources(paths, sources)?;
    let mut groups = BTreeMap::<Version, (CompilerSettings, Sources)>::new();
    for (id, node) in graph.input_nodes().enumerate() {
        let requirements = graph
            .nodes(id)
            .filter_map(|node| node.version().as_ref())
            .map(|version| Solc::version_req(version.data()))
            .collect::<Result<Vec<_>, _>>()?;
        let (path, source) = node.unpack();
        let settings = config.select(path, &requirements)?;
        groups
            .entry(settings.version.clone())
            .or_insert_with(|| (settings.clone(), Sources::new()))
            .1
            .insert(path.clone(), source.clone());
    }
    Ok(groups)
}

fn paths(root: &Path, config: &CompilerConfig) -> Result<ProjectPathsConfig> {
    Ok(ProjectPathsConfig::builder()
        .root(root)
        .sources(root.join(&config.sources))
        .lib(root.join("node_modules"))
        .build()?)
}

fn project(paths: ProjectPathsConfig, settings: &CompilerSettings) -> Result<Project> {
    let solc_config = SolcConfig::builder()
        .settings(Settings {
            optimizer: Optimizer {
                enabled: Some(settings.optimizer_enabled),
                runs: Some(settings.optimizer_runs),
                ..Default::default()
            },
            ..Default::default()
        })
        .build();
    Ok(Project::builder()
        .paths(paths)
        .solc_config(solc_config)
        .ephemeral()
        .no_artifacts()
        .build()?)
}

/// Compiles the sources under `root`. Any compiler error aborts the build.
/// This downloads missing solc releases and blocks while doing so.
pub fn compile(root: &Path, config: &CompilerConfig) -> Result<CompiledContracts> {
    let sources_dir: PathBuf = root.join(&config.sources);
    let sources = Source::read_all_from(&sources_dir)?;
    if sources.is_empty() {
        return Err(eyre!("no sources found in {}", sources_dir.display()));
    }

    let paths = paths(root, config)?;
    let mut contracts = CompiledContracts::default();
    for (version, (settings, sources)) in group_sources(&paths, config, sources)? {
        info!(%version, sources = sources.len(), "compiling");
        let solc = Solc::find_or_install_svm_version(version.to_string())?;
        let output = project(paths.clone(), &settings)?.compile_with_version(&solc, sources)?;
        if output.has_compiler_errors() {
            return Err(eyre!("compilation with solc {} failed:\n{}", version, output));
        }
        for (id, artifact) in output.into_artifacts() {
            let (abi, bytecode, _) = artifact.into_parts();
            // Interfaces and abstract contracts have no bytecode to deploy.
            if let (Some(abi), Some(bytecode)) = (abi, bytecode) {
                if !bytecode.is_empty() {
                    contracts.artifacts.insert(id.name, (abi, bytecode));
                }
            }
        }
    }
    Ok(contracts)
}

/// Checks that every named contract was compiled. This runs before any
/// transaction is sent.
pub fn require_contracts<'a, I>(contracts: &CompiledContracts, names: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a str>,
{
    let missing = names
        .into_iter()
        .filter(|name| !contracts.contains(name))
        .map(|name| format!("contract {}", name))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingValues(missing))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ethers::abi::Abi;

    use super::*;

    /// A throwaway project root holding the given contract sources.
    struct Sandbox {
        root: PathBuf,
    }

    impl Sandbox {
        fn new(name: &str, files: &[(&str, &str)]) -> Result<Self> {
            let root = std::env::temp_dir().join(format!(
                "yieldhub-compile-{}-{}",
                name,
                std::process::id()
            ));
            let config = CompilerConfig::default();
            let sources = root.join(&config.sources);
            fs::create_dir_all(&sources)?;
            for (file, content) in files {
                fs::write(sources.join(file), content)?;
            }
            Ok(Self { root })
        }

        fn group(&self) -> Result<BTreeMap<Version, (CompilerSettings, Sources)>> {
            let config = CompilerConfig::default();
            let sources = Source::read_all_from(self.root.join(&config.sources))?;
            group_sources(&paths(&self.root, &config)?, &config, sources)
        }
    }

    impl Drop for Sandbox {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    fn file_names(sources: &Sources) -> Vec<String> {
        let mut names = sources
            .keys()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_group_sources() -> Result<()> {
        let sandbox = Sandbox::new(
            "pragmas",
            &[
                ("Vault.sol", "pragma solidity ^0.8.0;\ncontract Vault {}"),
                ("Strategy.sol", "pragma solidity ^0.8.0;\ncontract Strategy {}"),
                ("Legacy.sol", "pragma solidity ^0.6.0;\ncontract Legacy {}"),
            ],
        )?;

        let groups = sandbox.group()?;
        assert_eq!(
            groups.keys().cloned().collect::<Vec<_>>(),
            vec![Version::new(0, 6, 12), Version::new(0, 8, 11)]
        );
        assert_eq!(
            file_names(&groups[&Version::new(0, 8, 11)].1),
            vec!["Strategy.sol", "Vault.sol"]
        );
        assert_eq!(file_names(&groups[&Version::new(0, 6, 12)].1), vec!["Legacy.sol"]);
        Ok(())
    }

    #[test]
    fn test_group_sources_follows_pinned_imports() -> Result<()> {
        let sandbox = Sandbox::new(
            "imports",
            &[
                (
                    "Vault.sol",
                    "pragma solidity ^0.8.0;\nimport \"./Lib.sol\";\ncontract Vault {}",
                ),
                ("Lib.sol", "pragma solidity =0.8.4;\nlibrary Lib {}"),
                ("Strategy.sol", "pragma solidity ^0.8.0;\ncontract Strategy {}"),
            ],
        )?;

        // The vault can only be built by the compiler its library is pinned to.
        let groups = sandbox.group()?;
        assert_eq!(
            file_names(&groups[&Version::new(0, 8, 4)].1),
            vec!["Lib.sol", "Vault.sol"]
        );
        assert_eq!(
            file_names(&groups[&Version::new(0, 8, 11)].1),
            vec!["Strategy.sol"]
        );
        Ok(())
    }

    #[test]
    fn test_group_sources_with_incompatible_imports() -> Result<()> {
        let sandbox = Sandbox::new(
            "incompatible",
            &[
                (
                    "Vault.sol",
                    "pragma solidity ^0.8.0;\nimport \"./Old.sol\";\ncontract Vault {}",
                ),
                ("Old.sol", "pragma solidity ^0.6.0;\nlibrary Old {}"),
            ],
        )?;
        assert!(sandbox.group().is_err());
        Ok(())
    }

    #[test]
    fn test_group_sources_without_compiler() -> Result<()> {
        let sandbox = Sandbox::new(
            "ancient",
            &[("Ancient.sol", "pragma solidity ^0.4.24;\ncontract Ancient {}")],
        )?;
        assert!(sandbox.group().is_err());
        Ok(())
    }

    #[test]
    fn test_require_contracts() {
        let contracts = CompiledContracts::from_artifacts(vec![(
            "YieldHubVaultV6".to_string(),
            Abi::default(),
            Bytes::from(vec![0x60, 0x00]),
        )]);
        assert!(require_contracts(&contracts, ["YieldHubVaultV6"]).is_ok());
        match require_contracts(&contracts, ["YieldHubVaultV6", "StrategyTelosOmnidexLP"]) {
            Err(ConfigError::MissingValues(missing)) => {
                assert_eq!(missing, vec!["contract StrategyTelosOmnidexLP"])
            }
            other => panic!("expected missing contract, got {:?}", other),
        }
    }
}
