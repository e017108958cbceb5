//! Resolution of contract names to Hardhat compilation artifacts

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, UNLINKED_LIBRARY_MARKER},
    errors::ScriptError,
};

/// Everything needed to produce a deployment transaction for a contract
#[derive(Clone, Debug)]
pub struct ContractFactory {
    /// The name of the contract
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The contract creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

/// The subset of a Hardhat artifact used for deployment
#[derive(Deserialize)]
struct HardhatArtifact {
    /// The contract ABI
    abi: JsonAbi,
    /// The hex-encoded creation bytecode
    bytecode: String,
}

impl ContractFactory {
    /// Parse a factory from the contents of a Hardhat artifact
    pub fn from_artifact_json(name: &str, json: &str) -> Result<Self, ScriptError> {
        let artifact: HardhatArtifact = serde_json::from_str(json)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;

        if artifact.bytecode.contains(UNLINKED_LIBRARY_MARKER) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has unlinked library references",
                name
            )));
        }

        let bytecode = Bytes::from_str(&artifact.bytecode)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no bytecode, it may be abstract or an interface",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            abi: artifact.abi,
            bytecode,
        })
    }
}

/// A directory of Hardhat artifacts, laid out as
/// `<root>/<source path>/<Contract>.json`
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The artifacts directory
    root: PathBuf,
}

impl ArtifactStore {
    /// A store rooted at the given artifacts directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The artifacts directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the factory for the named contract.
    ///
    /// Accepts either a bare contract name, which must be unique across the
    /// artifacts, or a fully qualified `path/to/Source.sol:Contract` name.
    pub fn factory(&self, name: &str) -> Result<ContractFactory, ScriptError> {
        let path = self.find(name)?;
        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        ContractFactory::from_artifact_json(name, &contents)
    }

    /// Find the artifact file for the named contract
    fn find(&self, name: &str) -> Result<PathBuf, ScriptError> {
        if !self.root.is_dir() {
            return Err(ScriptError::UnknownContract(format!(
                "{} (artifacts directory {} does not exist)",
                name,
                self.root.display()
            )));
        }

        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self
                .root
                .join(source)
                .join(contract)
                .with_extension(ARTIFACT_EXTENSION);

            return if path.is_file() {
                Ok(path)
            } else {
                Err(ScriptError::UnknownContract(name.to_string()))
            };
        }

        let file_name = format!("{}.{}", name, ARTIFACT_EXTENSION);
        let mut matches = Vec::new();
        collect_matching(&self.root, &file_name, &mut matches)?;
        matches.sort();

        match matches.len() {
            0 => Err(ScriptError::UnknownContract(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(ScriptError::ArtifactParsing(format!(
                "multiple artifacts named {}, use a fully qualified name: {}",
                name,
                matches
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Recursively collect the files under `dir` named `file_name`
fn collect_matching(
    dir: &Path,
    file_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", dir.display(), e)))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            collect_matching(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            matches.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal artifact with a `(string, string)` constructor
    pub(crate) const NFT_ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "Axe",
        "sourceName": "contracts/Axe.sol",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "name_", "type": "string", "internalType": "string" },
                    { "name": "symbol_", "type": "string", "internalType": "string" }
                ]
            }
        ],
        "bytecode": "0x6080604052",
        "deployedBytecode": "0x6080604052",
        "linkReferences": {},
        "deployedLinkReferences": {}
    }"#;

    /// Write an artifact to `<root>/contracts/<source>.sol/<name>.json`
    fn write_artifact(root: &Path, source: &str, name: &str, contents: &str) {
        let dir = root.join("contracts").join(format!("{}.sol", source));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.json", name)), contents).unwrap();
        fs::write(dir.join(format!("{}.dbg.json", name)), "{}").unwrap();
    }

    #[test]
    fn test_resolve_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Axe", "Axe", NFT_ARTIFACT);
        fs::create_dir_all(dir.path().join(BUILD_INFO_DIR)).unwrap();
        fs::write(dir.path().join(BUILD_INFO_DIR).join("Axe.json"), "{}").unwrap();

        let factory = ArtifactStore::new(dir.path()).factory("Axe").unwrap();
        assert_eq!(factory.name, "Axe");
        assert_eq!(factory.bytecode.len(), 5);
        assert_eq!(factory.abi.constructor().unwrap().inputs.len(), 2);
    }

    #[test]
    fn test_resolve_fully_qualified_name() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Axe", "Axe", NFT_ARTIFACT);
        write_artifact(dir.path(), "legacy/Axe", "Axe", NFT_ARTIFACT);

        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.factory("Axe"),
            Err(ScriptError::ArtifactParsing(_))
        ));
        assert!(store.factory("contracts/Axe.sol:Axe").is_ok());
    }

    #[test]
    fn test_unknown_contract() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Axe", "Axe", NFT_ARTIFACT);

        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.factory("MarketPlace"),
            Err(ScriptError::UnknownContract(_))
        ));
        assert!(matches!(
            ArtifactStore::new(dir.path().join("missing")).factory("Axe"),
            Err(ScriptError::UnknownContract(_))
        ));
    }

    #[test]
    fn test_reject_unusable_bytecode() {
        let interface =
            NFT_ARTIFACT.replace("\"bytecode\": \"0x6080604052\"", "\"bytecode\": \"0x\"");
        assert!(matches!(
            ContractFactory::from_artifact_json("IAxe", &interface),
            Err(ScriptError::ArtifactParsing(_))
        ));

        let unlinked = NFT_ARTIFACT.replace(
            "\"bytecode\": \"0x6080604052\"",
            "\"bytecode\": \"0x6080__$1234$__\"",
        );
        assert!(matches!(
            ContractFactory::from_artifact_json("Axe", &unlinked),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }
}
