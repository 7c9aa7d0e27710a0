//! Conversion profiles: JSON description, lookup, and chain assembly.
//!
//! A profile names an ordered list of stages, each backed by a dictionary
//! tree (`text`, `trie`, or a nested `group`). See [`Profile`] for the format.
//!
//! Profiles are located by a [`ProfileLoader`]. The process-wide default
//! loader ([`default_loader`]) searches the directories listed in
//! `OPENCC_CHAIN_DATA_DIR` and then the `data/` directory bundled with this
//! crate.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::conversion::{Conversion, ConversionChain};
use crate::dictionary_lib::{Dict, DictGroup, TextDict, TrieDict};
use crate::errors::InitError;
use crate::segmentation::SegmentationType;
use crate::Converter;

/// Built-in profile ids shipped in `data/`.
pub const PROFILE_IDS: &[&str] = &[
    "s2t", "t2s", "s2tw", "tw2s", "s2twp", "tw2sp", "s2hk", "hk2s", "t2tw", "tw2t", "t2hk", "hk2t",
    "t2jp", "jp2t",
];

/// Environment variable holding extra profile/dictionary directories, in the
/// platform's `PATH` syntax.
pub const DATA_DIR_ENV: &str = "OPENCC_CHAIN_DATA_DIR";

const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

static DEFAULT_LOADER: Lazy<ProfileLoader> =
    Lazy::new(|| ProfileLoader::from_env().with_search_path(BUNDLED_DATA_DIR));

/// The loader used by [`Converter::open`]. Reads the environment once.
pub fn default_loader() -> &'static ProfileLoader {
    &DEFAULT_LOADER
}

/// A conversion profile.
///
/// ```json
/// {
///   "name": "Simplified Chinese to Traditional Chinese",
///   "segmentation": { "type": "mmseg" },
///   "conversion_chain": [
///     { "dict": { "type": "group", "dicts": [
///         { "type": "text", "file": "STPhrases.txt" },
///         { "type": "text", "file": "STCharacters.txt" } ] } }
///   ]
/// }
/// ```
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Default segmentation for stages that do not set their own.
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    pub conversion_chain: Vec<StageConfig>,
}

impl Profile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    #[serde(rename = "type", default)]
    pub kind: SegmentationType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub dict: DictConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationConfig>,
}

/// Dictionary node of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DictConfig {
    Text { file: PathBuf },
    Trie { file: PathBuf },
    Group { dicts: Vec<DictConfig> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DictFormat {
    Text,
    Trie,
}

/// Profile dictionary tree with leaves replaced by indexes into the list of
/// distinct files to load.
enum Resolved {
    Leaf(usize),
    Group(Vec<Resolved>),
}

/// Distinct leaf dictionaries of one profile, in first-seen order.
#[derive(Default)]
struct Leaves {
    files: Vec<(DictFormat, PathBuf)>,
    seen: FxHashMap<(DictFormat, PathBuf), usize>,
}

impl Leaves {
    fn intern(&mut self, format: DictFormat, path: PathBuf) -> usize {
        if let Some(&idx) = self.seen.get(&(format, path.clone())) {
            return idx;
        }
        let idx = self.files.len();
        self.seen.insert((format, path.clone()), idx);
        self.files.push((format, path));
        idx
    }
}

/// Finds profiles and the dictionaries they reference.
#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    search_paths: Vec<PathBuf>,
}

impl ProfileLoader {
    /// Loader with no search paths; only direct file paths resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader whose search paths come from [`DATA_DIR_ENV`].
    pub fn from_env() -> Self {
        let search_paths = env::var_os(DATA_DIR_ENV)
            .map(|value| {
                env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { search_paths }
    }

    /// Appends `dir` to the search paths.
    pub fn with_search_path<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    #[inline]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Maps a profile id or path to a profile file.
    ///
    /// `id` is used as-is when it names an existing file; otherwise each
    /// search path is tried for `<dir>/<id>` and `<dir>/<id>.json`.
    pub fn resolve_profile(&self, id: &str) -> Result<PathBuf, InitError> {
        let direct = Path::new(id);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }
        for dir in &self.search_paths {
            let candidate = dir.join(id);
            if candidate.is_file() {
                return Ok(candidate);
            }
            let candidate = dir.join(format!("{id}.json"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(InitError::NotFound {
            kind: "profile",
            path: direct.to_path_buf(),
        })
    }

    /// Reads and parses a profile file.
    pub fn load_profile(&self, path: &Path) -> Result<Profile, InitError> {
        let json = fs::read_to_string(path).map_err(|source| InitError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Profile::from_json(&json).map_err(|e| InitError::MalformedProfile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads every dictionary `profile` references and assembles the chain.
    ///
    /// `profile_path` anchors relative dictionary paths and names the profile
    /// in errors. Each distinct dictionary file is loaded once, in parallel,
    /// and shared between the stages and groups that mention it.
    pub fn build_chain(
        &self,
        profile: &Profile,
        profile_path: &Path,
    ) -> Result<ConversionChain, InitError> {
        if profile.conversion_chain.is_empty() {
            return Err(malformed(profile_path, "conversion_chain is empty"));
        }

        let profile_dir = profile_path.parent();
        let mut leaves = Leaves::default();
        let stages = profile
            .conversion_chain
            .iter()
            .map(|stage| self.resolve_dict(&stage.dict, profile_path, profile_dir, &mut leaves))
            .collect::<Result<Vec<_>, _>>()?;

        let loaded = leaves
            .files
            .par_iter()
            .map(|(format, path)| load_leaf(*format, path))
            .collect::<Result<Vec<_>, _>>()?;

        let conversions = profile
            .conversion_chain
            .iter()
            .zip(&stages)
            .map(|(config, resolved)| {
                let group = match resolved {
                    Resolved::Leaf(idx) => DictGroup::new(vec![Arc::clone(&loaded[*idx])]),
                    Resolved::Group(members) => {
                        DictGroup::new(members.iter().map(|m| assemble(m, &loaded)).collect())
                    }
                };
                let kind = config.segmentation.unwrap_or(profile.segmentation).kind;
                Conversion::with_segmentation(Arc::new(group), kind)
            })
            .collect();

        ConversionChain::new(conversions)
    }

    /// Resolves, loads, and builds the converter for a profile id or path.
    pub fn open(&self, id: &str) -> Result<Converter, InitError> {
        let path = self.resolve_profile(id)?;
        let profile = self.load_profile(&path)?;
        let chain = self.build_chain(&profile, &path)?;
        let name = profile.name.unwrap_or_else(|| id.to_string());
        log::info!(
            "opened profile {:?} from {} ({} stages)",
            name,
            path.display(),
            chain.stages().len()
        );
        Ok(Converter::from_chain(name, chain))
    }

    fn resolve_dict(
        &self,
        config: &DictConfig,
        profile_path: &Path,
        profile_dir: Option<&Path>,
        leaves: &mut Leaves,
    ) -> Result<Resolved, InitError> {
        let (format, file) = match config {
            DictConfig::Text { file } => (DictFormat::Text, file),
            DictConfig::Trie { file } => (DictFormat::Trie, file),
            DictConfig::Group { dicts } => {
                if dicts.is_empty() {
                    return Err(malformed(profile_path, "dictionary group is empty"));
                }
                let members = dicts
                    .iter()
                    .map(|d| self.resolve_dict(d, profile_path, profile_dir, leaves))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Resolved::Group(members));
            }
        };
        let path = self.resolve_dict_file(file, profile_dir)?;
        Ok(Resolved::Leaf(leaves.intern(format, path)))
    }

    /// Relative paths are tried against the profile's directory first, then
    /// each search path.
    fn resolve_dict_file(
        &self,
        file: &Path,
        profile_dir: Option<&Path>,
    ) -> Result<PathBuf, InitError> {
        if file.is_absolute() {
            if file.is_file() {
                return Ok(file.to_path_buf());
            }
        } else {
            let found = profile_dir
                .into_iter()
                .chain(self.search_paths.iter().map(PathBuf::as_path))
                .map(|dir| dir.join(file))
                .find(|candidate| candidate.is_file());
            if let Some(path) = found {
                return Ok(path);
            }
        }
        Err(InitError::NotFound {
            kind: "dictionary",
            path: file.to_path_buf(),
        })
    }
}

fn load_leaf(format: DictFormat, path: &Path) -> Result<Arc<dyn Dict>, InitError> {
    let loaded: Result<Arc<dyn Dict>, _> = match format {
        DictFormat::Text => TextDict::load(path).map(|d| Arc::new(d) as Arc<dyn Dict>),
        DictFormat::Trie => TrieDict::load(path).map(|d| Arc::new(d) as Arc<dyn Dict>),
    };
    let dict = loaded.map_err(|source| InitError::Dictionary {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "loaded {:?} dictionary {} ({} entries, longest key {})",
        format,
        path.display(),
        dict.len(),
        dict.max_key_length()
    );
    Ok(dict)
}

fn assemble(node: &Resolved, loaded: &[Arc<dyn Dict>]) -> Arc<dyn Dict> {
    match node {
        Resolved::Leaf(idx) => Arc::clone(&loaded[*idx]),
        Resolved::Group(members) => Arc::new(DictGroup::new(
            members.iter().map(|m| assemble(m, loaded)).collect(),
        )),
    }
}

fn malformed(path: &Path, reason: &str) -> InitError {
    InitError::MalformedProfile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
