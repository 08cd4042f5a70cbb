use crate::config::schema::{PatchFile, SpecKind, ValidationError};
use crate::registry::{Registry, RegistryError};
use crate::spec::{PatchSpec, PatternError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
    Pattern {
        path: Option<PathBuf>,
        source: PatternError,
    },
    Registry {
        path: Option<PathBuf>,
        source: RegistryError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            ConfigError::Pattern { path: None, source } => ConfigError::Pattern {
                path: Some(path),
                source,
            },
            ConfigError::Registry { path: None, source } => ConfigError::Registry {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn at(f: &mut fmt::Formatter<'_>, path: &Option<PathBuf>) -> fmt::Result {
            match path {
                Some(path) => write!(f, " ({})", path.display()),
                None => Ok(()),
            }
        }

        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read patch file from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { path, source } => {
                write!(f, "failed to parse patch file TOML")?;
                at(f, path)?;
                write!(f, ": {source}")
            }
            ConfigError::Validation { path, source } => {
                write!(f, "invalid patch file")?;
                at(f, path)?;
                write!(f, ": {source}")
            }
            ConfigError::Pattern { path, source } => {
                write!(f, "pattern failed to compile")?;
                at(f, path)?;
                write!(f, ": {source}")
            }
            ConfigError::Registry { path, source } => {
                write!(f, "invalid patch registry")?;
                at(f, path)?;
                write!(f, ": {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
            ConfigError::Pattern { source, .. } => Some(source),
            ConfigError::Registry { source, .. } => Some(source),
        }
    }
}

/// Parse, validate, and compile a patch file into a ready registry.
/// Pattern compilation happens here, before any matching begins.
pub fn load_from_str(input: &str) -> Result<Registry, ConfigError> {
    build(parse(input)?)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Registry, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = parse(&contents).map_err(|error| error.with_path(path))?;
    // A file that declares no meta.name is named after its file stem.
    if file.meta.name.trim().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            file.meta.name = stem.to_string();
        }
    }
    build(file).map_err(|error| error.with_path(path))
}

fn parse(input: &str) -> Result<PatchFile, ConfigError> {
    toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { path: None, source })
}

fn build(file: PatchFile) -> Result<Registry, ConfigError> {
    file.validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;

    let mut specs = Vec::with_capacity(file.patches.len());
    for entry in &file.patches {
        let mut spec = match entry.kind {
            SpecKind::Literal => PatchSpec::literal(&entry.id, &entry.find, &entry.replace),
            SpecKind::Pattern => PatchSpec::pattern(&entry.id, &entry.find, &entry.replace)
                .map_err(|source| ConfigError::Pattern { path: None, source })?,
        };
        if !entry.required {
            spec = spec.optional();
        }
        specs.push(spec);
    }

    Registry::new(file.meta.name, specs)
        .map_err(|source| ConfigError::Registry { path: None, source })
}
