use std::path::{Component, Path, PathBuf};

use super::{ResolutionError, Result};

/// Maps control-group identifiers onto directories of a cgroup v2 mount.
#[derive(Debug, Clone)]
pub struct CgroupPathResolver {
    root: PathBuf,
}

impl CgroupPathResolver {
    /// Constructs a resolver for the hierarchy mounted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves an identifier such as `/system.slice/nginx.service` to the
    /// absolute directory of that group.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::EmptyIdentifier`] for an empty or blank identifier.
    /// - [`ResolutionError::RootIdentifier`] for `/`, which would select every
    ///   process on the host.
    /// - [`ResolutionError::InvalidIdentifier`] if the identifier tries to
    ///   leave the hierarchy with `..`.
    /// - [`ResolutionError::MissingPath`] / [`ResolutionError::NotADirectory`]
    ///   if the computed path is not an existing directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use unit_monitor::cgroup::CgroupPathResolver;
    ///
    /// let resolver = CgroupPathResolver::new("/sys/fs/cgroup");
    /// let base = resolver.resolve("/system.slice/sshd.service").unwrap();
    /// assert_eq!(base.to_str(), Some("/sys/fs/cgroup/system.slice/sshd.service"));
    /// ```
    pub fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolutionError::EmptyIdentifier);
        }

        let relative = Path::new(identifier.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(ResolutionError::RootIdentifier(identifier.to_owned()));
        }
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ResolutionError::InvalidIdentifier(identifier.to_owned()));
        }

        let path = self.root.join(relative);
        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {
                log::debug!("Resolved control group `{identifier}` to {}", path.display());
                Ok(path)
            }
            Ok(_) => Err(ResolutionError::NotADirectory { path }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ResolutionError::MissingPath { path })
            }
            Err(source) => Err(ResolutionError::Metadata { path, source }),
        }
    }
}
