//! Fetchable sources: single files, archives and git repositories.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};

use crate::checksum::{sha256_bytes, sha256_file};
use crate::download::Downloader;
use crate::error::{FetchError, IoContext};

/// Name of the file recording which archive an extraction came from.
pub const STAMP_FILE: &str = ".fetch-stamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Https,
    Ssh,
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "https" => Ok(Protocol::Https),
            "ssh" => Ok(Protocol::Ssh),
            _ => Err(format!("unknown protocol '{}', expected https or ssh", s)),
        }
    }
}

/// Shared state for one run over a manifest.
pub struct Context<'a> {
    pub root: PathBuf,
    pub downloader: &'a dyn Downloader,
    pub protocol: Protocol,
}

pub trait Source {
    fn name(&self) -> String;
    fn update(&self, ctx: &Context<'_>) -> Result<(), FetchError>;
    fn clean(&self, ctx: &Context<'_>) -> Result<(), FetchError>;
}

fn remove_dir(path: &Path) -> Result<(), FetchError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FetchError::IOError(path.to_path_buf(), e)),
    }
}

fn remove_file(path: &Path) -> Result<(), FetchError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FetchError::IOError(path.to_path_buf(), e)),
    }
}

/// Downloads `url` into `path` unless the file there already has `checksum`.
/// Returns whether a download happened.
fn fetch_verified(ctx: &Context<'_>, url: &str, checksum: &str, path: &Path) -> Result<bool, FetchError> {
    if sha256_file(path).at(path)?.as_deref() == Some(checksum) {
        debug!("{} is up to date", path.display());
        return Ok(false);
    }
    let data = ctx.downloader.fetch(url)?;
    let actual = sha256_bytes(&data);
    if actual != checksum {
        return Err(FetchError::ChecksumMismatch {
            url: url.to_string(),
            expected: checksum.to_string(),
            actual,
        });
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    fs::write(path, data).at(path)?;
    Ok(true)
}

/// A single file stored as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub url: String,
    pub filename: String,
    pub checksum: String,
    pub dst_dir: PathBuf,
}

impl SourceFile {
    pub fn path(&self, ctx: &Context<'_>) -> PathBuf {
        ctx.root.join(&self.dst_dir).join(&self.filename)
    }
}

impl Source for SourceFile {
    fn name(&self) -> String {
        self.filename.clone()
    }

    fn update(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        fetch_verified(ctx, &self.url, &self.checksum, &self.path(ctx))?;
        Ok(())
    }

    fn clean(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        remove_file(&self.path(ctx))
    }
}

/// A `.tar` or `.tar.xz` archive extracted into `dst_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackage {
    pub url: String,
    pub filename: String,
    pub checksum: String,
    pub dst_dir: PathBuf,
    /// Leading path components dropped from every entry.
    #[serde(default)]
    pub strip_components: usize,
    /// Paths, relative to `dst_dir`, removed after extraction.
    #[serde(default)]
    pub cleanup: Vec<PathBuf>,
}

/// Where downloaded archives are cached, relative to the root.
pub const ARCHIVE_DIR: &str = "packages";

impl SourcePackage {
    pub fn archive_path(&self, ctx: &Context<'_>) -> PathBuf {
        ctx.root.join(ARCHIVE_DIR).join(&self.filename)
    }

    pub fn extract_dir(&self, ctx: &Context<'_>) -> PathBuf {
        ctx.root.join(&self.dst_dir)
    }

    fn stamp_matches(&self, dir: &Path) -> Result<bool, FetchError> {
        let path = dir.join(STAMP_FILE);
        match fs::read_to_string(&path) {
            Ok(stamp) => Ok(stamp.trim() == self.checksum),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FetchError::IOError(path, e)),
        }
    }

    fn extract(&self, archive: &Path, dir: &Path) -> Result<(), FetchError> {
        let file = fs::File::open(archive).at(archive)?;
        if self.filename.ends_with(".tar.xz") {
            unpack(xz2::read::XzDecoder::new(file), dir, self.strip_components)
        } else if self.filename.ends_with(".tar") {
            unpack(file, dir, self.strip_components)
        } else {
            Err(FetchError::UnsupportedArchive(self.filename.clone()))
        }
    }
}

/// Strips `strip` leading components. Entries that would escape the
/// destination yield `None`.
fn stripped_path(path: &Path, strip: usize) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components().skip(strip) {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn unpack(r: impl Read, dir: &Path, strip: usize) -> Result<(), FetchError> {
    let mut archive = tar::Archive::new(r);
    for entry in archive.entries().at(dir)? {
        let mut entry = entry.at(dir)?;
        let path = entry.path().at(dir)?.into_owned();
        let target = match stripped_path(&path, strip) {
            Some(relative) => dir.join(relative),
            None => {
                if path.components().count() > strip {
                    warn!("skipping archive entry {}", path.display());
                }
                continue;
            }
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }
        entry.unpack(&target).at(&target)?;
    }
    Ok(())
}

impl Source for SourcePackage {
    fn name(&self) -> String {
        self.filename.clone()
    }

    fn update(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        let archive = self.archive_path(ctx);
        let dir = self.extract_dir(ctx);
        let downloaded = fetch_verified(ctx, &self.url, &self.checksum, &archive)?;
        if !downloaded && self.stamp_matches(&dir)? {
            debug!("{} is already extracted", self.filename);
            return Ok(());
        }
        info!("Extracting {} to {}", self.filename, dir.display());
        remove_dir(&dir)?;
        fs::create_dir_all(&dir).at(&dir)?;
        self.extract(&archive, &dir)?;
        for path in &self.cleanup {
            let path = dir.join(path);
            if path.is_dir() {
                remove_dir(&path)?;
            } else {
                remove_file(&path)?;
            }
        }
        let stamp = dir.join(STAMP_FILE);
        fs::write(&stamp, &self.checksum).at(&stamp)
    }

    fn clean(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        remove_file(&self.archive_path(ctx))?;
        remove_dir(&self.extract_dir(ctx))
    }
}

/// A git repository pinned to a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepo {
    pub https_url: String,
    #[serde(default)]
    pub ssh_url: Option<String>,
    pub revision: String,
    pub dst_dir: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_remote() -> String {
    String::from("origin")
}

impl GitRepo {
    pub fn url(&self, protocol: Protocol) -> &str {
        match (protocol, &self.ssh_url) {
            (Protocol::Ssh, Some(url)) => url,
            _ => &self.https_url,
        }
    }

    /// Git invocations that bring `dir` to `revision`, given whether the
    /// clone already exists.
    pub fn commands(&self, ctx: &Context<'_>, exists: bool) -> Vec<Vec<String>> {
        let dir = ctx.root.join(&self.dst_dir).to_string_lossy().into_owned();
        let url = self.url(ctx.protocol).to_string();
        let mut commands = Vec::new();
        if !exists {
            commands.push(vec![
                "clone".into(),
                "--no-checkout".into(),
                "--origin".into(),
                self.remote.clone(),
                url.clone(),
                dir.clone(),
            ]);
        }
        // Every branch, so revisions off the default branch can be checked out.
        commands.push(vec![
            "-C".into(),
            dir.clone(),
            "fetch".into(),
            "--tags".into(),
            url,
            format!("+refs/heads/*:refs/remotes/{}/*", self.remote),
        ]);
        commands.push(vec![
            "-C".into(),
            dir,
            "checkout".into(),
            "--quiet".into(),
            self.revision.clone(),
        ]);
        commands
    }
}

fn run_git(git: &Path, args: &[String]) -> Result<(), FetchError> {
    let command = format!("git {}", args.join(" "));
    debug!("Running {}", command);
    let status = Command::new(git).args(args).status().at(git)?;
    if status.success() {
        Ok(())
    } else {
        Err(FetchError::CommandFailed { command, status })
    }
}

impl Source for GitRepo {
    fn name(&self) -> String {
        self.dst_dir.display().to_string()
    }

    fn update(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        let git = which::which("git").map_err(|error| FetchError::ToolNotFound { tool: "git", error })?;
        let exists = ctx.root.join(&self.dst_dir).join(".git").exists();
        info!("Updating {} to {}", self.dst_dir.display(), self.revision);
        for args in self.commands(ctx, exists) {
            run_git(&git, &args)?;
        }
        Ok(())
    }

    fn clean(&self, ctx: &Context<'_>) -> Result<(), FetchError> {
        remove_dir(&ctx.root.join(&self.dst_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_components() {
        assert_eq!(stripped_path(Path::new("pkg-1.0/src/a.c"), 1), Some(PathBuf::from("src/a.c")));
        assert_eq!(stripped_path(Path::new("pkg-1.0/"), 1), None);
        assert_eq!(stripped_path(Path::new("./pkg/a"), 0), Some(PathBuf::from("pkg/a")));
        assert_eq!(stripped_path(Path::new("pkg/../../etc"), 1), None);
    }
}
