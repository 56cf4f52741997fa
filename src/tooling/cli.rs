//! CLI Tooling
//!
//! Command-line access to layout documents: mirror a real directory into one,
//! list or read its files, or keep one loaded and follow external edits.

use crate::config::{ConfigLoader, PersistenceConfig, VfsConfig};
use crate::error::VfsError;
use crate::live::LiveVirtualFileSystem;
use crate::persistence::{LayoutFilePersistence, Persistence};
use crate::stub::{File, FileSystemStub};
use crate::tree::{NodeTree, TreeOptions};
use crate::types::Platform;
use crate::vfs::VirtualFileSystem;
use clap::{Parser, Subcommand};
use parking_lot::RwLock;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// vfstub CLI - in-memory filesystem layouts backed by a JSON document
#[derive(Parser, Debug)]
#[command(name = "vfstub")]
#[command(about = "Build, inspect and follow virtual filesystem layout documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides ./vfstub.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror a directory on disk into a layout document
    Mirror {
        /// Directory to mirror
        dir: PathBuf,
        /// Layout document to write
        #[arg(long)]
        out: PathBuf,
        /// Platform conventions of the layout (default: host)
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// List every file in a layout document with its content digest
    Tree {
        layout: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a file stored in a layout document
    Cat { layout: PathBuf, path: String },
    /// Keep a layout document loaded, reloading on external changes
    Watch {
        layout: PathBuf,
        /// Quiet period before reloading, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

impl Cli {
    /// Fold the command-line log flags into `config`.
    pub fn apply_log_overrides(&self, config: &mut VfsConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// Resolved configuration plus command dispatch
pub struct CliContext {
    config: VfsConfig,
}

impl CliContext {
    /// Load `config_path`, or `./vfstub.toml` and the environment when absent
    pub fn new(config_path: Option<&Path>) -> Result<Self, VfsError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(Path::new("."))?,
        };
        Ok(Self { config })
    }

    pub fn from_config(config: VfsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VfsConfig {
        &mut self.config
    }

    /// Run `command`, returning what should be printed
    pub fn execute(&self, command: &Commands) -> Result<String, VfsError> {
        match command {
            Commands::Mirror { dir, out, platform } => self.mirror(dir, out, *platform),
            Commands::Tree { layout, format } => self.tree(layout, format),
            Commands::Cat { layout, path } => self.cat(layout, path),
            Commands::Watch {
                layout,
                debounce_ms,
            } => self.watch(layout, *debounce_ms),
        }
    }

    fn mirror(&self, dir: &Path, out: &Path, platform: Option<Platform>) -> Result<String, VfsError> {
        let mut options = self.config.tree.options();
        if let Some(platform) = platform {
            options.platform = platform;
        }
        let vfs = VirtualFileSystem::new(options).and_physical_path(dir)?;
        let files = vfs.tree().read().files().len();

        let persistence = LayoutFilePersistence::new(
            out,
            vfs.tree().clone(),
            options,
            self.snapshot_settings(),
        );
        persistence.save()?;
        info!(dir = %dir.display(), out = %out.display(), files, "Mirrored directory");
        Ok(format!("Mirrored {} files into {}", files, out.display()))
    }

    fn tree(&self, layout: &Path, format: &str) -> Result<String, VfsError> {
        let persistence = self.open_snapshot(layout)?;
        let tree = persistence.tree().read();
        let entries: Vec<(String, String, usize)> = tree
            .files()
            .into_iter()
            .map(|id| {
                let contents = tree.node(id).contents().unwrap_or_default();
                (
                    tree.full_path(id),
                    hex::encode(blake3::hash(contents).as_bytes()),
                    contents.len(),
                )
            })
            .collect();

        match format {
            "json" => {
                let files: Vec<_> = entries
                    .iter()
                    .map(|(path, digest, size)| json!({ "path": path, "digest": digest, "size": size }))
                    .collect();
                let value = json!({
                    "platform": tree.platform().to_string(),
                    "files": files,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            "text" => Ok(entries
                .iter()
                .map(|(path, digest, size)| format!("{}  {:>10}  {}", &digest[..16], size, path))
                .collect::<Vec<_>>()
                .join("\n")),
            other => Err(VfsError::InvalidOperation(format!(
                "Unknown output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }

    fn cat(&self, layout: &Path, path: &str) -> Result<String, VfsError> {
        let persistence = self.open_snapshot(layout)?;
        let vfs = VirtualFileSystem::from_stub(FileSystemStub::new(persistence.tree().clone()));
        vfs.file().read_all_text(path)
    }

    fn watch(&self, layout: &Path, debounce_ms: Option<u64>) -> Result<String, VfsError> {
        let mut config = self.config.clone();
        config.persistence.layout_file = Some(layout.to_path_buf());
        config.persistence.watch = true;
        if let Some(debounce_ms) = debounce_ms {
            config.persistence.debounce_ms = debounce_ms;
        }
        let live = LiveVirtualFileSystem::open(&config)?;
        info!(layout = %layout.display(), "Following layout document, press Ctrl-C to stop");
        loop {
            std::thread::sleep(Duration::from_secs(1));
            if !live.persistence().is_watching() {
                return Err(VfsError::WatchError(format!(
                    "Watch on {} is not running",
                    layout.display()
                )));
            }
        }
    }

    fn snapshot_settings(&self) -> PersistenceConfig {
        PersistenceConfig {
            watch: false,
            ..self.config.persistence.clone()
        }
    }

    /// Load `layout` once without watching it; a missing file is an error here.
    fn open_snapshot(&self, layout: &Path) -> Result<Arc<LayoutFilePersistence>, VfsError> {
        if !layout.is_file() {
            return Err(VfsError::NotFound(format!(
                "Layout document not found: {}",
                layout.display()
            )));
        }
        let options: TreeOptions = self.config.tree.options();
        let tree = Arc::new(RwLock::new(NodeTree::new(options)));
        let persistence =
            LayoutFilePersistence::new(layout, tree, options, self.snapshot_settings());
        persistence.load()?;
        Ok(persistence)
    }
}
