use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::ConfigError;

/// The file reference a local record keeps for its attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Primary key of the record owning the attachment.
    pub id: u64,
    pub filename: String,
}

impl StoredFile {
    pub fn new(id: u64, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
        }
    }
}

/// Resolves a stored file to a path on local disk.
pub trait FileLocatable: Send + Sync {
    fn file_path(&self, file: &StoredFile) -> PathBuf;
}

/// The supported local storage layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStrategy {
    AttachmentFu,
    Paperclip,
}

impl FromStr for StorageStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match folded.as_str() {
            "attachmentfu" => Ok(Self::AttachmentFu),
            "paperclip" => Ok(Self::Paperclip),
            _ => Err(ConfigError::UnsupportedStrategy(s.to_owned())),
        }
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachmentFu => write!(f, "AttachmentFu"),
            Self::Paperclip => write!(f, "Paperclip"),
        }
    }
}

/// attachment_fu's file-system layout:
/// `<root>/<table>/<id partition>/<filename>`, where the id is zero padded
/// to eight digits and split into four-digit directories (`0000/0042`).
#[derive(Debug, Clone)]
pub struct AttachmentFuLocator {
    root: PathBuf,
    table: String,
}

impl AttachmentFuLocator {
    pub fn new(root: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            table: table.into(),
        }
    }

    fn partition(id: u64) -> Vec<String> {
        let padded = format!("{id:08}");
        padded
            .as_bytes()
            .chunks_exact(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect()
    }
}

impl FileLocatable for AttachmentFuLocator {
    fn file_path(&self, file: &StoredFile) -> PathBuf {
        let mut path = self.root.join(&self.table);
        for segment in Self::partition(file.id) {
            path.push(segment);
        }
        path.join(&file.filename)
    }
}

/// Paperclip's default layout:
/// `<root>/system/<attachment>/<id>/<style>/<filename>`.
#[derive(Debug, Clone)]
pub struct PaperclipLocator {
    root: PathBuf,
    attachment: String,
    style: String,
}

impl PaperclipLocator {
    pub const DEFAULT_STYLE: &'static str = "original";

    pub fn new(root: impl Into<PathBuf>, attachment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            attachment: attachment.into(),
            style: Self::DEFAULT_STYLE.to_owned(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

impl FileLocatable for PaperclipLocator {
    fn file_path(&self, file: &StoredFile) -> PathBuf {
        self.root
            .join("system")
            .join(&self.attachment)
            .join(file.id.to_string())
            .join(&self.style)
            .join(&file.filename)
    }
}

/// A storage strategy resolved once, at configuration time.
pub struct FileBinding {
    strategy: StorageStrategy,
    locator: Box<dyn FileLocatable>,
}

impl FileBinding {
    /// Bind the named strategy. `root` is the public storage directory and
    /// `collection` the table (attachment_fu) or attachment name (Paperclip).
    pub fn bind(
        strategy_name: &str,
        root: impl Into<PathBuf>,
        collection: &str,
    ) -> Result<Self, ConfigError> {
        let strategy: StorageStrategy = strategy_name.parse()?;
        Ok(Self::for_strategy(strategy, root, collection))
    }

    pub fn for_strategy(
        strategy: StorageStrategy,
        root: impl Into<PathBuf>,
        collection: &str,
    ) -> Self {
        let locator: Box<dyn FileLocatable> = match strategy {
            StorageStrategy::AttachmentFu => Box::new(AttachmentFuLocator::new(root, collection)),
            StorageStrategy::Paperclip => Box::new(PaperclipLocator::new(root, collection)),
        };
        tracing::debug!(%strategy, collection, "bound storage strategy");
        Self { strategy, locator }
    }

    pub fn strategy(&self) -> StorageStrategy {
        self.strategy
    }

    pub fn file_path(&self, file: &StoredFile) -> PathBuf {
        self.locator.file_path(file)
    }
}

impl fmt::Debug for FileBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBinding")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
