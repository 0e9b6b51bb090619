//! Core types for media-vault

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a media asset
///
/// The ID doubles as the sandbox directory name for site bundles, so it is
/// never reused and never mutated after creation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct AssetId(pub i64);

impl AssetId {
    /// Create a new AssetId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for AssetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<AssetId> for i64 {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for AssetId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<AssetId> for i64 {
    fn eq(&self, other: &AssetId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AssetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for AssetId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for AssetId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for AssetId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Asset processing state
///
/// Site bundles start `Pending` and are moved through `Processing` to `Ready`
/// or `Failed` exclusively by the ingestion orchestrator. Non-bundle assets
/// are created directly in `Ready` since they require no processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    /// Waiting for the ingestion job to pick the asset up
    Pending,
    /// Ingestion in progress (claimed by a worker)
    Processing,
    /// Entry document located; site is servable
    Ready,
    /// Ingestion failed; see `processing_error`. Terminal but not destructive
    Failed,
}

impl ProcessingState {
    /// Convert integer state code to ProcessingState enum
    pub fn from_i32(state: i32) -> Self {
        match state {
            0 => ProcessingState::Pending,
            1 => ProcessingState::Processing,
            2 => ProcessingState::Ready,
            3 => ProcessingState::Failed,
            _ => ProcessingState::Failed, // Default to Failed for unknown state
        }
    }

    /// Convert ProcessingState enum to integer state code
    pub fn to_i32(&self) -> i32 {
        match self {
            ProcessingState::Pending => 0,
            ProcessingState::Processing => 1,
            ProcessingState::Ready => 2,
            ProcessingState::Failed => 3,
        }
    }

    /// Lowercase label used in API payloads and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Pending => "pending",
            ProcessingState::Processing => "processing",
            ProcessingState::Ready => "ready",
            ProcessingState::Failed => "failed",
        }
    }
}

/// Broad media classification derived from the uploaded file's extension
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Raster images (jpg, jpeg, png, gif, webp)
    Image,
    /// Office/print documents (pdf, doc, docx, xls, xlsx, ppt, pptx)
    Document,
    /// Video files (mp4, avi, mov, wmv)
    Video,
    /// Audio files (mp3, wav, ogg)
    Audio,
    /// Zipped static-HTML site bundle
    Site,
    /// Anything else
    #[default]
    Other,
}

impl MediaKind {
    /// Classify a filename by its extension.
    ///
    /// `is_site_bundle` wins over the extension table: a zip flagged as a
    /// site bundle is `Site`, not `Other`.
    pub fn classify(filename: &str, is_site_bundle: bool) -> Self {
        if is_site_bundle {
            return MediaKind::Site;
        }

        let ext = std::path::Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => MediaKind::Image,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" => MediaKind::Document,
            "mp4" | "avi" | "mov" | "wmv" => MediaKind::Video,
            "mp3" | "wav" | "ogg" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    /// Lowercase label stored in the database and used in API filters
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Site => "site",
            MediaKind::Other => "other",
        }
    }

    /// Parse the stored label back into a MediaKind
    pub fn parse(s: &str) -> Self {
        match s {
            "image" => MediaKind::Image,
            "document" => MediaKind::Document,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            "site" => MediaKind::Site,
            _ => MediaKind::Other,
        }
    }
}

/// Kind of background job dispatched to the vault workers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    /// Run site bundle ingestion for the asset
    Ingest,
    /// Remove the asset's extraction sandbox
    Reap,
}

/// Background job payload: the explicit event contract between persistence
/// and processing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetJob {
    /// The asset the job operates on
    pub asset_id: AssetId,
    /// What the worker should do
    pub kind: JobKind,
}

/// Events emitted on the vault's broadcast channel
///
/// Consumers subscribe via [`crate::MediaVault::subscribe`]; no polling
/// required.
#[derive(Clone, Debug)]
pub enum Event {
    /// A new asset record was created
    AssetCreated {
        /// Asset ID
        id: AssetId,
        /// Whether it was flagged as a site bundle (and will be ingested)
        is_site_bundle: bool,
    },
    /// Ingestion claimed the asset and started extracting
    IngestStarted {
        /// Asset ID
        id: AssetId,
    },
    /// Ingestion finished; the site is servable
    IngestCompleted {
        /// Asset ID
        id: AssetId,
        /// Storage-root-relative path of the located entry document
        entry_document_path: String,
    },
    /// Ingestion failed; the record carries the error message
    IngestFailed {
        /// Asset ID
        id: AssetId,
        /// Failure detail as persisted on the record
        reason: String,
    },
    /// The asset record was deleted
    AssetDeleted {
        /// Asset ID
        id: AssetId,
    },
    /// The reaper removed the asset's extraction sandbox
    SandboxRemoved {
        /// Asset ID
        id: AssetId,
    },
    /// The vault is shutting down
    Shutdown,
}

/// Asset information exposed by the REST API
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetInfo {
    /// Asset ID
    pub id: AssetId,
    /// Display title
    pub title: String,
    /// Broad media classification
    pub kind: MediaKind,
    /// Storage-root-relative path of the uploaded blob
    pub file_path: String,
    /// Whether the asset is a site bundle
    pub is_site_bundle: bool,
    /// Current processing state
    pub processing_state: ProcessingState,
    /// Failure detail when state is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    /// Gateway URL for the site's entry document, present once ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Alternative text for accessibility
    pub alt_text: String,
    /// Free-form description
    pub description: String,
    /// Slugs of linked categories
    pub categories: Vec<String>,
    /// When the asset was created
    pub created_at: DateTime<Utc>,
    /// When the asset was last updated
    pub updated_at: DateTime<Utc>,
}

/// Category information exposed by the REST API
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryInfo {
    /// Category ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL-safe unique slug
    pub slug: String,
}
