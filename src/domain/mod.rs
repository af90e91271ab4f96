mod channel;
mod media_format;
mod output_format;
pub mod result_codec;
mod storage_path;
mod stored_file;
mod task;
mod task_id;
mod task_status;
mod transcription_result;
mod user_id;

pub use channel::{Channel, ChannelId, ChannelStatus, EngineType};
pub use media_format::{
    AUDIO_FORMATS, AUTO_LANGUAGE, SUPPORTED_LANGUAGES, VIDEO_FORMATS, all_supported_formats,
    extension_of, is_supported_format, is_supported_language, mime_for_format,
};
pub use output_format::{BillingType, OutputFormat, Quality};
pub use storage_path::StoragePath;
pub use stored_file::{FileKind, StoredFile, StoredFileId};
pub use task::{
    DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY, Task, TaskStateError, TranscriptionOptions,
};
pub use task_id::TaskId;
pub use task_status::TaskStatus;
pub use transcription_result::{Speaker, TranscriptionResult, TranscriptionSegment, TranscriptionWord};
pub use user_id::UserId;
