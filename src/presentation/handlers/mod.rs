mod api_error;
mod channels;
mod current_user;
mod health;
mod transcriptions;

pub use api_error::{ApiError, ErrorResponse};
pub use channels::{test_channel_handler, update_channel_status_handler};
pub use current_user::{CurrentUser, TOKEN_ID_HEADER, USER_ID_HEADER};
pub use health::health_handler;
pub use transcriptions::{
    ApiResponse, TaskResponse, cancel_transcription_handler, create_transcription_handler,
    delete_transcription_handler, download_transcription_handler, get_transcription_handler,
    list_transcriptions_handler, preview_transcription_handler, transcription_stats_handler,
};
