pub const AUDIO_FORMATS: &[&str] = &["mp3", "mp4", "wav", "m4a", "flac", "aac", "ogg", "wma", "amr"];

pub const VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "auto", "zh", "en", "ja", "ko", "es", "fr", "de", "ru", "it", "pt", "ar", "hi", "th", "vi",
];

pub const AUTO_LANGUAGE: &str = "auto";

/// Every accepted upload extension, audio first, without duplicates.
pub fn all_supported_formats() -> Vec<&'static str> {
    let mut formats: Vec<&'static str> = AUDIO_FORMATS.to_vec();
    for format in VIDEO_FORMATS {
        if !formats.contains(format) {
            formats.push(format);
        }
    }
    formats
}

pub fn is_supported_format(ext: &str) -> bool {
    AUDIO_FORMATS.contains(&ext) || VIDEO_FORMATS.contains(&ext)
}

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Lower-cased extension of `filename` without the dot, empty when absent.
pub fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn mime_for_format(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "wma" => "audio/x-ms-wma",
        "amr" => "audio/amr",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
