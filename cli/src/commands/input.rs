use std::path::Path;
use tokio::fs;

use framer_application::error::AppResult;
use framer_application::ports::incoming::framing::Upload;

/// MIME type inferred from the file extension, as a browser would send it.
pub(crate) fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "jfif" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

pub(crate) async fn read_upload(path: &Path) -> AppResult<Upload> {
    let bytes = fs::read(path).await?;
    let filename = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

    Ok(Upload {
        filename,
        content_type: content_type_for(path).map(str::to_string),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension_case_insensitively() {
        assert_eq!(content_type_for(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("frame.png")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("noext")), None);
    }
}
