//! Recognises video and image payloads in HTTP responses.

/// Content type fragments that announce a stream or a still frame.
const STREAM_CONTENT_TYPES: &[&str] = &[
    "video",
    "mjpeg",
    "multipart",
    "stream",
    "image",
    "application/octet-stream",
    "binary",
    "application/x-motion-jpeg",
    "application/x-rtsp",
];

/// Path fragments typical of snapshot and stream endpoints.
const STREAM_PATH_HINTS: &[&str] = &[
    "video", "mjpg", "mjpeg", "stream", "snapshot", "image", "jpg", "jpeg", "picture", "live",
];

/// Magic numbers of the image formats cameras serve.
const IMAGE_SIGNATURES: &[&[u8]] = &[
    b"\xff\xd8",
    b"\x89PNG",
    b"GIF8",
];

/// Markers that show up inside the first chunk of a multipart or JPEG body.
const IMAGE_MARKERS: &[&[u8]] = &[b"JFIF", b"Exif", b"PNG", b"GIF", b"JPEG", b"\xff\xd8"];

/// Minimum size of a first chunk before it is taken for media.
pub const MIN_STREAM_CHUNK: usize = 100;

pub fn is_stream_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    STREAM_CONTENT_TYPES
        .iter()
        .any(|fragment| content_type.contains(fragment))
}

pub fn looks_like_stream_path(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    STREAM_PATH_HINTS.iter().any(|hint| url.contains(hint))
}

/// True when the body starts with a known image signature.
pub fn starts_with_image_signature(body: &[u8]) -> bool {
    IMAGE_SIGNATURES.iter().any(|sig| body.starts_with(sig))
}

/// True when an image marker appears anywhere in the chunk.
pub fn contains_image_marker(chunk: &[u8]) -> bool {
    IMAGE_MARKERS
        .iter()
        .any(|marker| chunk.windows(marker.len()).any(|window| window == *marker))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_content_types() {
        assert!(is_stream_content_type("multipart/x-mixed-replace; boundary=frame"));
        assert!(is_stream_content_type("Image/JPEG"));
        assert!(is_stream_content_type("application/octet-stream"));
        assert!(!is_stream_content_type("text/html; charset=utf-8"));
    }

    #[test]
    fn image_signatures() {
        assert!(starts_with_image_signature(b"\xff\xd8\xff\xe0\x00\x10JFIF"));
        assert!(starts_with_image_signature(b"\x89PNG\r\n\x1a\n"));
        assert!(!starts_with_image_signature(b"<html>\xff\xd8"));
        assert!(contains_image_marker(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n\xff\xd8"));
        assert!(!contains_image_marker(b"<html><body>404</body></html>"));
    }

    #[test]
    fn stream_paths() {
        assert!(looks_like_stream_path("http://10.0.0.1/cgi-bin/snapshot.cgi"));
        assert!(looks_like_stream_path("http://10.0.0.1/mjpg/video.mjpg"));
        assert!(!looks_like_stream_path("http://10.0.0.1/doc/page/login.asp"));
    }
}
