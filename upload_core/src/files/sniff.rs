//! Content sniffing from leading bytes.

/// Only this many leading bytes are ever inspected.
pub const SNIFF_LEN: usize = 512;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a MIME type from the leading bytes of `data`, ignoring any
/// client-declared value.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    if head.starts_with(b"%PDF-") {
        "application/pdf"
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        "image/gif"
    } else if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if is_webp(head) {
        "image/webp"
    } else if head.starts_with(b"BM") {
        "image/bmp"
    } else if head.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        "image/x-icon"
    } else if head.starts_with(b"PK\x03\x04") {
        "application/zip"
    } else if head.starts_with(&[0x1F, 0x8B, 0x08]) {
        "application/gzip"
    } else if !head.iter().any(|&b| is_binary_byte(b)) {
        TEXT_PLAIN_UTF8
    } else {
        OCTET_STREAM
    }
}

/// Preferred file extension (without the dot) for a MIME type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = essence(content_type);

    let preferred = match essence.as_str() {
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/png" => Some("png"),
        "application/pdf" => Some("pdf"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "image/x-icon" => Some("ico"),
        "application/zip" => Some("zip"),
        "application/gzip" => Some("gz"),
        "text/plain" => Some("txt"),
        _ => None,
    };

    preferred.or_else(|| {
        let mime: mime::Mime = essence.parse().ok()?;
        mime_guess::get_mime_extensions(&mime).and_then(|exts| exts.first().copied())
    })
}

/// Lowercased type/subtype with parameters dropped.
pub fn essence(content_type: &str) -> String {
    match content_type.parse::<mime::Mime>() {
        Ok(mime) => mime.essence_str().to_ascii_lowercase(),
        Err(_) => content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase(),
    }
}

fn is_webp(head: &[u8]) -> bool {
    head.len() >= 14 && &head[..4] == b"RIFF" && &head[8..14] == b"WEBPVP"
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
