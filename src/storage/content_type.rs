//! MIME detection from payload bytes
//!
//! The stored content type comes from the bytes themselves, never from
//! client-supplied metadata. Unknown content falls back to octet-stream.

/// Sniff the MIME type of a payload from its magic bytes.
pub fn sniff(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
        return "image/png";
    }
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if bytes.starts_with(b"%PDF") {
        return "application/pdf";
    }
    if bytes.starts_with(&[0x1f, 0x8b]) {
        return "application/gzip";
    }
    if bytes.starts_with(b"PK\x03\x04") {
        return "application/zip";
    }
    if bytes.starts_with(b"BM") {
        return "image/bmp";
    }
    if bytes.starts_with(b"OggS") {
        return "application/ogg";
    }
    if mp4_brand(bytes) {
        return "video/mp4";
    }

    if looks_like_text(bytes) {
        return "text/plain; charset=utf-8";
    }

    "application/octet-stream"
}

fn mp4_brand(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp"
}

/// Treat valid-UTF-8 prefixes without control bytes as plain text. A
/// multibyte character cut off at the prefix boundary still counts.
fn looks_like_text(bytes: &[u8]) -> bool {
    let prefix = &bytes[..bytes.len().min(512)];
    let text = match std::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&prefix[..e.valid_up_to()]).unwrap_or("")
        }
        Err(_) => return false,
    };
    !text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png() {
        let payload = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00];
        assert_eq!(sniff(&payload), "image/png");
    }

    #[test]
    fn detects_jpeg() {
        assert_eq!(sniff(&[0xff, 0xd8, 0xff, 0xe0]), "image/jpeg");
    }

    #[test]
    fn detects_pdf() {
        assert_eq!(sniff(b"%PDF-1.7 ..."), "application/pdf");
    }

    #[test]
    fn detects_gzip() {
        assert_eq!(sniff(&[0x1f, 0x8b, 0x08]), "application/gzip");
    }

    #[test]
    fn plain_utf8_is_text() {
        assert_eq!(sniff(b"hello1234\n"), "text/plain; charset=utf-8");
    }

    #[test]
    fn binary_garbage_falls_back_to_octet_stream() {
        assert_eq!(sniff(&[0x00, 0x01, 0x02, 0xfe]), "application/octet-stream");
    }

    #[test]
    fn empty_payload_is_text() {
        // An empty body sniffs as empty text, matching the UTF-8 rule.
        assert_eq!(sniff(b""), "text/plain; charset=utf-8");
    }
}
