//! Multipart form-data parsing for file uploads.
//!
//! [`parse_multipart`] splits a `multipart/form-data` body on its boundary and
//! sorts each part into either a plain form field or an [`UploadedFile`].
//! Part bodies are handled as bytes, so binary uploads survive intact.

use std::collections::HashMap;

use xweb_core::{XwebError, XwebResult};

/// An uploaded file from a multipart form submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// The original filename as provided by the client.
    pub name: String,
    /// The MIME content type of the file.
    pub content_type: String,
    /// The raw file content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Size of the file content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// The result of parsing a multipart form-data body.
#[derive(Debug, Clone, Default)]
pub struct MultipartData {
    /// Regular form fields in arrival order: `(name, value)`.
    pub fields: Vec<(String, String)>,
    /// Uploaded files: field name -> list of uploaded files.
    pub files: HashMap<String, Vec<UploadedFile>>,
}

/// Extracts the boundary string from a `Content-Type: multipart/form-data` header.
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let boundary = part.trim().strip_prefix("boundary=")?.trim_matches('"');
        (!boundary.is_empty()).then_some(boundary)
    })
}

/// Parses a multipart/form-data request body.
///
/// # Errors
///
/// Returns [`XwebError::BadRequest`] if the opening boundary is missing or a
/// part has no header/body separator.
pub fn parse_multipart(body: &[u8], boundary: &str) -> XwebResult<MultipartData> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let Some(first) = find(body, delimiter, 0) else {
        return Err(XwebError::BadRequest(
            "multipart body does not contain the boundary".to_string(),
        ));
    };

    let mut data = MultipartData::default();
    let mut cursor = first + delimiter.len();

    loop {
        // "--" right after a delimiter closes the body.
        if body[cursor..].starts_with(b"--") {
            break;
        }
        cursor += line_break_len(&body[cursor..]);

        let Some(next) = find(body, delimiter, cursor) else {
            return Err(XwebError::BadRequest(
                "multipart body is not terminated".to_string(),
            ));
        };

        let part = trim_trailing_line_break(&body[cursor..next]);
        parse_part(part, &mut data)?;
        cursor = next + delimiter.len();
    }

    Ok(data)
}

fn parse_part(part: &[u8], data: &mut MultipartData) -> XwebResult<()> {
    let (head, content) = if let Some(pos) = find(part, b"\r\n\r\n", 0) {
        (&part[..pos], &part[pos + 4..])
    } else if let Some(pos) = find(part, b"\n\n", 0) {
        (&part[..pos], &part[pos + 2..])
    } else {
        return Err(XwebError::BadRequest(
            "multipart part has no header terminator".to_string(),
        ));
    };

    let head = String::from_utf8_lossy(head);
    let mut field_name = None;
    let mut filename = None;
    let mut content_type = "text/plain".to_string();

    for line in head.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.trim().eq_ignore_ascii_case("content-disposition") {
            field_name = extract_header_param(value, "name");
            filename = extract_header_param(value, "filename");
        } else if name.trim().eq_ignore_ascii_case("content-type") {
            content_type = value.to_string();
        }
    }

    let Some(field_name) = field_name else {
        return Ok(());
    };

    match filename {
        Some(name) if name.is_empty() && content.is_empty() => {}
        Some(name) => {
            data.files.entry(field_name).or_default().push(UploadedFile {
                name,
                content_type,
                content: content.to_vec(),
            });
        }
        None => data
            .fields
            .push((field_name, String::from_utf8_lossy(content).into_owned())),
    }
    Ok(())
}

/// Extracts `param="value"` (or unquoted `param=value`) from a header value.
fn extract_header_param(header_value: &str, param_name: &str) -> Option<String> {
    header_value.split(';').find_map(|piece| {
        let (key, value) = piece.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case(param_name)
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

fn line_break_len(bytes: &[u8]) -> usize {
    if bytes.starts_with(b"\r\n") {
        2
    } else {
        usize::from(bytes.starts_with(b"\n"))
    }
}

fn trim_trailing_line_break(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----xwebBoundary";

    fn body(parts: &[&str]) -> Vec<u8> {
        let mut out = String::new();
        for part in parts {
            out.push_str("--");
            out.push_str(BOUNDARY);
            out.push_str("\r\n");
            out.push_str(part);
            out.push_str("\r\n");
        }
        out.push_str("--");
        out.push_str(BOUNDARY);
        out.push_str("--\r\n");
        out.into_bytes()
    }

    #[test]
    fn test_extract_boundary_basic() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary";
        assert_eq!(extract_boundary(ct), Some("----WebKitFormBoundary"));
    }

    #[test]
    fn test_extract_boundary_quoted() {
        let ct = "multipart/form-data; boundary=\"b123\"";
        assert_eq!(extract_boundary(ct), Some("b123"));
    }

    #[test]
    fn test_extract_boundary_missing() {
        assert_eq!(extract_boundary("multipart/form-data"), None);
        assert_eq!(extract_boundary("multipart/form-data; boundary="), None);
    }

    #[test]
    fn test_parse_fields() {
        let raw = body(&[
            "Content-Disposition: form-data; name=\"title\"\r\n\r\nHello",
            "Content-Disposition: form-data; name=\"tags\"\r\n\r\na",
            "Content-Disposition: form-data; name=\"tags\"\r\n\r\nb",
        ]);
        let data = parse_multipart(&raw, BOUNDARY).unwrap();
        assert_eq!(
            data.fields,
            vec![
                ("title".to_string(), "Hello".to_string()),
                ("tags".to_string(), "a".to_string()),
                ("tags".to_string(), "b".to_string()),
            ]
        );
        assert!(data.files.is_empty());
    }

    #[test]
    fn test_parse_file_upload() {
        let raw = body(&[
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n\u{1}\u{2}\u{3}",
        ]);
        let data = parse_multipart(&raw, BOUNDARY).unwrap();
        let file = &data.files["avatar"][0];
        assert_eq!(file.name, "me.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.content, vec![1, 2, 3]);
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn test_parse_empty_file_field_skipped() {
        let raw = body(&[
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"\"\r\n\r\n",
        ]);
        let data = parse_multipart(&raw, BOUNDARY).unwrap();
        assert!(data.files.is_empty());
    }

    #[test]
    fn test_parse_missing_boundary_is_error() {
        let result = parse_multipart(b"garbage", BOUNDARY);
        assert!(matches!(result, Err(XwebError::BadRequest(_))));
    }

    #[test]
    fn test_parse_unterminated_is_error() {
        let raw = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1");
        assert!(parse_multipart(raw.as_bytes(), BOUNDARY).is_err());
    }
}
