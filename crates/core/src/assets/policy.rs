//! Upload acceptance rules per asset kind.
//!
//! Images: `jpeg, jpg, png, gif, webp`, at most 5 MiB, and the bytes must
//! actually decode as one of those raster formats.
//! Documents: `pdf, doc, docx, xls, xlsx, txt`, at most 10 MiB.

use image::ImageFormat;

use super::AssetKind;

/// Maximum accepted image size (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum accepted document size (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Accepted image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Accepted document extensions with their canonical MIME types.
const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("txt", "text/plain"),
];

/// A file as received from the client, before any checks.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-side file name, kept for display only.
    pub original_name: String,
    /// `Content-Type` declared by the client for this part, if any.
    pub declared_mime: Option<String>,
    pub data: Vec<u8>,
}

/// An upload that passed [`check_upload`].
#[derive(Debug, Clone)]
pub struct AcceptedUpload {
    pub original_name: String,
    /// Lowercased extension from the allow-list.
    pub extension: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl AcceptedUpload {
    pub fn size_bytes(&self) -> i64 {
        self.data.len() as i64
    }
}

impl AssetKind {
    pub fn max_bytes(self) -> usize {
        match self {
            AssetKind::Image => MAX_IMAGE_BYTES,
            AssetKind::Document => MAX_DOCUMENT_BYTES,
        }
    }

    fn allowed_extensions(self) -> Vec<&'static str> {
        match self {
            AssetKind::Image => IMAGE_EXTENSIONS.to_vec(),
            AssetKind::Document => DOCUMENT_TYPES.iter().map(|(ext, _)| *ext).collect(),
        }
    }
}

/// Check one upload against the rules for `kind`.
///
/// Returns a human-readable reason on rejection; the caller attaches it to
/// the offending form field.
pub fn check_upload(kind: AssetKind, file: UploadedFile) -> Result<AcceptedUpload, String> {
    let allowed = kind.allowed_extensions();

    let extension = file
        .original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| allowed.contains(&ext.as_str()))
        .ok_or_else(|| {
            format!(
                "The file '{}' must be a file of type: {}.",
                file.original_name,
                allowed.join(", ")
            )
        })?;

    if file.data.is_empty() {
        return Err(format!("The file '{}' is empty.", file.original_name));
    }

    if file.data.len() > kind.max_bytes() {
        return Err(format!(
            "The file '{}' may not be greater than {} kilobytes.",
            file.original_name,
            kind.max_bytes() / 1024
        ));
    }

    let mime_type = match kind {
        AssetKind::Image => sniff_image_mime(&file.data).ok_or_else(|| {
            format!(
                "The file '{}' must be an image of type: {}.",
                file.original_name,
                IMAGE_EXTENSIONS.join(", ")
            )
        })?,
        AssetKind::Document => document_mime(&extension, file.declared_mime.as_deref()),
    };

    Ok(AcceptedUpload {
        original_name: file.original_name,
        extension,
        mime_type,
        data: file.data,
    })
}

/// MIME type of an accepted raster image, read from its header bytes.
fn sniff_image_mime(data: &[u8]) -> Option<String> {
    match image::guess_format(data).ok()? {
        format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP) => {
            Some(format.to_mime_type().to_string())
        }
        _ => None,
    }
}

/// Declared type wins when it is specific; otherwise the extension's canonical type.
fn document_mime(extension: &str, declared: Option<&str>) -> String {
    match declared {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => mime.to_string(),
        _ => DOCUMENT_TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| (*mime).to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest header `image::guess_format` recognises as PNG.
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn upload(name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: name.to_string(),
            declared_mime: None,
            data: data.to_vec(),
        }
    }

    #[test]
    fn accepts_png_image() {
        let accepted = check_upload(AssetKind::Image, upload("Photo.PNG", PNG_MAGIC)).unwrap();
        assert_eq!(accepted.extension, "png");
        assert_eq!(accepted.mime_type, "image/png");
        assert_eq!(accepted.original_name, "Photo.PNG");
        assert_eq!(accepted.size_bytes(), PNG_MAGIC.len() as i64);
    }

    #[test]
    fn rejects_image_with_wrong_extension() {
        let err = check_upload(AssetKind::Image, upload("photo.bmp", PNG_MAGIC)).unwrap_err();
        assert!(err.contains("jpeg, jpg, png, gif, webp"));
    }

    #[test]
    fn rejects_image_whose_bytes_are_not_an_image() {
        let err = check_upload(AssetKind::Image, upload("photo.png", b"plain text")).unwrap_err();
        assert!(err.contains("must be an image"));
    }

    #[test]
    fn rejects_oversized_image() {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = check_upload(AssetKind::Image, upload("big.png", &data)).unwrap_err();
        assert!(err.contains("5120 kilobytes"));
    }

    #[test]
    fn image_at_size_limit_is_accepted() {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(MAX_IMAGE_BYTES, 0);
        assert!(check_upload(AssetKind::Image, upload("edge.png", &data)).is_ok());
    }

    #[test]
    fn rejects_missing_extension_and_empty_files() {
        assert!(check_upload(AssetKind::Document, upload("README", b"hello")).is_err());
        assert!(check_upload(AssetKind::Document, upload("empty.txt", b"")).is_err());
    }

    #[test]
    fn document_mime_falls_back_to_extension() {
        let accepted = check_upload(AssetKind::Document, upload("catalogue.pdf", b"%PDF-1.7")).unwrap();
        assert_eq!(accepted.mime_type, "application/pdf");

        let mut declared = upload("notes.txt", b"hello");
        declared.declared_mime = Some("text/plain; charset=utf-8".to_string());
        let accepted = check_upload(AssetKind::Document, declared).unwrap();
        assert_eq!(accepted.mime_type, "text/plain; charset=utf-8");

        let mut generic = upload("sheet.xlsx", b"PK..");
        generic.declared_mime = Some("application/octet-stream".to_string());
        let accepted = check_upload(AssetKind::Document, generic).unwrap();
        assert!(accepted.mime_type.contains("spreadsheetml"));
    }

    #[test]
    fn document_size_limit_is_ten_mib() {
        let data = vec![b'a'; MAX_DOCUMENT_BYTES + 1];
        let err = check_upload(AssetKind::Document, upload("huge.txt", &data)).unwrap_err();
        assert!(err.contains("10240 kilobytes"));
    }
}
