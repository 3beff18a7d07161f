//! Image attachments for `run --image`

use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zia_application::ImageAttachment;

/// Media type for a supported image extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read and base64-encode an image file.
pub fn load(path: &Path) -> Result<ImageAttachment> {
    let Some(media_type) = media_type_for(path) else {
        bail!(
            "unsupported image type: {} (expected png, jpeg, gif or webp)",
            path.display()
        );
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read image {}", path.display()))?;
    Ok(ImageAttachment {
        media_type: media_type.to_string(),
        data: STANDARD.encode(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(media_type_for(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(media_type_for(Path::new("b.jpg")), Some("image/jpeg"));
        assert_eq!(media_type_for(Path::new("c.jpeg")), Some("image/jpeg"));
        assert_eq!(media_type_for(Path::new("d.gif")), Some("image/gif"));
        assert_eq!(media_type_for(Path::new("e.webp")), Some("image/webp"));
        assert_eq!(media_type_for(Path::new("f.bmp")), None);
        assert_eq!(media_type_for(Path::new("noext")), None);
    }

    #[test]
    fn test_load_encodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let image = load(&path).unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, "iVBORw==");
    }

    #[test]
    fn test_load_rejects_unknown_type() {
        let err = load(&PathBuf::from("notes.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported image type"));
    }
}
