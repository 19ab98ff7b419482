use crate::intake::{SelectedFile, SelectionId};
use image::imageops::FilterType;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Longest edge of a displayed preview, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 512;

/// Decoded RGBA8 pixels ready to be uploaded as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub selection: SelectionId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PreviewHandle {
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }
}

/// Decodes the selected file into a preview. `None` means the bytes are not
/// something we can display; that never blocks a prediction.
pub fn decode_preview(file: &SelectedFile) -> Option<PreviewHandle> {
    let img = match image::load_from_memory(&file.bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!("no preview for {}: {e}", file.name);
            return None;
        }
    };
    let img = if img.width() > PREVIEW_MAX_EDGE || img.height() > PREVIEW_MAX_EDGE {
        img.resize(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE, FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(PreviewHandle {
        selection: file.id,
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Starts decoding on a background thread. The receiver yields exactly one
/// value; once started the decode runs to completion.
pub fn render(file: SelectedFile) -> Receiver<(SelectionId, Option<PreviewHandle>)> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let preview = decode_preview(&file);
        // The host may have gone away; nobody to tell then.
        let _ = tx.send((file.id, preview));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn png_file(width: u32, height: u32) -> SelectedFile {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        SelectedFile {
            id: SelectionId(7),
            name: "red.png".into(),
            media_type: "image/png".into(),
            bytes: Arc::from(buf.into_inner()),
        }
    }

    #[test]
    fn decodes_small_image_unchanged() {
        let preview = decode_preview(&png_file(4, 3)).unwrap();
        assert_eq!(preview.selection, SelectionId(7));
        assert_eq!(preview.size(), [4, 3]);
        assert_eq!(preview.rgba.len(), 4 * 3 * 4);
        assert_eq!(&preview.rgba[..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn large_image_is_scaled_to_fit() {
        let preview = decode_preview(&png_file(1024, 256)).unwrap();
        assert_eq!(preview.width, PREVIEW_MAX_EDGE);
        assert_eq!(preview.height, 128);
    }

    #[test]
    fn garbage_bytes_give_no_preview() {
        let file = SelectedFile {
            id: SelectionId(1),
            name: "broken.jpg".into(),
            media_type: "image/jpeg".into(),
            bytes: Arc::from(vec![0u8, 1, 2, 3]),
        };
        assert!(decode_preview(&file).is_none());
    }

    #[test]
    fn background_render_reports_once() {
        let rx = render(png_file(2, 2));
        let (id, preview) = rx.recv().unwrap();
        assert_eq!(id, SelectionId(7));
        assert!(preview.is_some());
        assert!(rx.recv().is_err());
    }
}
