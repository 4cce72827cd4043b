//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the codec and transport seams so the transform
//! service and the processing controller can be exercised without real
//! encoders or a running server.
//!
//! # Example
//!
//! ```rust,ignore
//! use fil_core::testing::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push_json(200, &serde_json::json!({ "dataUrl": "data:image/jpeg;base64,AA==" })).await;
//!
//! let file = fixtures::selected_file("photo.png", fixtures::png_image(16, 16));
//! ```

mod mock_image_codec;
mod mock_transport;

pub use mock_image_codec::MockImageCodec;
pub use mock_transport::{MockReply, MockTransport};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use image::codecs::jpeg::JpegEncoder;
    use image::{ImageFormat, Rgb, RgbImage};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    use crate::client::SelectedFile;

    /// A deterministic RGB pattern with enough detail for lossy encoders
    /// to have something to throw away.
    pub fn gradient(width: u32, height: u32) -> RgbImage {
        let w = width.max(1);
        let h = height.max(1);
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / w) as u8,
                (y * 255 / h) as u8,
                ((x ^ y) & 0xff) as u8,
            ])
        })
    }

    /// PNG-encoded gradient.
    pub fn png_image(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        gradient(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .expect("png fixture should encode");
        out.into_inner()
    }

    /// JPEG-encoded gradient at the given quality.
    pub fn jpeg_image(width: u32, height: u32, quality: u8) -> Vec<u8> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&gradient(width, height))
            .expect("jpeg fixture should encode");
        out
    }

    /// A one-page PDF with a single line of text.
    pub fn minimal_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal("Fil test page")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("pdf content should encode"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("pdf fixture should serialize");
        out
    }

    /// A selected file whose MIME type is guessed from the name.
    pub fn selected_file(name: &str, bytes: Vec<u8>) -> SelectedFile {
        SelectedFile::from_bytes(name, bytes)
    }
}
