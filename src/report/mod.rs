//! PDF screening report generation.
//!
//! Renders a one-page A4 report carrying the prediction, its confidence,
//! the generation timestamp, and a scaled copy of the screened image. Pure
//! consumer of a [`Classification`]; it never re-runs the pipeline.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Local};
use image::{imageops::FilterType, DynamicImage};
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument,
    PdfLayerReference, Px,
};

use crate::error::{Error, Result};
use crate::pipeline::Classification;

/// Edge length of the embedded image copy, in pixels.
const REPORT_IMAGE_SIZE: u32 = 400;

/// Resolution the embedded image is placed at.
const REPORT_IMAGE_DPI: f32 = 96.0;

/// Render a screening report as PDF bytes.
///
/// # Errors
///
/// Returns an error if the classification is not applicable (the gate
/// rejected the image, so there is no prediction to report) or if PDF
/// assembly fails.
pub fn render_report(
    img: &DynamicImage,
    result: &Classification,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>> {
    let confidence = match (result.applicable, result.confidence) {
        (true, Some(confidence)) => confidence,
        _ => {
            return Err(Error::Report {
                reason: "no diagnostic prediction available".to_string(),
            })
        }
    };

    let (doc, page1, layer1) =
        PdfDocument::new("Pneumonia Screening Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Report {
            reason: format!("font error: {e}"),
        })?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| Error::Report {
            reason: format!("font error: {e}"),
        })?;

    let mut y = Mm(275.0);

    layer.use_text("Pneumonia Screening Report", 16.0, Mm(20.0), y, &bold);
    y -= Mm(12.0);

    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S");
    layer.use_text(format!("Generated on: {stamp}"), 11.0, Mm(20.0), y, &font);
    y -= Mm(10.0);

    layer.use_text(
        format!("Prediction: {}", result.label),
        11.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(7.0);

    layer.use_text(
        format!("Confidence: {:.2}%", confidence * 100.0),
        11.0,
        Mm(20.0),
        y,
        &font,
    );

    embed_image(&layer, img);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| Error::Report {
        reason: format!("PDF save error: {e}"),
    })?;
    buf.into_inner().map_err(|e| Error::Report {
        reason: format!("PDF buffer error: {e}"),
    })
}

/// Render a screening report stamped with the current local time and write
/// it to disk.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn save_report<P: AsRef<Path>>(
    path: P,
    img: &DynamicImage,
    result: &Classification,
) -> Result<()> {
    let bytes = render_report(img, result, Local::now())?;
    fs::write(path.as_ref(), bytes)?;

    tracing::info!("Report saved to {}", path.as_ref().display());
    Ok(())
}

/// Place a 400x400 copy of the screened image on the page, centered below
/// the text block.
fn embed_image(layer: &PdfLayerReference, img: &DynamicImage) {
    let scaled = img
        .resize_exact(REPORT_IMAGE_SIZE, REPORT_IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();

    let xobject = ImageXObject {
        width: Px(REPORT_IMAGE_SIZE as usize),
        height: Px(REPORT_IMAGE_SIZE as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: scaled.into_raw(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };

    // 400 px at 96 dpi is ~105.8 mm; translate centers it on the A4 page.
    Image::from(xobject).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(52.0)),
            translate_y: Some(Mm(120.0)),
            dpi: Some(REPORT_IMAGE_DPI),
            ..Default::default()
        },
    );
}
