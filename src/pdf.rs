use crate::models::FlyerBatch;
use printpdf::*;
use std::io::BufWriter;

/// Minimal PDF (text-only) summary of a batch; images stay on disk.
pub fn batch_summary_pdf(batch: &FlyerBatch) -> Vec<u8> {
    let (doc, _page, layer) = PdfDocument::new(
        format!("Flyers: {}", truncate(&batch.product, 48)),
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
    let summary = doc.get_page(_page).get_layer(layer);
    summary.use_text("Promotional Flyer Batch", 20.0, Mm(15.0), Mm(275.0), &font);
    summary.use_text(truncate(&batch.product, 140), 11.0, Mm(15.0), Mm(260.0), &font);
    summary.use_text(
        format!("Requested: {}  Rendered: {}  Language: {}", batch.requested, batch.flyers.len(), batch.language),
        10.0,
        Mm(15.0),
        Mm(248.0),
        &font,
    );
    summary.use_text("(Images not embedded; see the output directory)", 8.0, Mm(15.0), Mm(236.0), &font);

    for flyer in &batch.flyers {
        let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), &flyer.filename);
        let layer_ref = doc.get_page(page).get_layer(layer);
        layer_ref.use_text(&flyer.variation.title, 16.0, Mm(15.0), Mm(275.0), &font);
        layer_ref.use_text(&flyer.variation.subtitle, 11.0, Mm(15.0), Mm(263.0), &font);
        layer_ref.use_text(truncate(&flyer.variation.description, 180), 9.0, Mm(15.0), Mm(251.0), &font);
        layer_ref.use_text(
            format!("CTA: {}  Tone: {}  Format: {}", flyer.variation.call_to_action, flyer.variation.tone, flyer.format),
            9.0,
            Mm(15.0),
            Mm(239.0),
            &font,
        );
        layer_ref.use_text(format!("File: {}  Background: {}", flyer.filename, flyer.background_color), 8.0, Mm(15.0), Mm(227.0), &font);
    }

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buf);
        doc.save(&mut writer).ok();
    }
    buf
}

// char-based: Spanish copy routinely carries accented characters
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { format!("{}…", s.chars().take(max).collect::<String>()) }
}
