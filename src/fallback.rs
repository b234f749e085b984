//! Deterministic marketing-copy bank used whenever the generative source
//! fails or returns junk. Templates are tone-indexed and parameterized by the
//! brief's product/offer/validity/location fields.

use crate::models::{PromotionalBrief, TextVariation};

/// Tones assigned round-robin across the requested slots.
pub const TONES: [&str; 8] = [
    "urgent", "elegant", "casual", "fun", "exclusive", "friendly", "informative", "inspiring",
];

const TITLE_MAX: usize = 50;
const SUBTITLE_MAX: usize = 80;
const CTA_MAX: usize = 30;
const DESCRIPTION_MAX: usize = 200;

/// Produce `quantity` variations. Guaranteed non-empty for quantity >= 1; a
/// last-resort generic variation covers the pathological zero-template case.
pub fn fallback_variations(
    brief: &PromotionalBrief,
    quantity: u32,
    language: &str,
) -> Vec<TextVariation> {
    let spanish = language.to_ascii_lowercase().starts_with("es");
    let mut variations = Vec::with_capacity(quantity as usize);
    for slot in 0..quantity as usize {
        let tone = TONES[slot % TONES.len()];
        variations.push(TextVariation {
            title: truncate(fill(title_template(tone, spanish), brief), TITLE_MAX),
            subtitle: truncate(fill(subtitle_template(tone, spanish), brief), SUBTITLE_MAX),
            call_to_action: truncate(fill(cta_template(tone, spanish), brief), CTA_MAX),
            description: truncate(fill(description_template(tone, spanish), brief), DESCRIPTION_MAX),
            tone: tone.to_string(),
        });
    }
    if variations.is_empty() && quantity > 0 {
        variations.push(generic_variation(brief, spanish));
    }
    variations
}

fn generic_variation(brief: &PromotionalBrief, spanish: bool) -> TextVariation {
    let template = if spanish {
        ("{product}", "Una oferta especial te espera", "Ven hoy", "Descubre {product} con {offer}. Te esperamos en {location}.")
    } else {
        ("{product}", "A special offer is waiting for you", "Come by today", "Discover {product} with {offer}. Find us at {location}.")
    };
    TextVariation {
        title: truncate(fill(template.0, brief), TITLE_MAX),
        subtitle: truncate(fill(template.1, brief), SUBTITLE_MAX),
        call_to_action: truncate(fill(template.2, brief), CTA_MAX),
        description: truncate(fill(template.3, brief), DESCRIPTION_MAX),
        tone: "friendly".to_string(),
    }
}

/// Substitute brief fields into a template's placeholders.
fn fill(template: &str, brief: &PromotionalBrief) -> String {
    template
        .replace("{product}", &brief.product)
        .replace("{offer}", &brief.offer)
        .replace("{validity}", &brief.validity)
        .replace("{location}", &brief.location)
}

/// Hard character truncation, not word-boundary-aware.
fn truncate(text: String, max: usize) -> String {
    if text.chars().count() <= max {
        text
    } else {
        text.chars().take(max).collect()
    }
}

fn title_template(tone: &str, spanish: bool) -> &'static str {
    if spanish {
        match tone {
            "urgent" => "¡Última chance! {offer} en {product}",
            "elegant" => "{product}, pensado para ti",
            "casual" => "¿Ya viste? {offer} en {product}",
            "fun" => "¡{product} + {offer} = felicidad!",
            "exclusive" => "Solo para ti: {offer} en {product}",
            "friendly" => "Te esperamos con {product}",
            "informative" => "{product}: ahora con {offer}",
            _ => "Date el gusto: {product}",
        }
    } else {
        match tone {
            "urgent" => "Last chance! {offer} on {product}",
            "elegant" => "{product}, crafted for you",
            "casual" => "Heads up: {offer} on {product}",
            "fun" => "{product} + {offer} = happiness!",
            "exclusive" => "Members only: {offer} on {product}",
            "friendly" => "Come enjoy {product} with us",
            "informative" => "{product}: now with {offer}",
            _ => "Treat yourself to {product}",
        }
    }
}

fn subtitle_template(tone: &str, spanish: bool) -> &'static str {
    if spanish {
        match tone {
            "urgent" => "Solo {validity}, no lo dejes pasar",
            "elegant" => "Una experiencia distinta, {validity}",
            "casual" => "Pásate cuando quieras, {validity}",
            "fun" => "La excusa perfecta para salir de casa",
            "exclusive" => "Cupos limitados, {validity}",
            "friendly" => "Tu lugar de siempre, con {offer}",
            "informative" => "Válido {validity} en {location}",
            _ => "Porque te lo mereces, {validity}",
        }
    } else {
        match tone {
            "urgent" => "Only {validity}, don't let it slip away",
            "elegant" => "A different kind of experience, {validity}",
            "casual" => "Drop by whenever, {validity}",
            "fun" => "The perfect excuse to get out of the house",
            "exclusive" => "Limited spots, {validity}",
            "friendly" => "Your usual spot, now with {offer}",
            "informative" => "Valid {validity} at {location}",
            _ => "Because you deserve it, {validity}",
        }
    }
}

fn cta_template(tone: &str, spanish: bool) -> &'static str {
    if spanish {
        match tone {
            "urgent" => "¡Aprovecha ya!",
            "elegant" => "Descúbrelo",
            "casual" => "Pásate hoy",
            "fun" => "¡Vamos!",
            "exclusive" => "Reserva tu lugar",
            "friendly" => "Visítanos",
            "informative" => "Más información",
            _ => "Empieza hoy",
        }
    } else {
        match tone {
            "urgent" => "Grab it now!",
            "elegant" => "Discover more",
            "casual" => "Stop by today",
            "fun" => "Let's go!",
            "exclusive" => "Reserve your spot",
            "friendly" => "Visit us",
            "informative" => "Learn more",
            _ => "Start today",
        }
    }
}

fn description_template(tone: &str, spanish: bool) -> &'static str {
    if spanish {
        match tone {
            "urgent" => "El tiempo corre: {product} con {offer}, disponible {validity}. Encuéntranos en {location} antes de que se acabe.",
            "elegant" => "Déjate consentir con {product} y una atención de primera. {offer}, {validity}, en {location}.",
            "casual" => "Nada complicado: {product}, {offer} y buena onda. Estamos en {location}, {validity}.",
            "fun" => "¿Plan aburrido? Jamás. {product} con {offer} te espera en {location}. Corre la voz, es {validity}.",
            "exclusive" => "Acceso preferente a {product} con {offer}. Una selección limitada, {validity}, solo en {location}.",
            "friendly" => "Como en casa, pero mejor: {product} con {offer}. Ven a {location}, {validity}.",
            "informative" => "{product} disponible con {offer}. Promoción válida {validity}. Ubicación: {location}.",
            _ => "Hoy es un buen día para empezar: {product} con {offer}, {validity}. Te esperamos en {location}.",
        }
    } else {
        match tone {
            "urgent" => "The clock is ticking: {product} with {offer}, available {validity}. Find us at {location} before it's gone.",
            "elegant" => "Indulge in {product} with service to match. {offer}, {validity}, at {location}.",
            "casual" => "Nothing fancy: {product}, {offer} and a good time. We're at {location}, {validity}.",
            "fun" => "Boring plans? Never. {product} with {offer} is waiting at {location}. Spread the word, it's {validity}.",
            "exclusive" => "Priority access to {product} with {offer}. A limited selection, {validity}, only at {location}.",
            "friendly" => "Like home, but better: {product} with {offer}. Come to {location}, {validity}.",
            "informative" => "{product} available with {offer}. Promotion valid {validity}. Location: {location}.",
            _ => "Today is a good day to start: {product} with {offer}, {validity}. We're waiting at {location}.",
        }
    }
}
