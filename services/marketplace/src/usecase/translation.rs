//! Field-level translation of listings, bookings and feedback.
//!
//! Each entity exposes an allow-list of text fields. Non-empty fields are joined with
//! [`DELIMITER`], sent in one request and split back in order. Any failure keeps the
//! original entity; a list never fails as a whole.

use futures::future::join_all;
use tracing::warn;

use crate::domain::repository::Translator;
use crate::domain::types::{
    Booking, BookingDetail, BookingSummary, FeedbackWithAuthor, Property, PropertyDetail,
    PropertyListing,
};

pub const DELIMITER: &str = "\n|||\n";

/// Marker the translated text is split on. Translators tend to trim the newlines.
const SPLIT_MARKER: &str = "|||";

/// Entity with translatable text fields, in a stable order.
pub trait Translatable {
    fn text_fields(&mut self) -> Vec<&mut String>;
}

impl Translatable for Property {
    fn text_fields(&mut self) -> Vec<&mut String> {
        let mut fields = vec![&mut self.name, &mut self.description];
        fields.extend(self.amenities.iter_mut());
        fields.push(&mut self.location);
        fields.push(&mut self.state);
        fields.push(&mut self.property_type);
        fields
    }
}

impl Translatable for PropertyListing {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.property.text_fields()
    }
}

impl Translatable for PropertyDetail {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.listing.text_fields()
    }
}

impl Translatable for Booking {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.payment_instruction.iter_mut().collect()
    }
}

impl Translatable for BookingSummary {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.booking.text_fields()
    }
}

impl Translatable for BookingDetail {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.booking.text_fields()
    }
}

impl Translatable for FeedbackWithAuthor {
    fn text_fields(&mut self) -> Vec<&mut String> {
        self.feedback.comment.iter_mut().collect()
    }
}

/// Accept `lang` only if it looks like a language tag: 2 to 5 ASCII letters or `-`.
pub fn target_lang(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|lang| {
        (2..=5).contains(&lang.len())
            && lang.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
    })
}

/// Translate one entity. Returns it unchanged on any failure.
pub async fn translate_item<T, X>(translator: &X, mut item: T, lang: &str) -> T
where
    T: Translatable + Clone,
    X: Translator,
{
    let original = item.clone();
    let mut fields: Vec<&mut String> = item
        .text_fields()
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .collect();
    if fields.is_empty() {
        return original;
    }

    let joined = fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(DELIMITER);
    let translated = match translator.translate(&joined, lang).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = ?e, lang, "translation failed, keeping original");
            return original;
        }
    };

    let parts: Vec<&str> = translated.split(SPLIT_MARKER).map(str::trim).collect();
    if parts.len() != fields.len() {
        warn!(
            expected = fields.len(),
            got = parts.len(),
            lang,
            "translated field count mismatch, keeping original"
        );
        return original;
    }
    for (field, part) in fields.iter_mut().zip(parts) {
        **field = part.to_owned();
    }
    item
}

/// Translate every entity concurrently.
pub async fn translate_all<T, X>(translator: &X, items: Vec<T>, lang: &str) -> Vec<T>
where
    T: Translatable + Clone,
    X: Translator,
{
    join_all(
        items
            .into_iter()
            .map(|item| translate_item(translator, item, lang)),
    )
    .await
}
