//! Default caption: a decorative title line followed by the book details.

use chrono::NaiveDate;

use crate::contract::CaptionGenerator;
use crate::identity::BookIdentity;

/// Decorative phrases prefixed to the book identity in the title line.
pub const TITLE_PREFIXES: [&str; 7] = [
    "📚 اكتشف أسرار",
    "🔍 دليلك الشامل ل",
    "🌟 كنز المعرفة:",
    "📖 رحلة في عالم",
    "🧠 موسوعة",
    "✨ الجديد في",
    "🏆 أفضل مرجع ل",
];

pub const HASHTAGS: &str = "#كتب #قراءة #مكتبة";

/// Caption generator used in production. The title prefix is picked uniformly
/// at random on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecorativeCaption;

impl DecorativeCaption {
    /// Title line for `identity` using a random prefix.
    pub fn title(identity: &BookIdentity) -> String {
        format!("{} {identity}", random_prefix())
    }
}

impl CaptionGenerator for DecorativeCaption {
    fn caption(&self, identity: &BookIdentity, publisher: &str, date: NaiveDate) -> String {
        format!(
            "{}\n\n📖 الكتاب: {identity}\n🏢 الناشر: {publisher}\n📅 تاريخ النشر: {}\n{HASHTAGS}",
            Self::title(identity),
            date.format("%Y-%m-%d"),
        )
    }
}

// Random index from the 122 random bits of a v4 UUID.
fn random_prefix() -> &'static str {
    let index = (uuid::Uuid::new_v4().as_u128() % TITLE_PREFIXES.len() as u128) as usize;
    TITLE_PREFIXES[index]
}
