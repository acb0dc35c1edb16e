//! Scene lexicon: static keyword → concept-tag dictionary
//!
//! Hints are pure substring hits against the dictionary keys, in
//! dictionary order. They only enrich prompts; they never filter results.

/// Keyword and its concept tags
pub type LexiconEntry = (&'static str, &'static [&'static str]);

pub const SCENE_LEXICON: &[LexiconEntry] = &[
    // Time of day
    ("深夜", &["ambient", "dark", "night", "slow", "calm", "quiet"]),
    ("晚上", &["ambient", "dark", "night", "slow", "calm"]),
    ("夜晚", &["ambient", "dark", "night", "slow", "calm"]),
    ("凌晨", &["ambient", "dark", "quiet", "meditation"]),
    // Activity
    ("工作", &["ambient", "focus", "concentration", "background", "downtempo"]),
    ("学习", &["ambient", "focus", "concentration", "background", "classical"]),
    ("运动", &["electronic", "dance", "upbeat", "fast", "energetic", "workout"]),
    ("跑步", &["electronic", "dance", "upbeat", "fast", "energetic"]),
    ("健身", &["electronic", "dance", "upbeat", "fast", "energetic", "workout"]),
    ("瑜伽", &["ambient", "meditation", "calm", "spiritual", "new age"]),
    ("冥想", &["ambient", "meditation", "calm", "spiritual", "new age"]),
    ("阅读", &["ambient", "classical", "calm", "background", "instrumental"]),
    ("开车", &["electronic", "rock", "upbeat", "driving", "road"]),
    ("通勤", &["pop", "upbeat", "electronic", "indie"]),
    // Mood
    ("放松", &["ambient", "chill", "calm", "lounge", "downtempo"]),
    ("专注", &["ambient", "focus", "minimal", "background", "instrumental"]),
    ("兴奋", &["electronic", "dance", "rock", "upbeat", "energetic"]),
    ("悲伤", &["blues", "sad", "melancholic", "ambient", "folk"]),
    ("开心", &["pop", "upbeat", "happy", "dance", "funk"]),
    ("平静", &["ambient", "calm", "peaceful", "new age", "meditation"]),
    // Surroundings
    ("雨", &["ambient", "rain", "nature", "atmospheric"]),
    ("雨天", &["ambient", "rain", "nature", "atmospheric", "melancholic"]),
    ("咖啡", &["jazz", "lounge", "chill", "ambient", "bossa nova"]),
    ("咖啡馆", &["jazz", "lounge", "chill", "ambient", "bossa nova"]),
    // English phrases
    ("late night", &["ambient", "dark", "night", "slow", "calm"]),
    ("rainy", &["ambient", "rain", "nature", "atmospheric", "melancholic"]),
    ("workout", &["electronic", "dance", "upbeat", "fast", "energetic"]),
    ("coffee shop", &["jazz", "lounge", "chill", "bossa nova"]),
    ("road trip", &["rock", "upbeat", "driving", "road"]),
    ("study", &["ambient", "focus", "concentration", "background"]),
    ("meditation", &["ambient", "meditation", "calm", "spiritual", "new age"]),
];

/// Every dictionary key contained in `text`, in dictionary order
pub fn extract_hints(text: &str) -> Vec<&'static str> {
    SCENE_LEXICON
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(keyword, _)| *keyword)
        .collect()
}

/// Concept tags for a dictionary key; empty for unknown keys
pub fn concepts_for(keyword: &str) -> &'static [&'static str] {
    SCENE_LEXICON
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, tags)| *tags)
        .unwrap_or(&[])
}

/// `keyword (tag, tag)` rendering used in prompts
pub fn describe_hints(hints: &[&str]) -> String {
    hints
        .iter()
        .map(|hint| format!("{} ({})", hint, concepts_for(hint).join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
