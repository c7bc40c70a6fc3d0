/// Number of words in `text`: runs of non-whitespace separated by runs of
/// whitespace. Empty or whitespace-only text has zero words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
