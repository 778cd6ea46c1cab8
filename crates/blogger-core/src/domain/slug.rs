/// Derive the URL slug of a title.
///
/// Non-ASCII characters are transliterated first (`é` becomes `e`, `ß`
/// becomes `ss`), then the text is lower-cased, every run of characters
/// that are not ASCII letters or digits collapses into a single hyphen and
/// leading and trailing hyphens are dropped. Applying it to its own output
/// returns the output unchanged.
pub fn slugify(title: &str) -> String {
    ::slug::slugify(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_hyphenates() {
        assert_eq!(slugify("My Title"), "my-title");
    }

    #[test]
    fn test_collapses_runs_and_trims_edges() {
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("--rust__and--go--"), "rust-and-go");
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(slugify("Top 10 Tips for 2024"), "top-10-tips-for-2024");
    }

    #[test]
    fn test_transliterates_accented_letters() {
        assert_eq!(slugify("Café"), "cafe");
        assert_eq!(slugify("Über Äpfel"), "uber-apfel");
        assert_eq!(slugify("Café Über alles"), "cafe-uber-alles");
    }

    #[test]
    fn test_accents_do_not_collide_with_truncated_words() {
        assert_ne!(slugify("Café"), slugify("Caf"));
        assert_eq!(slugify("Ärger"), "arger");
    }

    #[test]
    fn test_expanding_letters() {
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn test_is_idempotent() {
        for title in [
            "My Title",
            "a--b",
            "  x y z  ",
            "Already-a-slug",
            "ÄÖÜ 123",
            "Café Über alles",
            "Crème brûlée à la française",
        ] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once, "slugify not idempotent for {title:?}");
        }
    }

    #[test]
    fn test_punctuation_only_gives_empty_slug() {
        assert_eq!(slugify("?!..."), "");
    }
}
