//! URL slugs for listing titles.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid slug regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Folds the Latin-1 letters used in Portuguese text to their ASCII base.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Builds a slug: lowercase, accents stripped, anything other than
/// `[a-z0-9]`, whitespace and `-` dropped, whitespace runs turned into `-`,
/// repeated `-` collapsed and trimmed from both ends.
pub fn generate_slug(title: &str) -> String {
    let folded: String = title.to_lowercase().chars().map(fold_diacritic).collect();
    let cleaned = DISALLOWED.replace_all(folded.trim(), "");
    let dashed = WHITESPACE.replace_all(&cleaned, "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_lowercases() {
        assert_eq!(
            generate_slug("Residencial São João"),
            "residencial-sao-joao"
        );
        assert_eq!(generate_slug("AÇÃO Única"), "acao-unica");
    }

    #[test]
    fn drops_punctuation_and_collapses_separators() {
        assert_eq!(
            generate_slug("  Vila  Mariana -- 2 & 3 dorms! "),
            "vila-mariana-2-3-dorms"
        );
        assert_eq!(generate_slug("---"), "");
    }

    #[test]
    fn canonical_slugs_are_unchanged() {
        assert_eq!(generate_slug("jardins-premium"), "jardins-premium");
    }
}
