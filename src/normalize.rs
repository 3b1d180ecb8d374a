//! Accent handling for department and municipality names.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Replace the accented Latin vowels (á é í ó ú, upper and lower case) with
/// their plain counterparts. Every other character is left untouched, so the
/// function is idempotent and the identity on ASCII input.
pub fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' => 'U',
            other => other,
        })
        .collect()
}

/// Comparison key for location filters: lowercase, canonically decomposed,
/// combining marks removed. Folds ñ/ü and decomposed accents as well, which
/// `normalize` deliberately does not touch.
pub fn match_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_vowel_accents() {
        assert_eq!(normalize("Bogotá"), "Bogota");
        assert_eq!(normalize("ÁÉÍÓÚ áéíóú"), "AEIOU aeiou");
    }

    #[test]
    fn leaves_other_characters_alone() {
        assert_eq!(normalize("NARIÑO"), "NARIÑO");
        assert_eq!(normalize("Güepsa"), "Güepsa");
        assert_eq!(normalize("San José del Guaviare"), "San Jose del Guaviare");
    }

    #[test]
    fn is_idempotent() {
        for s in ["Bogotá", "Medellín", "QUIBDÓ", "plain ascii", "", "Ñ"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn ascii_is_identity() {
        let s = "Cundinamarca 2019 / IRCA: 12.5";
        assert_eq!(normalize(s), s);
        assert_eq!(normalize(s).len(), s.len());
    }

    #[test]
    fn match_key_folds_tilde_and_case() {
        assert_eq!(match_key("Nariño"), "narino");
        assert_eq!(match_key("NARIÑO"), match_key("narino"));
        // decomposed form: "a" + U+0301
        assert_eq!(match_key("Bogota\u{301}"), "bogota");
    }

    #[test]
    fn match_key_is_stable_under_normalize() {
        for s in ["Bogotá", "Nariño", "Güepsa", "ANTIOQUIA"] {
            assert_eq!(match_key(&normalize(s)), match_key(s));
        }
    }
}
