//! Formatting of the stored genre string.

use std::collections::BTreeSet;

/// How a list of genres is written into a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreFormat {
    pub separator: String,
    pub title_case: bool,
}

impl Default for GenreFormat {
    fn default() -> Self {
        GenreFormat {
            separator: ";".to_string(),
            title_case: false,
        }
    }
}

/// Build the new genre string for an album.
///
/// * With selected genres, they are merged with the genres already on the
///   album (unless `replace`), de-duplicated, sorted and joined.
/// * Without selected genres, `fallback` is used, but only when not replacing.
///   `None` means the album must be left alone.
///
/// The result is title-cased or lower-cased according to `format`.
pub fn compose_genre_string(
    selected: &[String],
    existing: Option<&str>,
    replace: bool,
    fallback: Option<&str>,
    format: &GenreFormat,
) -> Option<String> {
    let joined = if selected.is_empty() {
        if replace {
            return None;
        }
        fallback?.to_string()
    } else {
        let mut genres: BTreeSet<String> = selected.iter().map(|g| g.to_lowercase()).collect();
        if !replace {
            if let Some(existing) = existing {
                genres.extend(split_genres(existing, &format.separator));
            }
        }
        genres.into_iter().collect::<Vec<_>>().join(&format.separator)
    };

    Some(apply_case(&joined, format.title_case))
}

/// Split a stored genre string into lowercase genre names.
pub fn split_genres(genre: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return std::iter::once(genre.to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
    }
    genre
        .to_lowercase()
        .split(&separator.to_lowercase())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn apply_case(genre: &str, title_case: bool) -> String {
    if title_case {
        self::title_case(genre)
    } else {
        genre.to_lowercase()
    }
}

/// Upper-case the first letter of every word and lower-case the rest.  Any
/// non-letter starts a new word, so `"r&b;hip hop"` becomes `"R&B;Hip Hop"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fmt(separator: &str, title_case: bool) -> GenreFormat {
        GenreFormat {
            separator: separator.to_string(),
            title_case,
        }
    }

    #[test]
    fn test_merge_with_existing() {
        let out = compose_genre_string(&names(&["pop"]), Some("rock;metal"), false, None, &fmt(";", false));
        assert_eq!(out.as_deref(), Some("metal;pop;rock"));
    }

    #[test]
    fn test_merge_is_case_insensitive() {
        let out = compose_genre_string(&names(&["Rock", "pop"]), Some("ROCK;Jazz"), false, None, &fmt(";", false));
        assert_eq!(out.as_deref(), Some("jazz;pop;rock"));
    }

    #[test]
    fn test_replace_ignores_existing() {
        let out = compose_genre_string(&names(&["pop"]), Some("rock;metal"), true, None, &fmt(";", false));
        assert_eq!(out.as_deref(), Some("pop"));
    }

    #[test]
    fn test_fallback_when_nothing_selected() {
        let out = compose_genre_string(&[], Some("rock"), false, Some("unknown"), &fmt(";", false));
        assert_eq!(out.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_no_update_when_replacing_without_selection() {
        assert_eq!(compose_genre_string(&[], None, true, Some("unknown"), &fmt(";", false)), None);
    }

    #[test]
    fn test_no_update_without_fallback() {
        assert_eq!(compose_genre_string(&[], Some("rock"), false, None, &fmt(";", false)), None);
    }

    #[test]
    fn test_title_case_output() {
        let out = compose_genre_string(&names(&["rock", "pop"]), None, false, None, &fmt(";", true));
        assert_eq!(out.as_deref(), Some("Pop;Rock"));
        assert_eq!(apply_case("rock;pop", true), "Rock;Pop");
        assert_eq!(apply_case("Rock;Pop", false), "rock;pop");
    }

    #[test]
    fn test_title_case_words() {
        assert_eq!(title_case("r&b;hip hop"), "R&B;Hip Hop");
        assert_eq!(title_case("POST-ROCK"), "Post-Rock");
        assert_eq!(title_case("drum and bass"), "Drum And Bass");
    }

    #[test]
    fn test_custom_separator() {
        let out = compose_genre_string(&names(&["pop"]), Some("Rock, Metal"), false, None, &fmt(", ", false));
        assert_eq!(out.as_deref(), Some("metal, pop, rock"));
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert_eq!(split_genres("rock;;Pop;", ";"), names(&["rock", "pop"]));
        assert!(split_genres("", ";").is_empty());
    }
}
