//! Text normalization and deterministic identifiers
//!
//! Every identifier in the record model is derived from row content, so
//! ingesting the same file twice yields the same ids.

use sha2::{Digest, Sha256};

/// Hex characters kept from a SHA-256 digest
const HASH_LEN: usize = 16;

/// Collapse whitespace runs and strip stray BOMs, preserving case
pub fn clean_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-folded, whitespace-collapsed form used for identity comparisons
pub fn normalize_text(text: &str) -> String {
    clean_text(text).to_lowercase()
}

/// URL-safe slug: ASCII alphanumerics kept, everything else collapses to `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "x".to_string()
    } else {
        slug
    }
}

/// Person-name key: `Last, First` is reordered to `First Last` before
/// normalization so both spellings compare equal.
pub fn person_name_key(name: &str) -> String {
    match name.split_once(',') {
        Some((last, first)) if !last.trim().is_empty() && !first.trim().is_empty() => {
            normalize_text(&format!("{} {}", first.trim(), last.trim()))
        }
        _ => normalize_text(name),
    }
}

fn short_hash(prefix: char, key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut id = String::with_capacity(HASH_LEN + 1);
    id.push(prefix);
    id.push_str(&hex::encode(digest)[..HASH_LEN]);
    id
}

/// Paper identity: DOI when present, else EID, else the normalized title
pub fn paper_id(doi: &str, eid: Option<&str>, title: &str) -> String {
    let doi = normalize_text(doi);
    let key = if !doi.is_empty() {
        format!("doi:{}", doi)
    } else if let Some(eid) = eid.map(normalize_text).filter(|e| !e.is_empty()) {
        format!("eid:{}", eid)
    } else {
        format!("title:{}", normalize_text(title))
    };
    short_hash('p', &key)
}

/// Author identity: the source author id when present, else a hash of the
/// normalized name, affiliation and country.
pub fn author_id(source_id: Option<&str>, name: &str, affiliation: &str, country_id: &str) -> String {
    match source_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => slugify(id),
        None => short_hash(
            'a',
            &format!(
                "{}\u{1f}{}\u{1f}{}",
                person_name_key(name),
                normalize_text(affiliation),
                country_id
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Asia Pacific\n\tUniversity  "), "Asia Pacific University");
        assert_eq!(clean_text("\u{FEFF}Title"), "Title");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("United Kingdom"), "united-kingdom");
        assert_eq!(slugify("  Asia Pacific University (APU) "), "asia-pacific-university-apu");
        assert_eq!(slugify("Université de Montréal"), "universit-de-montr-al");
        assert_eq!(slugify("!!!"), "x");
    }

    #[test]
    fn test_person_name_key_reorders_last_first() {
        assert_eq!(person_name_key("Maghami, Mohammad Reza"), "mohammad reza maghami");
        assert_eq!(person_name_key("Mohammad  Reza Maghami"), "mohammad reza maghami");
    }

    #[test]
    fn test_paper_id_prefers_doi() {
        let a = paper_id("10.1016/J.ENBUILD.2025.1", None, "Net zero energy buildings");
        let b = paper_id("10.1016/j.enbuild.2025.1", Some("2-s2.0-1"), "Different title");
        assert_eq!(a, b);
        assert!(a.starts_with('p'));
        assert_eq!(a.len(), HASH_LEN + 1);
    }

    #[test]
    fn test_paper_id_falls_back_to_title() {
        let a = paper_id("", None, "Net zero  energy buildings");
        let b = paper_id("", None, "net zero energy buildings");
        assert_eq!(a, b);
        assert_ne!(a, paper_id("", Some("2-s2.0-85"), "net zero energy buildings"));
    }

    #[test]
    fn test_author_id_uses_source_id() {
        assert_eq!(author_id(Some(" 57193456789 "), "Anyone", "APU", "malaysia"), "57193456789");
    }

    #[test]
    fn test_author_id_hash_depends_on_affiliation() {
        let a = author_id(None, "Ka Fei Thang", "APU", "malaysia");
        let b = author_id(None, "Thang, Ka Fei", "apu", "malaysia");
        let c = author_id(None, "Ka Fei Thang", "UM", "malaysia");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
