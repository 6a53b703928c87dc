//! Avatar initials.

/// Fallback shown when a name has no usable letters.
pub const DEFAULT_INITIALS: &str = "LF";

/// First letter of up to the first two words of `name`, uppercased.
///
/// ```
/// use lakeside_core::initials;
///
/// assert_eq!(initials("ama serwaa boateng"), "AS");
/// assert_eq!(initials("  "), "LF");
/// ```
#[must_use]
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        DEFAULT_INITIALS.to_owned()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word() {
        assert_eq!(initials("kwame"), "K");
    }

    #[test]
    fn test_takes_first_two_words() {
        assert_eq!(initials("Kofi Mensah Jr"), "KM");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(initials("  efua \t  owusu "), "EO");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(initials(""), DEFAULT_INITIALS);
    }
}
