/// Maximum length of a draw number after normalization.
pub const DRAW_NUMBER_MAX_LEN: usize = 4;

/// Normalize a raw draw-number input: keep digits only, truncate to four
/// characters. An empty result means "no usable number" and excludes the
/// student from every draw-number index.
pub fn normalize_draw_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(DRAW_NUMBER_MAX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_digits() {
        assert_eq!(normalize_draw_number("12-34"), "1234");
        assert_eq!(normalize_draw_number(" 0 0 7 "), "007");
    }

    #[test]
    fn empty_when_no_digits() {
        assert_eq!(normalize_draw_number("ab"), "");
        assert_eq!(normalize_draw_number(""), "");
    }

    #[test]
    fn truncates_to_four() {
        assert_eq!(normalize_draw_number("123456"), "1234");
        assert_eq!(normalize_draw_number("9-8-7-6-5"), "9876");
    }

    #[test]
    fn keeps_leading_zeros() {
        assert_eq!(normalize_draw_number("007"), "007");
    }
}
