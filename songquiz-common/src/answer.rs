//! Quiz answer checking
//!
//! Lenient comparison of a player's guess against the correct artist.

use crate::text::normalize;

/// Guesses at or below this many characters must match exactly
const MIN_PARTIAL_GUESS_CHARS: usize = 3;

/// Whether a guess names the correct artist
///
/// Both sides are lowercased, then normalized. The guess is correct if the two
/// are equal, or if the guess is longer than three characters and either one
/// contains the other. A guess that is empty after normalization is always
/// wrong.
///
/// # Example
/// ```
/// use songquiz_common::answer::is_correct_guess;
///
/// assert!(is_correct_guess("the beatles", "The Beatles"));
/// assert!(is_correct_guess("Beatles", "The Beatles"));
/// assert!(!is_correct_guess("The", "The Beatles"));
/// assert!(!is_correct_guess("", "The Beatles"));
/// ```
pub fn is_correct_guess(guess: &str, correct_artist: &str) -> bool {
    let guess = normalize(&guess.to_lowercase());
    if guess.is_empty() {
        return false;
    }
    let correct = normalize(&correct_artist.to_lowercase());

    if guess == correct {
        return true;
    }

    guess.chars().count() > MIN_PARTIAL_GUESS_CHARS
        && (correct.contains(&guess) || guess.contains(&correct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_after_cleaning() {
        assert!(is_correct_guess("AC/DC", "ac dc"));
        assert!(is_correct_guess("Guns N' Roses", "guns n roses"));
        // Lowercasing first lets the contraction table apply to capitalized input
        assert!(is_correct_guess("Don't", "dont"));
    }

    #[test]
    fn test_partial_needs_more_than_three_chars() {
        assert!(!is_correct_guess("ABB", "ABBA"));
        assert!(is_correct_guess("Swift", "Taylor Swift"));
        assert!(is_correct_guess("Taylor Swift feat. Someone", "Taylor Swift"));
    }

    #[test]
    fn test_short_exact_match_still_counts() {
        assert!(is_correct_guess("U2", "U2"));
        assert!(is_correct_guess("Yes", "YES"));
    }

    #[test]
    fn test_empty_or_blank_guess_is_wrong() {
        assert!(!is_correct_guess("", "Queen"));
        assert!(!is_correct_guess("   ", "Queen"));
        assert!(!is_correct_guess("(live)", "Queen"));
        assert!(!is_correct_guess("", ""));
    }

    #[test]
    fn test_wrong_artist() {
        assert!(!is_correct_guess("Metallica", "Megadeth"));
    }
}
