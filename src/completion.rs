//! Prefix-based tab completion against a fixed command vocabulary.

/// Compute the extension to append to `partial`.
///
/// The result is the longest string shared by every vocabulary entry that
/// starts with `partial`, after that prefix is removed. No match, or matches
/// that diverge immediately, yield an empty string.
pub fn complete<'v, S: AsRef<str>>(partial: &str, vocabulary: &'v [S]) -> &'v str {
    let mut suffixes = vocabulary
        .iter()
        .filter_map(|cmd| cmd.as_ref().strip_prefix(partial));

    let Some(first) = suffixes.next() else {
        return "";
    };

    let mut common = first.len();
    for suffix in suffixes {
        common = first
            .bytes()
            .zip(suffix.bytes())
            .take(common)
            .take_while(|(a, b)| a == b)
            .count();
        if common == 0 {
            return "";
        }
    }

    // A multi-byte character shared only in part is not a common prefix.
    while !first.is_char_boundary(common) {
        common -= 1;
    }

    &first[..common]
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMANDS: [&str; 4] = ["help", "cpu_reset", "cpu_resume", "cpu_pause"];

    /// Brute-force reference: the longest candidate extension that every match shares.
    fn reference(partial: &str, vocabulary: &[&str]) -> String {
        let matches: Vec<&str> = vocabulary
            .iter()
            .filter_map(|c| c.strip_prefix(partial))
            .collect();
        let Some(first) = matches.first() else {
            return String::new();
        };
        let mut best = String::new();
        for (end, _) in first.char_indices().skip(1).chain([(first.len(), ' ')]) {
            let candidate = &first[..end];
            if matches.iter().all(|m| m.starts_with(candidate)) {
                best = candidate.to_string();
            } else {
                break;
            }
        }
        best
    }

    #[test]
    fn test_complete_unique_match() {
        assert_eq!(complete("he", &COMMANDS), "lp");
        assert_eq!(complete("cpu_p", &COMMANDS), "ause");
    }

    #[test]
    fn test_complete_shared_prefix() {
        assert_eq!(complete("cpu_re", &COMMANDS), "s");
        assert_eq!(complete("cpu_re", &COMMANDS), reference("cpu_re", &COMMANDS));
        assert_eq!(complete("c", &COMMANDS), "pu_");
    }

    #[test]
    fn test_complete_no_match() {
        assert_eq!(complete("reboot", &COMMANDS), "");
        assert_eq!(complete("x", &[] as &[&str]), "");
    }

    #[test]
    fn test_complete_divergent_or_exact() {
        assert_eq!(complete("", &COMMANDS), "");
        assert_eq!(complete("help", &COMMANDS), "");
        assert_eq!(complete("cpu_res", &COMMANDS), "");
    }

    #[test]
    fn test_complete_owned_vocabulary() {
        let vocabulary = vec![String::from("status"), String::from("stop")];
        assert_eq!(complete("s", &vocabulary), "t");
    }

    #[test]
    fn test_complete_respects_char_boundaries() {
        // 'é' (C3 A9) and 'è' (C3 A8) share their first byte only
        assert_eq!(complete("caf", &["café", "cafè"]), "");
    }

    #[test]
    fn test_complete_matches_reference() {
        let vocabulary = ["go", "goto", "gopher", "halt", "hal9000", "help", "he"];
        for partial in ["", "g", "go", "got", "h", "ha", "he", "hel", "z"] {
            let s = complete(partial, &vocabulary);
            assert_eq!(s, reference(partial, &vocabulary), "partial {partial:?}");

            let extended = format!("{partial}{s}");
            for cmd in vocabulary.iter().filter(|c| c.starts_with(partial)) {
                assert!(cmd.starts_with(&extended), "{cmd} vs {extended}");
            }
        }
    }
}
