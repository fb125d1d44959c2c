//! Completion response parsing
//!
//! Bullet lines (`-` or `•`) win; if there are none, every non-blank line is a
//! tip. An empty result means the enrichment did not produce anything usable.

const BULLET_MARKERS: [char; 2] = ['-', '•'];

pub fn parse_recommendations(response: &str) -> Vec<String> {
    let bullets: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(BULLET_MARKERS))
        .map(|tip| tip.trim().to_string())
        .collect();

    if !bullets.is_empty() {
        return bullets;
    }

    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_only() {
        let text = "Here are some tips:\n- Drink water\n  • Rest in shade\nStay safe!";
        assert_eq!(parse_recommendations(text), vec!["Drink water", "Rest in shade"]);
    }

    #[test]
    fn test_no_bullets_uses_non_blank_lines() {
        let text = "1. Drink water\n\n   \n2. Rest often\n";
        assert_eq!(parse_recommendations(text), vec!["1. Drink water", "2. Rest often"]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(parse_recommendations("").is_empty());
        assert!(parse_recommendations("\n  \n\t\n").is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        assert_eq!(parse_recommendations("- One\r\n- Two\r\n"), vec!["One", "Two"]);
    }
}
