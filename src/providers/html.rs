//! Directions providers return step instructions as HTML fragments
//! (`Turn <b>left</b> onto <b>Elm St</b>`). The shade heuristic works on plain text.

pub fn strip_html(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;

    for ch in fragment.chars() {
        match ch {
            '<' => {
                in_tag = true;
                // block-level tags separate words
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_html("Turn <b>left</b> onto <b>Elm St</b>"), "Turn left onto Elm St");
    }

    #[test]
    fn test_nested_div_separates_words() {
        let html = "Head <b>north</b><div style=\"font-size:0.9em\">Walk through Hyde Park</div>";
        assert_eq!(strip_html(html), "Head north Walk through Hyde Park");
    }

    #[test]
    fn test_entities() {
        assert_eq!(strip_html("Cross&nbsp;Main &amp; 5th"), "Cross Main & 5th");
    }
}
