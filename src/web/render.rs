//! HTML rendering for the search page.

use std::collections::BTreeSet;

const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// What to show below the search form
pub enum PageContent<'a> {
    /// Fresh form, nothing submitted yet
    Empty,
    /// The submission was rejected
    Error(&'a str),
    /// Plants matching the submitted query
    Results(&'a BTreeSet<String>),
}

/// Escape text for interpolation into HTML element content or attribute values
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the search page, echoing the submitted fields back into the form
#[must_use]
pub fn render_index(disease: &str, region: &str, content: &PageContent<'_>) -> String {
    let results = match content {
        PageContent::Empty => String::new(),
        PageContent::Error(message) => {
            format!("<p class=\"error\">{}</p>", escape_html(message))
        }
        PageContent::Results(plants) if plants.is_empty() => {
            "<h2>Results</h2>\n    <p class=\"empty\">No matching plants found.</p>".to_string()
        }
        PageContent::Results(plants) => {
            let items: String = plants
                .iter()
                .map(|plant| format!("\n        <li>{}</li>", escape_html(plant)))
                .collect();
            format!("<h2>Results</h2>\n    <ul class=\"plants\">{items}\n    </ul>")
        }
    };

    fill_template(INDEX_TEMPLATE, |name| match name {
        "disease" => Some(escape_html(disease)),
        "region" => Some(escape_html(region)),
        "results" => Some(results.clone()),
        _ => None,
    })
}

/// Substitute `{{name}}` placeholders in a single pass, so substituted text is never rescanned.
/// Unknown placeholders are left as they are.
fn fill_template(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match value(name) {
                    Some(text) => out.push_str(&text),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Goat's Rue"), "Goat&#39;s Rue");
    }

    #[test]
    fn test_render_empty_form() {
        let page = render_index("", "", &PageContent::Empty);
        assert!(page.contains("name=\"disease\""));
        assert!(page.contains("name=\"region\""));
        assert!(!page.contains("Results"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_results() {
        let plants: BTreeSet<String> = ["Willow".to_string(), "Meadowsweet".to_string()].into();
        let page = render_index("M79", "Europe", &PageContent::Results(&plants));
        assert!(page.contains("<li>Meadowsweet</li>"));
        assert!(page.contains("<li>Willow</li>"));
        assert!(page.contains("value=\"M79\""));
    }

    #[test]
    fn test_render_no_results() {
        let plants = BTreeSet::new();
        let page = render_index("Z99", "Europe", &PageContent::Results(&plants));
        assert!(page.contains("No matching plants found."));
    }

    #[test]
    fn test_render_escapes_input() {
        let page = render_index(
            "\"><script>",
            "{{results}}",
            &PageContent::Error("bad <input>"),
        );
        assert!(!page.contains("<script>"));
        assert!(page.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(page.contains("bad &lt;input&gt;"));
        assert!(page.contains("value=\"{{results}}\""));
    }

    #[test]
    fn test_fill_template() {
        let filled = fill_template("a {{x}} b {{y}} {{unclosed", |name| {
            (name == "x").then(|| "{{y}}".to_string())
        });
        assert_eq!(filled, "a {{y}} b {{y}} {{unclosed");
    }
}
