//! Landing page HTML.

use super::routes::{GRAPH_FORM_FIELD, RAW_PATH, UPLOAD_PATH};

/// Render the landing page; `base_url` appears in the curl example
pub fn index_page(base_url: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><title>modgraphviz Web Interface</title></head>
<body>
<h1>modgraphviz Web Interface</h1>
<p>Runs <a href="https://godoc.org/golang.org/x/exp/cmd/modgraphviz">modgraphviz</a> on the web and produces an SVG. Paste the contents of <code>go mod graph</code> below, then either save the resulting SVG or share the link.</p>

<p>Single line: <code>go mod graph | curl --data-binary '@-' {base_url}{raw_path}</code></p>

<form method="post" action="{upload_path}" enctype="multipart/form-data">
<textarea rows="40" cols="120" name="{field}">
</textarea>

<p><input type="submit" value="Upload"></p>
</form>
</body>
</html>
"#,
        base_url = escape_html(base_url),
        raw_path = RAW_PATH,
        upload_path = UPLOAD_PATH,
        field = GRAPH_FORM_FIELD,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_links() {
        let page = index_page("http://localhost:8080");

        assert!(page.contains(r#"action="/upload""#));
        assert!(page.contains(r#"name="graph""#));
        assert!(page.contains("http://localhost:8080/raw"));
    }

    #[test]
    fn test_base_url_is_escaped() {
        let page = index_page("http://<script>");
        assert!(page.contains("http://&lt;script&gt;/raw"));
        assert!(!page.contains("<script>"));
    }
}
