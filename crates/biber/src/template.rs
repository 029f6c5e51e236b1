//! HTML page wrapper around a rendered post body.

use std::fmt::Write;

use biber_renderer::escape_html;

/// All data needed to render a post page.
pub(crate) struct PageData<'a> {
    pub site_title: &'a str,
    /// Absolute URL of the page, when the site domain is known.
    pub canonical: Option<String>,
    pub title: &'a str,
    pub author: &'a str,
    pub date: String,
    pub categories: &'a [String],
    /// Rendered post body.
    pub body: &'a str,
    /// Attachment paths, relative to the page.
    pub attachments: &'a [String],
    /// Script URLs, in load order.
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
}

/// Render a complete post page.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.body.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    let _ = writeln!(
        html,
        "<title>{} - {}</title>",
        escape_html(page.title),
        escape_html(page.site_title)
    );
    if let Some(href) = &page.canonical {
        let _ = writeln!(html, "<link rel=\"canonical\" href=\"{}\">", escape_html(href));
    }
    for href in &page.stylesheets {
        let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape_html(href));
    }
    html.push_str("</head>\n<body>\n<article class=\"post\">\n");

    let _ = writeln!(
        html,
        "<h1 class=\"post-title\">{}</h1>",
        escape_html(page.title)
    );
    let _ = writeln!(
        html,
        "<div class=\"post-meta\"><span class=\"post-author\">{}</span> <time>{}</time></div>",
        escape_html(page.author),
        page.date
    );
    if !page.categories.is_empty() {
        html.push_str("<ul class=\"post-categories\">");
        for category in page.categories {
            let _ = write!(html, "<li>{}</li>", escape_html(category));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<div class=\"post-body\">");
    html.push_str(page.body);
    html.push_str("</div>\n");

    if !page.attachments.is_empty() {
        html.push_str("<ul class=\"post-attachments\">");
        for file in page.attachments {
            let file = escape_html(file);
            let _ = write!(html, "<li><a href=\"{file}\" download>{file}</a></li>");
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</article>\n");
    for src in &page.scripts {
        let _ = writeln!(html, "<script src=\"{}\"></script>", escape_html(src));
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(categories: &'a [String], attachments: &'a [String]) -> PageData<'a> {
        PageData {
            site_title: "Notes",
            canonical: None,
            title: "Fish & <Chips>",
            author: "Ada",
            date: "05.03.2024".to_owned(),
            categories,
            body: "<p>Body</p>",
            attachments,
            scripts: vec!["../../plugin/latex/custom.js".to_owned()],
            stylesheets: vec!["../../plugin/latex/custom.css".to_owned()],
        }
    }

    #[test]
    fn test_render_page_escapes_metadata() {
        let html = render_page(&page(&[], &[]));
        assert!(html.contains("<title>Fish &amp; &lt;Chips&gt; - Notes</title>"));
        assert!(html.contains("<h1 class=\"post-title\">Fish &amp; &lt;Chips&gt;</h1>"));
        assert!(html.contains("<div class=\"post-body\"><p>Body</p></div>"));
    }

    #[test]
    fn test_render_page_assets() {
        let html = render_page(&page(&[], &[]));
        let css = html
            .find("<link rel=\"stylesheet\" href=\"../../plugin/latex/custom.css\">")
            .unwrap();
        let head_end = html.find("</head>").unwrap();
        assert!(css < head_end);
        assert!(html.contains("<script src=\"../../plugin/latex/custom.js\"></script>\n</body>"));
    }

    #[test]
    fn test_render_page_canonical() {
        let mut data = page(&[], &[]);
        assert!(!render_page(&data).contains("canonical"));

        data.canonical = Some("https://notes.example.com/posts/3/".to_owned());
        let html = render_page(&data);
        let link = html
            .find(r#"<link rel="canonical" href="https://notes.example.com/posts/3/">"#)
            .unwrap();
        assert!(link < html.find("</head>").unwrap());
    }

    #[test]
    fn test_render_page_lists() {
        let categories = vec!["RUST".to_owned(), "WEB".to_owned()];
        let attachments = vec!["data.csv".to_owned()];
        let html = render_page(&page(&categories, &attachments));
        assert!(html.contains("<ul class=\"post-categories\"><li>RUST</li><li>WEB</li></ul>"));
        assert!(html.contains("<a href=\"data.csv\" download>data.csv</a>"));
    }

    #[test]
    fn test_render_page_without_lists() {
        let html = render_page(&page(&[], &[]));
        assert!(!html.contains("post-categories"));
        assert!(!html.contains("post-attachments"));
    }
}
