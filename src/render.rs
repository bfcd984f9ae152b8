//! HTML rendering of pages and directory listings
//!
//! The wiki ships a small built-in layout rather than a template engine;
//! page bodies go through pulldown-cmark, everything else is assembled
//! here. Static theme assets can restyle it via `/theme/wiki.css`.

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, Options, Parser};

use crate::page::Page;

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Render a full page view: breadcrumbs, content (or edit form), history.
pub fn render_page(page: &Page, edit: bool, show_revisions: bool) -> String {
    let title = page
        .dirs
        .last()
        .map(|d| d.name.as_str())
        .unwrap_or("wiki");

    let mut body = String::new();
    body.push_str(&breadcrumb_nav(page));

    if edit {
        body.push_str(&edit_form(page));
    } else if page.content.is_empty() && page.revisions.is_empty() {
        body.push_str(&format!(
            "<p>This page does not exist yet. <a href=\"{}?edit=1\">Create it</a>.</p>\n",
            page.path
        ));
    } else {
        if !page.is_head() && !page.revision.is_empty() {
            body.push_str(&format!(
                "<p class=\"notice\">Viewing revision {} (read-only). \
                 <a href=\"{}\">Back to latest</a>.</p>\n",
                encode_text(&page.revision),
                page.path
            ));
        }
        body.push_str("<article>\n");
        body.push_str(&markdown_to_html(&page.content));
        body.push_str("</article>\n");
        body.push_str(&page_actions(page));
    }

    if show_revisions {
        body.push_str(&history_list(page));
    }

    layout(title, &body)
}

/// Render a directory index built from a glob listing.
pub fn render_listing(dir: &str, pages: &[Page]) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>Index of {}</h1>\n", encode_text(dir)));
    if pages.is_empty() {
        body.push_str("<p>No pages here yet.</p>\n");
    } else {
        body.push_str("<ul class=\"listing\">\n");
        for page in pages {
            let name = page.dirs.last().map(|d| d.name.as_str()).unwrap_or("");
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                page.path,
                encode_text(name)
            ));
        }
        body.push_str("</ul>\n");
    }
    layout(dir, &body)
}

fn breadcrumb_nav(page: &Page) -> String {
    let mut nav = String::from("<nav class=\"breadcrumbs\"><a href=\"/\">wiki</a>");
    for crumb in &page.dirs {
        nav.push_str(&format!(
            " / <a href=\"/{}\">{}</a>",
            crumb.path,
            encode_text(&crumb.name)
        ));
    }
    nav.push_str("</nav>\n");
    nav
}

fn page_actions(page: &Page) -> String {
    if page.is_head() || page.revision.is_empty() {
        format!(
            "<p class=\"actions\"><a href=\"{0}?edit=1\">Edit</a> \
             <a href=\"{0}?show_revisions=1\">History</a></p>\n",
            page.path
        )
    } else {
        // Historical view: offer revert instead of edit
        format!(
            "<form class=\"actions\" method=\"post\" action=\"{}\">\
             <input type=\"hidden\" name=\"revert\" value=\"{}\">\
             <button type=\"submit\">Revert to this revision</button></form>\n",
            page.path,
            encode_double_quoted_attribute(&page.revision)
        )
    }
}

fn edit_form(page: &Page) -> String {
    format!(
        "<form method=\"post\" action=\"{}\">\n\
         <textarea name=\"content\" rows=\"24\" cols=\"80\">{}</textarea><br>\n\
         <input type=\"text\" name=\"msg\" placeholder=\"Change message\">\n\
         <input type=\"text\" name=\"author\" placeholder=\"Author\">\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n",
        page.path,
        encode_text(&page.content)
    )
}

fn history_list(page: &Page) -> String {
    let mut out = String::from("<section class=\"history\"><h2>History</h2>\n<ul>\n");
    for rev in &page.revisions {
        out.push_str(&format!(
            "<li><a href=\"{}?revision={}\"><code>{}</code></a> {} — {}</li>\n",
            page.path,
            encode_double_quoted_attribute(&rev.hash),
            encode_text(&rev.hash),
            encode_text(&rev.time),
            encode_text(&rev.message)
        ));
    }
    out.push_str("</ul>\n</section>\n");
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"/theme/wiki.css\">\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        body
    )
}
