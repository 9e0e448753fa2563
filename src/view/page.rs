//! Page markup for the health display.
//!
//! The page goes out in two parts. The opening is the whole document with the
//! pending sentinel, minus the closing `</body></html>`. The closing part is
//! sent once the view settles and swaps the sentinel for the settled text.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::view::state::{HealthDisplay, HealthOutcome};

/// `id` of the element holding the health text.
pub const HEALTH_ELEMENT_ID: &str = "api-health";

const PAGE_STYLE: &str =
    "padding: 24px; font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif";

const BODY_CLOSE: &str = "</body></html>";

/// Static parts of the page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    pub api_hint_path: String,
    /// Backend origin the dev server forwards to, as shown in the hint.
    pub backend_origin: String,
}

/// Render the full HTML document for `display`.
pub fn render_page(display: &HealthDisplay, ctx: &PageContext) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (ctx.title) }
            }
            body {
                div style=(PAGE_STYLE) {
                    h1 { (ctx.title) }
                    p {
                        "API health: "
                        strong id=(HEALTH_ELEMENT_ID) { (display.as_str()) }
                    }
                    p {
                        "Try calling any API under "
                        code { (ctx.api_hint_path) }
                        "; the dev server proxies to "
                        code { (ctx.backend_origin.trim_end_matches('/')) }
                        "."
                    }
                }
            }
        }
    }
}

/// The pending page, left open after the content so a closing part can follow.
pub fn render_opening(ctx: &PageContext) -> String {
    let page = render_page(&HealthDisplay::Pending, ctx).into_string();
    match page.strip_suffix(BODY_CLOSE) {
        Some(opening) => opening.to_string(),
        None => page,
    }
}

/// Script that shows `outcome` in place of the sentinel, then the document close.
pub fn render_closing(outcome: &HealthOutcome) -> String {
    // JSON string literal; `<` is escaped so the text cannot end the script.
    let text = serde_json::Value::from(outcome.as_str())
        .to_string()
        .replace('<', "\\u003c");
    let script = format!("document.getElementById(\"{HEALTH_ELEMENT_ID}\").textContent = {text};");

    let markup = html! {
        script { (PreEscaped(script)) }
    };
    format!("{}{}", markup.into_string(), BODY_CLOSE)
}
