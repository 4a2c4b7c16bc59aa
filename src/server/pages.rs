use percent_encoding::utf8_percent_encode;

use super::delivery::FILENAME_ENCODE_SET;
use crate::downloader::{Platform, QUALITY_LABELS};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta \
         name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title} | \
         mediagrab</title>\n</head>\n<body>\n<main>\n<h1>{title}</h1>\n{body}\n<p><a \
         href=\"/\">Back to start</a></p>\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn index() -> String {
    let items = Platform::ALL
        .iter()
        .map(|platform| {
            format!(
                "<li><a href=\"/{slug}\">{platform}</a></li>\n",
                slug = platform.slug()
            )
        })
        .collect::<String>();
    let body = format!("<p>Pick where your link is from.</p>\n<ul>\n{items}</ul>");

    layout("Media downloader", &body)
}

pub fn platform_form(platform: Platform) -> String {
    let mut body = format!(
        "<form method=\"post\" action=\"/download\">\n<input type=\"hidden\" name=\"platform\" \
         value=\"{slug}\">\n<label>{platform} URL <input type=\"url\" name=\"url\" \
         required></label>\n",
        slug = platform.slug()
    );

    if platform == Platform::Youtube {
        body.push_str(
            "<label>Format <select name=\"format\">\n<option value=\"mp4\">MP4 \
             (video)</option>\n<option value=\"mp3\">MP3 (audio)</option>\n</select></label>\n",
        );

        let options = QUALITY_LABELS
            .iter()
            .map(|label| {
                format!(
                    "<option value=\"{label}\">{label}</option>\n",
                    label = escape_html(label)
                )
            })
            .collect::<String>();
        body.push_str(&format!(
            "<label>Quality <select name=\"quality\">\n{options}</select></label>\n"
        ));
    }

    body.push_str("<button type=\"submit\">Download</button>\n</form>");

    layout(&format!("{platform} download"), &body)
}

pub fn download_success(platform: Platform, names: &[String], skipped: &[String]) -> String {
    let mut body = String::from("<p>Your download is ready.</p>\n<ul>\n");
    for name in names {
        let display = name.rsplit('/').next().unwrap_or(name);
        body.push_str(&format!(
            "<li><a href=\"{href}\" download>{display}</a></li>\n",
            href = download_href(name),
            display = escape_html(display)
        ));
    }
    body.push_str("</ul>");

    if !skipped.is_empty() {
        body.push_str("\n<p>These tracks could not be downloaded:</p>\n<ul>\n");
        for name in skipped {
            body.push_str(&format!("<li>{}</li>\n", escape_html(name)));
        }
        body.push_str("</ul>");
    }

    layout(&format!("{platform} download"), &body)
}

pub fn error_page(message: &str) -> String {
    layout(
        "Download failed",
        &format!("<p class=\"error\">{}</p>", escape_html(message)),
    )
}

/// Link to the delivery route for a `/`-separated relative name.
pub fn download_href(name: &str) -> String {
    name.split('/')
        .fold(String::from("/downloads"), |mut href, segment| {
            href.push('/');
            href.extend(utf8_percent_encode(segment, FILENAME_ENCODE_SET));
            href
        })
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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
