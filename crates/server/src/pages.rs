//! Server-rendered pages. Every interpolated value goes through
//! [`escape_html`] first.

use shared::{domain::Filename, protocol};

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn flash_block(flash: Option<&str>) -> String {
    match flash {
        Some(message) => format!(
            r#"<p class="flash">{}</p>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

pub fn index_page(flash: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Image Upload</title></head>
<body>
<h1>Upload an Image</h1>
{flash}
<form action="{upload}" method="post" enctype="multipart/form-data">
  <input type="file" name="{field}" accept="image/*">
  <button type="submit">Upload</button>
</form>
</body>
</html>
"#,
        flash = flash_block(flash),
        upload = protocol::upload_route(),
        field = protocol::FILE_FIELD,
    )
}

/// The view page carries the element ids and the `data-filename` attribute
/// that interactive clients bind to.
pub fn view_page(filename: &Filename, flash: Option<&str>) -> String {
    let name = escape_html(filename.as_str());
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>View Image</title></head>
<body data-filename="{name}">
<h1>{name}</h1>
{flash}
<img src="{src}" alt="Uploaded image" class="uploaded-image">
<div>
  <button id="grayscaleBtn" type="button">Convert to Grayscale</button>
  <span id="loading" hidden>Processing...</span>
</div>
<div id="processedImageContainer"></div>
<p><a href="{index}">Upload another image</a></p>
</body>
</html>
"#,
        flash = flash_block(flash),
        src = protocol::uploads_route_for(filename),
        index = protocol::index_route(),
    )
}
