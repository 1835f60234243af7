//! Landing page renderer.
//!
//! Rendered when resolution finds no target. Self-contained HTML: a URL
//! input that navigates to `origin/<input>` and a shortcut link row from
//! configuration.

use axum::response::Html;

use crate::config::schema::HomeConfig;

/// Render the landing page for the given proxy origin.
pub fn render_home(origin: &str, config: &HomeConfig) -> Html<String> {
    let shortcuts = config
        .shortcuts
        .iter()
        .map(|s| {
            format!(
                r#"<a href="{origin}/{url}">{name}</a>"#,
                url = s.url,
                name = escape(&s.name),
            )
        })
        .collect::<String>();

    let background = if config.bg_image.is_empty() {
        "background: #101418;".to_string()
    } else {
        format!(
            "background: #101418 url('{}') no-repeat center center fixed; background-size: cover;",
            config.bg_image
        )
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{page_title}</title>
  <style>
    body {{
      margin: 0; min-height: 100vh;
      display: flex; justify-content: center; align-items: center;
      font-family: -apple-system, sans-serif;
      color: #eee; {background}
    }}
    .card {{
      background: #1a2028; border: 1px solid #2a323c; border-radius: 16px;
      padding: 3rem; width: 90%; max-width: 480px; text-align: center;
    }}
    h1 {{ margin: 0 0 10px; font-weight: 300; letter-spacing: 3px; }}
    p.subtitle {{ font-size: 14px; opacity: 0.7; margin-bottom: 2rem; }}
    input {{
      width: 100%; padding: 14px 18px; border: 1px solid #3a434e;
      border-radius: 50px; background: #0c1014; color: #eee;
      font-size: 16px; outline: none; box-sizing: border-box; text-align: center;
    }}
    button {{
      margin-top: 16px; padding: 12px 32px; border: none; border-radius: 50px;
      background: #6366f1; color: white; font-size: 15px; cursor: pointer;
    }}
    .shortcuts {{ margin-top: 2rem; }}
    .shortcuts a {{
      color: #9aa4b2; text-decoration: none; margin: 0 8px; font-size: 14px;
    }}
    .shortcuts a:hover {{ color: #fff; }}
  </style>
</head>
<body>
  <div class="card">
    <h1>{main_title}</h1>
    <p class="subtitle">{sub_title}</p>
    <form onsubmit="go(); return false;">
      <input id="u" placeholder="{input_placeholder}" autofocus>
      <button type="submit">{button_text}</button>
    </form>
    <div class="shortcuts">{shortcuts}</div>
  </div>
  <script>
    function go() {{
      var v = document.getElementById('u').value.trim();
      if (!v) return;
      if (!/^https?:\/\//.test(v)) v = 'https://' + v;
      location.href = '{origin}/' + v;
    }}
  </script>
</body>
</html>
"#,
        page_title = escape(&config.page_title),
        main_title = escape(&config.main_title),
        sub_title = escape(&config.sub_title),
        input_placeholder = escape(&config.input_placeholder),
        button_text = escape(&config.button_text),
    );

    Html(html)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
