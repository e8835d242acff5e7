//! 最小 HTML 页面

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// 访问码输入页，表单以 `?code=` 提交回同一地址
///
/// `carried` query pairs (`type`, `download`) ride along as hidden inputs so
/// the retried request lands on the same branch.
pub fn access_gate_page(short_code: &str, request_path: &str, carried: &[(&str, &str)]) -> String {
    let hidden: String = carried
        .iter()
        .map(|(name, value)| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                escape_html(name),
                escape_html(value)
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Access code required</title>
</head>
<body>
<h1>Access code required</h1>
<p>Link <code>{code}</code> is protected.</p>
<form method="get" action="{action}">
{hidden}<input type="password" name="code" placeholder="Access code" autofocus required>
<button type="submit">Open</button>
</form>
</body>
</html>
"#,
        code = escape_html(short_code),
        action = escape_html(request_path),
        hidden = hidden,
    )
}
