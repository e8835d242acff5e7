pub mod path;
pub mod time_parser;

pub use time_parser::TimeParser;

/// 格式化文件大小
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// 从 URL 中提取文件名
///
/// 优先级：`filename` 参数 > `name` 参数 > 路径最后一段
pub fn extract_filename(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let from_query = parsed
                .query_pairs()
                .find(|(k, v)| k == "filename" && !v.is_empty())
                .or_else(|| {
                    parsed
                        .query_pairs()
                        .find(|(k, v)| k == "name" && !v.is_empty())
                })
                .map(|(_, v)| v.into_owned());

            from_query
                .or_else(|| {
                    parsed
                        .path_segments()
                        .and_then(|mut segments| segments.next_back())
                        .filter(|s| !s.is_empty())
                        .map(|s| {
                            urlencoding::decode(s)
                                .map(|d| d.into_owned())
                                .unwrap_or_else(|_| s.to_string())
                        })
                })
                .unwrap_or_else(|| "unknown".to_string())
        }
        Err(_) => raw
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string(),
    }
}

/// 判断是否为可直接访问的绝对 URL（http/https）
pub fn is_absolute_url(raw: &str) -> bool {
    url::Url::parse(raw.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Percent-encode each segment of a path, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
