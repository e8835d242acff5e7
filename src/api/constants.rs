//! API 模块常量定义

/// 访问码请求头
pub const ACCESS_CODE_HEADER: &str = "X-Access-Code";

/// Cloudflare 注入的国家/地区代码
pub const COUNTRY_HEADER: &str = "cf-ipcountry";

/// 转发给上游的请求头
pub const FORWARDED_REQUEST_HEADERS: &[&str] = &["Range", "Accept", "Accept-Encoding"];

/// 从上游透传给客户端的响应头
pub const PASSTHROUGH_RESPONSE_HEADERS: &[&str] = &[
    "content-type",
    "content-range",
    "accept-ranges",
    "etag",
    "last-modified",
    "content-encoding",
];

/// 下载流每次读取的块大小
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;
