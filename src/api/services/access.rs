//! `/s/{code}/{tail}` access handler
//!
//! Maps a [`Resolution`] onto HTTP: the gate page, a JSON listing, JSON file
//! info, or the upstream body streamed through.

use std::io::Read;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::Bytes;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use super::pages::access_gate_page;
use crate::api::constants::{
    ACCESS_CODE_HEADER, COUNTRY_HEADER, FORWARDED_REQUEST_HEADERS, PASSTHROUGH_RESPONSE_HEADERS,
    STREAM_CHUNK_SIZE,
};
use crate::errors::FilelinkerError;
use crate::services::{Resolution, ResolveRequest, Resolver};
use crate::sources::{FileItem, Headers, HttpClient, UpstreamStream};
use crate::utils::format_file_size;

/// 访问入口共享状态
pub struct AccessState {
    pub resolver: Arc<Resolver>,
    pub http: Arc<dyn HttpClient>,
    /// 为空表示不限制
    pub allowed_regions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccessQuery {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub download: Option<String>,
}

impl AccessQuery {
    fn as_file(&self) -> bool {
        self.kind.as_deref() == Some("file")
    }

    fn download(&self) -> bool {
        matches!(self.download.as_deref(), Some("1") | Some("true"))
    }

    /// Flags the gate form has to send back with the code
    fn carried(&self) -> Vec<(&'static str, &str)> {
        let mut carried = Vec::new();
        if let Some(kind) = self.kind.as_deref() {
            carried.push(("type", kind));
        }
        if let Some(download) = self.download.as_deref() {
            carried.push(("download", download));
        }
        carried
    }
}

#[derive(Serialize)]
struct ListingBody<'a> {
    path: &'a str,
    items: &'a [FileItem],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileInfoBody<'a> {
    name: &'a str,
    size: u64,
    size_text: String,
}

pub struct AccessService;

impl AccessService {
    pub async fn handle_access(
        req: HttpRequest,
        query: web::Query<AccessQuery>,
        state: web::Data<AccessState>,
    ) -> HttpResponse {
        if !Self::region_allowed(&req, &state.allowed_regions) {
            debug!("Request from disallowed region rejected: {}", req.path());
            return HttpResponse::Forbidden()
                .content_type("text/plain; charset=utf-8")
                .body("Access denied in your region");
        }

        let code = req.match_info().get("code").unwrap_or_default().to_string();
        let tail = req.match_info().get("tail").unwrap_or_default().to_string();
        let query = query.into_inner();

        let request = ResolveRequest {
            code,
            sub_path: tail,
            query_access_code: query.code.clone(),
            header_access_code: req
                .headers()
                .get(ACCESS_CODE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            as_file: query.as_file(),
            download: query.download(),
        };
        trace!("Resolving {:?}", request);

        match state.resolver.resolve(&request).await {
            Ok(Resolution::AccessGate { code }) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(access_gate_page(&code, req.path(), &query.carried())),
            Ok(Resolution::Listing { path, items, .. }) => HttpResponse::Ok().json(ListingBody {
                path: &path,
                items: &items,
            }),
            Ok(Resolution::FileInfo { name, size, .. }) => HttpResponse::Ok().json(FileInfoBody {
                name: &name,
                size,
                size_text: format_file_size(size),
            }),
            Ok(Resolution::Download {
                url,
                file_name,
                access_code,
            }) => Self::proxy_download(&req, state.http.as_ref(), &url, &file_name, access_code).await,
            Err(e) => Self::error_response(&e),
        }
    }

    fn region_allowed(req: &HttpRequest, allowed: &[String]) -> bool {
        if allowed.is_empty() {
            return true;
        }
        req.headers()
            .get(COUNTRY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .is_some_and(|country| allowed.iter().any(|a| a.eq_ignore_ascii_case(country)))
    }

    fn error_response(e: &FilelinkerError) -> HttpResponse {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Access failed: {}", e);
        } else {
            debug!("Access rejected: {}", e);
        }
        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(e.message().to_string())
    }

    async fn proxy_download(
        req: &HttpRequest,
        http: &dyn HttpClient,
        url: &str,
        file_name: &str,
        access_code: Option<String>,
    ) -> HttpResponse {
        let mut headers: Headers = Vec::new();
        for &name in FORWARDED_REQUEST_HEADERS {
            if let Some(value) = req.headers().get(name).and_then(|v| v.to_str().ok()) {
                headers.push((name, value.to_string()));
            }
        }
        if let Some(code) = access_code {
            headers.push((ACCESS_CODE_HEADER, code));
        }

        let upstream = match http.open_stream(url, headers).await {
            Ok(upstream) => upstream,
            Err(e) => return Self::error_response(&e),
        };

        let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            warn!("Upstream download {} returned {}", url, status);
        }

        let mut builder = HttpResponse::build(status);
        for &name in PASSTHROUGH_RESPONSE_HEADERS {
            if let Some(value) = upstream.header(name) {
                builder.insert_header((name, value.to_string()));
            }
        }
        // 已编码或原样的字节都不再压缩
        if upstream.header("content-encoding").is_none() {
            builder.insert_header(("content-encoding", "identity"));
        }
        let disposition = upstream
            .header("content-disposition")
            .map(String::from)
            .unwrap_or_else(|| content_disposition(file_name));
        builder.insert_header(("content-disposition", disposition));

        if let Some(len) = upstream
            .header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            builder.no_chunking(len);
        }

        builder.streaming(body_stream(upstream))
    }
}

fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

/// 在阻塞线程池里按块读取上游 body
fn body_stream(upstream: UpstreamStream) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    futures_util::stream::unfold(Some(upstream.body), |state| async move {
        let Some(mut reader) = state else {
            return None;
        };
        let read = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            let result = reader.read(&mut buf).map(|n| {
                buf.truncate(n);
                Bytes::from(buf)
            });
            (reader, result)
        })
        .await;

        match read {
            Ok((_, Ok(chunk))) if chunk.is_empty() => None,
            Ok((reader, Ok(chunk))) => Some((Ok(chunk), Some(reader))),
            Ok((_, Err(e))) => {
                warn!("Upstream body read failed: {}", e);
                Some((Err(e), None))
            }
            Err(e) => Some((Err(std::io::Error::other(e)), None)),
        }
    })
}

pub fn access_routes() -> actix_web::Scope {
    web::scope("/s")
        .route("/{code}", web::get().to(AccessService::handle_access))
        .route("/{code}", web::head().to(AccessService::handle_access))
        .route("/{code}/{tail:.*}", web::get().to(AccessService::handle_access))
        .route("/{code}/{tail:.*}", web::head().to(AccessService::handle_access))
}
