use std::path::Path;

use tokio::fs::OpenOptions;
use tokio_util::io::ReaderStream;
use axum::http::StatusCode;
use axum::body::Body;
use axum::response::Response;

use crate::net;
use crate::net::error;

pub async fn stream_file<P>(path: P) -> error::Result<Response<Body>>
where
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let mime = net::mime::mime_from_ext(path_ref.extension());

    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .await?;
    let metadata = file.metadata().await?;

    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", mime.to_string())
        .header("content-length", metadata.len())
        .body(Body::from_stream(stream))?)
}

/// streams a stored blob back with the name the client uploaded it under and
/// the mime type recorded at upload time
pub async fn attachment_file<N, P>(
    name: N,
    mime: &mime::Mime,
    path: P
) -> error::Result<Response<Body>>
where
    N: AsRef<str>,
    P: AsRef<Path>,
{
    let name_ref = name.as_ref();

    // quotes and control characters in the user supplied name would corrupt
    // the header
    let sanitized: String = name_ref.chars()
        .map(|ch| if ch == '"' || ch.is_control() { '_' } else { ch })
        .collect();

    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .await?;
    let metadata = file.metadata().await?;

    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", mime.to_string())
        .header("content-length", metadata.len())
        .header(
            "content-disposition",
            format!("attachment; filename=\"{}\"", sanitized)
        )
        .body(Body::from_stream(stream))?)
}
