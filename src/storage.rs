use std::path::{Path, PathBuf};

use futures::TryStreamExt;
use mime::Mime;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use taxsetu_lib::ids;
use taxsetu_lib::documents::{self, MAX_DOCUMENT_SIZE};

use crate::net::error::{Error as NetError, DocumentKind};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("document exceeds the maximum allowed size")]
    MaxSize,

    #[error(transparent)]
    Axum(#[from] axum::Error),

    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for NetError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MaxSize => NetError::api(DocumentKind::MaxSize),
            StorageError::Axum(err) => NetError::new()
                .context("failed reading upload stream")
                .source(err),
            StorageError::Multipart(err) => NetError::new()
                .context("failed reading multipart upload stream")
                .source(err),
            StorageError::Io(err) => NetError::new()
                .context("failed writing upload to storage")
                .source(err),
        }
    }
}

/// blobs are namespaced per owning user under the documents data directory
pub fn user_dir(documents: &Path, user_id: &ids::UserId) -> PathBuf {
    documents.join(user_id.to_string())
}

pub async fn ensure_user_dir(
    documents: &Path,
    user_id: &ids::UserId
) -> Result<PathBuf, std::io::Error> {
    let dir = user_dir(documents, user_id);

    tokio::fs::create_dir_all(&dir).await?;

    Ok(dir)
}

/// server side file name. a fresh nanoid with a mime derived extension,
/// never anything the client sent
pub fn gen_stored_name(mime: &Mime) -> String {
    format!("{}.{}", nanoid::nanoid!(), documents::extension_for(mime))
}

pub fn tmp_path(dir: &Path, stored_name: &str) -> PathBuf {
    dir.join(format!("{stored_name}.tmp"))
}

/// drains the upload stream into the given file, enforcing the size cap as
/// bytes arrive. the caller owns cleanup of the file on error
pub async fn write_stream<S, E>(file: File, mut stream: S) -> Result<u64, StorageError>
where
    S: futures::Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    StorageError: From<E>,
{
    let mut writer = BufWriter::new(file);
    let mut written: u64 = 0;

    while let Some(chunk) = stream.try_next().await? {
        written += chunk.len() as u64;

        if written > MAX_DOCUMENT_SIZE {
            return Err(StorageError::MaxSize);
        }

        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;

    Ok(written)
}

/// best effort removal of a blob that lost its metadata row. failure is
/// logged, not surfaced, the request outcome is already decided
pub async fn remove_orphan(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::error!(
            "failed removing orphaned blob \"{}\": {err}",
            path.display()
        );
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn stored_name_is_not_user_derived() {
        let mime = Mime::from_str("application/pdf").unwrap();

        let first = gen_stored_name(&mime);
        let second = gen_stored_name(&mime);

        assert_ne!(first, second);
        assert!(first.ends_with(".pdf"));
        assert!(!first.contains('/'));
        assert!(!first.contains(".."));
    }

    #[test]
    fn user_namespacing() {
        let dir = user_dir(Path::new("/data/documents"), &42);

        assert_eq!(dir, PathBuf::from("/data/documents/42"));
    }

    #[tokio::test]
    async fn size_cap_enforced_mid_stream() {
        let tmp = std::env::temp_dir().join(format!("upload-cap-{}", nanoid::nanoid!()));
        let file = File::create(&tmp).await.unwrap();

        let chunk = bytes::Bytes::from(vec![0u8; 1024 * 1024]);
        let chunks: Vec<Result<bytes::Bytes, axum::Error>> =
            std::iter::repeat_with(|| Ok(chunk.clone())).take(11).collect();
        let stream = futures::stream::iter(chunks);

        futures::pin_mut!(stream);

        let result = write_stream(file, stream).await;

        assert!(matches!(result, Err(StorageError::MaxSize)));

        tokio::fs::remove_file(&tmp).await.unwrap();
    }

    #[tokio::test]
    async fn exactly_at_cap_accepted() {
        let tmp = std::env::temp_dir().join(format!("upload-exact-{}", nanoid::nanoid!()));
        let file = File::create(&tmp).await.unwrap();

        let chunk = bytes::Bytes::from(vec![0u8; 1024 * 1024]);
        let chunks: Vec<Result<bytes::Bytes, axum::Error>> =
            std::iter::repeat_with(|| Ok(chunk.clone())).take(10).collect();
        let stream = futures::stream::iter(chunks);

        futures::pin_mut!(stream);

        let written = write_stream(file, stream).await.unwrap();

        assert_eq!(written, MAX_DOCUMENT_SIZE);

        let one_more = File::create(&tmp).await.unwrap();
        let chunks: Vec<Result<bytes::Bytes, axum::Error>> = vec![
            Ok(bytes::Bytes::from(vec![0u8; MAX_DOCUMENT_SIZE as usize])),
            Ok(bytes::Bytes::from_static(b"x")),
        ];
        let stream = futures::stream::iter(chunks);

        futures::pin_mut!(stream);

        assert!(matches!(
            write_stream(one_more, stream).await,
            Err(StorageError::MaxSize)
        ));

        tokio::fs::remove_file(&tmp).await.unwrap();
    }
}
