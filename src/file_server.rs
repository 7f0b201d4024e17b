use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
	body::Body,
	extract::{Path, State},
	http::{header, Uri},
	response::IntoResponse,
};
use hyper::StatusCode;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::app::AppState;

/// Serves the front-end page matching the request path; `/` is the login page.
pub async fn page_handler(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
	let page = match uri.path().trim_matches('/') {
		"" => "login",
		other => other,
	};
	let path = FsPath::new(&*state.static_dir).join(format!("{}.html", page));
	stream_file(&path, "text/html; charset=utf-8").await
}

pub async fn image_handler(State(state): State<AppState>, Path(file): Path<String>) -> impl IntoResponse {
	let Some(path) = confined(&state.static_dir, "images", &file) else {
		return (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], Body::empty());
	};
	let content_type = match path.extension().and_then(|e| e.to_str()) {
		Some("png") => "image/png",
		Some("jpg") | Some("jpeg") => "image/jpeg",
		Some("webp") => "image/webp",
		_ => "application/octet-stream",
	};
	stream_file(&path, content_type).await
}

/// Rejects names that would climb out of `root/dir`.
fn confined(root: &str, dir: &str, file: &str) -> Option<PathBuf> {
	let name = FsPath::new(file);
	let mut components = name.components();
	match (components.next(), components.next()) {
		(Some(Component::Normal(_)), None) => Some(FsPath::new(root).join(dir).join(name)),
		_ => None,
	}
}

async fn stream_file(path: &FsPath, content_type: &'static str) -> (StatusCode, [(header::HeaderName, &'static str); 1], Body) {
	match read_file_stream(path).await {
		Some(stream) => (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], Body::from_stream(stream)),
		None => {
			log::debug!("static file missing: {}", path.display());
			(StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], Body::empty())
		}
	}
}

pub async fn read_file_stream(path: &FsPath) -> Option<ReaderStream<File>> {
	File::open(path).await.map(ReaderStream::new).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn traversal_is_refused() {
		assert!(confined("public", "images", "1.jpeg").is_some());
		assert!(confined("public", "images", "../secret.env").is_none());
		assert!(confined("public", "images", "/etc/passwd").is_none());
		assert!(confined("public", "images", "a/b.png").is_none());
	}

	#[tokio::test]
	async fn missing_files_are_not_found() {
		let (status, _, _) = stream_file(FsPath::new("definitely/not/here.html"), "text/html").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}
}
