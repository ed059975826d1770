use std::{
    env::current_dir,
    io,
    path::{Path, PathBuf},
};

use percent_encoding::percent_decode_str;
use tokio::fs::{self, File};

use crate::req::Request;
use crate::resp::{Response, Status};
use crate::templates::{self, ListingEntry};

#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn in_current_dir() -> io::Result<StaticFileHandler> {
        current_dir().map(StaticFileHandler::with_root)
    }

    pub fn with_root(root: PathBuf) -> StaticFileHandler {
        StaticFileHandler { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn handle(&self, request: &Request) -> anyhow::Result<Response> {
        let target = request.path.split(['?', '#']).next().unwrap_or("");
        let decoded = percent_decode_str(target).decode_utf8_lossy();
        let path = self.root.join(relative_path(&decoded));

        if path.is_dir() {
            // Browsers resolve relative listing links against the directory
            // only when the URL ends with a slash.
            if !target.ends_with('/') {
                return Ok(Response::redirect(format!("{target}/")));
            }

            let index = path.join("index.html");
            if index.is_file() {
                let file = File::open(&index).await?;
                return Response::from_file(&index, file).await;
            }

            return self.list_directory(&decoded, &path).await;
        }

        if !path.is_file() {
            return Ok(Response::from_html(
                Status::NotFound,
                include_str!("../static/404.html"),
            ));
        }

        let file = File::open(&path).await?;
        Response::from_file(&path, file).await
    }

    async fn list_directory(&self, display_path: &str, dir: &Path) -> anyhow::Result<Response> {
        let mut entries = Vec::new();
        let mut dir_entries = fs::read_dir(dir).await?;

        while let Some(entry) = dir_entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().await?.is_dir();
            entries.push(ListingEntry { name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Response::from_html(
            Status::Ok,
            templates::directory_listing_html(display_path, &entries),
        ))
    }
}

/// Request paths can never name anything outside the serving root: empty,
/// `.` and `..` components are dropped rather than resolved.
fn relative_path(target: &str) -> PathBuf {
    target
        .split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect()
}
