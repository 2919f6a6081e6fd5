//! Static file serving module
//!
//! Resolves request paths inside the asset root and loads the SPA entry
//! document. Paths are joined onto the root as-is, so `/static/app.js`
//! reads `<root>/static/app.js`.

use hyper::body::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::config::AssetsConfig;
use crate::error::RouterError;
use crate::http::cache::CachePolicy;
use crate::http::{mime, Payload};

const HTML: &str = "text/html; charset=utf-8";

/// The prebuilt bundle on disk
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    index_file: String,
    shell: Bytes,
    cache_max_age: u32,
}

impl StaticAssets {
    pub fn new(config: &AssetsConfig) -> Self {
        Self {
            root: config.root.clone(),
            index_file: config.index_file.clone(),
            shell: Bytes::from(render_shell(&config.shell_title)),
            cache_max_age: config.cache_max_age,
        }
    }

    /// Load the file a decoded request path names
    pub async fn load(&self, request_path: &str) -> Result<Payload, RouterError> {
        let file_path = self.resolve(request_path).await?;
        let data = fs::read(&file_path).await.map_err(|e| {
            tracing::error!(path = %file_path.display(), error = %e, "failed to read asset");
            RouterError::NotFound
        })?;

        Ok(Payload {
            data: Bytes::from(data),
            content_type: mime::for_path(&file_path),
            cache: CachePolicy::Public(self.cache_max_age),
        })
    }

    /// `<root>/<index_file>` when present, otherwise the built-in shell
    pub async fn entry_document(&self) -> Payload {
        let data = match self.load_index().await {
            Some(data) => data,
            None => self.shell.clone(),
        };
        Payload {
            data,
            content_type: HTML,
            cache: CachePolicy::NoCache,
        }
    }

    async fn load_index(&self) -> Option<Bytes> {
        let path = self.resolve(&self.index_file).await.ok()?;
        match fs::read(&path).await {
            Ok(data) => Some(Bytes::from(data)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "entry document unreadable, serving shell");
                None
            }
        }
    }

    /// Map a request path to a regular file strictly inside the root
    async fn resolve(&self, request_path: &str) -> Result<PathBuf, RouterError> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(RouterError::NotFound);
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            tracing::warn!(path = request_path, "path traversal attempt blocked");
            return Err(RouterError::NotFound);
        }

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            tracing::warn!(root = %self.root.display(), error = %e, "asset root not found or inaccessible");
            RouterError::NotFound
        })?;

        // Missing files are routine 404s
        let Ok(file_path) = fs::canonicalize(root.join(relative)).await else {
            return Err(RouterError::NotFound);
        };
        if !file_path.starts_with(&root) {
            tracing::warn!(
                path = request_path,
                resolved = %file_path.display(),
                "symlink escaping asset root blocked"
            );
            return Err(RouterError::NotFound);
        }

        let metadata = fs::metadata(&file_path)
            .await
            .map_err(|_| RouterError::NotFound)?;
        if !metadata.is_file() {
            return Err(RouterError::NotFound);
        }
        Ok(file_path)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Document that boots the client bundle.
///
/// `app.js` is a classic script that mounts on `#app` and expects `axios`
/// and `XLSX` as globals, so the vendor scripts must load before it.
fn render_shell(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link href="https://cdn.jsdelivr.net/npm/@fortawesome/fontawesome-free@6.4.0/css/all.min.css" rel="stylesheet">
    <style>
        .scan-input {{
            border: 3px solid #3b82f6;
            animation: pulse 2s infinite;
        }}
        @keyframes pulse {{
            0%, 100% {{ border-color: #3b82f6; }}
            50% {{ border-color: #60a5fa; }}
        }}
        .success-flash {{
            animation: successFlash 0.5s;
        }}
        @keyframes successFlash {{
            0%, 100% {{ background-color: transparent; }}
            50% {{ background-color: #10b981; }}
        }}
        .error-flash {{
            animation: errorFlash 0.5s;
        }}
        @keyframes errorFlash {{
            0%, 100% {{ background-color: transparent; }}
            50% {{ background-color: #ef4444; }}
        }}
    </style>
</head>
<body class="bg-gray-100">
    <div id="app"></div>

    <script src="https://cdn.jsdelivr.net/npm/axios@1.6.0/dist/axios.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/xlsx@0.18.5/dist/xlsx.full.min.js"></script>
    <script src="/static/app.js"></script>
</body>
</html>
"#,
        title = escape_html(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn assets_in(dir: &TempDir) -> StaticAssets {
        let config = AssetsConfig {
            root: dir.path().to_path_buf(),
            ..AssetsConfig::default()
        };
        StaticAssets::new(&config)
    }

    fn bundle() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static/app.js"), "console.log('scan');").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let dir = bundle();
        let payload = assets_in(&dir).load("/static/app.js").await.unwrap();
        assert_eq!(&payload.data[..], b"console.log('scan');");
        assert_eq!(payload.content_type, "text/javascript; charset=utf-8");
        assert_eq!(payload.cache, CachePolicy::Public(3600));
    }

    #[tokio::test]
    async fn test_missing_file_and_directory() {
        let dir = bundle();
        let assets = assets_in(&dir);
        assert_eq!(
            assets.load("/static/missing.js").await.unwrap_err(),
            RouterError::NotFound
        );
        assert_eq!(
            assets.load("/static/").await.unwrap_err(),
            RouterError::NotFound
        );
        assert_eq!(assets.load("/").await.unwrap_err(), RouterError::NotFound);
    }

    #[tokio::test]
    async fn test_traversal_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "jwt").unwrap();
        std::fs::create_dir_all(outer.path().join("public/static")).unwrap();
        let config = AssetsConfig {
            root: outer.path().join("public"),
            ..AssetsConfig::default()
        };
        let assets = StaticAssets::new(&config);
        assert_eq!(
            assets.load("/static/../../secret.txt").await.unwrap_err(),
            RouterError::NotFound
        );
    }

    #[tokio::test]
    async fn test_entry_document_prefers_index() {
        let dir = bundle();
        std::fs::write(dir.path().join("index.html"), "<html>built</html>").unwrap();
        let payload = assets_in(&dir).entry_document().await;
        assert_eq!(&payload.data[..], b"<html>built</html>");
        assert_eq!(payload.cache, CachePolicy::NoCache);
    }

    #[tokio::test]
    async fn test_entry_document_shell() {
        let dir = bundle();
        let payload = assets_in(&dir).entry_document().await;
        let html = std::str::from_utf8(&payload.data).unwrap();
        assert!(html.contains("<title>APD OASIS - Warehouse Logistic System</title>"));
        assert_eq!(payload.content_type, HTML);
    }

    #[test]
    fn test_shell_boots_bundle() {
        let html = render_shell("APD OASIS");
        assert!(html.contains(r#"<div id="app"></div>"#));
        assert!(!html.contains(r#"id="root""#));
        assert!(html.contains("axios.min.js"));
        assert!(html.contains("xlsx.full.min.js"));
        assert!(html.contains("cdn.tailwindcss.com"));
        assert!(html.contains("fontawesome-free"));
        assert!(!html.contains("type=\"module\""));

        // Vendor globals load before the classic bundle script
        let app = html.find(r#"<script src="/static/app.js"></script>"#).unwrap();
        assert!(html.find("axios.min.js").unwrap() < app);
        assert!(html.find("xlsx.full.min.js").unwrap() < app);
    }

    #[test]
    fn test_shell_title_escaped() {
        assert!(render_shell("<b>&</b>").contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
    }
}
