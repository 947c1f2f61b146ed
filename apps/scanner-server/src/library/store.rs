//! Scan directory access
//!
//! Lists, resolves, reads and deletes the PDFs the scan script writes into a
//! single flat directory. Every filename coming from a request goes through
//! [`ScanLibrary::resolve`] before it touches the filesystem.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::error::{AppError, Result};

use super::types::ScanFile;

/// A PDF found in the scans directory
#[derive(Debug, Clone)]
struct PdfEntry {
    filename: String,
    size: u64,
    created: SystemTime,
    modified: SystemTime,
}

impl PdfEntry {
    fn to_scan_file(&self) -> ScanFile {
        ScanFile::new(&self.filename, self.size, self.created)
    }
}

/// Filesystem view over the scans directory
#[derive(Debug, Clone)]
pub struct ScanLibrary {
    dir: PathBuf,
    list_limit: usize,
}

impl ScanLibrary {
    pub fn new(dir: impl Into<PathBuf>, list_limit: usize) -> Self {
        Self {
            dir: dir.into(),
            list_limit,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Most recent scans, newest first, capped at the list limit
    pub async fn list(&self) -> Result<Vec<ScanFile>> {
        Ok(self
            .pdf_entries()
            .await?
            .iter()
            .take(self.list_limit)
            .map(PdfEntry::to_scan_file)
            .collect())
    }

    /// Filenames currently present, taken before a scan starts
    pub async fn snapshot(&self) -> Result<HashSet<String>> {
        Ok(self
            .pdf_entries()
            .await?
            .into_iter()
            .map(|entry| entry.filename)
            .collect())
    }

    /// The file a scan produced: the newest PDF absent from `before`, or
    /// failing that the newest one written since `started`
    pub async fn find_new_scan(
        &self,
        before: &HashSet<String>,
        started: SystemTime,
    ) -> Result<Option<ScanFile>> {
        let entries = self.pdf_entries().await?;

        let found = entries
            .iter()
            .find(|entry| !before.contains(&entry.filename))
            .or_else(|| entries.iter().find(|entry| entry.modified >= started));

        Ok(found.map(PdfEntry::to_scan_file))
    }

    /// Map a requested filename to a path inside the scans directory
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        if !is_plain_file_name(filename) {
            tracing::warn!("Rejected path outside scans directory: {:?}", filename);
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        let path = self.dir.join(filename);
        if !path.starts_with(&self.dir) {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        Ok(path)
    }

    /// Read a scan, refusing anything that is not a regular file inside the
    /// directory once symlinks are followed
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.existing_file(filename).await?;

        let canonical = tokio::fs::canonicalize(&path).await?;
        let canonical_dir = tokio::fs::canonicalize(&self.dir).await?;
        if !canonical.starts_with(&canonical_dir) {
            tracing::warn!("Rejected symlink leaving scans directory: {:?}", filename);
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        Ok(tokio::fs::read(&canonical).await?)
    }

    pub async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.existing_file(filename).await?;
        tokio::fs::remove_file(&path).await?;
        tracing::info!("Deleted scan {}", path.display());
        Ok(())
    }

    async fn existing_file(&self, filename: &str) -> Result<PathBuf> {
        let path = self.resolve(filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(AppError::NotFound("File not found".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All `*.pdf` files, newest first
    async fn pdf_entries(&self) -> Result<Vec<PdfEntry>> {
        let dir = self.dir.clone();

        // Globbing and stat calls block, keep them off the runtime workers
        tokio::task::spawn_blocking(move || scan_dir(&dir))
            .await
            .map_err(|e| AppError::Internal(format!("Directory listing task failed: {}", e)))?
    }
}

fn scan_dir(dir: &Path) -> Result<Vec<PdfEntry>> {
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("*.pdf");
    // Hidden files are in-progress output, as with a shell glob
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };

    let paths = glob::glob_with(&pattern.to_string_lossy(), options)
        .map_err(|e| AppError::Internal(format!("Invalid scan pattern: {}", e)))?;

    let canonical_dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    let mut entries = Vec::new();
    for path in paths {
        let path = match path {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        match read_entry(&path, &canonical_dir) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    entries.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| b.filename.cmp(&a.filename))
    });

    Ok(entries)
}

fn read_entry(path: &Path, canonical_dir: &Path) -> std::io::Result<Option<PdfEntry>> {
    if std::fs::symlink_metadata(path)?.file_type().is_symlink() {
        let target = std::fs::canonicalize(path)?;
        if !target.starts_with(canonical_dir) {
            tracing::warn!("Skipping {}: symlink leaves scans directory", path.display());
            return Ok(None);
        }
    }

    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Ok(None);
    }
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        tracing::warn!("Skipping {}: file name is not valid UTF-8", path.display());
        return Ok(None);
    };

    let modified = meta.modified()?;
    let created = meta.created().unwrap_or(modified);

    Ok(Some(PdfEntry {
        filename: filename.to_string(),
        size: meta.len(),
        created,
        modified,
    }))
}

/// A single normal path component with no separators
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) {
        std::fs::write(dir.join(name), bytes).unwrap();
        // Keep creation times distinct between files
        std::thread::sleep(Duration::from_millis(20));
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("scan.pdf"));
        assert!(is_plain_file_name("scan 2024-01-01.pdf"));
        assert!(is_plain_file_name("..hidden.pdf"));

        for name in ["", ".", "..", "../x.pdf", "a/b.pdf", "/etc/passwd", "a\\b.pdf", "a\0.pdf"] {
            assert!(!is_plain_file_name(name), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let library = ScanLibrary::new("/srv/scans", 50);

        assert_eq!(
            library.resolve("a.pdf").unwrap(),
            PathBuf::from("/srv/scans/a.pdf")
        );
        assert!(matches!(
            library.resolve("../secret.pdf"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            library.resolve("/etc/passwd"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_pdf(dir.path(), &format!("scan-{}.pdf", i), b"%PDF-1.4");
        }
        write_pdf(dir.path(), "notes.txt", b"not a pdf");
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let library = ScanLibrary::new(dir.path(), 3);
        let files = library.list().await.unwrap();

        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["scan-4.pdf", "scan-3.pdf", "scan-2.pdf"]);
        assert_eq!(files[0].size, 8);
        assert_eq!(files[0].download_url, "/api/download/scan-4.pdf");
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = ScanLibrary::new(dir.path().join("missing"), 50);
        assert!(library.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_new_scan_prefers_new_file() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "old.pdf", b"old");

        let library = ScanLibrary::new(dir.path(), 50);
        let before = library.snapshot().await.unwrap();
        let started = SystemTime::now();

        assert!(library.find_new_scan(&before, started).await.unwrap().is_none());

        write_pdf(dir.path(), "new.pdf", b"new");
        let found = library.find_new_scan(&before, started).await.unwrap().unwrap();
        assert_eq!(found.filename, "new.pdf");
    }

    #[tokio::test]
    async fn test_find_new_scan_accepts_overwritten_file() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "scan.pdf", b"first");

        let library = ScanLibrary::new(dir.path(), 50);
        let before = library.snapshot().await.unwrap();
        let started = SystemTime::now();
        std::thread::sleep(Duration::from_millis(20));

        write_pdf(dir.path(), "scan.pdf", b"second");
        let found = library.find_new_scan(&before, started).await.unwrap().unwrap();
        assert_eq!(found.filename, "scan.pdf");
        assert_eq!(found.size, 6);
    }

    #[tokio::test]
    async fn test_read_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "a.pdf", b"%PDF");
        let library = ScanLibrary::new(dir.path(), 50);

        assert_eq!(library.read("a.pdf").await.unwrap(), b"%PDF");
        assert!(matches!(
            library.read("b.pdf").await,
            Err(AppError::NotFound(_))
        ));

        library.delete("a.pdf").await.unwrap();
        assert!(!dir.path().join("a.pdf").exists());
        assert!(matches!(
            library.delete("a.pdf").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_rejects_symlink_out_of_directory() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.pdf"), b"secret").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.pdf"), dir.path().join("link.pdf"))
            .unwrap();

        let library = ScanLibrary::new(dir.path(), 50);
        assert!(matches!(
            library.read("link.pdf").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_hidden_pdfs_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "real.pdf", b"%PDF");

        let library = ScanLibrary::new(dir.path(), 50);
        let before = library.snapshot().await.unwrap();
        let started = SystemTime::now();

        write_pdf(dir.path(), ".partial.pdf", b"%PDF in progress");

        let names: Vec<_> = library
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(names, vec!["real.pdf"]);
        assert!(library.find_new_scan(&before, started).await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_symlink_out_of_directory() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.pdf"), b"secret").unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "inside.pdf", b"%PDF");
        std::os::unix::fs::symlink(outside.path().join("secret.pdf"), dir.path().join("link.pdf"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("inside.pdf"), dir.path().join("alias.pdf"))
            .unwrap();

        let library = ScanLibrary::new(dir.path(), 50);
        let mut names: Vec<_> = library
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.filename)
            .collect();
        names.sort();
        assert_eq!(names, vec!["alias.pdf", "inside.pdf"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_list_skips_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "good.pdf", b"%PDF");
        let bad = std::ffi::OsStr::from_bytes(b"bad\xff.pdf");
        std::fs::write(dir.path().join(bad), b"%PDF").unwrap();

        let library = ScanLibrary::new(dir.path(), 50);
        let names: Vec<_> = library
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(names, vec!["good.pdf"]);
    }
}
