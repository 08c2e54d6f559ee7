//! Process-wide font registry backed by `fontdb`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use parking_lot::RwLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{MapnikError, MapnikResult};

/// File extensions picked up by [`register_fonts`].
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "ttc", "pfa", "pfb", "dfont"];

static FONTS: LazyLock<RwLock<fontdb::Database>> =
    LazyLock::new(|| RwLock::new(fontdb::Database::new()));

/// Registers every face in one font file; returns the number of faces added.
pub fn register_font(path: impl AsRef<Path>) -> MapnikResult<usize> {
    let path = path.as_ref();
    let mut db = FONTS.write();
    let before = db.len();
    db.load_font_file(path)
        .map_err(|source| MapnikError::io(path, source))?;
    let added = db.len() - before;
    if added == 0 {
        return Err(MapnikError::Font(format!(
            "no font faces found in '{}'",
            path.display()
        )));
    }
    debug!(path = %path.display(), faces = added, "registered font");
    Ok(added)
}

/// Registers all font files under `dir`, descending into subdirectories when
/// `recurse` is set. Unreadable font files are skipped with a warning.
pub fn register_fonts(dir: impl AsRef<Path>, recurse: bool) -> MapnikResult<usize> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MapnikError::Font(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let mut added = 0;
    for path in font_files(dir, recurse)? {
        match register_font(&path) {
            Ok(faces) => added += faces,
            Err(err) => warn!(path = %path.display(), %err, "skipping font file"),
        }
    }
    Ok(added)
}

/// Font files under `dir` in file-name order; only the top level unless
/// `recurse` is set.
pub fn font_files(dir: &Path, recurse: bool) -> MapnikResult<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recurse { usize::MAX } else { 1 })
        .follow_links(true)
        .sort_by_file_name();
    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| MapnikError::walk(dir, err))?;
        if entry.file_type().is_file() && is_font_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[must_use]
pub fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FONT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[must_use]
pub fn face_count() -> usize {
    FONTS.read().len()
}

/// Family names of all registered faces, in registration order.
#[must_use]
pub fn face_names() -> Vec<String> {
    FONTS
        .read()
        .faces()
        .filter_map(|face| face.families.first().map(|(family, _)| family.clone()))
        .collect()
}
