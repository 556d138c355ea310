use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const ICON_EXTENSIONS: [&str; 2] = ["svg", "png"];

/// All `.svg` / `.png` files below `folder`, sorted by path.
/// A missing folder yields an empty list.
pub fn discover(folder: &Path) -> Vec<PathBuf> {
    if !folder.is_dir() {
        log::debug!("No icon folder at {}", folder.display());
        return Vec::new();
    }
    let mut icons: Vec<PathBuf> = WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_icon(e.path()))
        .map(|e| e.into_path())
        .collect();
    icons.sort();
    icons
}

fn is_icon(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ICON_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_icons_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        for name in ["b.PNG", "a.svg", "notes.txt", "sub/c.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let found: Vec<PathBuf> = discover(dir.path())
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("a.svg"),
                PathBuf::from("b.PNG"),
                PathBuf::from("sub/c.png")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_folders_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        assert_eq!(discover(dir.path()), vec![dir.path().join("a.png")]);
    }

    #[test]
    fn missing_folder_is_empty() {
        assert!(discover(Path::new("/nonexistent/icons")).is_empty());
    }
}
