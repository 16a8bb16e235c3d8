use std::{
    fs,
    path::{Path, PathBuf},
};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Finds the image whose file stem names `item`.
///
/// Matching ignores case and treats underscores as spaces.
pub fn find_image(dir: &Path, item: &str) -> Option<PathBuf> {
    let wanted = normalize(item);

    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image(path))
        .find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map_or(false, |stem| normalize(stem) == wanted)
        })
}

/// The item name an image file stands for.
pub fn item_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.replace('_', " "))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn normalize(name: &str) -> String {
    name.replace('_', " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn matches_stem_loosely() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("Rainbow_Trout.PNG"), b"").unwrap();
        fs::write(dir.join("Pike.txt"), b"").unwrap();

        let found = find_image(dir, "rainbow trout").unwrap();
        assert_eq!(found.file_name().unwrap(), "Rainbow_Trout.PNG");
        assert_eq!(item_name(&found).as_deref(), Some("Rainbow Trout"));

        assert!(find_image(dir, "Pike").is_none());
        assert!(find_image(&dir.join("missing"), "Pike").is_none());
    }
}
