//! Path helpers shared by the CLI commands.

use std::path::{Component, Path, PathBuf};

/// `path` relative to `base` when it lies under it, otherwise unchanged.
///
/// ```
/// use std::path::Path;
/// use autoglot::utils::display_path;
///
/// assert_eq!(display_path(Path::new("/p/src/a.ts"), Path::new("/p")), "src/a.ts");
/// assert_eq!(display_path(Path::new("/q/a.ts"), Path::new("/p")), "/q/a.ts");
/// ```
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Directory holding every copy `revert` writes for `revert_root`:
/// `<out_dir>/revert-<name of revert_root>`.
pub fn revert_output_root(out_dir: &Path, revert_root: &Path) -> PathBuf {
    let root_name = revert_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    out_dir.join(format!("revert-{}", root_name))
}

/// Where `revert` writes the copy of `file`: under
/// [`revert_output_root`], at its path relative to `revert_root`.
pub fn revert_output_path(out_dir: &Path, revert_root: &Path, file: &Path) -> PathBuf {
    let relative = file.strip_prefix(revert_root).unwrap_or(file);
    let relative: PathBuf = relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    revert_output_root(out_dir, revert_root).join(relative)
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_display_path() {
        assert_eq!(display_path(Path::new("/p/a/b.vue"), Path::new("/p")), "a/b.vue");
        assert_eq!(display_path(Path::new("a/b.vue"), Path::new("/p")), "a/b.vue");
    }

    #[test]
    fn test_revert_output_path() {
        let out = revert_output_path(
            Path::new("/p/.autoglot"),
            Path::new("/p/src"),
            Path::new("/p/src/views/Home.vue"),
        );
        assert_eq!(out, PathBuf::from("/p/.autoglot/revert-src/views/Home.vue"));
    }

    #[test]
    fn test_revert_output_root() {
        let out = revert_output_root(Path::new(".autoglot"), Path::new("/p/src"));
        assert_eq!(out.to_string_lossy(), ".autoglot/revert-src");
    }

    #[test]
    fn test_revert_output_path_outside_root() {
        let out = revert_output_path(Path::new("out"), Path::new("src"), Path::new("/etc/a.ts"));
        assert_eq!(out, PathBuf::from("out/revert-src/etc/a.ts"));
    }
}
