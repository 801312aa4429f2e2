use std::path::{Path, PathBuf};

const STEAM_CANDIDATES: [&str; 3] = [
    // Windows
    r"C:\Program Files (x86)\Steam\steamapps\common\Victoria 2",
    // Linux
    ".local/share/Steam/steamapps/common/Victoria 2",
    // macOS
    "Library/Application Support/Steam/steamapps/common/Victoria 2",
];

/// Whether `path` looks like a game root: it holds `common/` and `map/`.
pub fn is_game_root(path: &Path) -> bool {
    path.join("common").is_dir() && path.join("map").is_dir()
}

fn first_install(candidates: &[&str], home: Option<&Path>) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        let path = if candidate.starts_with("C:") {
            PathBuf::from(candidate)
        } else {
            home?.join(candidate)
        };
        is_game_root(&path).then_some(path)
    })
}

/// Detects the Victoria 2 installation path.
///
/// Checks the usual Steam directories on Windows, Linux and macOS.
pub fn detect_game_path() -> Option<PathBuf> {
    let home = dirs::home_dir();
    first_install(&STEAM_CANDIDATES, home.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_install_under_home() {
        let home = tempfile::tempdir().unwrap();
        let root = home.path().join(STEAM_CANDIDATES[1]);
        fs::create_dir_all(root.join("common")).unwrap();
        fs::create_dir_all(root.join("map")).unwrap();
        assert_eq!(first_install(&STEAM_CANDIDATES[1..], Some(home.path())), Some(root));
    }

    #[test]
    fn test_incomplete_install_is_skipped() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(STEAM_CANDIDATES[1]).join("common")).unwrap();
        assert_eq!(first_install(&STEAM_CANDIDATES[1..], Some(home.path())), None);
        assert_eq!(first_install(&STEAM_CANDIDATES[1..], None), None);
    }
}
