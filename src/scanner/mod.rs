//! 감시 폴더 스캔
//!
//! 기동 시 이미 떨어져 있는 카운팅 결과 JSON을 찾는다 (하위 폴더는 보지 않는다).

use crate::error::{PharmError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RESULT_EXTENSIONS: &[&str] = &["json", "JSON"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// 감시 폴더에 들어온 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropFileKind {
    CountingResult,
    Image,
    Other,
}

pub fn classify_path(path: &Path) -> DropFileKind {
    let Some(ext) = path.extension() else {
        return DropFileKind::Other;
    };
    let ext_str = ext.to_string_lossy();
    if RESULT_EXTENSIONS.iter().any(|&e| e == ext_str) {
        DropFileKind::CountingResult
    } else if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
        DropFileKind::Image
    } else {
        DropFileKind::Other
    }
}

/// 폴더 직하의 결과 JSON 목록 (파일명 순)
pub fn scan_result_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(PharmError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && classify_path(p) == DropFileKind::CountingResult)
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_classify_path() {
        assert_eq!(classify_path(Path::new("a.json")), DropFileKind::CountingResult);
        assert_eq!(classify_path(Path::new("a.JPG")), DropFileKind::Image);
        assert_eq!(classify_path(Path::new("a.png")), DropFileKind::Image);
        assert_eq!(classify_path(Path::new("a.txt")), DropFileKind::Other);
        assert_eq!(classify_path(Path::new("noext")), DropFileKind::Other);
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_result_files(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(PharmError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_only_top_level_json_sorted() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("c.json")).unwrap();
        File::create(dir.path().join("a.json")).unwrap();
        File::create(dir.path().join("b.jpg")).unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        File::create(dir.path().join("images").join("nested.json")).unwrap();

        let files = scan_result_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "c.json"]);
    }
}
