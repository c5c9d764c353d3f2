use super::path_error::PathError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 入力ファイルへのパスを表現し、その妥当性を保証する構造体。
///
/// 拡張子は検証しません。PNGかどうかは中身（シグネチャ）で判断します。
#[derive(Debug)]
pub struct PngFilePath(PathBuf);

impl PngFilePath {
    // --- Public Methods ---

    /// 新しい `PngFilePath` インスタンスを生成する。
    ///
    /// パスが存在し、ファイルであることを検証する。
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はファイルではありません。",
                path.display()
            )));
        }
        Ok(Self(path.to_path_buf()))
    }

    /// 内部の `Path` への参照を返す。
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// ファイル全体をバイト列で読み込む。
    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.0)
    }
}

// Displayトレイトの実装（表示用）
impl fmt::Display for PngFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

// テストモジュール
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_and_read_ok() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, b"\x89PNG data").unwrap();

        let file = PngFilePath::new(&path).expect("PngFilePath::new should succeed");
        assert_eq!(file.read().unwrap(), b"\x89PNG data");
        assert_eq!(file.as_path(), path.as_path());
    }

    #[test]
    fn test_new_nonexistent() {
        let res = PngFilePath::new("nonexistent_file_for_test.png");
        if let Err(PathError::InvalidPath(msg)) = res {
            assert!(msg.contains("は存在しません。"));
        } else {
            panic!("Expected InvalidPath error for nonexistent file");
        }
    }

    #[test]
    fn test_new_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let res = PngFilePath::new(dir.path());
        if let Err(PathError::InvalidPath(msg)) = res {
            assert!(msg.contains("はファイルではありません。"));
        } else {
            panic!("Expected InvalidPath error for directory");
        }
    }

    // as_path / Display が元の Path を返すことを確認
    #[test]
    fn test_display_returns_original_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, b"").unwrap();
        let file = PngFilePath::new(&path).unwrap();
        assert_eq!(file.to_string(), path.display().to_string());
    }
}
