use super::directory_path::DirectoryPath;
use super::path_error::PathError;
use super::png_file_path::PngFilePath;
use std::path::Path;

/// 入力ソースを表現する列挙型。
/// ディレクトリパスまたは単一ファイルのパスのいずれかを保持する。
#[derive(Debug)]
pub enum InputSource {
    Directory(DirectoryPath),
    PngFile(PngFilePath),
}

impl InputSource {
    /// パスの種類を判定して `InputSource` を作成する。
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();
        if path.is_dir() {
            DirectoryPath::new(path).map(InputSource::Directory)
        } else {
            PngFilePath::new(path).map(InputSource::PngFile)
        }
    }

    pub fn as_path(&self) -> &Path {
        match self {
            InputSource::Directory(dir) => dir.as_path(),
            InputSource::PngFile(file) => file.as_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_directory_and_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, b"").unwrap();

        assert!(matches!(
            InputSource::new(dir.path()),
            Ok(InputSource::Directory(_))
        ));
        let source = InputSource::new(&file).unwrap();
        assert!(matches!(source, InputSource::PngFile(_)));
        assert_eq!(source.as_path(), file.as_path());
    }

    #[test]
    fn missing_path_is_invalid() {
        assert!(matches!(
            InputSource::new("missing_input_for_test.png"),
            Err(PathError::InvalidPath(_))
        ));
    }
}
