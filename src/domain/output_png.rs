// image クレートのPNGエンコーダでRGBA画像をバイト列に変換します。
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
// 書き込み途中のファイルを残さないよう、同じフォルダに一時ファイルを作ってから名前を変更します。
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// PNGの生成やファイル保存時に発生する可能性のあるエラーを定義する列挙型。
#[derive(Debug, Error)]
pub enum OutputError {
    /// 画像のエンコード中にエラーが発生した場合。
    #[error("PNGのエンコードに失敗しました: {0}")]
    Encode(String),

    /// 生成されたPNGデータをディスクに保存する際にエラーが発生した場合。
    /// 例えば、書き込み権限がないパスを指定した場合などが該当します。
    #[error("出力ファイル '{path}' の書き込みに失敗しました: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// メモリ上に生成された出力PNGのバイト列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPng {
    data: Vec<u8>,
}

impl OutputPng {
    /// RGBA画像をPNGにエンコードし、`trailer` が指定されていれば末尾に追記します。
    pub fn encode(image: &RgbaImage, trailer: Option<&[u8]>) -> Result<Self, OutputError> {
        let mut data = Vec::new();
        PngEncoder::new(&mut data)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| OutputError::Encode(e.to_string()))?;
        if let Some(trailer) = trailer {
            data.extend_from_slice(trailer);
        }
        Ok(Self { data })
    }

    /// 描画が不要な場合に、元のPNG本体（とトレーラー）をそのまま使います。
    pub fn passthrough(png_data: &[u8], trailer: Option<&[u8]>) -> Self {
        let mut data = png_data.to_vec();
        if let Some(trailer) = trailer {
            data.extend_from_slice(trailer);
        }
        Self { data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `self.data` を、指定されたパスにファイルとして保存します。
    ///
    /// 出力先と同じフォルダに一時ファイルを作って書き込み、完了してから名前を変更します。
    /// 途中で失敗した場合、一時ファイルはドロップ時に削除され、出力先には何も残りません。
    pub fn save_to_path(&self, path: &Path) -> Result<(), OutputError> {
        let save_err = |source| OutputError::Save {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(save_err)?;
        file.write_all(&self.data).map_err(save_err)?;
        file.as_file().sync_all().map_err(save_err)?;
        file.persist(path).map_err(|e| save_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trailer::split_trailer;
    use image::Rgba;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> RgbaImage {
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn encode_appends_trailer() {
        let out = OutputPng::encode(&sample(), Some(b"ID: abc123")).unwrap();
        let (png, trailer) = split_trailer(out.data()).unwrap();
        assert_eq!(trailer, b"ID: abc123");
        let decoded = image::load_from_memory(png).unwrap().to_rgba8();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn encode_is_byte_identical_for_identical_input() {
        let a = OutputPng::encode(&sample(), None).unwrap();
        let b = OutputPng::encode(&sample(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn passthrough_keeps_original_bytes() {
        let out = OutputPng::passthrough(b"png-bytes", Some(b"trailer"));
        assert_eq!(out.data(), b"png-bytestrailer");
        assert_eq!(OutputPng::passthrough(b"png", None).data(), b"png");
    }

    #[test]
    fn save_writes_file_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let out = OutputPng::encode(&sample(), None).unwrap();
        out.save_to_path(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), out.data());
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn failed_save_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        // 存在しないフォルダの中には一時ファイルも作れない
        let path = dir.path().join("missing").join("out.png");
        let res = OutputPng::passthrough(b"x", None).save_to_path(&path);
        assert!(matches!(res, Err(OutputError::Save { .. })));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_into_directory_path_fails_cleanly() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "x").unwrap();

        let res = OutputPng::passthrough(b"x", None).save_to_path(&target);
        assert!(res.is_err());
        // 一時ファイルは削除され、既存のフォルダだけが残る
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("occupied")]);
    }
}
