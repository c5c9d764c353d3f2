use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use png_trailer_caption::domain::SourceImage;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const PATTERNS: &str = r"^ID:\s*(\w+)$
Identifier: \1

^Seed:\s*(?P<seed>\d+)  # 数値だけを取り出す
Seed \g<seed>
";

fn png_with_trailer(trailer: &[u8]) -> Vec<u8> {
    let pixels = vec![220u8; 48 * 12 * 3];
    let mut data = Vec::new();
    PngEncoder::new(&mut data)
        .write_image(&pixels, 48, 12, ExtendedColorType::Rgb8)
        .unwrap();
    data.extend_from_slice(trailer);
    data
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_png_trailer_caption"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("バイナリを起動できません")
}

#[test]
fn captions_a_png_and_exits_successfully() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("patterns.txt"), PATTERNS).unwrap();
    fs::write(dir.path().join("in.png"), png_with_trailer(b"ID: abc123\nSeed: 42\n")).unwrap();

    let out = run(dir.path(), &["in.png", "out.png"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let written = fs::read(dir.path().join("out.png")).unwrap();
    let image = SourceImage::from_bytes(&written, "out.png").unwrap();
    assert_eq!(image.trailer(), b"ID: abc123\nSeed: 42\n");
    assert_eq!(image.dimensions().0, 48);
    assert!(image.dimensions().1 > 12);
}

#[test]
fn config_in_working_directory_is_picked_up() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("patterns.txt"), PATTERNS).unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "output-template = \"{stem}.captioned.png\"\nplacement = \"overlay\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("in.png"), png_with_trailer(b"ID: abc123")).unwrap();

    let out = run(dir.path(), &["in.png"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let written = fs::read(dir.path().join("in.captioned.png")).unwrap();
    let image = SourceImage::from_bytes(&written, "in.captioned.png").unwrap();
    assert_eq!(image.dimensions(), (48, 12));
}

#[test]
fn distinct_exit_codes_for_each_failure() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("patterns.txt"), PATTERNS).unwrap();
    fs::write(dir.path().join("bad_patterns.txt"), "^ID:(\\w+)$\n\\2\n").unwrap();
    fs::write(dir.path().join("ok.png"), png_with_trailer(b"ID: a")).unwrap();
    fs::write(dir.path().join("text.png"), b"just some text").unwrap();
    let mut truncated = png_with_trailer(b"");
    truncated.truncate(truncated.len() - 12);
    fs::write(dir.path().join("truncated.png"), truncated).unwrap();

    let code = |args: &[&str]| run(dir.path(), args).status.code();

    assert_eq!(code(&["missing.png", "o1.png"]), Some(3));
    assert_eq!(code(&["text.png", "o2.png"]), Some(3));
    assert_eq!(code(&["truncated.png", "o3.png"]), Some(4));
    assert_eq!(code(&["ok.png", "o4.png", "-p", "bad_patterns.txt"]), Some(5));
    assert_eq!(code(&["ok.png", "o5.png", "-p", "no_such_patterns.txt"]), Some(6));
    assert_eq!(code(&["ok.png", "ok.png"]), Some(3));

    for name in ["o1.png", "o2.png", "o3.png", "o4.png", "o5.png"] {
        assert!(!dir.path().join(name).exists(), "{name} が作られています");
    }
}
