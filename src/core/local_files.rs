use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

/// Line terminator a text file was read with, reused when writing it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Not decodable as text. Lines hold a lossy decoding and cannot be written back.
    Binary,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// File content split into lines, with enough of its original shape
/// (encoding, line ending, final newline) to write it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
    pub encoding: TextEncoding,
    pub trailing_newline: bool,
}

impl TextFile {
    pub fn decode(bytes: &[u8]) -> Self {
        let (content, encoding) = if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
            match std::str::from_utf8(rest) {
                Ok(text) => (text.to_string(), TextEncoding::Utf8Bom),
                Err(_) => lossy(bytes),
            }
        } else if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
            decode_utf16(rest, u16::from_le_bytes, TextEncoding::Utf16Le)
                .unwrap_or_else(|| lossy(bytes))
        } else if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
            decode_utf16(rest, u16::from_be_bytes, TextEncoding::Utf16Be)
                .unwrap_or_else(|| lossy(bytes))
        } else {
            match std::str::from_utf8(bytes) {
                Ok(text) => (text.to_string(), TextEncoding::Utf8),
                Err(_) => lossy(bytes),
            }
        };

        Self {
            lines: content.lines().map(str::to_string).collect(),
            line_ending: LineEnding::detect(&content),
            encoding,
            trailing_newline: content.ends_with('\n'),
        }
    }

    /// Same shape, new lines.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            lines,
            ..self.clone()
        }
    }

    pub fn is_binary(&self) -> bool {
        self.encoding == TextEncoding::Binary
    }

    /// Bytes in the original encoding, or `None` for binary content.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let mut content = self.lines.join(self.line_ending.as_str());
        if self.trailing_newline && !self.lines.is_empty() {
            content.push_str(self.line_ending.as_str());
        }

        match self.encoding {
            TextEncoding::Utf8 => Some(content.into_bytes()),
            TextEncoding::Utf8Bom => Some([UTF8_BOM, content.as_bytes()].concat()),
            TextEncoding::Utf16Le => Some(encode_utf16(&content, UTF16LE_BOM, u16::to_le_bytes)),
            TextEncoding::Utf16Be => Some(encode_utf16(&content, UTF16BE_BOM, u16::to_be_bytes)),
            TextEncoding::Binary => None,
        }
    }
}

fn lossy(bytes: &[u8]) -> (String, TextEncoding) {
    (
        String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Binary,
    )
}

fn decode_utf16(
    bytes: &[u8],
    unit: fn([u8; 2]) -> u16,
    encoding: TextEncoding,
) -> Option<(String, TextEncoding)> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok().map(|text| (text, encoding))
}

fn encode_utf16(content: &str, bom: &[u8], bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut out = bom.to_vec();
    for unit in content.encode_utf16() {
        out.extend_from_slice(&bytes(unit));
    }
    out
}

/// Entry returned from directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Filesystem capability consumed by the tree builder, the rename strategies,
/// the backup step and the cleanup walk.
pub trait FileSystem {
    /// Immediate entries of `dir`, in enumeration order.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>>;
    /// True when `path` is rooted and names an existing directory.
    fn is_valid_folder(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool;
    /// Move `from` to `to`. Fails when `to` already exists, unless it is
    /// `from` itself under a different letter case.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    /// Read a file of any encoding. Never fails on undecodable bytes.
    fn read_text(&self, path: &Path) -> Result<TextFile>;
    /// Replace `path` atomically with `text` in its recorded encoding.
    fn write_text(&self, path: &Path, text: &TextFile) -> Result<()>;
    /// Archive the contents of `dir` into a new zip at `zip_path`.
    fn zip_directory(&self, dir: &Path, zip_path: &Path) -> Result<()>;
    /// Archive a single file into a new zip at `zip_path`.
    fn zip_file(&self, file: &Path, zip_path: &Path) -> Result<()>;
    fn delete(&self, path: &Path) -> Result<()>;
    fn delete_dir_all(&self, dir: &Path) -> Result<()>;
}

/// Local filesystem implementation
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(e: impl ToString, context: &str, path: &Path) -> Error {
    Error::internal_io(
        e.to_string(),
        Some(format!("{} {}", context, path.display())),
    )
}

impl FileSystem for LocalFs {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        let entries = fs::read_dir(dir).map_err(|e| io_error(e, "list directory", dir))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(e, "list directory", dir))?;
            let path = entry.path();
            let is_dir = path.is_dir();
            result.push(Entry { path, is_dir });
        }

        Ok(result)
    }

    fn is_valid_folder(&self, path: &Path) -> bool {
        path.is_absolute() && path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let context = || Some(format!("move {} to {}", from.display(), to.display()));

        if to.exists() && !is_case_only_change(from, to) {
            return Err(Error::internal_io("destination already exists", context()));
        }

        fs::rename(from, to).map_err(|e| Error::internal_io(e.to_string(), context()))
    }

    fn read_text(&self, path: &Path) -> Result<TextFile> {
        let bytes = fs::read(path).map_err(|e| io_error(e, "read", path))?;
        Ok(TextFile::decode(&bytes))
    }

    fn write_text(&self, path: &Path, text: &TextFile) -> Result<()> {
        let bytes = text
            .encode()
            .ok_or_else(|| io_error("content is not text", "write", path))?;
        write_atomic(path, &bytes)
    }

    fn zip_directory(&self, dir: &Path, zip_path: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(io_error("not a directory", "archive", dir));
        }

        let file = fs::File::create_new(zip_path).map_err(|e| io_error(e, "create", zip_path))?;
        let mut zip = ZipWriter::new(file);
        add_directory_contents(&mut zip, dir, "")?;
        zip.finish().map_err(|e| io_error(e, "finish", zip_path))?;
        Ok(())
    }

    fn zip_file(&self, file: &Path, zip_path: &Path) -> Result<()> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| io_error("path has no file name", "archive", file))?;

        let out = fs::File::create_new(zip_path).map_err(|e| io_error(e, "create", zip_path))?;
        let mut zip = ZipWriter::new(out);
        add_file(&mut zip, file, &name)?;
        zip.finish().map_err(|e| io_error(e, "finish", zip_path))?;
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| io_error(e, "delete file", path))
    }

    fn delete_dir_all(&self, dir: &Path) -> Result<()> {
        fs::remove_dir_all(dir).map_err(|e| io_error(e, "delete directory", dir))
    }
}

fn is_case_only_change(from: &Path, to: &Path) -> bool {
    from.to_string_lossy().to_lowercase() == to.to_string_lossy().to_lowercase()
}

/// Write to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io_error("invalid path", "write", path))?;
    let filename = path
        .file_name()
        .ok_or_else(|| io_error("invalid path", "write", path))?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, bytes).map_err(|e| io_error(e, "write temp file", &tmp_path))?;

    if let Ok(metadata) = fs::metadata(path) {
        let _ = fs::set_permissions(&tmp_path, metadata.permissions());
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error(e, "rename temp file", path)
    })
}

fn add_directory_contents<W: Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    prefix: &str,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| io_error(e, "archive", dir))?;

    for entry in entries {
        let entry = entry.map_err(|e| io_error(e, "archive", dir))?;
        let path = entry.path();
        let name = format!("{}{}", prefix, entry.file_name().to_string_lossy());

        if path.is_dir() {
            let dir_name = format!("{}/", name);
            zip.add_directory(dir_name.as_str(), FileOptions::default())
                .map_err(|e| io_error(e, "archive", &path))?;
            add_directory_contents(zip, &path, &dir_name)?;
        } else {
            add_file(zip, &path, &name)?;
        }
    }

    Ok(())
}

fn add_file<W: Write + io::Seek>(zip: &mut ZipWriter<W>, path: &Path, name: &str) -> Result<()> {
    let mut source = fs::File::open(path).map_err(|e| io_error(e, "archive", path))?;
    zip.start_file(name, FileOptions::default())
        .map_err(|e| io_error(e, "archive", path))?;
    io::copy(&mut source, zip).map_err(|e| io_error(e, "archive", path))?;
    Ok(())
}

/// Convenience function to get local filesystem
pub fn local() -> LocalFs {
    LocalFs::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn text(lines: &[&str], line_ending: LineEnding, encoding: TextEncoding) -> TextFile {
        TextFile {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            line_ending,
            encoding,
            trailing_newline: true,
        }
    }

    #[test]
    fn test_local_fs_write_read_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.cs");
        let fs = local();

        let content = text(&["namespace Acme", "{", "}"], LineEnding::Lf, TextEncoding::Utf8);
        fs.write_text(&path, &content).unwrap();

        assert_eq!(fs.read_text(&path).unwrap(), content);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "namespace Acme\n{\n}\n"
        );
        assert!(!dir.path().join("test.cs.tmp").exists());
    }

    #[test]
    fn test_local_fs_crlf_survives_rewrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crlf.cs");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();
        let fs = local();

        let content = fs.read_text(&path).unwrap();
        assert_eq!(content.lines, vec!["a", "b"]);
        assert_eq!(content.line_ending, LineEnding::CrLf);

        fs.write_text(&path, &content.with_lines(vec!["c".into(), "d".into()]))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c\r\nd\r\n");
    }

    #[test]
    fn test_local_fs_missing_final_newline_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last.txt");
        std::fs::write(&path, "one\ntwo").unwrap();
        let fs = local();

        let content = fs.read_text(&path).unwrap();
        assert!(!content.trailing_newline);
        fs.write_text(&path, &content).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo");
    }

    #[test]
    fn test_local_fs_bom_encodings_round_trip() {
        let dir = tempdir().unwrap();
        let fs = local();

        let utf8_bom = dir.path().join("bom.cs");
        let bom = [0xEF_u8, 0xBB, 0xBF];
        std::fs::write(&utf8_bom, [&bom[..], &b"using Acme;\r\n"[..]].concat()).unwrap();
        let content = fs.read_text(&utf8_bom).unwrap();
        assert_eq!(content.encoding, TextEncoding::Utf8Bom);
        assert_eq!(content.lines, vec!["using Acme;"]);
        fs.write_text(&utf8_bom, &content.with_lines(vec!["using Contoso;".into()]))
            .unwrap();
        assert_eq!(
            std::fs::read(&utf8_bom).unwrap(),
            [&bom[..], &b"using Contoso;\r\n"[..]].concat()
        );

        let utf16 = dir.path().join("schema.sql");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "CREATE SCHEMA Acme\r\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&utf16, &bytes).unwrap();
        let content = fs.read_text(&utf16).unwrap();
        assert_eq!(content.encoding, TextEncoding::Utf16Le);
        assert_eq!(content.lines, vec!["CREATE SCHEMA Acme"]);
        fs.write_text(&utf16, &content).unwrap();
        assert_eq!(std::fs::read(&utf16).unwrap(), bytes);
    }

    #[test]
    fn test_local_fs_binary_is_read_but_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Acme.snk");
        let bytes = [0x07_u8, 0x02, 0x00, 0x9F, 0x92, b'A', b'c', b'm', b'e', 0xC3];
        std::fs::write(&path, bytes).unwrap();
        let fs = local();

        let content = fs.read_text(&path).unwrap();
        assert!(content.is_binary());
        assert!(content.lines.concat().contains("Acme"));

        assert!(fs.write_text(&path, &content).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_local_fs_rename_refuses_existing_destination() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("AcmeHelper.cs");
        let to = dir.path().join("ContosoHelper.cs");
        std::fs::write(&from, "class Helper {}").unwrap();
        std::fs::write(&to, "existing").unwrap();

        let err = local().rename(&from, &to).unwrap_err();

        assert!(err.detail_text().contains("destination already exists"));
        assert!(from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "existing");
    }

    #[test]
    fn test_local_fs_rename_allows_case_only_change() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("acme.cs");
        std::fs::write(&from, "x").unwrap();

        local().rename(&from, &dir.path().join("Acme.cs")).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("Acme.cs")).unwrap(), "x");
    }

    #[test]
    fn test_local_fs_list() {
        let dir = tempdir().unwrap();
        let fs = local();

        std::fs::write(dir.path().join("a.sln"), "").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let entries = fs.list(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);

        let dirs: Vec<_> = entries.iter().filter(|e| e.is_dir).collect();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].path.ends_with("src"));
    }

    #[test]
    fn test_local_fs_is_valid_folder() {
        let dir = tempdir().unwrap();
        let fs = local();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(fs.is_valid_folder(dir.path()));
        assert!(!fs.is_valid_folder(&file));
        assert!(!fs.is_valid_folder(Path::new("relative/folder")));
        assert!(!fs.is_valid_folder(&dir.path().join("missing")));
    }

    #[test]
    fn test_local_fs_zip_directory_keeps_relative_layout() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Acme");
        std::fs::create_dir_all(source.join("Acme.Core")).unwrap();
        std::fs::write(source.join("Acme.sln"), "solution").unwrap();
        std::fs::write(source.join("Acme.Core").join("Program.cs"), "class P {}").unwrap();

        let zip_path = dir.path().join("Acme.zip");
        local().zip_directory(&source, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("Acme.Core/Program.cs")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "class P {}");
        assert!(archive.by_name("Acme.sln").is_ok());
    }

    #[test]
    fn test_local_fs_zip_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.txt");
        std::fs::write(&file, "x").unwrap();
        let zip_path = dir.path().join("out.zip");
        std::fs::write(&zip_path, "existing").unwrap();

        assert!(local().zip_file(&file, &zip_path).is_err());
    }

    #[test]
    fn test_local_fs_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("delete_me.txt");
        let nested = dir.path().join("nested").join("deeper");
        std::fs::write(&path, "content").unwrap();
        std::fs::create_dir_all(&nested).unwrap();
        let fs = local();

        fs.delete(&path).unwrap();
        fs.delete_dir_all(&dir.path().join("nested")).unwrap();

        assert!(!path.exists());
        assert!(!dir.path().join("nested").exists());
    }
}
