// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output naming and placement — base name sanitization, the default output
// directory, and the atomic write of the finished PDF.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use cmykpdf_core::error::{ConvertError, Result};
use tracing::{debug, info, instrument};

/// Replace every character outside `[A-Za-z0-9_]` and the CJK unified
/// ideographs U+4E00..=U+9FA5 with `_`.
pub fn sanitize_base_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || ('\u{4E00}'..='\u{9FA5}').contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A fresh name of the form `{prefix}-{timestamp}`, sanitized.
pub fn default_base_name(prefix: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    sanitize_base_name(&format!("{}-{}", prefix, stamp))
}

/// Sanitize the caller's name, or synthesize one when it is missing or empty.
pub fn resolve_base_name(name: Option<&str>, prefix: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => sanitize_base_name(name),
        _ => default_base_name(prefix),
    }
}

/// The user's downloads folder.
///
/// Tries the `XDG_DOWNLOAD_DIR` entry of `~/.config/user-dirs.dirs`, then
/// `~/Downloads`, then the home directory, then the system temp directory.
pub fn default_output_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    downloads_dir(home.as_deref())
}

fn downloads_dir(home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return std::env::temp_dir();
    };

    let user_dirs = home.join(".config").join("user-dirs.dirs");
    if let Ok(contents) = std::fs::read_to_string(&user_dirs)
        && let Some(dir) = parse_download_dir(&contents, home)
        && dir.is_dir()
    {
        return dir;
    }

    let downloads = home.join("Downloads");
    if downloads.is_dir() {
        return downloads;
    }
    if home.is_dir() {
        return home.to_path_buf();
    }
    std::env::temp_dir()
}

/// Read `XDG_DOWNLOAD_DIR` from the contents of an xdg-user-dirs file.
///
/// Values are either `"$HOME/..."` or absolute. A value equal to the home
/// directory means the entry is disabled.
fn parse_download_dir(contents: &str, home: &Path) -> Option<PathBuf> {
    let value = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| line.strip_prefix("XDG_DOWNLOAD_DIR="))?;
    let value = value.trim().trim_matches('"');

    let dir = if let Some(rest) = value.strip_prefix("$HOME") {
        home.join(rest.trim_start_matches('/'))
    } else if value.starts_with('/') {
        PathBuf::from(value)
    } else {
        return None;
    };
    (dir != home).then_some(dir)
}

/// Write `bytes` to `{dir}/{base_name}.pdf`, replacing any existing file.
///
/// The bytes go to a temporary file in `dir` first, which is then renamed
/// over the destination, so readers never see a partial PDF.
#[instrument(skip(bytes), fields(dir = %dir.display(), bytes = bytes.len()))]
pub fn write_atomically(dir: &Path, base_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(format!("{}.pdf", base_name));

    let mut temp = tempfile::Builder::new()
        .prefix(".cmykpdf-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|err| {
            ConvertError::Write(format!(
                "cannot create temporary file in {}: {}",
                dir.display(),
                err
            ))
        })?;

    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| {
            ConvertError::Write(format!("cannot write {}: {}", temp.path().display(), err))
        })?;
    debug!(temp = %temp.path().display(), "Temporary PDF written");

    temp.persist(&target).map_err(|err| {
        ConvertError::Write(format!("cannot move PDF to {}: {}", target.display(), err.error))
    })?;

    info!(path = %target.display(), "PDF saved");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators_and_controls() {
        assert_eq!(sanitize_base_name("../evil/\x07name"), "___evil__name");
        assert_eq!(sanitize_base_name("a\\b:c"), "a_b_c");
        assert_eq!(sanitize_base_name("report 2026.v2"), "report_2026_v2");
    }

    #[test]
    fn sanitize_keeps_cjk_ideographs() {
        assert_eq!(sanitize_base_name("图片_001"), "图片_001");
        // Hiragana is outside the kept range.
        assert_eq!(sanitize_base_name("あ"), "_");
    }

    #[test]
    fn missing_or_empty_name_is_synthesized() {
        for name in [None, Some("")] {
            let resolved = resolve_base_name(name, "img2pdf");
            assert!(resolved.starts_with("img2pdf_"), "{}", resolved);
            assert_eq!(resolved, sanitize_base_name(&resolved));
        }
        assert_eq!(resolve_base_name(Some("scan"), "img2pdf"), "scan");
    }

    #[test]
    fn user_dirs_entry_is_parsed() {
        let home = Path::new("/home/ada");
        let contents = "# written by xdg-user-dirs-update\n\
                        XDG_DESKTOP_DIR=\"$HOME/Desktop\"\n\
                        XDG_DOWNLOAD_DIR=\"$HOME/Téléchargements\"\n";
        assert_eq!(
            parse_download_dir(contents, home),
            Some(PathBuf::from("/home/ada/Téléchargements"))
        );
        assert_eq!(
            parse_download_dir("XDG_DOWNLOAD_DIR=\"/srv/inbox\"", home),
            Some(PathBuf::from("/srv/inbox"))
        );
        // Disabled, commented out, relative or missing entries are ignored.
        assert_eq!(parse_download_dir("XDG_DOWNLOAD_DIR=\"$HOME/\"", home), None);
        assert_eq!(parse_download_dir("#XDG_DOWNLOAD_DIR=\"$HOME/x\"", home), None);
        assert_eq!(parse_download_dir("XDG_DOWNLOAD_DIR=\"x\"", home), None);
        assert_eq!(parse_download_dir("", home), None);
    }

    #[test]
    fn downloads_dir_prefers_user_dirs_then_downloads_then_home() {
        let home = tempfile::tempdir().unwrap();
        assert_eq!(downloads_dir(Some(home.path())), home.path());

        std::fs::create_dir(home.path().join("Downloads")).unwrap();
        assert_eq!(downloads_dir(Some(home.path())), home.path().join("Downloads"));

        let custom = home.path().join("Inbox");
        std::fs::create_dir(&custom).unwrap();
        std::fs::create_dir(home.path().join(".config")).unwrap();
        std::fs::write(
            home.path().join(".config").join("user-dirs.dirs"),
            "XDG_DOWNLOAD_DIR=\"$HOME/Inbox\"\n",
        )
        .unwrap();
        assert_eq!(downloads_dir(Some(home.path())), custom);

        assert_eq!(downloads_dir(None), std::env::temp_dir());
    }

    #[test]
    fn write_replaces_existing_file_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();

        let first = write_atomically(dir.path(), "out", b"first version").unwrap();
        let second = write_atomically(dir.path(), "out", b"second").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("out.pdf"));
        assert_eq!(std::fs::read(&second).unwrap(), b"second");

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.pdf")]);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_atomically(&missing, "out", b"x").unwrap_err();
        assert!(matches!(err, ConvertError::Write(_)));
    }
}
