//! Path helpers shared across modules.

use std::path::Path;

use serde::Serializer;

/// Serialize a path as a string, replacing invalid UTF-8 instead of failing.
///
/// Byte-level truncation can leave a partial multi-byte character at the end
/// of a filename, and event logs and JSON reports must still be writable.
pub fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Byte length of the final path component; 0 when there is none.
#[must_use]
pub fn basename_len(path: &Path) -> usize {
    path.file_name()
        .map_or(0, |name| name.as_encoded_bytes().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
    }

    #[cfg(unix)]
    #[test]
    fn invalid_utf8_serializes_with_replacement() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let path = PathBuf::from(OsString::from_vec(b"/out/caf\xc3".to_vec()));
        let json = serde_json::to_string(&Wrapper { path }).expect("serialize");
        assert_eq!(json, "{\"path\":\"/out/caf\u{fffd}\"}");
    }

    #[test]
    fn basename_len_counts_bytes() {
        assert_eq!(basename_len(Path::new("/out/é.png")), 6);
        assert_eq!(basename_len(Path::new("/")), 0);
    }
}
