// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input acquisition — the native file picker and the extension allow-list.

use std::path::PathBuf;

use ocrpro_core::{SUPPORTED_EXTENSIONS, is_supported_image};
use tracing::{debug, warn};

/// Ask the user for image files with the platform's file dialog.
///
/// A cancelled dialog yields no paths.
pub fn pick_images() -> Vec<PathBuf> {
    let picked = rfd::FileDialog::new()
        .set_title("Select images")
        .add_filter("Images", SUPPORTED_EXTENSIONS)
        .pick_files()
        .unwrap_or_default();
    debug!(count = picked.len(), "files picked");
    picked
}

/// Keep only paths with a supported image extension, warning about the rest.
pub fn filter_supported(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            let ok = is_supported_image(path);
            if !ok {
                warn!(path = %path.display(), "skipping unsupported file type");
            }
            ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_paths_are_dropped_in_order() {
        let kept = filter_supported(vec![
            PathBuf::from("b.PNG"),
            PathBuf::from("notes.txt"),
            PathBuf::from("a.jpeg"),
            PathBuf::from("archive.tar.gz"),
        ]);
        assert_eq!(kept, vec![PathBuf::from("b.PNG"), PathBuf::from("a.jpeg")]);
    }
}
