//! Extension-based entry classification
//!
//! Classification looks at the file name only. File contents are never
//! inspected, so a renamed file is classified by its new name.

use std::path::Path;

/// Type label used for every directory
pub const FOLDER_LABEL: &str = "文件夹";
/// Suffix appended to an uppercased extension, and the label of files without one
pub const FILE_LABEL: &str = "文件";

const DOC_EXTENSIONS: &[&str] = &["txt", "doc", "docx", "pdf", "md", "rtf"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv"];
const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "msi"];

/// Display category of an entry
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum IconTag {
    Doc,
    Image,
    Audio,
    Video,
    Executable,
    Generic,
    Folder,
}

impl IconTag {
    /// Glyph shown next to the entry name
    pub fn glyph(self) -> &'static str {
        match self {
            IconTag::Folder => "📁",
            IconTag::Doc => "📝",
            IconTag::Image => "🖼️",
            IconTag::Audio => "🔊",
            IconTag::Video => "🎬",
            IconTag::Executable => "⚙️",
            IconTag::Generic => "📄",
        }
    }
}

/// Extension of a file name, without the dot.
///
/// A name that only starts with a dot (".bashrc") has no extension.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
}

/// Icon category for a path
pub fn icon_for(path: &Path, is_dir: bool) -> IconTag {
    if is_dir {
        return IconTag::Folder;
    }

    let Some(ext) = extension_of(path) else {
        return IconTag::Generic;
    };
    let ext = ext.to_lowercase();
    let ext = ext.as_str();

    if DOC_EXTENSIONS.contains(&ext) {
        IconTag::Doc
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        IconTag::Image
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        IconTag::Audio
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        IconTag::Video
    } else if EXECUTABLE_EXTENSIONS.contains(&ext) {
        IconTag::Executable
    } else {
        IconTag::Generic
    }
}

/// Human readable type label ("TXT文件", "文件", "文件夹")
pub fn type_label_for(path: &Path, is_dir: bool) -> String {
    if is_dir {
        return FOLDER_LABEL.to_string();
    }
    match extension_of(path) {
        Some(ext) => format!("{}{}", ext.to_uppercase(), FILE_LABEL),
        None => FILE_LABEL.to_string(),
    }
}

/// Classify a path in one go
pub fn classify(path: &Path, is_dir: bool) -> (IconTag, String) {
    (icon_for(path, is_dir), type_label_for(path, is_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_by_extension() {
        assert_eq!(icon_for(Path::new("notes.txt"), false), IconTag::Doc);
        assert_eq!(icon_for(Path::new("report.PDF"), false), IconTag::Doc);
        assert_eq!(icon_for(Path::new("photo.JpEg"), false), IconTag::Image);
        assert_eq!(icon_for(Path::new("song.flac"), false), IconTag::Audio);
        assert_eq!(icon_for(Path::new("clip.mkv"), false), IconTag::Video);
        assert_eq!(icon_for(Path::new("setup.msi"), false), IconTag::Executable);
        assert_eq!(icon_for(Path::new("data.bin"), false), IconTag::Generic);
        assert_eq!(icon_for(Path::new("Makefile"), false), IconTag::Generic);
    }

    #[test]
    fn test_directories_ignore_their_name() {
        assert_eq!(
            classify(Path::new("holiday.png"), true),
            (IconTag::Folder, "文件夹".to_string())
        );
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label_for(Path::new("a.txt"), false), "TXT文件");
        assert_eq!(type_label_for(Path::new("a.tar.gz"), false), "GZ文件");
        assert_eq!(type_label_for(Path::new("README"), false), "文件");
        assert_eq!(type_label_for(Path::new(".bashrc"), false), "文件");
        assert_eq!(type_label_for(Path::new("trailing."), false), "文件");
    }

    #[test]
    fn test_renamed_file_follows_new_name() {
        // Same bytes, different name: only the name counts.
        assert_eq!(icon_for(Path::new("movie.mp4"), false), IconTag::Video);
        assert_eq!(icon_for(Path::new("movie.mp4.txt"), false), IconTag::Doc);
    }
}
