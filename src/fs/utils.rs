//! Copy, move and delete with collision-safe destination names

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// Default streaming buffer for file copies
pub const DEFAULT_COPY_BUFFER: usize = 1024 * 1024;

/// Tunables for copy and move
#[derive(Clone, Copy, Debug)]
pub struct CopyOptions {
    /// Bytes read per chunk when streaming a file
    pub buffer_size: usize,
    /// Carry modification time and Unix permissions over to the copy
    pub preserve_attributes: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_COPY_BUFFER,
            preserve_attributes: true,
        }
    }
}

/// True if something (even a dangling symlink) occupies the path
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// The `attempt`-th name tried for `name`: the name itself first, then
/// `stem(1).ext`, `stem(2).ext`, ... Built from raw OS strings so names
/// that are not valid UTF-8 survive unchanged.
fn candidate_name(name: &OsStr, attempt: u64) -> OsString {
    if attempt == 0 {
        return name.to_os_string();
    }

    let as_path = Path::new(name);
    let mut candidate = as_path.file_stem().unwrap_or(name).to_os_string();
    candidate.push(format!("({attempt})"));
    if let Some(ext) = as_path.extension() {
        candidate.push(".");
        candidate.push(ext);
    }
    candidate
}

/// Pick a free destination for `name` inside `dest_dir`.
///
/// `report.txt` becomes `report(1).txt`, `report(2).txt`, ... The extension
/// is kept for directories as well.
pub fn unique_destination(dest_dir: &Path, name: &OsStr) -> PathBuf {
    let mut attempt: u64 = 0;
    loop {
        let candidate = dest_dir.join(candidate_name(name, attempt));
        if !is_taken(&candidate) {
            return candidate;
        }
        attempt += 1;
    }
}

/// Reserve a free destination for `name` by creating it exclusively: an
/// empty directory when `as_dir`, an empty file otherwise.
///
/// A name that shows up between the check and the create is skipped, so
/// nothing that already exists is ever written to.
fn claim_destination(dest_dir: &Path, name: &OsStr, as_dir: bool) -> io::Result<PathBuf> {
    let mut attempt: u64 = 0;
    loop {
        let candidate = dest_dir.join(candidate_name(name, attempt));
        attempt += 1;
        if is_taken(&candidate) {
            continue;
        }

        let created = if as_dir {
            fs::create_dir(&candidate)
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .map(drop)
        };
        match created {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
}

/// True if `dest_dir` is `src` itself or lies inside it
pub fn is_inside(src: &Path, dest_dir: &Path) -> bool {
    let Ok(src) = src.canonicalize() else {
        return false;
    };
    let Ok(dest) = dest_dir.canonicalize() else {
        return false;
    };
    dest.starts_with(src)
}

/// Preserve file attributes (permissions, modification time) from src to dest.
/// Best-effort: errors are ignored since the data is already written.
fn preserve_attributes(src: &Path, dest: &Path) {
    if let Ok(meta) = fs::metadata(src) {
        if let Ok(mtime) = meta.modified() {
            let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime));
        }
        #[cfg(unix)]
        {
            let _ = fs::set_permissions(dest, meta.permissions());
        }
    }
}

fn stream(reader: &mut fs::File, writer: &mut fs::File, buffer_size: usize) -> io::Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;

    Ok(total)
}

/// Stream one file through a fixed-size buffer into a new file.
/// Fails with `AlreadyExists` rather than overwrite `dest`. Returns bytes copied.
pub fn copy_file_buffered(src: &Path, dest: &Path, buffer_size: usize) -> io::Result<u64> {
    let mut reader = fs::File::open(src)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;
    stream(&mut reader, &mut writer, buffer_size)
}

fn copy_dir_recursive(src: &Path, dest: &Path, opts: &CopyOptions) -> io::Result<()> {
    fs::create_dir(dest)?;
    copy_dir_contents(src, dest, opts)
}

fn copy_dir_contents(src: &Path, dest: &Path, opts: &CopyOptions) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dest_path, opts)?;
        } else {
            copy_file_buffered(&src_path, &dest_path, opts.buffer_size)?;
            if opts.preserve_attributes {
                preserve_attributes(&src_path, &dest_path);
            }
        }
    }

    // Last, so creating children doesn't bump the directory mtime
    if opts.preserve_attributes {
        preserve_attributes(src, dest);
    }

    Ok(())
}

/// Copy `src` onto a destination already reserved by `claim_destination`
fn fill_claimed(src: &Path, dest: &Path, opts: &CopyOptions) -> io::Result<()> {
    let dest_is_dir = fs::symlink_metadata(dest)?.is_dir();

    if src.is_dir() {
        if !dest_is_dir {
            // Claimed as a file for a symlink that points at a directory
            fs::remove_file(dest)?;
            fs::create_dir(dest)?;
        }
        return copy_dir_contents(src, dest, opts);
    }

    let mut reader = fs::File::open(src)?;
    let mut writer = OpenOptions::new().write(true).truncate(true).open(dest)?;
    stream(&mut reader, &mut writer, opts.buffer_size)?;
    drop(writer);
    if opts.preserve_attributes {
        preserve_attributes(src, dest);
    }
    Ok(())
}

/// Checks shared by copy and move: source exists, destination is a
/// directory, and a directory is not pasted into itself.
/// Returns the source's file name.
fn prepare_transfer<'a>(src: &'a Path, dest_dir: &Path) -> AppResult<&'a OsStr> {
    if let Err(e) = fs::symlink_metadata(src) {
        return Err(AppError::copy_failed(src, e));
    }
    if !dest_dir.is_dir() {
        return Err(AppError::NotADirectory(dest_dir.to_path_buf()));
    }
    if src.is_dir() && is_inside(src, dest_dir) {
        return Err(AppError::copy_failed(
            src,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination is inside the source directory",
            ),
        ));
    }

    src.file_name().ok_or_else(|| {
        AppError::copy_failed(
            src,
            io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })
}

/// Copy `src` into `dest_dir` without overwriting anything.
///
/// Returns the path actually written. On failure a partial destination may
/// be left behind.
pub fn copy_to(src: &Path, dest_dir: &Path, opts: &CopyOptions) -> AppResult<PathBuf> {
    let name = prepare_transfer(src, dest_dir)?;
    let dest = claim_destination(dest_dir, name, src.is_dir())
        .map_err(|e| AppError::copy_failed(src, e))?;
    fill_claimed(src, &dest, opts).map_err(|e| AppError::copy_failed(src, e))?;
    log::info!("copied {} -> {}", src.display(), dest.display());
    Ok(dest)
}

/// Move `src` into `dest_dir` without overwriting anything.
///
/// The destination name is reserved first, then a rename onto the
/// reservation is tried. Otherwise falls back to `move_by_copy`.
pub fn move_to(src: &Path, dest_dir: &Path, opts: &CopyOptions) -> AppResult<PathBuf> {
    let name = prepare_transfer(src, dest_dir)?;
    // A symlink is moved as itself, so reserve by what the link is
    let as_dir = fs::symlink_metadata(src).is_ok_and(|m| m.is_dir());
    let dest = claim_destination(dest_dir, name, as_dir)
        .map_err(|e| AppError::copy_failed(src, e))?;

    if fs::rename(src, &dest).is_ok() {
        log::info!("moved {} -> {}", src.display(), dest.display());
        return Ok(dest);
    }

    move_by_copy(src, &dest, opts)?;
    log::info!("moved {} -> {} (copy + remove)", src.display(), dest.display());
    Ok(dest)
}

/// Second half of a move that could not be renamed (e.g. across
/// filesystems): fill the reserved `dest`, then remove `src`.
///
/// The source is only removed after the copy succeeded. If removal fails the
/// copy stays in place and `MoveFailed` is returned.
fn move_by_copy(src: &Path, dest: &Path, opts: &CopyOptions) -> AppResult<()> {
    fill_claimed(src, dest, opts).map_err(|e| AppError::copy_failed(src, e))?;
    remove_path(src).map_err(|e| AppError::move_failed(src, e))
}

fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Delete a file or directory tree. Irreversible.
///
/// A symlink is removed itself, never its target.
pub fn delete_path(path: &Path) -> AppResult<()> {
    remove_path(path).map_err(|e| AppError::delete_failed(path, e))?;
    log::info!("deleted {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src_dir = tmp.path().join("src");
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&src_dir).unwrap();
        fs::create_dir(&dest_dir).unwrap();
        (tmp, src_dir, dest_dir)
    }

    #[test]
    fn test_unique_destination_free_name() {
        let (_tmp, _src, dest) = setup();
        assert_eq!(unique_destination(&dest, OsStr::new("a.txt")), dest.join("a.txt"));
    }

    #[test]
    fn test_unique_destination_counts_up() {
        let (_tmp, _src, dest) = setup();
        fs::write(dest.join("a.txt"), b"").unwrap();
        fs::write(dest.join("a(1).txt"), b"").unwrap();
        assert_eq!(unique_destination(&dest, OsStr::new("a.txt")), dest.join("a(2).txt"));
    }

    #[test]
    fn test_unique_destination_directory_keeps_extension() {
        let (_tmp, _src, dest) = setup();
        fs::create_dir(dest.join("photos.2024")).unwrap();
        fs::create_dir(dest.join("plain")).unwrap();
        assert_eq!(
            unique_destination(&dest, OsStr::new("photos.2024")),
            dest.join("photos(1).2024")
        );
        assert_eq!(unique_destination(&dest, OsStr::new("plain")), dest.join("plain(1)"));
    }

    #[test]
    fn test_copy_file_is_byte_identical() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("blob.bin");
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        // Small buffer forces many chunks.
        let opts = CopyOptions {
            buffer_size: 4096,
            ..CopyOptions::default()
        };
        let out = copy_to(&src, &dest_dir, &opts).unwrap();

        assert_eq!(out, dest_dir.join("blob.bin"));
        assert_eq!(fs::read(&out).unwrap(), data);
        assert!(src.exists());
    }

    #[test]
    fn test_copy_twice_never_overwrites() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("note.txt");
        fs::write(&src, b"hello").unwrap();

        let first = copy_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        let second = copy_to(&src, &dest_dir, &CopyOptions::default()).unwrap();

        assert_eq!(first, dest_dir.join("note.txt"));
        assert_eq!(second, dest_dir.join("note(1).txt"));
        assert_eq!(fs::read(&second).unwrap(), b"hello");
    }

    #[test]
    fn test_copy_into_same_directory() {
        let (_tmp, src_dir, _dest) = setup();
        let src = src_dir.join("x.md");
        fs::write(&src, b"x").unwrap();
        let out = copy_to(&src, &src_dir, &CopyOptions::default()).unwrap();
        assert_eq!(out, src_dir.join("x(1).md"));
    }

    #[test]
    fn test_copy_directory_tree() {
        let (_tmp, src_dir, dest_dir) = setup();
        let tree = src_dir.join("tree");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("top.txt"), b"top").unwrap();
        fs::write(tree.join("a/b/deep.txt"), b"deep").unwrap();

        let out = copy_to(&tree, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(fs::read(out.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(out.join("a/b/deep.txt")).unwrap(), b"deep");

        let again = copy_to(&tree, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(again, dest_dir.join("tree(1)"));
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("old.txt");
        fs::write(&src, b"x").unwrap();
        let stamp = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&src, stamp).unwrap();

        let out = copy_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        let meta = fs::metadata(&out).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), stamp);
    }

    #[test]
    fn test_copy_into_itself_is_refused() {
        let (_tmp, src_dir, _dest) = setup();
        let tree = src_dir.join("tree");
        fs::create_dir_all(tree.join("inner")).unwrap();

        let err = copy_to(&tree, &tree.join("inner"), &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::CopyFailed { .. }));
        assert!(!tree.join("inner").join("tree").exists());
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let (_tmp, src_dir, dest_dir) = setup();
        let err = copy_to(&src_dir.join("ghost"), &dest_dir, &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::CopyFailed { .. }));
    }

    #[test]
    fn test_copy_to_non_directory_fails() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("a.txt");
        fs::write(&src, b"a").unwrap();
        let err = copy_to(&src, &dest_dir.join("nowhere"), &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::NotADirectory(_)));
    }

    #[test]
    fn test_move_file() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("m.txt");
        fs::write(&src, b"payload").unwrap();

        let out = move_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&out).unwrap(), b"payload");
    }

    #[test]
    fn test_move_resolves_collision() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("m.txt"), b"existing").unwrap();
        let src = src_dir.join("m.txt");
        fs::write(&src, b"incoming").unwrap();

        let out = move_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(out, dest_dir.join("m(1).txt"));
        assert_eq!(fs::read(dest_dir.join("m.txt")).unwrap(), b"existing");
        assert_eq!(fs::read(&out).unwrap(), b"incoming");
    }

    #[test]
    fn test_move_directory() {
        let (_tmp, src_dir, dest_dir) = setup();
        let tree = src_dir.join("tree");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("f"), b"f").unwrap();

        let out = move_to(&tree, &dest_dir, &CopyOptions::default()).unwrap();
        assert!(!tree.exists());
        assert_eq!(fs::read(out.join("f")).unwrap(), b"f");
    }

    #[test]
    fn test_delete_file_and_tree() {
        let (_tmp, src_dir, _dest) = setup();
        let file = src_dir.join("f.txt");
        fs::write(&file, b"f").unwrap();
        let tree = src_dir.join("tree");
        fs::create_dir_all(tree.join("x/y")).unwrap();

        delete_path(&file).unwrap();
        delete_path(&tree).unwrap();
        assert!(!file.exists());
        assert!(!tree.exists());
    }

    #[test]
    fn test_delete_missing_fails() {
        let (_tmp, src_dir, _dest) = setup();
        let err = delete_path(&src_dir.join("ghost")).unwrap_err();
        assert!(matches!(err, AppError::DeleteFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_symlink_keeps_target() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("keep.txt"), b"k").unwrap();
        let link = src_dir.join("link");
        std::os::unix::fs::symlink(&dest_dir, &link).unwrap();

        delete_path(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(dest_dir.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_taken() {
        let (_tmp, _src, dest_dir) = setup();
        std::os::unix::fs::symlink(dest_dir.join("gone"), dest_dir.join("a.txt")).unwrap();
        assert_eq!(unique_destination(&dest_dir, OsStr::new("a.txt")), dest_dir.join("a(1).txt"));
    }

    // Linux filesystems accept arbitrary bytes in names; APFS does not
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_kept_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let (_tmp, src_dir, dest_dir) = setup();
        let name = OsStr::from_bytes(b"bad\xffname.txt");
        let src = src_dir.join(name);
        fs::write(&src, b"raw").unwrap();

        let first = copy_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(first.file_name().unwrap().as_bytes(), b"bad\xffname.txt");
        assert_eq!(fs::read(&first).unwrap(), b"raw");

        // A different name with the same lossy rendering is not a collision
        let other = src_dir.join(OsStr::from_bytes(b"bad\xfename.txt"));
        fs::write(&other, b"other").unwrap();
        let second = copy_to(&other, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(second.file_name().unwrap().as_bytes(), b"bad\xfename.txt");

        let third = move_to(&src, &dest_dir, &CopyOptions::default()).unwrap();
        assert_eq!(third.file_name().unwrap().as_bytes(), b"bad\xffname(1).txt");
        assert!(!src.exists());
    }

    #[test]
    fn test_claim_never_reuses_a_name() {
        let (_tmp, _src, dest_dir) = setup();
        let first = claim_destination(&dest_dir, OsStr::new("a.txt"), false).unwrap();
        let second = claim_destination(&dest_dir, OsStr::new("a.txt"), false).unwrap();
        let third = claim_destination(&dest_dir, OsStr::new("a.txt"), true).unwrap();

        assert_eq!(first, dest_dir.join("a.txt"));
        assert_eq!(second, dest_dir.join("a(1).txt"));
        assert_eq!(third, dest_dir.join("a(2).txt"));
        assert!(first.is_file());
        assert!(third.is_dir());
    }

    #[test]
    fn test_copy_file_buffered_refuses_existing_target() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("new.txt");
        let dest = dest_dir.join("taken.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"keep me").unwrap();

        let err = copy_file_buffered(&src, &dest, 1024).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"keep me");
    }

    #[test]
    fn test_move_by_copy_file() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("m.txt");
        fs::write(&src, b"payload").unwrap();

        let dest = claim_destination(&dest_dir, OsStr::new("m.txt"), false).unwrap();
        move_by_copy(&src, &dest, &CopyOptions::default()).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_move_by_copy_directory_tree() {
        let (_tmp, src_dir, dest_dir) = setup();
        let tree = src_dir.join("tree");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("a/b/deep.txt"), b"deep").unwrap();

        let dest = claim_destination(&dest_dir, OsStr::new("tree"), true).unwrap();
        move_by_copy(&tree, &dest, &CopyOptions::default()).unwrap();

        assert!(!tree.exists());
        assert_eq!(fs::read(dest.join("a/b/deep.txt")).unwrap(), b"deep");
    }

    // procfs entries can be read but never removed, even by root
    #[cfg(target_os = "linux")]
    #[test]
    fn test_move_by_copy_keeps_copy_when_source_cannot_be_removed() {
        let (_tmp, _src, dest_dir) = setup();
        let src = Path::new("/proc/version");
        let expected = fs::read(src).unwrap();

        let dest = claim_destination(&dest_dir, OsStr::new("version"), false).unwrap();
        let err = move_by_copy(src, &dest, &CopyOptions::default()).unwrap_err();

        assert!(matches!(err, AppError::MoveFailed { .. }));
        assert_eq!(fs::read(&dest).unwrap(), expected);
        assert!(src.exists());
    }

    #[test]
    fn test_move_copy_failure_is_copy_failed() {
        let (_tmp, src_dir, dest_dir) = setup();
        let dest = claim_destination(&dest_dir, OsStr::new("ghost"), false).unwrap();
        let err = move_by_copy(&src_dir.join("ghost"), &dest, &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::CopyFailed { .. }));
    }
}
