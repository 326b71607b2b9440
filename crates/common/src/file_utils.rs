/// Error type for file names announced by remote providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
}

impl FileNameError {
    pub fn message(&self) -> &'static str {
        match self {
            FileNameError::Empty => "File name cannot be empty",
            FileNameError::ContainsNullByte => "File name cannot contain null bytes",
            FileNameError::ContainsPathSeparator => {
                "File name cannot contain path separators (/ or \\)"
            }
            FileNameError::IsSpecialDirectory => "File name cannot be '.' or '..'",
        }
    }
}

impl std::fmt::Display for FileNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FileNameError {}

/// Normalize a host download directory to the form the node expects.
///
/// The node runs under a POSIX layer, so a Windows path such as
/// `C:\Users\a\Downloads` becomes `/mnt/c/Users/a/Downloads`.
/// Anything that does not start with a drive letter is returned unchanged.
pub fn normalize_download_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/');

    if !has_drive {
        return path.to_string();
    }

    let drive = (bytes[0] as char).to_ascii_lowercase();
    let rest = path[2..].replace('\\', "/");
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        format!("/mnt/{}", drive)
    } else {
        format!("/mnt/{}/{}", drive, rest)
    }
}

/// Check a remote file name before it is joined onto the download directory.
pub fn validate_file_name(name: &str) -> Result<(), FileNameError> {
    if name.is_empty() {
        return Err(FileNameError::Empty);
    }
    if name.contains('\0') {
        return Err(FileNameError::ContainsNullByte);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(FileNameError::ContainsPathSeparator);
    }
    if name == "." || name == ".." {
        return Err(FileNameError::IsSpecialDirectory);
    }
    Ok(())
}

/// Destination path handed to `p2p_getFile`, always forward-slash separated
pub fn download_target(download_dir: &str, file_name: &str) -> Result<String, FileNameError> {
    validate_file_name(file_name)?;
    let dir = download_dir.trim_end_matches('/');
    Ok(format!("{}/{}", dir, file_name))
}
