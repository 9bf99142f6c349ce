//! Resolution of the positional argument into a file or raw-text input.

use intake_domain::InputSource;
use std::path::{self, Path};
use tracing::{info, warn};

/// Decide whether `arg` names an existing file or is content to classify.
///
/// Existing regular files become absolute file inputs. Anything else is raw
/// text; a warning is logged when it looks like a mistyped path.
pub fn resolve_input(arg: &str) -> InputSource {
    let candidate = Path::new(arg);

    if candidate.is_file() {
        let absolute = path::absolute(candidate).unwrap_or_else(|_| candidate.to_path_buf());
        info!(path = %absolute.display(), "Input resolved to existing file");
        return InputSource::file(absolute);
    }

    if looks_like_path(arg) {
        warn!(
            input = arg,
            "Input looks like a file path but no such file exists, treating it as raw text"
        );
    }
    InputSource::raw(arg)
}

/// Heuristic for arguments that were probably meant as paths.
pub fn looks_like_path(arg: &str) -> bool {
    if arg.chars().count() <= 3 {
        return false;
    }

    let has_separator = arg.contains(path::MAIN_SEPARATOR) || arg.contains('/');
    let dotted_name = Path::new(arg)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains('.') && name.chars().count() > 1);

    has_separator || dotted_name
}
