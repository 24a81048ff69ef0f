//! Mapping of local paths onto the remote tree.
//!
//! Remote paths are always `/` separated, whatever the local convention is.

use std::{
    borrow::Cow,
    path::{Component, Path, MAIN_SEPARATOR},
};

/// Replaces the platform separator with `/`.
#[must_use]
pub fn to_slash(path: &str) -> Cow<'_, str> {
    if MAIN_SEPARATOR == '/' {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(path.replace(MAIN_SEPARATOR, "/"))
    }
}

/// Returns `local_path` relative to `local_root`.
///
/// Comparison is done per component, so a trailing separator on the root
/// makes no difference. A path outside of the root is returned unchanged.
#[must_use]
pub fn relative_path<'a>(local_root: &Path, local_path: &'a Path) -> &'a Path {
    local_path.strip_prefix(local_root).unwrap_or(local_path)
}

/// Maps a local path below `local_root` to its place below `remote_root`.
///
/// The root itself maps to `remote_root` unchanged. `..` segments are kept
/// as they are.
#[must_use]
pub fn map_to_remote(local_root: &Path, remote_root: &str, local_path: &Path) -> String {
    let mut remote = to_slash(remote_root).into_owned();

    for component in relative_path(local_root, local_path).components() {
        match component {
            Component::Normal(name) => push_segment(&mut remote, &name.to_string_lossy()),
            Component::ParentDir => push_segment(&mut remote, ".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    remote
}

fn push_segment(remote: &mut String, segment: &str) {
    if !remote.is_empty() && !remote.ends_with('/') {
        remote.push('/');
    }
    remote.push_str(segment);
}

/// Returns the directory containing a remote path.
///
/// A bare name lives in `.`, a top level absolute name in `/`.
#[must_use]
pub fn remote_parent(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }

    match trimmed.rfind('/') {
        None => ".",
        Some(idx) => match trimmed[..idx].trim_end_matches('/') {
            "" => "/",
            parent => parent,
        },
    }
}

/// Whether the path always exists on the remote side and never needs creating.
#[must_use]
pub fn is_implicit(path: &str) -> bool {
    matches!(path.trim_end_matches('/'), "" | ".")
}

/// Every directory that has to exist for `path` to exist, shallowest first,
/// `path` included.
#[must_use]
pub fn remote_ancestors(path: &str) -> Vec<&str> {
    let path = path.trim_end_matches('/');
    let mut ancestors = Vec::new();

    for (idx, ch) in path.char_indices() {
        if ch == '/' && idx > 0 && !path[..idx].ends_with('/') {
            ancestors.push(&path[..idx]);
        }
    }
    if !path.is_empty() {
        ancestors.push(path);
    }

    ancestors.retain(|dir| !is_implicit(dir));
    ancestors
}
