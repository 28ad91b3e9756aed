use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref METHOD_TOKEN: Regex = Regex::new(r"^[A-Z]+$").expect("the method token pattern is a valid regex");
}

/// Method tokens are restricted to uppercase ASCII letters.
pub(crate) fn is_valid_method(method: &str) -> bool {
    METHOD_TOKEN.is_match(method)
}

pub(crate) fn percent_decode_request_path(val: &str) -> Cow<'_, str> {
    percent_decode_str(val).decode_utf8_lossy()
}

/// Number of `:` and `*` sigils in a route path.
pub(crate) fn count_params(path: &str) -> u16 {
    count_bytes(path, |b| b == b':' || b == b'*')
}

/// Number of `/` separators in a route path.
pub(crate) fn count_sections(path: &str) -> u16 {
    count_bytes(path, |b| b == b'/')
}

fn count_bytes(path: &str, pred: impl Fn(u8) -> bool) -> u16 {
    let n = path.bytes().filter(|&b| pred(b)).count();
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Joins a group's base path with a route path.
///
/// The result is cleaned. It ends in a slash only when `relative_path`
/// does.
pub(crate) fn join_paths(absolute_path: &str, relative_path: &str) -> String {
    if relative_path.is_empty() {
        return absolute_path.to_owned();
    }

    let mut final_path = clean_path(&format!("{}/{}", absolute_path, relative_path));
    let wants_slash = relative_path.ends_with('/');
    if final_path.len() > 1 && final_path.ends_with('/') && !wants_slash {
        final_path.pop();
    }
    if wants_slash && !final_path.ends_with('/') {
        final_path.push('/');
    }
    final_path
}

/// Returns the canonical form of a URL path.
///
/// Repeated slashes collapse into one, `.` elements are dropped and `..`
/// elements remove the element before them. The result is always rooted
/// and keeps a trailing slash when the input had one.
///
/// # Examples
///
/// ```
/// use gon::clean_path;
///
/// assert_eq!(clean_path("//a/./b/../c/"), "/a/c/");
/// assert_eq!(clean_path("a/b"), "/a/b");
/// assert_eq!(clean_path(""), "/");
/// ```
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut trailing = false;
    for segment in path.split('/') {
        match segment {
            "" => {}
            "." => trailing = true,
            ".." => {
                segments.pop();
                trailing = false;
            }
            other => {
                segments.push(other);
                trailing = false;
            }
        }
    }
    if path.len() > 1 && path.ends_with('/') {
        trailing = true;
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() || trailing {
        cleaned.push('/');
    }
    cleaned
}
