use crate::Error;

/// A `:name` or `*name` segment found in a route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wildcard<'p> {
    /// The wildcard including its sigil, up to the next `/` or the end.
    pub text: &'p str,
    /// Byte offset of the sigil.
    pub start: usize,
    /// False when a second sigil appears in the same segment.
    pub valid: bool,
}

impl<'p> Wildcard<'p> {
    pub fn is_catch_all(&self) -> bool {
        self.text.starts_with('*')
    }

    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Returns the first wildcard segment of `path`.
pub(crate) fn find_wildcard(path: &str) -> Option<Wildcard<'_>> {
    let bytes = path.as_bytes();
    let start = bytes.iter().position(|&b| b == b':' || b == b'*')?;

    let mut valid = true;
    for (offset, &b) in bytes[start + 1..].iter().enumerate() {
        match b {
            b'/' => {
                return Some(Wildcard {
                    text: &path[start..start + 1 + offset],
                    start,
                    valid,
                })
            }
            b':' | b'*' => valid = false,
            _ => {}
        }
    }

    Some(Wildcard {
        text: &path[start..],
        start,
        valid,
    })
}

/// Rejects malformed wildcards before the tree is touched.
///
/// These checks depend on the path alone, so running them up front keeps
/// the reported error independent of which routes were registered before.
pub(crate) fn validate_path(path: &str) -> Result<(), Error> {
    let mut offset = 0;
    while let Some(found) = find_wildcard(&path[offset..]) {
        let wildcard = Wildcard {
            start: offset + found.start,
            ..found
        };
        check(&wildcard, path)?;

        if wildcard.is_catch_all() {
            if wildcard.end() != path.len() {
                return Err(Error::CatchAllNotAtEnd { path: path.to_owned() });
            }
            if wildcard.start == 0 || path.as_bytes()[wildcard.start - 1] != b'/' {
                return Err(Error::NoSlashBeforeCatchAll { path: path.to_owned() });
            }
        }
        offset = wildcard.end();
    }
    Ok(())
}

/// Checks every wildcard must pass regardless of its kind.
pub(crate) fn check(wildcard: &Wildcard<'_>, full_path: &str) -> Result<(), Error> {
    if !wildcard.valid {
        return Err(Error::InvalidWildcard {
            wildcard: wildcard.text.to_owned(),
            path: full_path.to_owned(),
        });
    }
    if wildcard.text.len() < 2 {
        return Err(Error::EmptyWildcardName {
            path: full_path.to_owned(),
        });
    }
    Ok(())
}
