//! URL path normalization.

/// Returns the canonical form of `p`, eliminating `.` and `..` elements.
///
/// The rules, applied iteratively until none apply:
///
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path name element (the current directory).
/// 3. Eliminate each inner `..` path name element (the parent directory)
///    along with the non-`..` element that precedes it.
/// 4. Eliminate `..` elements that begin a rooted path, that is, replace
///    `/..` by `/` at the beginning of a path.
///
/// A leading slash is added when missing, and a trailing slash is kept.
/// The empty path becomes `/`.
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let src = p.as_bytes();
    let n = src.len();
    let mut trailing = n > 1 && src[n - 1] == b'/';

    let mut out: Vec<u8> = Vec::with_capacity(n + 1);
    out.push(b'/');
    let mut r = usize::from(src[0] == b'/');

    while r < n {
        if src[r] == b'/' {
            // empty path element
            r += 1;
        } else if src[r] == b'.' && r + 1 == n {
            // trailing `.` element
            trailing = true;
            r += 1;
        } else if src[r] == b'.' && src[r + 1] == b'/' {
            // `.` element
            r += 2;
        } else if src[r] == b'.' && src[r + 1] == b'.' && (r + 2 == n || src[r + 2] == b'/') {
            // `..` element: backtrack past the previous element
            r += 3;
            if out.len() > 1 {
                out.pop();
                while out.len() > 1 && out[out.len() - 1] != b'/' {
                    out.pop();
                }
                if out.len() > 1 {
                    out.pop();
                }
            }
        } else {
            // real path element, preceded by a slash unless at the root
            if out.len() > 1 {
                out.push(b'/');
            }
            while r < n && src[r] != b'/' {
                out.push(src[r]);
                r += 1;
            }
        }
    }

    if trailing && out.len() > 1 {
        out.push(b'/');
    }

    // Only ASCII bytes are ever removed, so the result stays valid UTF-8
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
