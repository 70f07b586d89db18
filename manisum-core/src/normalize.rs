use std::path::{Component, Path};

/// Express `resolved` relative to `base` with `/` separators.
///
/// Both paths are expected to be already resolved (canonicalized). Paths that
/// do not live under `base` are returned as-is. Prefix matching is done per
/// component, so `/srv/app2/x` is not considered under `/srv/app`.
pub fn relative_to_base(resolved: &Path, base: &Path) -> String {
    match resolved.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => resolved.to_string_lossy().into_owned(),
        Ok(rel) => join_slash(rel),
        Err(_) => resolved.to_string_lossy().into_owned(),
    }
}

/// Join the normal components of `rel` with `/`.
pub fn join_slash(rel: &Path) -> String {
    let mut out = String::new();
    for comp in rel.components() {
        if let Component::Normal(part) = comp {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}
