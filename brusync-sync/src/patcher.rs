//! Auth block rewriting for `collection.bru`.
//!
//! Matching is textual. Whitespace inside the recognised blocks may vary, but
//! a structurally different auth section is left alone rather than reported.
//!
//! Recognised shapes:
//!
//! ```text
//! auth { mode: none }
//!
//! auth { mode: bearer }
//! auth:bearer { token: {{authToken}} }
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::error::{io_err, SyncError};

/// File name of a collection root inside a service directory.
pub const COLLECTION_FILE: &str = "collection.bru";

/// Canonical "no authentication" block.
pub const NO_AUTH_BLOCK: &str = "auth {\n  mode: none\n}";

static NO_AUTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bauth\s*\{\s*mode:\s*none\s*\}").expect("valid regex"));

/// A primary `auth { … }` block plus an optional `auth:<mode> { … }` block
/// whose body may hold `{{variable}}` templates.
static ANY_AUTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bauth\s*\{[^{}]*\}(?:\s*auth:[a-z0-9]+\s*\{(?:[^{}]|\{\{[^{}]*\}\})*\})?")
        .expect("valid regex")
});

/// Outcome of patching one collection file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchResult {
    /// No collection file at the expected path.
    Missing,
    /// Nothing matched, or the replacement equalled the original.
    Unchanged,
    /// The file was rewritten.
    Patched,
}

/// `<workspace>/<acronym>/collection.bru`.
pub fn collection_path(workspace_root: &Path, acronym: &str) -> PathBuf {
    workspace_root.join(acronym).join(COLLECTION_FILE)
}

/// The two-block bearer template for `token_variable`.
pub fn bearer_block(token_variable: &str) -> String {
    format!("auth {{\n  mode: bearer\n}}\n\nauth:bearer {{\n  token: {{{{{token_variable}}}}}\n}}")
}

/// Replace every "no auth" block with the bearer template.
pub fn inject_bearer_text(content: &str, token_variable: &str) -> String {
    let block = bearer_block(token_variable);
    NO_AUTH_RE.replace_all(content, NoExpand(&block)).into_owned()
}

/// Replace every auth block (and its mode sub-block) with [`NO_AUTH_BLOCK`].
pub fn remove_auth_text(content: &str) -> String {
    ANY_AUTH_RE
        .replace_all(content, NoExpand(NO_AUTH_BLOCK))
        .into_owned()
}

/// Switch the service's collection to bearer auth. Idempotent.
pub async fn inject_bearer_auth(
    workspace_root: &Path,
    acronym: &str,
    token_variable: &str,
) -> Result<PatchResult, SyncError> {
    let path = collection_path(workspace_root, acronym);
    patch_file(&path, |content| inject_bearer_text(content, token_variable)).await
}

/// Switch the service's collection back to no auth. Idempotent.
pub async fn remove_auth(workspace_root: &Path, acronym: &str) -> Result<PatchResult, SyncError> {
    let path = collection_path(workspace_root, acronym);
    patch_file(&path, remove_auth_text).await
}

/// Read, transform, and write back only when the content changed, so an
/// untouched file keeps its mtime.
pub(crate) async fn patch_file(
    path: &Path,
    transform: impl FnOnce(&str) -> String,
) -> Result<PatchResult, SyncError> {
    if !tokio::fs::try_exists(path).await.map_err(|e| io_err(path, e))? {
        return Ok(PatchResult::Missing);
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_err(path, e))?;
    let updated = transform(&content);
    if updated == content {
        tracing::debug!("auth unchanged: {}", path.display());
        return Ok(PatchResult::Unchanged);
    }
    write_atomic(path, &updated).await?;
    tracing::debug!("auth patched: {}", path.display());
    Ok(PatchResult::Patched)
}

/// `<path>.brusync.tmp` sibling, then rename over the target.
pub(crate) async fn write_atomic(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = PathBuf::from(format!("{}.brusync.tmp", path.display()));
    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use filetime::{set_file_mtime, FileTime};
    use rstest::rstest;
    use tempfile::TempDir;

    const BEARER: &str = "auth {\n  mode: bearer\n}\n\nauth:bearer {\n  token: {{authToken}}\n}";

    fn collection_with(content: &str) -> TempDir {
        let workspace = TempDir::new().expect("workspace");
        let path = collection_path(workspace.path(), "iam");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        workspace
    }

    #[test]
    fn bearer_block_is_parameterised() {
        assert_eq!(bearer_block("authToken"), BEARER);
        assert!(bearer_block("jwt").contains("token: {{jwt}}"));
    }

    #[rstest]
    #[case("compact", "auth { mode: none }")]
    #[case("multiline", "auth {\n  mode: none\n}")]
    #[case("tight", "auth{mode:none}")]
    #[case("tabs", "auth\t{\t mode:\tnone \n}")]
    fn inject_matches_whitespace_variants(#[case] label: &str, #[case] block: &str) {
        let content = format!("meta {{\n  name: iam\n}}\n\n{block}\n");
        let out = inject_bearer_text(&content, "authToken");
        assert_eq!(out, format!("meta {{\n  name: iam\n}}\n\n{BEARER}\n"), "[{label}]");
    }

    #[test]
    fn inject_is_idempotent() {
        let once = inject_bearer_text("auth { mode: none }\n", "authToken");
        let twice = inject_bearer_text(&once, "authToken");
        assert_eq!(once, twice);
    }

    #[test]
    fn inject_leaves_other_modes_alone() {
        let basic = "auth {\n  mode: basic\n}\n\nauth:basic {\n  username: u\n}\n";
        assert_eq!(inject_bearer_text(basic, "authToken"), basic);
    }

    #[test]
    fn inject_does_not_expand_dollar_in_variable() {
        let out = inject_bearer_text("auth { mode: none }", "$1");
        assert!(out.contains("{{$1}}"), "{out}");
    }

    #[test]
    fn remove_collapses_bearer_pair_exactly() {
        let out = remove_auth_text("auth { mode: bearer }\n\nauth:bearer { token: {{authToken}} }");
        assert_eq!(out, "auth {\n  mode: none\n}");
    }

    #[test]
    fn remove_keeps_surrounding_blocks() {
        let content = format!("meta {{\n  name: iam\n}}\n\n{BEARER}\n\nvars {{\n  x: 1\n}}\n");
        let out = remove_auth_text(&content);
        assert_eq!(
            out,
            format!("meta {{\n  name: iam\n}}\n\n{NO_AUTH_BLOCK}\n\nvars {{\n  x: 1\n}}\n")
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let once = remove_auth_text(BEARER);
        assert_eq!(remove_auth_text(&once), once);
    }

    #[test]
    fn remove_then_inject_restores_canonical_bearer() {
        let start = "auth {\n  mode: none\n}\n";
        let out = inject_bearer_text(&remove_auth_text(start), "authToken");
        assert_eq!(out, format!("{BEARER}\n"));
    }

    #[test]
    fn oauth_prefixed_words_are_not_auth_blocks() {
        let content = "oauth { mode: none }";
        assert_eq!(inject_bearer_text(content, "authToken"), content);
    }

    #[tokio::test]
    async fn missing_file_is_a_no_op() {
        let workspace = TempDir::new().expect("workspace");
        let result = inject_bearer_auth(workspace.path(), "iam", "authToken")
            .await
            .expect("inject");
        assert_eq!(result, PatchResult::Missing);
        let result = remove_auth(workspace.path(), "iam").await.expect("remove");
        assert_eq!(result, PatchResult::Missing);
    }

    #[tokio::test]
    async fn inject_rewrites_file_once() {
        let workspace = collection_with("auth {\n  mode: none\n}\n");
        let first = inject_bearer_auth(workspace.path(), "iam", "authToken")
            .await
            .expect("inject");
        assert_eq!(first, PatchResult::Patched);
        let second = inject_bearer_auth(workspace.path(), "iam", "authToken")
            .await
            .expect("inject again");
        assert_eq!(second, PatchResult::Unchanged);

        let path = collection_path(workspace.path(), "iam");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{BEARER}\n"));
        assert!(!PathBuf::from(format!("{}.brusync.tmp", path.display())).exists());
    }

    #[tokio::test]
    async fn no_match_preserves_content_and_mtime() {
        let original = "auth {\n  mode: basic\n}\n";
        let workspace = collection_with(original);
        let path = collection_path(workspace.path(), "iam");
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        set_file_mtime(&path, old).unwrap();

        let result = inject_bearer_auth(workspace.path(), "iam", "authToken")
            .await
            .expect("inject");
        assert_eq!(result, PatchResult::Unchanged);

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }
}
