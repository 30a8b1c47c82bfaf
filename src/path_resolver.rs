// path_resolver.rs — Icon reference path normalization
//
// Pure functions: quote trimming, %VAR% expansion, relative-to-base
// resolution and extension classification.  Nothing here touches the
// filesystem or the process working directory.

use std::path::{Component, Path, PathBuf};

use crate::environment_provider::EnvironmentProvider;





/// Icon source file kinds accepted in an IconResource entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSourceKind {
    /// Single icon file; the index is always 0.
    Ico,

    /// Module with indexed icon resources; the index selects one.
    Dll,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl IconSourceKind
//
//  Extension-to-kind mapping.
//
////////////////////////////////////////////////////////////////////////////////

impl IconSourceKind {
    ////////////////////////////////////////////////////////////////////////////
    //
    //  from_extension
    //
    //  Maps a lowercase extension with leading dot (as returned by
    //  extension_of) to a source kind.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn from_extension(ext: &str) -> Option<IconSourceKind> {
        match ext {
            ".ico" => Some(IconSourceKind::Ico),
            ".dll" => Some(IconSourceKind::Dll),
            _      => None,
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  from_path
    //
    //  Classifies a path by its extension.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn from_path(path: &Path) -> Option<IconSourceKind> {
        Self::from_extension(&extension_of(path))
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  trim_quotes
//
//  Removes one matching pair of surrounding double quotes.  Unquoted input
//  (or a lone quote) is returned unchanged.
//
////////////////////////////////////////////////////////////////////////////////

pub fn trim_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  expand_env_vars
//
//  Expands %NAME% references (e.g. %SystemRoot%\System32\shell32.dll).
//  Unknown names and unterminated references are kept verbatim.
//
////////////////////////////////////////////////////////////////////////////////

pub fn expand_env_vars(s: &str, env: &dyn EnvironmentProvider) -> String {
    let mut out  = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(len) = after.find('%') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..len];

        match env.get_env_var(name) {
            Some(value) if !name.is_empty() => {
                out.push_str(&value);
                rest = &after[len + 1..];
            }
            _ => {
                // Keep the opening '%' and rescan from the closing one, so
                // "100%%Var%" still expands %Var%.
                out.push('%');
                out.push_str(name);
                rest = &after[len..];
            }
        }
    }

    out.push_str(rest);
    out
}





////////////////////////////////////////////////////////////////////////////////
//
//  resolve_relative
//
//  Returns `maybe_relative` unchanged when absolute; otherwise joins it onto
//  the parent directory of `base_path` (the configuration file itself).
//  `.` and `..` components of the joined result are folded lexically.
//
////////////////////////////////////////////////////////////////////////////////

pub fn resolve_relative(base_path: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        return maybe_relative.to_path_buf();
    }

    let base_dir = base_path.parent().unwrap_or(Path::new(""));
    normalize_lexically(&base_dir.join(maybe_relative))
}





////////////////////////////////////////////////////////////////////////////////
//
//  normalize_lexically
//
//  Drops `.` components and folds `name/..` pairs without consulting the
//  filesystem.  A `..` directly under a root is discarded; leading `..`
//  components of a relative path are kept.
//
////////////////////////////////////////////////////////////////////////////////

pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_))                        => { out.pop(); }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _                                                 => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    out
}





////////////////////////////////////////////////////////////////////////////////
//
//  extension_of
//
//  Lowercase extension with its leading dot (".ico"), or "" when the file
//  name has none.
//
////////////////////////////////////////////////////////////////////////////////

pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None      => String::new(),
    }
}





#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment_provider::MockEnvironment;

    ////////////////////////////////////////////////////////////////////////////
    //
    //  trim_quotes_removes_one_pair
    //
    //  Only the outermost matching pair goes; inner quotes stay.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn trim_quotes_removes_one_pair() {
        assert_eq!(trim_quotes(r#""C:\Icons\a.ico""#), r"C:\Icons\a.ico");
        assert_eq!(trim_quotes(r#"""a.ico"""#), r#""a.ico""#);
        assert_eq!(trim_quotes(r#""""#), "");
    }

    #[test]
    fn trim_quotes_is_idempotent_for_unquoted() {
        assert_eq!(trim_quotes("a.ico"), "a.ico");
        assert_eq!(trim_quotes(trim_quotes("a.ico")), "a.ico");
        assert_eq!(trim_quotes(r#""a.ico"#), r#""a.ico"#);
        assert_eq!(trim_quotes(r#"""#), r#"""#);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  expand_env_vars_*
    //
    //  Known variables are substituted; everything else survives.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn expand_env_vars_substitutes_known() {
        let env = MockEnvironment::default().with("SystemRoot", r"C:\Windows");
        assert_eq!(
            expand_env_vars(r"%SystemRoot%\System32\shell32.dll", &env),
            r"C:\Windows\System32\shell32.dll"
        );
    }

    #[test]
    fn expand_env_vars_keeps_unknown_and_unterminated() {
        let env = MockEnvironment::default().with("Icons", "lib");
        assert_eq!(expand_env_vars("%Nope%/a.ico", &env), "%Nope%/a.ico");
        assert_eq!(expand_env_vars("50%/a.ico", &env), "50%/a.ico");
        assert_eq!(expand_env_vars("%%Icons%/a.ico", &env), "%lib/a.ico");
        assert_eq!(expand_env_vars("no vars", &env), "no vars");
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  resolve_relative_*
    //
    //  Relative entries resolve against the configuration file's folder.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn resolve_relative_keeps_absolute() {
        let abs = std::env::temp_dir().join("icons").join("a.ico");
        let ini = std::env::temp_dir().join("folder").join("desktop.ini");
        assert_eq!(resolve_relative(&ini, &abs), abs);
    }

    #[test]
    fn resolve_relative_joins_parent_of_base() {
        let folder = std::env::temp_dir().join("folder");
        let ini    = folder.join("desktop.ini");
        assert_eq!(resolve_relative(&ini, Path::new("pack.dll")), folder.join("pack.dll"));
    }

    #[test]
    fn resolve_relative_folds_dot_components() {
        let root = std::env::temp_dir();
        let ini  = root.join("folder").join("desktop.ini");
        let rel  = Path::new(".").join("..").join("icons").join("a.ico");
        assert_eq!(resolve_relative(&ini, &rel), root.join("icons").join("a.ico"));
    }

    #[test]
    fn normalize_keeps_leading_parent_of_relative() {
        let p = Path::new("..").join("x").join("..").join("y.ico");
        assert_eq!(normalize_lexically(&p), Path::new("..").join("y.ico"));
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  extension_of_*
    //
    //  Lowercased, dotted, or empty.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn extension_of_lowercases_with_dot() {
        assert_eq!(extension_of(Path::new("Folder.ICO")), ".ico");
        assert_eq!(extension_of(Path::new("imageres.Dll")), ".dll");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
    }

    #[test]
    fn extension_of_empty_when_missing() {
        assert_eq!(extension_of(Path::new("README")), "");
        assert_eq!(extension_of(Path::new(".hidden")), "");
    }

    #[test]
    fn source_kind_classification() {
        assert_eq!(IconSourceKind::from_path(Path::new("a.ICO")), Some(IconSourceKind::Ico));
        assert_eq!(IconSourceKind::from_path(Path::new("a.dll")), Some(IconSourceKind::Dll));
        assert_eq!(IconSourceKind::from_path(Path::new("a.png")), None);
        assert_eq!(IconSourceKind::from_path(Path::new("a")), None);
    }
}
