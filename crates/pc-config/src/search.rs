//! Locating config files on disk.
//!
//! A source string is resolved in this order:
//! 1. an existing file path is used as is;
//! 2. a name with an extension (`settings.json`) is looked up literally in
//!    each search directory;
//! 3. a bare app name (`myapp`) becomes `config.<ext>`, trying every
//!    supported extension in priority order in each search directory.
//!
//! Without explicit directories the search covers the working directory
//! (file names only), `~/.config` and the platform's system config
//! directory. App names search `<dir>/<app>/` in the latter two.

use pc_codec::ConfigFormat;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Placeholder replaced by each candidate extension.
pub const EXT_PLACEHOLDER: &str = "<ext>";

/// File name searched for under an app's directory.
pub const APP_CONFIG_FILE: &str = "config.<ext>";

/// `~/.config`, or `None` when the home directory is unknown.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config"))
}

/// The platform's shared config directory, optionally for one app.
///
/// Linux honors the first entry of `XDG_CONFIG_DIRS`, falling back to
/// `/etc/xdg`.
pub fn system_config_dir(appname: Option<&str>) -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support")
    } else if cfg!(windows) {
        std::env::var_os("PROGRAMDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
    } else {
        std::env::var("XDG_CONFIG_DIRS")
            .ok()
            .and_then(|list| {
                list.split(':')
                    .find(|d| !d.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from("/etc/xdg"))
    };
    match appname {
        Some(app) => base.join(app),
        None => base,
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Candidate locations when no directories were given.
pub fn default_search_paths(filename: &str, appname: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    match appname {
        Some(app) => {
            if let Some(user) = user_config_dir() {
                paths.push(user.join(app).join(filename));
            }
            paths.push(system_config_dir(Some(app)).join(filename));
        }
        None => {
            paths.push(PathBuf::from(filename));
            if let Some(user) = user_config_dir() {
                paths.push(user.join(filename));
            }
            paths.push(system_config_dir(None).join(filename));
        }
    }
    paths
}

/// Candidate locations for `filename`: inside each of `directories` when
/// given, otherwise the defaults.
pub fn search_paths(
    filename: &str,
    directories: Option<&[PathBuf]>,
    appname: Option<&str>,
) -> Vec<PathBuf> {
    match directories {
        Some(list) => list.iter().map(|d| expand_tilde(d).join(filename)).collect(),
        None => default_search_paths(filename, appname),
    }
}

/// Return `path` if it exists, else the first existing file obtained by
/// substituting each extension for the placeholder in its file name.
pub fn find_file_with_extensions(path: &Path, extensions: &[&str]) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }
    let template = path.file_name()?.to_str()?;
    extensions.iter().find_map(|ext| {
        let candidate = expand_tilde(&path.with_file_name(template.replace(EXT_PLACEHOLDER, ext)));
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found config");
            Some(candidate)
        } else {
            None
        }
    })
}

fn search_extensions() -> Vec<&'static str> {
    ConfigFormat::SEARCH_ORDER
        .iter()
        .map(ConfigFormat::extension)
        .collect()
}

fn first_match(paths: Vec<PathBuf>, extensions: &[&str]) -> Option<PathBuf> {
    paths
        .iter()
        .find_map(|path| find_file_with_extensions(path, extensions))
}

/// Whether `name` looks like a file name rather than an app name.
pub fn has_extension(name: &str) -> bool {
    Path::new(name).extension().is_some()
}

/// Find the config file for a path, file name or app name.
pub fn find_config(name: &str, directories: Option<&[PathBuf]>) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }

    if has_extension(name) {
        first_match(search_paths(name, directories, None), &[""])
    } else {
        first_match(
            search_paths(APP_CONFIG_FILE, directories, Some(name)),
            &search_extensions(),
        )
    }
}

/// Find a config file for `appname`, optionally looking for `file` instead
/// of `config.<ext>`.
pub fn find_config_from_appname(
    appname: &str,
    file: Option<&str>,
    directories: Option<&[PathBuf]>,
) -> Option<PathBuf> {
    match file {
        Some(file) => first_match(search_paths(file, directories, Some(appname)), &[""]),
        None => first_match(
            search_paths(APP_CONFIG_FILE, directories, Some(appname)),
            &search_extensions(),
        ),
    }
}
