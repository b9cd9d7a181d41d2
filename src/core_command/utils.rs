use std::sync::OnceLock;

use regex::Regex;

use crate::constants::USERNAME_REGEX;

pub fn valid_username(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(USERNAME_REGEX).unwrap())
        .is_match(name)
}

/// SIZE, DELE and the transfer commands take bare filenames, never paths;
/// separators in the argument would sidestep the sandbox.
pub fn is_bare_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
