use semver::Version;

/// Which component of the version the next release advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReleaseType {
    #[default]
    Patch,
    Minor,
    Major,
}

/// Parse a tag short name as a semantic version.
///
/// One leading 'v' or 'V' is stripped before parsing, so "v1.2.3" and
/// "1.2.3" are both valid candidates. Any other naming convention fails
/// to parse and the tag is excluded by the caller.
pub fn parse_tag(tag: &str) -> Result<Version, semver::Error> {
    let name = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);
    Version::parse(name)
}

/// Maximum semantic version among the given tag names.
///
/// Unparseable tags are reported through `on_skip` and excluded; they never
/// abort resolution. An empty candidate set yields exactly 0.0.0.
pub fn max_version<S, F>(tags: &[S], mut on_skip: F) -> Version
where
    S: AsRef<str>,
    F: FnMut(&str, &semver::Error),
{
    let mut latest: Option<Version> = None;

    for tag in tags {
        match parse_tag(tag.as_ref()) {
            Ok(version) => {
                if latest.as_ref().map_or(true, |max| version > *max) {
                    latest = Some(version);
                }
            }
            Err(e) => on_skip(tag.as_ref(), &e),
        }
    }

    latest.unwrap_or_else(|| Version::new(0, 0, 0))
}

/// Compute the next version for a release.
///
/// Pre-release and build metadata on the current version are cleared; a
/// patch bump on `1.2.3-rc.1` yields `1.2.4`.
pub fn next_version(current: &Version, release_type: ReleaseType) -> Version {
    match release_type {
        ReleaseType::Patch => Version::new(current.major, current.minor, current.patch + 1),
        ReleaseType::Minor => Version::new(current.major, current.minor + 1, 0),
        ReleaseType::Major => Version::new(current.major + 1, 0, 0),
    }
}

/// Tag name created for a released version.
pub fn tag_name(version: &Version) -> String {
    format!("v{}", version)
}
