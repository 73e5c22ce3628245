//! Package references parsed from package file names.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// `<id>.<major>.<minor>[.<patch>][-<prerelease>]`, id as short as possible.
static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\.([0-9]+\.[0-9]+(?:\.[0-9]+)?(?:-.+)?)$")
        .expect("package name pattern is valid")
});

/// An `(id, version)` pair identifying a built package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRef {
    id: String,
    version: String,
}

impl PackageRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRef {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Parse a package name without extension, e.g. `MyLib.1.2.3-beta1`.
    ///
    /// Returns `None` when the name carries no version suffix.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = PACKAGE_NAME.captures(name)?;
        Some(PackageRef::new(&caps[1], &caps[2]))
    }

    /// Parse the file stem of a package file such as `MyLib.1.2.3.nupkg`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        Self::parse(stem)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_part_version() {
        let pkg = PackageRef::parse("MyLib.1.2.3").unwrap();
        assert_eq!(pkg.id(), "MyLib");
        assert_eq!(pkg.version(), "1.2.3");
    }

    #[test]
    fn test_parse_prerelease() {
        let pkg = PackageRef::parse("MyLib.1.2.3-beta1").unwrap();
        assert_eq!(pkg.id(), "MyLib");
        assert_eq!(pkg.version(), "1.2.3-beta1");
    }

    #[test]
    fn test_parse_two_part_version() {
        let pkg = PackageRef::parse("MyLib.4.0").unwrap();
        assert_eq!(pkg.version(), "4.0");
    }

    #[test]
    fn test_parse_dotted_id() {
        let pkg = PackageRef::parse("Company.Product.Core.2.10.1").unwrap();
        assert_eq!(pkg.id(), "Company.Product.Core");
        assert_eq!(pkg.version(), "2.10.1");
    }

    #[test]
    fn test_parse_without_version() {
        assert!(PackageRef::parse("MyLib").is_none());
        assert!(PackageRef::parse("MyLib.1").is_none());
        assert!(PackageRef::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_non_ascii_digits() {
        assert!(PackageRef::parse("MyLib.١.٢").is_none());
    }

    #[test]
    fn test_from_path_strips_extension() {
        let pkg = PackageRef::from_path(Path::new("out/MyLib.1.2.3.nupkg")).unwrap();
        assert_eq!(pkg, PackageRef::new("MyLib", "1.2.3"));
        assert_eq!(pkg.to_string(), "MyLib.1.2.3");
    }
}
