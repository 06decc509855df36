//! Target framework identities.
//!
//! Manifests name frameworks with short monikers such as `dnx451`,
//! `dnxcore50`, `net40-client` or `netstandard1.3`. A moniker resolves to a
//! [`FrameworkName`] (identifier, version, optional profile). Monikers that
//! cannot be resolved produce the [`FrameworkName::unsupported`] sentinel.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Identifier of the unsupported sentinel.
pub const UNSUPPORTED_IDENTIFIER: &str = "Unsupported";

/// Identifier of portable class library frameworks.
pub const PORTABLE_IDENTIFIER: &str = ".NETPortable";

/// Known short prefixes and the identifiers they stand for.
struct KnownFramework {
    short: &'static str,
    identifier: &'static str,
    /// Versions are written with dots (`netstandard1.3`) rather than digits
    dotted: bool,
}

const KNOWN_FRAMEWORKS: &[KnownFramework] = &[
    KnownFramework { short: "net", identifier: ".NETFramework", dotted: false },
    KnownFramework { short: "dnx", identifier: "DNX", dotted: false },
    KnownFramework { short: "dnxcore", identifier: "DNXCore", dotted: false },
    KnownFramework { short: "aspnet", identifier: "Asp.Net", dotted: false },
    KnownFramework { short: "aspnetcore", identifier: "Asp.NetCore", dotted: false },
    KnownFramework { short: "netcore", identifier: ".NETCore", dotted: false },
    KnownFramework { short: "netstandard", identifier: ".NETStandard", dotted: true },
    KnownFramework { short: "netcoreapp", identifier: ".NETCoreApp", dotted: true },
    KnownFramework { short: "dotnet", identifier: ".NETPlatform", dotted: false },
    KnownFramework { short: "sl", identifier: "Silverlight", dotted: false },
    KnownFramework { short: "wp", identifier: "WindowsPhone", dotted: false },
    KnownFramework { short: "wpa", identifier: "WindowsPhoneApp", dotted: false },
    KnownFramework { short: "uap", identifier: "UAP", dotted: true },
];

/// Pairs of (requested, declared) identifiers where the declared framework
/// can serve the requested one.
const COMPATIBLE_IDENTIFIERS: &[(&str, &str)] = &[
    ("DNX", ".NETFramework"),
    ("Asp.Net", ".NETFramework"),
    ("DNXCore", ".NETPlatform"),
    ("DNXCore", ".NETStandard"),
    ("Asp.NetCore", ".NETPlatform"),
    ("Asp.NetCore", ".NETStandard"),
    (".NETCoreApp", ".NETStandard"),
];

fn known_by_short(short: &str) -> Option<&'static KnownFramework> {
    KNOWN_FRAMEWORKS
        .iter()
        .find(|k| k.short.eq_ignore_ascii_case(short))
}

fn known_by_identifier(identifier: &str) -> Option<&'static KnownFramework> {
    KNOWN_FRAMEWORKS
        .iter()
        .find(|k| k.identifier.eq_ignore_ascii_case(identifier))
}

/// Up to four numeric version components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl FrameworkVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        FrameworkVersion {
            major,
            minor,
            ..Default::default()
        }
    }

    pub fn with_build(mut self, build: u32) -> Self {
        self.build = build;
        self
    }

    fn from_components(components: &[u32]) -> Option<Self> {
        if components.is_empty() || components.len() > 4 {
            return None;
        }
        let get = |i: usize| components.get(i).copied().unwrap_or(0);
        Some(FrameworkVersion {
            major: get(0),
            minor: get(1),
            build: get(2),
            revision: get(3),
        })
    }

    /// Parse `4.5.1` or the digit-per-component form `451`.
    fn parse(s: &str) -> Option<Self> {
        if s.contains('.') {
            let components = s
                .split('.')
                .map(|p| p.parse::<u32>().ok())
                .collect::<Option<Vec<_>>>()?;
            return Self::from_components(&components);
        }

        let components = s
            .chars()
            .map(|c| c.to_digit(10))
            .collect::<Option<Vec<_>>>()?;
        Self::from_components(&components)
    }

    /// Components with trailing zeros dropped, keeping at least two.
    fn components(&self) -> Vec<u32> {
        let mut parts = vec![self.major, self.minor, self.build, self.revision];
        while parts.len() > 2 && parts.last() == Some(&0) {
            parts.pop();
        }
        parts
    }

    fn is_zero(&self) -> bool {
        *self == FrameworkVersion::default()
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components().iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A resolved target framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameworkName {
    identifier: String,
    version: FrameworkVersion,
    profile: Option<String>,
}

impl FrameworkName {
    pub fn new(identifier: impl Into<String>, version: FrameworkVersion) -> Self {
        FrameworkName {
            identifier: identifier.into(),
            version,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// The sentinel for monikers that cannot be resolved.
    pub fn unsupported() -> Self {
        FrameworkName::new(UNSUPPORTED_IDENTIFIER, FrameworkVersion::default())
    }

    pub fn is_unsupported(&self) -> bool {
        self.identifier == UNSUPPORTED_IDENTIFIER
    }

    pub fn is_portable(&self) -> bool {
        self.identifier.eq_ignore_ascii_case(PORTABLE_IDENTIFIER)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> FrameworkVersion {
        self.version
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Resolve a short moniker (`dnx451`) or a full name
    /// (`DNX,Version=v4.5.1`). Never fails; unknown input yields
    /// [`FrameworkName::unsupported`].
    pub fn parse_moniker(moniker: &str) -> FrameworkName {
        let moniker = moniker.trim();
        let parsed = if moniker.contains(',') {
            Self::parse_full_name(moniker)
        } else {
            Self::parse_short_name(moniker)
        };
        parsed.unwrap_or_else(FrameworkName::unsupported)
    }

    fn parse_short_name(moniker: &str) -> Option<FrameworkName> {
        let prefix = "portable-";
        if let Some(head) = moniker.get(..prefix.len()) {
            let profile = &moniker[prefix.len()..];
            if head.eq_ignore_ascii_case(prefix) && !profile.is_empty() {
                return Some(
                    FrameworkName::new(PORTABLE_IDENTIFIER, FrameworkVersion::default())
                        .with_profile(profile),
                );
            }
        }

        let (name, profile) = match moniker.split_once('-') {
            Some((name, profile)) if !profile.is_empty() => (name, Some(profile)),
            Some(_) => return None,
            None => (moniker, None),
        };

        let split = name
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(name.len());
        let (short, version) = name.split_at(split);

        let known = known_by_short(short)?;
        let version = if version.is_empty() {
            FrameworkVersion::default()
        } else {
            FrameworkVersion::parse(version)?
        };

        let mut framework = FrameworkName::new(known.identifier, version);
        framework.profile = profile.map(str::to_string);
        Some(framework)
    }

    fn parse_full_name(name: &str) -> Option<FrameworkName> {
        let mut parts = name.split(',').map(str::trim);
        let identifier = parts.next()?;
        let identifier = match known_by_identifier(identifier) {
            Some(known) => known.identifier,
            None if identifier.eq_ignore_ascii_case(PORTABLE_IDENTIFIER) => PORTABLE_IDENTIFIER,
            None => return None,
        };

        let mut version = None;
        let mut profile = None;
        for part in parts {
            let (key, value) = part.split_once('=')?;
            match key.trim().to_ascii_lowercase().as_str() {
                "version" => {
                    let value = value.trim();
                    let value = value.strip_prefix(['v', 'V']).unwrap_or(value);
                    if !value.contains('.') {
                        return None;
                    }
                    version = Some(FrameworkVersion::parse(value)?);
                }
                "profile" => profile = Some(value.trim().to_string()),
                _ => return None,
            }
        }

        let mut framework = FrameworkName::new(identifier, version?);
        framework.profile = profile.filter(|p| !p.is_empty());
        Some(framework)
    }

    /// The short moniker for this framework (`dnx451`, `netstandard1.3`).
    pub fn short_name(&self) -> String {
        if self.is_portable() {
            return format!("portable-{}", self.profile.as_deref().unwrap_or_default());
        }

        let Some(known) = known_by_identifier(&self.identifier) else {
            return self.to_string();
        };

        let components = self.version.components();
        let version = if self.version.is_zero() {
            String::new()
        } else if known.dotted || components.iter().any(|c| *c > 9) {
            self.version.to_string()
        } else {
            components.iter().map(u32::to_string).collect()
        };

        match &self.profile {
            Some(profile) => format!("{}{}-{}", known.short, version, profile),
            None => format!("{}{}", known.short, version),
        }
    }
}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},Version=v{}", self.identifier, self.version)?;
        if let Some(profile) = &self.profile {
            write!(f, ",Profile={}", profile)?;
        }
        Ok(())
    }
}

impl FromStr for FrameworkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let framework = FrameworkName::parse_moniker(s);
        if framework.is_unsupported() {
            Err(format!("`{}` is not a supported target framework", s))
        } else {
            Ok(framework)
        }
    }
}

impl Serialize for FrameworkName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Derive the preprocessor define for a framework.
///
/// The define comes from the short moniker, so every spelling of the same
/// framework agrees: `dnx451`, `DNX451` and `DNX,Version=v4.5.1` all give
/// `DNX451`, `net40-client` gives `NET40_CLIENT`. Portable frameworks and
/// frameworks without a short form get no define.
pub fn framework_define(framework: &FrameworkName) -> Option<String> {
    if framework.is_portable() {
        return None;
    }

    let candidate = framework
        .short_name()
        .to_ascii_uppercase()
        .replace(['-', '+', '.'], "_");
    let mut chars = candidate.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    (valid_start && valid_rest).then_some(candidate)
}

/// Decides whether a declared framework can serve a requested one.
pub trait FrameworkCompatibility {
    fn is_compatible(&self, requested: &FrameworkName, declared: &FrameworkName) -> bool;
}

/// Identifier/version/profile based compatibility.
///
/// A declared framework is compatible when it has the same (or a known
/// compatible) identifier, a version no newer than the requested one, and
/// either no profile or the requested profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompatibility;

impl FrameworkCompatibility for DefaultCompatibility {
    fn is_compatible(&self, requested: &FrameworkName, declared: &FrameworkName) -> bool {
        if requested.is_unsupported() || declared.is_unsupported() {
            return false;
        }

        let same = requested.identifier.eq_ignore_ascii_case(&declared.identifier);
        let related = COMPATIBLE_IDENTIFIERS.iter().any(|(req, dec)| {
            req.eq_ignore_ascii_case(&requested.identifier)
                && dec.eq_ignore_ascii_case(&declared.identifier)
        });
        if !same && !related {
            return false;
        }

        if declared.version > requested.version {
            return false;
        }

        match (&declared.profile, &requested.profile) {
            (None, _) => true,
            (Some(d), Some(r)) => d.eq_ignore_ascii_case(r),
            (Some(_), None) => false,
        }
    }
}

/// Pick the best compatible framework among `candidates`.
///
/// Compatible candidates are ordered by same identifier first, then by
/// highest version; the first one wins.
pub fn nearest<'a, C>(
    requested: &FrameworkName,
    candidates: impl IntoIterator<Item = &'a FrameworkName>,
    compatibility: &C,
) -> Option<&'a FrameworkName>
where
    C: FrameworkCompatibility + ?Sized,
{
    let mut compatible: Vec<&FrameworkName> = candidates
        .into_iter()
        .filter(|declared| compatibility.is_compatible(requested, declared))
        .collect();

    compatible.sort_by(|a, b| {
        let a_same = a.identifier.eq_ignore_ascii_case(&requested.identifier);
        let b_same = b.identifier.eq_ignore_ascii_case(&requested.identifier);
        b_same
            .cmp(&a_same)
            .then_with(|| b.version.cmp(&a.version))
            .then_with(|| a.cmp(b))
    });

    compatible.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fw(s: &str) -> FrameworkName {
        FrameworkName::parse_moniker(s)
    }

    #[test]
    fn test_parse_digit_versions() {
        let dnx = fw("dnx451");
        assert_eq!(dnx.identifier(), "DNX");
        assert_eq!(dnx.version(), FrameworkVersion::new(4, 5).with_build(1));
        assert_eq!(dnx.to_string(), "DNX,Version=v4.5.1");

        let core = fw("dnxcore50");
        assert_eq!(core.identifier(), "DNXCore");
        assert_eq!(core.version(), FrameworkVersion::new(5, 0));
    }

    #[test]
    fn test_parse_dotted_versions() {
        let std = fw("netstandard1.3");
        assert_eq!(std.identifier(), ".NETStandard");
        assert_eq!(std.version(), FrameworkVersion::new(1, 3));
        assert_eq!(std.short_name(), "netstandard1.3");
    }

    #[test]
    fn test_parse_profile() {
        let client = fw("net40-client");
        assert_eq!(client.identifier(), ".NETFramework");
        assert_eq!(client.profile(), Some("client"));
        assert_eq!(client.short_name(), "net40-client");
    }

    #[test]
    fn test_parse_portable() {
        let portable = fw("portable-net45+win8");
        assert!(portable.is_portable());
        assert_eq!(portable.profile(), Some("net45+win8"));
        assert_eq!(portable.short_name(), "portable-net45+win8");
    }

    #[test]
    fn test_parse_full_name() {
        assert_eq!(fw("DNX,Version=v4.5.1"), fw("dnx451"));
        assert_eq!(
            fw(".NETFramework,Version=v4.0,Profile=client"),
            fw("net40-client")
        );
    }

    #[test]
    fn test_unsupported_monikers() {
        assert!(fw("foo42").is_unsupported());
        assert!(fw("").is_unsupported());
        assert!(fw("dnx4x").is_unsupported());
        assert!(fw("net45-").is_unsupported());
        assert!("foo42".parse::<FrameworkName>().is_err());
    }

    #[test]
    fn test_case_insensitive_prefix() {
        assert_eq!(fw("DNX451"), fw("dnx451"));
    }

    #[test]
    fn test_short_name_round_trip() {
        for moniker in ["dnx451", "dnxcore50", "net45", "netstandard1.3", "net40-client", "dnx"] {
            let framework = fw(moniker);
            assert_eq!(framework.short_name(), moniker);
            assert_eq!(fw(&framework.short_name()), framework);
        }
    }

    #[test]
    fn test_framework_define() {
        let define = |moniker: &str| framework_define(&fw(moniker));

        assert_eq!(define("dnx451").as_deref(), Some("DNX451"));
        assert_eq!(define("net40-client").as_deref(), Some("NET40_CLIENT"));
        assert_eq!(define("netstandard1.3").as_deref(), Some("NETSTANDARD1_3"));
        assert_eq!(define("portable-net45+win8"), None);
        let custom = FrameworkName::new("Custom", FrameworkVersion::new(1, 0));
        assert_eq!(framework_define(&custom), None);
    }

    #[test]
    fn test_framework_define_follows_identity() {
        let define = |moniker: &str| framework_define(&fw(moniker));

        assert_eq!(define("DNX,Version=v4.5.1").as_deref(), Some("DNX451"));
        assert_eq!(define("DNX451").as_deref(), Some("DNX451"));
        assert_eq!(define("net4.5").as_deref(), Some("NET45"));
        assert_eq!(define("net45").as_deref(), Some("NET45"));
    }

    #[test]
    fn test_default_compatibility() {
        let compat = DefaultCompatibility;
        assert!(compat.is_compatible(&fw("dnx46"), &fw("dnx451")));
        assert!(!compat.is_compatible(&fw("dnx451"), &fw("dnx46")));
        assert!(compat.is_compatible(&fw("dnx451"), &fw("net45")));
        assert!(!compat.is_compatible(&fw("net45"), &fw("dnx451")));
        assert!(!compat.is_compatible(&fw("dnxcore50"), &fw("dnx451")));
        assert!(compat.is_compatible(&fw("net40-client"), &fw("net35")));
        assert!(!compat.is_compatible(&fw("net40"), &fw("net35-client")));
    }

    #[test]
    fn test_nearest_prefers_same_identifier_then_highest_version() {
        let declared = [fw("net45"), fw("dnx45"), fw("dnx451"), fw("dnxcore50")];
        let pick = nearest(&fw("dnx46"), declared.iter(), &DefaultCompatibility).unwrap();
        assert_eq!(pick, &fw("dnx451"));

        let declared = [fw("net40"), fw("net45")];
        let pick = nearest(&fw("dnx451"), declared.iter(), &DefaultCompatibility).unwrap();
        assert_eq!(pick, &fw("net45"));

        assert!(nearest(&fw("sl5"), declared.iter(), &DefaultCompatibility).is_none());
    }
}
