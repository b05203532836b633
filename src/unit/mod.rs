use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

mod error;

pub use error::{Error, Result};

/// The maximum allowed length for a [`UnitName`].
const UNIT_NAME_MAX_LEN: usize = 255;

/// A validated systemd unit name.
///
/// # Examples
///
/// ```
/// # use statewatch::unit::UnitName;
/// let unit = UnitName::new("nginx.service").unwrap();
/// assert_eq!(unit.as_ref(), "nginx.service");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitName(Arc<str>);

impl UnitName {
    /// Creates a new `UnitName` from the given raw name.
    ///
    /// The name is passed verbatim to `systemctl`, so anything that could be
    /// read as a flag or smuggle shell syntax is rejected up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUnitName`] if the input is empty, longer than
    /// [`UNIT_NAME_MAX_LEN`] bytes, starts with `-`, or contains characters
    /// outside ASCII alphanumerics and `: - _ . \ @`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use statewatch::unit::UnitName;
    /// assert!(UnitName::new("getty@tty1.service").is_ok());
    /// assert!(UnitName::new("-rf").is_err());
    /// ```
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty() || src.len() > UNIT_NAME_MAX_LEN || src.starts_with('-') {
            return Err(Error::InvalidUnitName(src.to_owned()));
        }
        if !src.bytes().all(is_allowed_byte) {
            return Err(Error::InvalidUnitName(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    pub fn to_arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

fn is_allowed_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.' | b'\\' | b'@')
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_unit_names() {
        for name in [
            "nginx.service",
            "dbus.socket",
            "getty@tty1.service",
            "systemd-journald.service",
            "proc-sys-fs-binfmt_misc.mount",
        ] {
            assert!(UnitName::new(name).is_ok(), "rejected {name}");
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert!(UnitName::new("").is_err());
    }

    #[test]
    fn rejects_leading_dash() {
        assert!(UnitName::new("-rf.service").is_err());
    }

    #[test]
    fn rejects_unsafe_characters() {
        for name in ["nginx.service; rm", "a b.service", "unit\nname", "caf\u{e9}.service"] {
            assert!(UnitName::new(name).is_err(), "accepted {name}");
        }
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "a".repeat(UNIT_NAME_MAX_LEN + 1);
        assert!(UnitName::new(name).is_err());
    }
}
