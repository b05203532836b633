//! Parser for `systemctl show` property output.
//!
//! `systemctl show <unit> --property=<name>` prints one `Name=value` line
//! per requested property. See
//! [`systemctl(1)`](https://man7.org/linux/man-pages/man1/systemctl.1.html)
//! for details on the output format.

/// Extracts the value of `property` from property-list output.
///
/// Keys and values are trimmed. An empty value counts as missing, which is
/// how `systemctl` renders properties a unit does not carry.
pub fn property_value<'a>(output: &'a str, property: &str) -> Option<&'a str> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != property {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then_some(value)
    })
}
