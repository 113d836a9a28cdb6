// Checks on caller-supplied values that end up on a device command line.
//
// `adb shell` joins its arguments into one line for the device shell, so
// anything passed unquoted must be restricted to a safe alphabet.

use crate::error::Error;

const MAX_PACKAGE_NAME: usize = 256;

/// Accept `segment(.segment)+` where each segment starts with an ASCII
/// letter followed by letters, digits or `_`.
pub fn package_name(name: &str) -> Result<(), Error> {
    let invalid = || Error::InvalidPackageName {
        name: name.to_owned(),
    };
    if name.is_empty() || name.len() > MAX_PACKAGE_NAME {
        return Err(invalid());
    }

    let mut segments = 0;
    for segment in name.split('.') {
        let mut chars = segment.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid());
        }
        segments += 1;
    }
    if segments < 2 {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_package_names() {
        for name in ["com.android.chrome", "org.example.app_2", "a.b", "Com.Foo.Bar9"] {
            assert!(package_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_shell_metacharacters_and_malformed_names() {
        for name in [
            "",
            "chrome",
            "x;reboot",
            "com.app && reboot",
            "com.app|sh",
            "com.$(id).app",
            "com..app",
            ".com.app",
            "com.app.",
            "com.1app",
            "com.app\nreboot",
        ] {
            assert!(
                matches!(package_name(name), Err(Error::InvalidPackageName { .. })),
                "{name:?}"
            );
        }
        assert!(package_name(&format!("a.{}", "b".repeat(300))).is_err());
    }
}
