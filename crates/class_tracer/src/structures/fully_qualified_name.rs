//! Internal class names, such as `java/lang/Object`

use std::fmt::{Debug, Display, Formatter};

/// A fully qualified class name in internal form, with packages separated by `/`
#[derive(Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct FQName {
    fcq: str,
}

impl FQName {
    /// Wraps a string as a fully qualified name
    pub fn new<'a, S: AsRef<str> + 'a + ?Sized>(fcq: &'a S) -> &'a Self {
        let fcq = fcq.as_ref() as *const str;
        // SAFETY: FQName is a transparent wrapper around str
        unsafe { &*(fcq as *const FQName) }
    }

    /// The name as written in the class file
    pub fn as_str(&self) -> &str {
        &self.fcq
    }

    /// The name with `.` separating packages, as it is written in java source
    pub fn binary_name(&self) -> String {
        self.fcq.replace('/', ".")
    }

    /// The last identifier of the name
    pub fn simple_name(&self) -> &str {
        self.fcq
            .rsplit_once('/')
            .map_or(&self.fcq, |(_, simple)| simple)
    }

    /// The package portion of the name, if the class isn't in the default package
    pub fn package(&self) -> Option<&str> {
        self.fcq.rsplit_once('/').map(|(package, _)| package)
    }
}

impl PartialEq<str> for FQName {
    fn eq(&self, other: &str) -> bool {
        &self.fcq == other
    }
}

impl PartialEq<&str> for FQName {
    fn eq(&self, other: &&str) -> bool {
        &self.fcq == *other
    }
}

impl AsRef<str> for FQName {
    fn as_ref(&self) -> &str {
        &self.fcq
    }
}

impl Debug for FQName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.fcq, f)
    }
}

impl Display for FQName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.fcq, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::structures::FQName;

    #[test]
    fn name_parts() {
        let fcq = FQName::new("java/lang/Object");
        assert_eq!(fcq, "java/lang/Object");
        assert_eq!(fcq.binary_name(), "java.lang.Object");
        assert_eq!(fcq.simple_name(), "Object");
        assert_eq!(fcq.package(), Some("java/lang"));
    }

    #[test]
    fn default_package() {
        let owned = String::from("Main");
        let fcq = FQName::new(&owned);
        assert_eq!(fcq.binary_name(), "Main");
        assert_eq!(fcq.simple_name(), "Main");
        assert_eq!(fcq.package(), None);
    }

    #[test]
    fn nested_class_keeps_dollar() {
        let fcq = FQName::new("com/example/Outer$Inner");
        assert_eq!(fcq.binary_name(), "com.example.Outer$Inner");
        assert_eq!(fcq.simple_name(), "Outer$Inner");
    }
}
