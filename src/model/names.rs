//! Class names, method signatures and method references.
//!
//! These are the identity types shared by every other module. They are cheap to
//! clone ([`ClassName`] is an `Arc<str>`) and totally ordered, so that every map
//! keyed by them iterates deterministically.

use std::{borrow::Borrow, fmt, str::FromStr, sync::Arc};

use bitflags::bitflags;

use crate::{Error, Result};

/// Fully-qualified name of a class, e.g. `com.example.MainActivity`.
///
/// Inner classes use `$` as separator (`android.app.Application$ActivityLifecycleCallbacks`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(Arc<str>);

impl ClassName {
    /// Creates a new class name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part after the last `.`, e.g. `MainActivity` or `Outer$Inner`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Returns the enclosing class for inner classes (`a.Outer$Inner` -> `a.Outer`).
    #[must_use]
    pub fn outer_class(&self) -> Option<ClassName> {
        self.0.rfind('$').map(|idx| ClassName::new(&self.0[..idx]))
    }

    /// Returns a form of the name usable inside a method identifier.
    ///
    /// Underscores are doubled, then dots become underscores: `a.b_c.D` becomes
    /// `a_b__c_D`. Distinct names can still mangle alike (`p._A` and `p_.A`), so
    /// callers needing unique identifiers must deduplicate.
    #[must_use]
    pub fn mangled(&self) -> String {
        self.0.replace('_', "__").replace('.', "_")
    }

    /// Returns true if the name starts with one of the given package prefixes.
    #[must_use]
    pub fn in_package(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|p| self.0.starts_with(p))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClassName {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&ClassName> for ClassName {
    fn from(value: &ClassName) -> Self {
        value.clone()
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Names of the primitive types of the target IR.
const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Returns true if the given type name denotes a primitive value type.
#[must_use]
pub fn is_primitive_type(ty: &str) -> bool {
    PRIMITIVES.contains(&ty)
}

/// Returns true if the given type name denotes an array type (`int[]`).
#[must_use]
pub fn is_array_type(ty: &str) -> bool {
    ty.ends_with("[]")
}

/// A method subsignature: return type, name and parameter types.
///
/// The textual form is `ret name(p1,p2)` without spaces after commas, for example
/// `void onCreate(android.os.Bundle)` or `boolean onCreate()`.
///
/// # Examples
///
/// ```rust
/// use rootsynth::model::MethodSignature;
///
/// let sig: MethodSignature = "void onStart(android.content.Intent,int)".parse()?;
/// assert_eq!(sig.name(), "onStart");
/// assert_eq!(sig.params(), ["android.content.Intent", "int"]);
/// assert_eq!(sig.to_string(), "void onStart(android.content.Intent,int)");
/// # Ok::<(), rootsynth::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MethodSignature {
    return_type: String,
    name: String,
    params: Vec<String>,
}

impl MethodSignature {
    /// Creates a signature from its parts.
    #[must_use]
    pub fn new(return_type: impl Into<String>, name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            return_type: return_type.into(),
            name: name.into(),
            params,
        }
    }

    /// Parses a subsignature of the form `ret name(p1,p2)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the string lacks a return type, a name or a
    /// well-formed parameter list.
    pub fn parse(subsignature: &str) -> Result<Self> {
        let invalid = || Error::InvalidSignature(subsignature.to_string());

        let trimmed = subsignature.trim();
        let open = trimmed.find('(').ok_or_else(invalid)?;
        if !trimmed.ends_with(')') {
            return Err(invalid());
        }

        let head = trimmed[..open].trim();
        let (return_type, name) = head.rsplit_once(char::is_whitespace).ok_or_else(invalid)?;
        let return_type = return_type.trim();
        let name = name.trim();
        if return_type.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        let inner = trimmed[open + 1..trimmed.len() - 1].trim();
        let params = if inner.is_empty() {
            Vec::new()
        } else {
            let params: Vec<String> = inner.split(',').map(|p| p.trim().to_string()).collect();
            if params.iter().any(String::is_empty) {
                return Err(invalid());
            }
            params
        };

        Ok(Self::new(return_type, name, params))
    }

    /// The declared return type.
    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter types in declaration order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns true if the method does not produce a value.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Returns true if this is an instance constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

impl FromStr for MethodSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            self.params.join(",")
        )
    }
}

bitflags! {
    /// Modifiers of a method relevant to call synthesis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct MethodFlags: u8 {
        /// Method is static and takes no receiver
        const STATIC = 0x01;
        /// Method has no body
        const ABSTRACT = 0x02;
        /// Method is not visible outside its class
        const PRIVATE = 0x04;
    }
}

/// A method of a specific class.
///
/// Ordering and equality consider the declaring class, the signature and the flags, which
/// gives callback sets a stable iteration order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MethodRef {
    class: ClassName,
    signature: MethodSignature,
    flags: MethodFlags,
}

impl MethodRef {
    /// Creates a reference to the method `subsignature` declared in `class`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the subsignature cannot be parsed.
    pub fn new(class: impl Into<ClassName>, subsignature: &str) -> Result<Self> {
        Ok(Self::from_signature(
            class.into(),
            MethodSignature::parse(subsignature)?,
        ))
    }

    /// Creates a method reference from an already parsed signature.
    #[must_use]
    pub fn from_signature(class: ClassName, signature: MethodSignature) -> Self {
        Self {
            class,
            signature,
            flags: MethodFlags::empty(),
        }
    }

    /// Replaces the modifiers of this method.
    #[must_use]
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The declaring class.
    #[must_use]
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// The parsed signature.
    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// The textual subsignature, e.g. `void onCreate()`.
    #[must_use]
    pub fn subsignature(&self) -> String {
        self.signature.to_string()
    }

    /// The method modifiers.
    #[must_use]
    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    /// Returns true if the method is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Returns true if the method has no body.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ABSTRACT)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {}>", self.class, self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(ClassName::new("com.example.Main").simple_name(), "Main");
        assert_eq!(ClassName::new("Main").simple_name(), "Main");
        assert_eq!(
            ClassName::new("android.app.Application$ActivityLifecycleCallbacks").simple_name(),
            "Application$ActivityLifecycleCallbacks"
        );
    }

    #[test]
    fn test_outer_class() {
        let inner = ClassName::new("com.example.Main$Listener");
        assert_eq!(inner.outer_class(), Some(ClassName::new("com.example.Main")));
        assert_eq!(ClassName::new("com.example.Main").outer_class(), None);
    }

    #[test]
    fn test_mangled_escapes_underscores() {
        assert_eq!(ClassName::new("a.b_c.D").mangled(), "a_b__c_D");
        assert_ne!(
            ClassName::new("a.b_c").mangled(),
            ClassName::new("a_b.c").mangled()
        );
        // not injective: dots next to underscores collapse
        assert_eq!(ClassName::new("p._A").mangled(), ClassName::new("p_.A").mangled());
    }

    #[test]
    fn test_parse_signature() -> Result<()> {
        let sig = MethodSignature::parse("boolean onCreate()")?;
        assert_eq!(sig.return_type(), "boolean");
        assert_eq!(sig.name(), "onCreate");
        assert!(sig.params().is_empty());

        let sig = MethodSignature::parse(
            "android.database.Cursor query(android.net.Uri,java.lang.String[],java.lang.String)",
        )?;
        assert_eq!(sig.params().len(), 3);
        assert_eq!(sig.params()[1], "java.lang.String[]");
        Ok(())
    }

    #[test]
    fn test_parse_signature_tolerates_spaces() -> Result<()> {
        let sig = MethodSignature::parse("  void onStart( android.content.Intent , int )  ")?;
        assert_eq!(sig.to_string(), "void onStart(android.content.Intent,int)");
        Ok(())
    }

    #[test]
    fn test_parse_signature_rejects_garbage() {
        for bad in ["onCreate()", "void onCreate", "void (int)", "void f(int,)", "void f(int"] {
            assert!(
                matches!(MethodSignature::parse(bad), Err(Error::InvalidSignature(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_method_ref_display() -> Result<()> {
        let m = MethodRef::new("com.example.Main", "void onCreate(android.os.Bundle)")?;
        assert_eq!(m.to_string(), "<com.example.Main: void onCreate(android.os.Bundle)>");
        assert!(!m.is_static());
        assert!(m.with_flags(MethodFlags::STATIC).is_static());
        Ok(())
    }

    #[test]
    fn test_primitive_types() {
        assert!(is_primitive_type("int"));
        assert!(!is_primitive_type("java.lang.Integer"));
        assert!(is_array_type("byte[]"));
    }
}
