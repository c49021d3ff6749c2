//! Small helpers shared by the constant pool accessors

/// Matches `$expr` against a single pattern, yielding the named bindings on a match.
///
/// ```ignore
/// let utf8 = match_as!(utf; ConstantPoolInfo::Utf8(utf) = info);
/// ```
macro_rules! match_as {
    ($($ids:ident),+; $pat:pat_param = $expr:expr) => {
        match $expr {
            $pat => Some(($($ids),*)),
            _ => None,
        }
    };
}
pub(crate) use match_as;
