use crate::attributes::Attribute;
use crate::error::Error;
pub use class::*;
pub use class_entries::*;
pub use descriptor::*;
pub use fully_qualified_name::*;

pub mod attributes;
mod class;
mod class_entries;
mod descriptor;
mod fully_qualified_name;

/// Objects which implement this trait can be queried for their attributes.
pub trait HasAttributes {
    /// The iterator that attributes are returned in
    type Iter<'a>: Iterator<Item = Result<Attribute<'a>, Error>>
    where
        Self: 'a;

    /// Gets the attributes associated with this value.
    fn attributes<'a>(&'a self) -> Self::Iter<'a>;

    /// Attempts to get an attribute by attribute name
    ///
    /// # Error
    /// Fails if any attribute before the match can't be resolved.
    fn get_attribute(&self, name: &str) -> Result<Option<Attribute>, Error> {
        for attribute in self.attributes() {
            let attribute = attribute?;
            if attribute.attribute_name() == name {
                return Ok(Some(attribute));
            }
        }
        Ok(None)
    }
}
