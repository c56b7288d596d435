use std::{borrow::Cow, io::Write};

pub use quick_xml::{events, Reader, Writer};

use super::error::Error;

pub trait ToXml {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error>;
}

/// Escapes `<`, `>`, `&`, `'` and `"` so `value` can be spliced into markup.
pub fn escape(value: &str) -> Cow<'_, str> {
    match quick_xml::escape::escape(value.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(value),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
