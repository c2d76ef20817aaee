//! The interface every resource filter implements.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::{error::Error, options::FilterOptions, types::LanguageBundle};

/// Converts one resource file format to and from a [`LanguageBundle`].
///
/// All operations are synchronous and keep no state between calls, so a
/// filter can be shared between threads working on independent streams.
///
/// # Example
///
/// ```rust
/// use resfilter::{FilterOptions, formats::AndroidStrings, traits::ResourceFilter};
///
/// let xml = r#"<resources><string name="greeting">Hello</string></resources>"#;
/// let bundle = AndroidStrings.parse_str(xml, &FilterOptions::new())?;
/// assert_eq!(bundle.resource_strings()[0].value, "Hello");
/// # Ok::<(), resfilter::Error>(())
/// ```
pub trait ResourceFilter {
    /// Parses a whole document into a bundle.
    fn parse<R: BufRead>(&self, reader: R, options: &FilterOptions) -> Result<LanguageBundle, Error>;

    /// Writes a bundle as a new document.
    fn write<W: Write>(
        &self,
        writer: W,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error>;

    /// Writes `base` with the values of `bundle` applied to it.
    fn merge<R: BufRead, W: Write>(
        &self,
        base: R,
        writer: W,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error>;

    /// Parse from a string.
    fn parse_str(&self, s: &str, options: &FilterOptions) -> Result<LanguageBundle, Error> {
        self.parse(Cursor::new(s), options)
    }

    /// Parse from file path.
    fn parse_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &FilterOptions,
    ) -> Result<LanguageBundle, Error> {
        let file = File::open(path)?;
        self.parse(BufReader::new(file), options)
    }

    /// Write into a string.
    fn write_to_string(
        &self,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<String, Error> {
        let mut out = Vec::new();
        self.write(&mut out, bundle, options)?;
        String::from_utf8(out).map_err(|e| Error::format_with_source("output is not UTF-8", e))
    }

    /// Write to file path.
    fn write_file<P: AsRef<Path>>(
        &self,
        path: P,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer, bundle, options)?;
        writer.flush()?;
        Ok(())
    }

    /// Merge into a string.
    fn merge_str(
        &self,
        base: &str,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<String, Error> {
        let mut out = Vec::new();
        self.merge(Cursor::new(base), &mut out, bundle, options)?;
        String::from_utf8(out).map_err(|e| Error::format_with_source("output is not UTF-8", e))
    }

    /// Merge the file at `base` into a new file at `output`.
    fn merge_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        base: P,
        output: Q,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error> {
        let reader = BufReader::new(File::open(base)?);
        let mut writer = BufWriter::new(File::create(output)?);
        self.merge(reader, &mut writer, bundle, options)?;
        writer.flush()?;
        Ok(())
    }
}
