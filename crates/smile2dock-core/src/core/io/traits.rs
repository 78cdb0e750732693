use super::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for writing a molecular file format.
///
/// Implementors serialize one [`Structure`] together with format-specific
/// metadata. Writing without metadata uses the format's default metadata.
pub trait MolecularFile {
    /// Format-specific metadata written alongside the structure.
    type Metadata: Default;

    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes a structure and its metadata to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure cannot be expressed in the format or
    /// the writer fails.
    fn write_to(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a structure with default metadata.
    fn write_structure_to(
        structure: &Structure<'_>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(structure, &Self::Metadata::default(), writer)
    }

    /// Writes a structure and its metadata to a new file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes a structure with default metadata to a new file at `path`.
    fn write_structure_to_path<P: AsRef<Path>>(
        structure: &Structure<'_>,
        path: P,
    ) -> Result<(), Self::Error> {
        Self::write_to_path(structure, &Self::Metadata::default(), path)
    }
}
