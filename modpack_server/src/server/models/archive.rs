use std::{
    fs::File,
    io::{self, Cursor},
    path::Path,
};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::{modpack_map::modpack_files, ModpackError};

/// Zips every file below `modpack_dir`, flattened to its base name.
pub fn zip_modpack(modpack_dir: &Path) -> Result<Vec<u8>, ModpackError> {
    let mut zip_buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in modpack_files(modpack_dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            zip.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut zip)?;
        }

        zip.finish()?;
    }
    Ok(zip_buffer)
}
