use anyhow::{Context, Result};
use std::{fs, io::Write, path::Path};

use crate::record::WordCount;

/// Escribe "palabra,conteo" (sin encabezado) en cualquier writer, ordenado por palabra.
pub fn write_word_count_csv<W: Write>(counts: &WordCount, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for (word, count) in counts {
        wtr.serialize((word, count))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Igual que `write_word_count_csv` pero a un archivo; crea la carpeta de salida si hace falta.
pub fn write_word_count_file(counts: &WordCount, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("no se pudo crear {}", parent.display()))?;
        }
    }

    let file = fs::File::create(output_path)
        .with_context(|| format!("no se pudo crear {}", output_path.display()))?;
    write_word_count_csv(counts, file)
}

/// Ordena de mayor a menor conteo (empates por palabra) y corta en `top` si viene.
pub fn ranked(counts: &WordCount, top: Option<usize>) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if let Some(n) = top {
        entries.truncate(n);
    }
    entries
}
